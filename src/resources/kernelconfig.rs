//! Kernel configuration resource.
//!
//! Settings loaded from an INI file. Defaults are safe to run with, so a
//! missing file is not fatal for callers that choose to ignore the error.
//!
//! # Configuration File Format
//!
//! ```ini
//! [frame]
//! time_scale = 1.0
//! target_fps = 60
//! frames = 600
//!
//! [collision]
//! max_collisions_per_frame = 32
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::components::collisionshape::DEFAULT_MAX_COLLISIONS_PER_FRAME;
use crate::error::{KernelError, KernelResult};

const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_FRAMES: u32 = 600;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone)]
pub struct KernelConfig {
    /// Multiplier applied to every frame delta.
    pub time_scale: f32,
    /// Fixed step used by headless runs, as frames per second.
    pub target_fps: u32,
    /// Number of frames a headless run simulates.
    pub frames: u32,
    /// Per-frame notification budget given to shapes built from config.
    pub max_collisions_per_frame: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            time_scale: DEFAULT_TIME_SCALE,
            target_fps: DEFAULT_TARGET_FPS,
            frames: DEFAULT_FRAMES,
            max_collisions_per_frame: DEFAULT_MAX_COLLISIONS_PER_FRAME,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Seconds per frame for fixed-step runs.
    pub fn fixed_delta(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    pub fn load_from_file(&mut self) -> KernelResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| KernelError::Config(format!("failed to load config file: {e}")))?;

        // [frame] section
        if let Some(scale) = config.getfloat("frame", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }
        if let Some(fps) = config.getuint("frame", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(frames) = config.getuint("frame", "frames").ok().flatten() {
            self.frames = frames as u32;
        }

        // [collision] section
        if let Some(max) = config
            .getuint("collision", "max_collisions_per_frame")
            .ok()
            .flatten()
        {
            self.max_collisions_per_frame = max as u32;
        }

        info!(
            "Loaded config: time_scale={}, fps={}, frames={}, max_collisions_per_frame={}",
            self.time_scale, self.target_fps, self.frames, self.max_collisions_per_frame
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> KernelResult<()> {
        let mut config = Ini::new();

        // [frame] section
        config.set("frame", "time_scale", Some(self.time_scale.to_string()));
        config.set("frame", "target_fps", Some(self.target_fps.to_string()));
        config.set("frame", "frames", Some(self.frames.to_string()));

        // [collision] section
        config.set(
            "collision",
            "max_collisions_per_frame",
            Some(self.max_collisions_per_frame.to_string()),
        );

        config.write(&self.config_path)?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
