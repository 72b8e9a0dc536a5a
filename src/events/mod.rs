//! Data exchanged with collision listeners.
//!
//! Submodules:
//! - [`collision`] – contact info and the notice delivered to shape listeners
pub mod collision;
