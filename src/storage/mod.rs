//! Profile storage and persistence module.
//!
//! Named speed profiles per channel, the currently applied profile of each
//! channel and user settings, saved as JSON.

pub mod defaults;
pub mod profiles;
pub mod types;

pub use defaults::default_profiles;
pub use profiles::{ProfileStore, get_config_dir, get_profiles_path};
pub use types::*;
