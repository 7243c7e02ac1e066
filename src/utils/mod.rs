pub mod config;
pub mod logger;
pub mod vaultvol_toml;

pub use config::*;
pub use logger::{Colors, setup_logging};
pub use vaultvol_toml::{VaultvolToml, apply_env_to_opts, apply_file_to_opts, load_vaultvol_toml};
