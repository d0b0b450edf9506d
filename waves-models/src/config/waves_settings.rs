//! Layered settings loading for node binaries.
//!
//! The node merges, in order: the file at `WAVES_CONFIG_PATH`
//! (`base_config/config.toml` by default), an optional override file at
//! `WAVES_CONFIG_OVERRIDE_PATH` (`config/config.toml` by default), a portable
//! per-user configuration directory, and finally environment variables with
//! the given prefix (override if duplicated).

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::Path;

/// Merge the settings layers into a deserialized settings struct.
#[inline]
pub fn build_waves_settings<T: Deserialize<'static>>(app_name: &str, env_prefix: &str) -> T {
    let mut builder = config::Config::builder();
    let config_path = std::env::var("WAVES_CONFIG_PATH")
        .unwrap_or_else(|_| "base_config/config.toml".to_string());

    builder = builder.add_source(config::File::with_name(&config_path));

    let config_override_path = std::env::var("WAVES_CONFIG_OVERRIDE_PATH")
        .unwrap_or_else(|_| "config/config.toml".to_string());

    if Path::new(&config_override_path).is_file() {
        builder = builder.add_source(config::File::with_name(&config_override_path));
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "WavesPlatform", app_name) {
        // portable user config loading
        let user_config_path = proj_dirs.config_dir();
        if user_config_path.exists() {
            let path_str = user_config_path.to_str().unwrap();
            builder = builder.add_source(config::File::with_name(path_str));
        }
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(env_prefix))
        .build()
        .unwrap_or_else(|err| panic!("failed to build settings: {}", err));

    settings
        .try_deserialize()
        .unwrap_or_else(|err| panic!("failed to deserialize settings: {}", err))
}
