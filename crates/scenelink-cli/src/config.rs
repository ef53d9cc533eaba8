//! Configuration loading for the client.
//!
//! The client shares the daemon's configuration layers (files and
//! `SCENELINK_*` variables) so that both agree on the endpoint without extra
//! flags. Command-line `--host` and `--port` are applied on top.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use scenelink_config::Config;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration layers other than the client's own flags.
    fn load(&self) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self) -> Result<Config, AppError> {
        // Only the program name is forwarded; client flags are not config flags.
        let args = [OsString::from("scenelink")];
        Config::load_from_iter(args).map_err(AppError::LoadConfiguration)
    }
}

/// Applies endpoint overrides from the command line.
pub(crate) fn apply_overrides(config: Config, host: Option<String>, port: Option<u16>) -> Config {
    Config {
        bind_host: host.or(config.bind_host),
        port: port.or(config.port),
        ..config
    }
}
