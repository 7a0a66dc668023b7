use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{FtpClientError, Result};

const ENV_PREFIX: &str = "FTP_ENGINE";

/// Configuration for an FTP engine session
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server configuration
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// FTP server hostname or IP address
    pub host: String,

    /// FTP server port number
    pub port: u16,

    /// Connection timeout in seconds, 0 waits for the OS
    pub connect_timeout: u64,

    /// Read/write timeout in seconds for control and data sockets, 0 disables it
    pub io_timeout: u64,
}

impl ClientConfig {
    /// Load configuration from an optional TOML file with environment variable overrides.
    ///
    /// Environment variables use the `FTP_ENGINE_` prefix and `__` between
    /// section and key, e.g. `FTP_ENGINE_SERVER__PORT=2121`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host.as_str())?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.connect_timeout", defaults.server.connect_timeout as i64)?
            .set_default("server.io_timeout", defaults.server.io_timeout as i64)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let config: ClientConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn host(&self) -> &str {
        &self.server.host
    }

    pub fn port(&self) -> u16 {
        self.server.port
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        seconds(self.server.connect_timeout)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        seconds(self.server.io_timeout)
    }

    /// Validate the basic configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(FtpClientError::Config("Host cannot be empty".to_string()));
        }

        if self.server.port == 0 {
            return Err(FtpClientError::Config("Port cannot be 0".to_string()));
        }

        Ok(())
    }
}

fn seconds(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 21,
                connect_timeout: 30,
                io_timeout: 60,
            },
        }
    }
}

impl std::fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FTP Config - Server: {}:{}, Connect Timeout: {}s, IO Timeout: {}s",
            self.server.host, self.server.port, self.server.connect_timeout, self.server.io_timeout
        )
    }
}
