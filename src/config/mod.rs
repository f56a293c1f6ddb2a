// Configuration module entry point
// Layers defaults, config file, environment and command line into one Config

mod state;
mod types;

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

use crate::cli::Cli;
use crate::error::ServerError;

/// Environment variable prefix, e.g. `SERVEDIR_SERVER__PORT=9000`
const ENV_PREFIX: &str = "SERVEDIR";

/// Values given on the command line; they beat every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub root: Option<String>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            host: cli.bind.clone(),
            port: cli.port,
            root: cli
                .directory
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
        }
    }
}

impl Config {
    /// Load configuration for the running binary
    pub fn load(cli: &Cli) -> Result<Self, ServerError> {
        Ok(Self::load_from(&cli.config, &Overrides::from(cli))?)
    }

    /// Load configuration from specified file path (without extension)
    /// A missing file is not an error; defaults apply.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root", ".")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.idle_timeout", 60)?
            .set_default(
                "http.server_name",
                concat!("servedir/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option("server.root", overrides.root.clone())?
            .build()?;

        settings.try_deserialize()
    }

    /// Defaults only, rooted at `root`; handy for embedding and tests
    pub fn with_root(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                root: root.into(),
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "common".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive: true,
                read_timeout: 30,
                idle_timeout: 60,
            },
            http: HttpConfig {
                server_name: concat!("servedir/", env!("CARGO_PKG_VERSION")).to_string(),
                index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            },
        }
    }

    /// Listen address from `server.host` and `server.port`.
    ///
    /// The host may be an IPv4 or IPv6 literal (brackets optional) or a
    /// name such as `localhost`, which is resolved to its first address.
    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let host = self.server.host.trim();
        let port = self.server.port;
        let literal = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, port));
        }

        let invalid = |source| ServerError::InvalidAddress {
            addr: host.to_string(),
            source,
        };
        (host, port)
            .to_socket_addrs()
            .map_err(invalid)?
            .next()
            .ok_or_else(|| {
                invalid(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "name resolved to no addresses",
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FILE: &str = "this-config-file-does-not-exist";

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from(NO_FILE, &Overrides::default()).unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.root, std::path::PathBuf::from("."));
        assert!(cfg.server.workers.is_none());
        assert_eq!(cfg.logging.access_log_format, "common");
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert!(cfg.performance.keep_alive);
        assert_eq!(cfg.performance.idle_timeout, 60);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            host: Some("127.0.0.1".to_string()),
            port: Some(9090),
            root: Some("/srv/www".to_string()),
        };
        let cfg = Config::load_from(NO_FILE, &overrides).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.root, std::path::PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servedir.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8123\n\n[http]\nindex_files = [\"home.html\"]\n",
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap(), &Overrides::default()).unwrap();
        assert_eq!(cfg.server.port, 8123);
        assert_eq!(cfg.http.index_files, vec!["home.html"]);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_socket_addr_ipv6_and_names() {
        let mut cfg = Config::with_root(".");
        cfg.server.port = 8000;

        cfg.server.host = "::".to_string();
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "[::]:8000");

        cfg.server.host = "[::1]".to_string();
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "[::1]:8000");

        cfg.server.host = "localhost".to_string();
        let addr = cfg.get_socket_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::with_root(".");
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:0");

        let mut bad = Config::with_root(".");
        bad.server.host = "not an address!".to_string();
        assert!(matches!(
            bad.get_socket_addr(),
            Err(ServerError::InvalidAddress { .. })
        ));
    }
}
