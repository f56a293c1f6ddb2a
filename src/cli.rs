//! Command line interface

use std::path::PathBuf;

use clap::Parser;

/// Serve a directory over HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "servedir", version, about)]
pub struct Cli {
    /// Port to listen on [default: 8000]
    #[arg(env = "SERVEDIR_PORT")]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(short, long, value_name = "ADDRESS")]
    pub bind: Option<String>,

    /// Directory to serve [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Configuration file, extension optional
    #[arg(short, long, value_name = "PATH", default_value = "config")]
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["servedir"]).unwrap();
        assert_eq!(cli.config, "config");
        assert!(cli.bind.is_none());
        assert!(cli.directory.is_none());
    }

    #[test]
    fn test_python_style_arguments() {
        let cli = Cli::try_parse_from(["servedir", "9000", "--bind", "127.0.0.1", "-d", "/srv"])
            .unwrap();
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.directory, Some(PathBuf::from("/srv")));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Cli::try_parse_from(["servedir", "eighty"]).is_err());
        assert!(Cli::try_parse_from(["servedir", "70000"]).is_err());
    }
}
