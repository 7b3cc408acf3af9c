use std::path::PathBuf;

use clap::{Args, Subcommand};
use flash_config::ConfigOverrides;

use super::validation::parse_package;

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server
    ///
    /// Serves the project root over HTTP, transforms source files on request,
    /// pre-bundles npm dependencies on first use and pushes update
    /// notifications for edited files over a WebSocket.
    Dev(DevArgs),

    /// Pre-bundle dependencies without starting the server
    ///
    /// Builds one artifact per package into the dependency artifact store,
    /// so the first page load does not wait on the bundler.
    Prebundle(PrebundleArgs),
}

/// Arguments for the dev command
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Project root to serve (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// HTTP port (default 5000)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Notification channel port (default 4000)
    ///
    /// The browser client opens a WebSocket to this port to receive
    /// update notifications.
    #[arg(long, value_name = "PORT")]
    pub hmr_port: Option<u16>,

    /// Path to a config file (defaults to <root>/flash.config.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl DevArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            port: self.port,
            hmr_port: self.hmr_port,
            config_file: self.config.clone(),
        }
    }
}

/// Arguments for the prebundle command
#[derive(Args, Debug)]
pub struct PrebundleArgs {
    /// Packages to pre-bundle
    ///
    /// Examples:
    ///   flash prebundle react react-dom/client
    ///   flash prebundle @tanstack/react-query
    #[arg(required = true, value_name = "PACKAGE", value_parser = parse_package)]
    pub packages: Vec<String>,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to a config file (defaults to <root>/flash.config.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl PrebundleArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            config_file: self.config.clone(),
            ..ConfigOverrides::default()
        }
    }
}
