// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sirbot - a pluggable chat-bot framework.
//!
//! This is the binary entry point. It loads configuration, builds the
//! plugin catalog from the built-in modules, and dispatches subcommands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod plugins;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sirbot_config::SirbotConfig;

/// Sirbot - a pluggable chat-bot framework.
#[derive(Parser, Debug)]
#[command(name = "sirbot", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the standard lookup
    /// (./sirbot.toml, ~/.config/sirbot/sirbot.toml, /etc/sirbot/sirbot.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot and its HTTP host.
    Serve {
        /// Address to bind, overriding `core.host`.
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding `core.port`.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List the compiled-in plugin modules (`*` marks enabled ones).
    Plugins {
        /// Only show modules whose name or description matches.
        query: Option<String>,
    },
    /// Validate the configuration and the configured plugin modules.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> SirbotConfig {
    let loaded = match path {
        Some(path) => sirbot_config::load_and_validate_path(path),
        None => sirbot_config::load_and_validate(),
    };

    match loaded {
        Ok(config) => config,
        Err(errors) => {
            sirbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    let catalog = sirbot_builtin::builtin_catalog();

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            let options = serve::ServeOptions { host, port };
            if let Err(e) = serve::run_serve(config, &catalog, options).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Plugins { query }) => {
            for line in plugins::list_plugins(&catalog, &config, query.as_deref()) {
                println!("{line}");
            }
        }
        Some(Commands::CheckConfig) => {
            let missing = plugins::missing_plugins(&catalog, &config);
            if !missing.is_empty() {
                for module in &missing {
                    eprintln!("error: plugin module not found: {module}");
                }
                std::process::exit(1);
            }
            println!(
                "sirbot: config OK ({} plugin(s), {} client section(s))",
                config.core.plugins.len(),
                config.clients.len()
            );
        }
        None => {
            println!("sirbot: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch; the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from(["sirbot", "--config", "bot.toml", "serve", "--port", "9000"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn check_config_subcommand_is_kebab_case() {
        let cli = Cli::try_parse_from(["sirbot", "check-config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
    }
}
