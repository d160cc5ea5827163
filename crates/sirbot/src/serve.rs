// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sirbot serve` command implementation.
//!
//! Builds the engine from the configured plugin modules and serves the
//! host application until SIGINT or SIGTERM.

use sirbot_config::{SirbotConfig, tracing_level};
use sirbot_core::SirbotError;
use sirbot_engine::SirBot;
use sirbot_plugin::PluginCatalog;
use tracing::info;

/// Overrides for the configured listen address.
#[derive(Debug, Default, Clone)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Runs the `sirbot serve` command.
pub async fn run_serve(
    config: SirbotConfig,
    catalog: &PluginCatalog,
    options: ServeOptions,
) -> Result<(), SirbotError> {
    init_tracing(&config);

    let host = options.host.unwrap_or_else(|| config.core.host.clone());
    let port = options.port.unwrap_or(config.core.port);
    info!(
        plugins = ?config.core.plugins,
        %host,
        port,
        "starting sirbot serve"
    );

    let bot = SirBot::new(config, catalog)?;
    bot.run(&host, port).await?;

    info!("sirbot serve exited");
    Ok(())
}

/// Crates carrying the engine machinery, governed by `core.loglevel`.
const CORE_TARGETS: &[&str] = &["sirbot_engine", "sirbot_plugin", "sirbot_queue"];

/// Default filter directives when `RUST_LOG` is unset.
///
/// `core.loglevel` applies to the engine crates. The top-level `loglevel`
/// applies to everything else under `sirbot` and to HTTP tracing; it falls
/// back to `core.loglevel` when absent. Other crates log warnings only.
fn filter_directives(config: &SirbotConfig) -> String {
    let core = tracing_level(&config.core.loglevel).unwrap_or("info");
    let top = tracing_level(config.effective_loglevel()).unwrap_or(core);

    let mut directives = vec!["warn".to_string(), format!("sirbot={top}")];
    directives.extend(CORE_TARGETS.iter().map(|target| format!("{target}={core}")));
    directives.push(format!("tower_http={top}"));
    directives.join(",")
}

/// Initialize the tracing subscriber. `RUST_LOG` wins when set.
fn init_tracing(config: &SirbotConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_level_applies_everywhere_without_top_level() {
        let mut config = SirbotConfig::default();
        config.core.loglevel = "debug".into();

        assert_eq!(
            filter_directives(&config),
            "warn,sirbot=debug,sirbot_engine=debug,sirbot_plugin=debug,sirbot_queue=debug,\
             tower_http=debug"
        );
    }

    #[test]
    fn top_level_and_core_levels_are_kept_apart() {
        let mut config = SirbotConfig::default();
        config.core.loglevel = "warning".into();
        config.loglevel = Some("DEBUG".into());

        let directives = filter_directives(&config);
        assert!(directives.contains("sirbot=debug"));
        assert!(directives.contains("tower_http=debug"));
        for target in CORE_TARGETS {
            assert!(directives.contains(&format!("{target}=warn")));
        }
    }
}
