use clap::Subcommand;
use colored::Colorize;

use rex_config::Config;
use rex_logger as logger;

use crate::GlobalOpts;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Print the configuration file path
    Path,
}

pub fn handle_config(action: ConfigAction, opts: GlobalOpts) {
    match action {
        ConfigAction::Show => match Config::load() {
            Ok(config) => {
                println!("{}", "Configuration:".bold().green());
                if config.is_empty() {
                    if opts.verbosity_level() > 0 {
                        println!("  {}", "(defaults)".yellow());
                    }
                } else {
                    for (key, value) in config.values_iter() {
                        println!("  {}: {}", key.cyan(), value);
                    }
                }
            }
            Err(e) => {
                logger::error(&format!("Failed to load config: {}", e));
            }
        },
        ConfigAction::Set { key, value } => match Config::load() {
            Ok(mut config) => {
                if Config::is_known_key(&key) {
                    config.set(&key, value.clone());
                    match config.save() {
                        Ok(()) => logger::success(&format!("Set {} = {}", key, value)),
                        Err(e) => logger::error(&format!("Failed to save config: {}", e)),
                    }
                } else {
                    logger::error(&format!(
                        "Unknown config key: {} (known: corpus-root, license-file, parallel)",
                        key
                    ));
                }
            }
            Err(e) => {
                logger::error(&format!("Failed to load config: {}", e));
            }
        },
        ConfigAction::Path => {
            println!("{}", Config::path().display());
        }
    }
}
