//! Config command handlers (no cloud connection required).

use tracing::warn;

use qingsync_config as file_config;

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output::Printer;

pub fn handle(args: ConfigArgs, printer: &Printer) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", file_config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let mut config = file_config::load_config_or_default();
            if config.app_secret.is_some() {
                config.app_secret = Some("<redacted>".into());
            }
            let rendered = toml::to_string_pretty(&config).map_err(|e| CliError::Config {
                message: e.to_string(),
            })?;
            printer.line(&rendered);
            Ok(())
        }

        ConfigCommand::Init {
            app_key,
            app_secret,
        } => {
            let mut config = file_config::load_config_or_default();
            config.app_key = Some(app_key.clone());

            // Prefer the keyring; fall back to plaintext in the file.
            match file_config::store_app_secret(&app_key, &app_secret) {
                Ok(()) => {
                    config.app_secret = None;
                }
                Err(e) => {
                    warn!(error = %e, "keyring unavailable, storing secret in config file");
                    config.app_secret = Some(app_secret);
                }
            }

            file_config::save_config(&config)?;
            printer.line(&format!("wrote {}", file_config::config_path().display()));
            Ok(())
        }
    }
}
