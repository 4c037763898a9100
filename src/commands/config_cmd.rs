use clap::{Args, Subcommand};

use super::OutputFormat;
use zentra_site::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn or_unset(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("(not set)")
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!(
                            "database_path: {}",
                            config.database_path.value.display()
                        );
                        println!("  source: {}", config.database_path.source);
                        println!();

                        let firebase = &config.firebase;
                        println!(
                            "firebase: {}",
                            if firebase.is_configured() {
                                "configured"
                            } else {
                                "not configured (local storage only)"
                            }
                        );
                        println!("  project_id: {}", or_unset(&firebase.project_id));
                        println!("  auth_domain: {}", or_unset(&firebase.auth_domain));
                        println!("  storage_bucket: {}", or_unset(&firebase.storage_bucket));
                        println!();

                        let email = &config.email;
                        println!(
                            "email: {}",
                            if email.is_configured() {
                                "configured"
                            } else {
                                "not configured (notifications disabled)"
                            }
                        );
                        println!("  from: {} <{}>", email.from_name, email.from_email);
                        println!("  to: {}", email.to_email);
                    }
                }
                Ok(())
            }
        }
    }
}
