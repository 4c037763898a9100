mod admin;
mod config_cmd;
mod image;
mod records;
mod seed;
mod submit;

pub use admin::AdminCommand;
pub use config_cmd::ConfigCommand;
pub use image::ImageCommand;
pub use records::RecordsCommand;
pub use seed::SeedCommand;
pub use submit::SubmitCommand;

use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
