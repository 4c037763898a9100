use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use zentra_site::store::DataStore;

#[derive(Args)]
pub struct ImageCommand {
    #[command(subcommand)]
    pub command: ImageSubcommand,
}

#[derive(Subcommand)]
pub enum ImageSubcommand {
    /// Upload an image and print its URL
    Upload {
        /// Image file
        path: PathBuf,

        /// Content type (guessed from the extension if omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
}

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

impl ImageCommand {
    pub async fn run(&self, store: &DataStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ImageSubcommand::Upload { path, content_type } => {
                let bytes = std::fs::read(path)?;
                let content_type = content_type
                    .clone()
                    .unwrap_or_else(|| guess_content_type(path).to_string());
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());

                let served = store.upload_image(&file_name, &content_type, bytes).await?;
                eprintln!("Stored via {} store", served.backend);
                println!("{}", served.value);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("logo.png")), "image/png");
        assert_eq!(
            guess_content_type(Path::new("README")),
            "application/octet-stream"
        );
    }
}
