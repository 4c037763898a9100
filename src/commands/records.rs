use clap::{Args, Subcommand};
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;

use super::OutputFormat;
use zentra_site::models::{Collection, Document, Record};
use zentra_site::store::DataStore;

#[derive(Args)]
pub struct RecordsCommand {
    #[command(subcommand)]
    pub command: RecordsSubcommand,
}

#[derive(Subcommand)]
pub enum RecordsSubcommand {
    /// List a collection, newest first
    List {
        /// Collection name (services, projects, gallery, testimonials,
        /// slider_images, bookings)
        collection: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a record from JSON
    Add {
        /// Collection name
        collection: Collection,

        /// Record fields as a JSON object
        #[arg(long, conflicts_with = "file")]
        json: Option<String>,

        /// Read the JSON object from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Update fields of a record
    Update {
        /// Collection name
        collection: Collection,

        /// Record ID
        id: String,

        /// Field to set as KEY=VALUE (can be repeated). VALUE is parsed as
        /// JSON when possible, otherwise taken as a string.
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Delete a record
    Delete {
        /// Collection name
        collection: Collection,

        /// Record ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

/// Parses `KEY=VALUE` pairs into a patch document.
fn parse_fields(fields: &[String]) -> Result<Document, String> {
    let mut patch = Document::new();
    for field in fields {
        let (key, raw) = field
            .split_once('=')
            .ok_or_else(|| format!("Invalid field '{}': expected KEY=VALUE", field))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Invalid field '{}': empty key", field));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        patch.insert(key.to_string(), value);
    }
    Ok(patch)
}

/// One-line description of a record for text output.
fn summary(record: &Record) -> String {
    match record {
        Record::Service(r) => format!("{} [{}]", r.data.title, r.data.category),
        Record::Project(r) => format!("{} ({})", r.data.title, r.data.client_name),
        Record::GalleryItem(r) => format!("{} [{}]", r.data.caption, r.data.category),
        Record::Testimonial(r) => format!(
            "{} {}/5 [{}]",
            r.data.client_name, r.data.rating, r.data.status
        ),
        Record::SliderImage(r) => r.data.caption.clone(),
        Record::Booking(r) => format!(
            "{} - {} on {} [{}]",
            r.data.name,
            r.data.service,
            r.data.preferred_date_label(),
            r.data.status
        ),
        Record::AdminCredential(r) => r.data.username.clone(),
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

impl RecordsCommand {
    pub async fn run(&self, store: &DataStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RecordsSubcommand::List { collection, format } => {
                let served = store.fetch_by_name(collection).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&served)?);
                    }
                    OutputFormat::Text => {
                        if served.value.is_empty() {
                            println!("No records found.");
                        } else {
                            for record in &served.value {
                                println!(
                                    "{}  {}  {}",
                                    record.id(),
                                    record.created_at().format("%Y-%m-%d %H:%M"),
                                    summary(record)
                                );
                            }
                        }
                        println!("\n({} record(s) from {} store)", served.value.len(), served.backend);
                    }
                }
                Ok(())
            }

            RecordsSubcommand::Add {
                collection,
                json,
                file,
            } => {
                let raw = match (json, file) {
                    (Some(json), _) => json.clone(),
                    (None, Some(path)) => std::fs::read_to_string(path)?,
                    (None, None) => return Err("Provide the record with --json or --file".into()),
                };
                let value: Value = serde_json::from_str(&raw)?;

                let served = store.insert_value(*collection, value).await?;
                println!("Created {} record ({} store):", collection, served.backend);
                println!("{}", serde_json::to_string_pretty(&served.value)?);
                Ok(())
            }

            RecordsSubcommand::Update {
                collection,
                id,
                fields,
            } => {
                let patch = parse_fields(fields)?;
                let served = store.update(*collection, id, patch).await?;
                println!("Updated {} {} ({} store)", collection, id, served.backend);
                Ok(())
            }

            RecordsSubcommand::Delete {
                collection,
                id,
                force,
            } => {
                if !force && !confirm(&format!("Delete {} record '{}'?", collection, id))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                let served = store.delete(*collection, id).await?;
                println!("Deleted {} {} ({} store)", collection, id, served.backend);
                Ok(())
            }
        }
    }
}
