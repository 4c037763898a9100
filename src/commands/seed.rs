use clap::Args;
use std::io::{self, Write};

use zentra_site::local::{seed_defaults, LocalStore};
use zentra_site::models::Collection;

#[derive(Args)]
pub struct SeedCommand {
    /// Discard all local records before seeding
    #[arg(long)]
    reset: bool,

    /// Skip confirmation prompt for --reset
    #[arg(long, short)]
    force: bool,
}

impl SeedCommand {
    pub async fn run(&self, local: &dyn LocalStore) -> Result<(), Box<dyn std::error::Error>> {
        if self.reset {
            if !self.force {
                print!("Discard all local records and restore the demo content? [y/N] ");
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;

                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Reset cancelled.");
                    return Ok(());
                }
            }

            for collection in Collection::ALL {
                local.remove(collection.storage_key()).await?;
            }
        }

        let seeded = seed_defaults(local).await?;
        if seeded == 0 {
            println!("Local store already seeded.");
        } else {
            println!("Seeded {} collection(s) with demo content.", seeded);
        }
        Ok(())
    }
}
