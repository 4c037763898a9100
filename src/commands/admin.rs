use clap::{Args, Subcommand};

use zentra_site::store::DataStore;

#[derive(Args)]
pub struct AdminCommand {
    #[command(subcommand)]
    pub command: AdminSubcommand,
}

#[derive(Subcommand)]
pub enum AdminSubcommand {
    /// Check admin credentials
    Login {
        /// Admin username
        #[arg(long, short)]
        username: String,

        /// Admin password
        #[arg(long, short)]
        password: String,
    },
}

impl AdminCommand {
    pub async fn run(&self, store: &DataStore) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AdminSubcommand::Login { username, password } => {
                let served = store.authenticate(username, password).await?;
                println!(
                    "Logged in as {} (id: {}, {} store)",
                    served.value.data.username, served.value.id, served.backend
                );
                Ok(())
            }
        }
    }
}
