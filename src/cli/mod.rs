use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod serve;
pub mod slots;
pub mod users;

#[derive(Subcommand)]
enum Command {
    /// Run the API and admin web server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "3002")]
        port: String,
    },
    /// Print the monitored users from the users config
    Users {},
    /// Print the time slots derived from the slot config
    Slots {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Users {}) => {
            users::run()?;
        }
        Some(Command::Slots {}) => {
            slots::run()?;
        }
        None => {}
    }

    Ok(())
}
