use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "routie-bot")]
#[command(author, version, about = "Telegram webhook bot for the Routie waitlist", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the webhook server (default)
    Serve,

    /// Register the webhook URL and secret with Telegram
    SetWebhook {
        /// Public URL of the webhook endpoint (defaults to WEBHOOK_URL)
        #[arg(long)]
        url: Option<String>,

        /// Drop updates that queued up while no webhook was set
        #[arg(long)]
        drop_pending_updates: bool,
    },

    /// Remove the webhook registration
    DeleteWebhook {
        /// Drop updates that queued up
        #[arg(long)]
        drop_pending_updates: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
