use clap::Parser;

pub mod http;
pub mod main;

/// Read-only sales/order feed over the ERP database
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML configuration file (defaults apply when missing)
    #[arg(short, long, default_value = "salesfeed.toml")]
    pub config: String,
}
