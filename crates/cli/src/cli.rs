use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stocksync")]
#[command(about = "Sync B2B portal product availability into Google Sheets")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug for stocksync, -vv debug for everything)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run the browser with a visible window instead of headless
    #[arg(long)]
    pub headed: bool,
}
