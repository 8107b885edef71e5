use clap::Parser;

#[derive(Parser)]
#[command(name = "articlecrawler", about = "Article ingestion pipeline")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,
}
