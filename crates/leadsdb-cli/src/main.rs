use clap::{Parser, Subcommand};

use leadsdb_crawler::{Crawler, CrawlerConfig};

#[derive(Debug, Parser)]
#[command(name = "leadsdb-cli")]
#[command(about = "leadsdb command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl a listing URL and print the extracted businesses as JSON.
    Crawl {
        /// Target listing URL (page 1).
        url: String,
        /// Follow the pagination and crawl every resolved page.
        #[arg(long)]
        all_pages: bool,
        /// Politeness delay between page fetches, in milliseconds.
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Crawl {
            url,
            all_pages,
            delay_ms,
        } => {
            let crawler = Crawler::new(&CrawlerConfig {
                inter_page_delay_ms: delay_ms,
                ..CrawlerConfig::default()
            })?;
            let report = crawler.crawl(&url, all_pages).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
