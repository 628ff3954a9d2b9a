mod clock;
mod fetch;
mod parser;
mod server;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "garden_scraper", about = "Grow a Garden stock & weather API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
    /// Fetch both pages once and print the combined payload
    Data,
    /// Fetch and print current shop stock
    Stocks,
    /// Fetch and print current weather
    Weather,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => server::serve(port).await,
        Commands::Data => {
            let client = fetch::build_client()?;
            let (stocks, weather) = tokio::try_join!(
                fetch::fetch_stocks(&client),
                fetch::fetch_weather(&client),
            )?;
            print_json(&serde_json::json!({ "stocks": stocks, "weather": weather }))
        }
        Commands::Stocks => {
            let client = fetch::build_client()?;
            let stocks = fetch::fetch_stocks(&client).await?;
            print_json(&serde_json::json!({ "stocks": stocks }))
        }
        Commands::Weather => {
            let client = fetch::build_client()?;
            let weather = fetch::fetch_weather(&client).await?;
            print_json(&serde_json::json!({ "weather": weather }))
        }
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
