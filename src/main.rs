use clap::{Parser, Subcommand};
use std::path::PathBuf;
use transport_frames::config::AppConfig;
use transport_frames::server::ApiServer;
use transport_frames::{logging, Result};

#[derive(Parser)]
#[command(name = "transport-frames")]
#[command(about = "Accessibility-matrix service for regional transport frames")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.config/transport-frames/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address, overriding the config file
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// List the configured regions
    Regions,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { listen } => {
            config.ensure_data_layout()?;
            let addr = listen.unwrap_or_else(|| config.listen_addr.clone());
            let server = ApiServer::new(&config)?;
            server.run(&addr).await
        }
        Commands::Regions => {
            for region in &config.regions {
                println!("{:>4}  {} (EPSG:{})", region.id, region.name, region.crs);
            }
            Ok(())
        }
    }
}
