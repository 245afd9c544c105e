use clap::Parser;
use hitch_server::Endpoint;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "hitch-server", about = "Reference HTTP endpoint for hitch")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8337)]
    port: u16,

    /// Directory for the payload log.
    #[arg(long, default_value = "./hitch-server-data")]
    data_dir: PathBuf,

    /// Require this value in the Authorization header on every request.
    #[arg(long)]
    token: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    fs::create_dir_all(&cli.data_dir).expect("failed to create data directory");

    let addr = format!("0.0.0.0:{}", cli.port);
    info!("starting hitch-server on {addr}");
    info!("data directory: {}", cli.data_dir.display());

    let mut endpoint = Endpoint::new(cli.data_dir);
    if let Some(ref token) = cli.token {
        endpoint = endpoint.with_token(token);
        info!("token check enabled");
    }
    hitch_server::run_server(&Arc::new(endpoint), &addr);
}
