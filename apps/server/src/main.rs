use altawater_config::{load as load_config, AppConfig};
use altawater_gateway::{create_router, GatewayState};
use altawater_runtime::{telemetry, BotServices, Shutdown};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "altawater-bot")]
#[command(about = "Water delivery request bot (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll for updates and run the keep-alive listener
    Serve,
    /// Print the resolved configuration with the token redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Config => show_config(),
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting Altawater bot");

    let config = load_config().context("failed to load configuration")?;

    let services = BotServices::initialise(&config)
        .await
        .context("failed to initialise bot services")?;

    let app = create_router(GatewayState::new(services.coordinator.clone()));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "keep-alive listener ready");

    let shutdown = Shutdown::on_signal();
    let poller = tokio::spawn(services.poller(&config).run(shutdown.clone().wait()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait())
        .await
        .context("http server error")?;

    poller.await.context("update poller panicked")?;

    info!(
        outstanding = services.coordinator.outstanding_count(),
        "bot shut down"
    );
    Ok(())
}

fn show_config() -> anyhow::Result<()> {
    let config: AppConfig = load_config().context("failed to load configuration")?;
    println!("{config:#?}");
    if config.telegram.bot_token.is_none() {
        println!("warning: no bot token configured; `serve` will refuse to start");
    }
    Ok(())
}
