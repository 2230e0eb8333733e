use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use govern_api::auth::{generate_token, Claims};
use govern_api::config::{config, AppConfig};
use govern_api::database::PgStore;
use govern_api::state::AppState;

/// One year
const MAX_TOKEN_HOURS: i64 = 24 * 366;

#[derive(Parser)]
#[command(name = "govern-api")]
#[command(about = "AI governance assessment API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Mint a development session token")]
    Token {
        #[arg(long, help = "Actor id placed in the sub claim")]
        user: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(
            long,
            default_value_t = 24,
            value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_HOURS),
            help = "Token lifetime in hours"
        )]
        hours: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(config).await,
        Commands::Token { user, email, hours } => {
            let claims = Claims::new(
                user,
                email,
                config.auth.jwt_audience.clone(),
                chrono::Duration::hours(hours),
            );
            let token = generate_token(&claims, &config.auth.jwt_secret)?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Govern API in {:?} mode", config.environment);

    let state = AppState::from_config(config)
        .await
        .context("failed to initialize backends")?;
    let app = govern_api::app(state, &config.security);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Govern API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to DATABASE_URL")?;
    store.migrate().await?;
    store.close().await;

    tracing::info!("Migrations applied");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
