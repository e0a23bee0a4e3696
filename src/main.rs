use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use dugout::api::state::AppState;
use dugout::api::{build_router, cors_layer};
use dugout::auth::{TokenSigner, DEFAULT_TOKEN_TTL};
use dugout::client::{format_stat_line, share_url, ApiClient, ShareKind};
use dugout::config::AppConfig;
use dugout::storage::{Database, ImageStore};
use dugout::RecordId;

#[derive(Parser)]
#[command(name = "dugout")]
#[command(about = "Baseball team, player and game statistics tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./dugout.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the database schema and exit
    InitDb,

    /// Validate the configuration file on its own, without environment overrides
    CheckConfig,

    /// Print a team's roster with stat lines from its public view
    TeamSummary {
        #[arg(long)]
        team_id: i64,

        /// Server to query; defaults to the configured public base URL
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Print a player's stat line and game log from their public view
    PlayerSummary {
        #[arg(long)]
        player_id: i64,

        /// Server to query; defaults to the configured public base URL
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Print the public link for a team or player
    ShareUrl {
        /// team or player
        #[arg(long)]
        kind: ShareKind,

        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(Path::new(&cli.config))
        .with_context(|| format!("loading configuration from {}", cli.config))?;

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Starting dugout v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(&config, &host, port).await?;
        }
        Commands::InitDb => {
            let db = Database::connect(&config.database.url).await?;
            db.init_schema().await?;
            db.close().await;
            println!("Database ready at {}", config.database.url);
        }
        Commands::CheckConfig => {
            let file = AppConfig::from_file(Path::new(&cli.config))
                .with_context(|| format!("checking {}", cli.config))?;
            println!("{} is valid", cli.config);
            println!("  server:   {}:{}", file.server.host, file.server.port);
            println!("  database: {}", file.database.url);
            println!("  uploads:  {} (max {} bytes)", file.uploads.dir.display(), file.uploads.max_bytes);
            if file.auth.token_secret == AppConfig::default().auth.token_secret {
                println!("  warning:  auth.token_secret is the default");
            }
        }
        Commands::TeamSummary { team_id, api_url } => {
            let base = api_url.unwrap_or_else(|| config.server.public_base_url.clone());
            let client = ApiClient::with_base_url(&base)?;
            let summary = client.public_team(RecordId::new(team_id)).await?;

            println!(
                "{} ({}, {})",
                summary.team.name, summary.team.league, summary.team.season
            );
            if summary.players.is_empty() {
                println!("  (no players)");
            }
            for entry in &summary.players {
                let label = format!("#{} {} {}", entry.player.number, entry.player.name, entry.player.position);
                println!("  {}", format_stat_line(&label, &entry.stats));
            }
            println!("\nShare: {}", share_url(client.base_url(), ShareKind::Team, team_id));
        }
        Commands::PlayerSummary { player_id, api_url } => {
            let base = api_url.unwrap_or_else(|| config.server.public_base_url.clone());
            let client = ApiClient::with_base_url(&base)?;
            let detail = client.public_player(RecordId::new(player_id)).await?;

            let label = format!("#{} {}", detail.player.number, detail.player.name);
            println!("{}", format_stat_line(&label, &detail.stats));
            println!();
            for game in &detail.games {
                println!(
                    "  {}  vs {:<20} AB {:>2}  H {:>2}  R {:>2}  RBI {:>2}  BB {:>2}  K {:>2}",
                    game.date,
                    game.opponent,
                    game.stats.at_bats,
                    game.stats.hits,
                    game.stats.runs,
                    game.stats.rbis,
                    game.stats.walks,
                    game.stats.strikeouts
                );
            }
            println!("\nShare: {}", share_url(client.base_url(), ShareKind::Player, player_id));
        }
        Commands::ShareUrl { kind, id } => {
            let base = Url::parse(&config.server.public_base_url)
                .with_context(|| format!("invalid public_base_url {:?}", config.server.public_base_url))?;
            println!("{}", share_url(&base, kind, id));
        }
    }

    Ok(())
}

async fn serve(config: &AppConfig, host: &str, port: u16) -> Result<()> {
    let db = Database::connect(&config.database.url).await?;
    db.init_schema().await?;

    let images = ImageStore::new(config.uploads.dir.clone(), config.uploads.max_bytes);
    images.ensure_dir().await?;

    if config.auth.token_secret == AppConfig::default().auth.token_secret {
        tracing::warn!("Using the default token secret; set auth.token_secret before deploying");
    }
    let ttl = config.auth.token_ttl().unwrap_or(DEFAULT_TOKEN_TTL);
    let tokens = TokenSigner::new(config.auth.token_secret.as_bytes(), ttl)?;

    let state = AppState {
        db: db.clone(),
        tokens: Arc::new(tokens),
        images: Arc::new(images),
    };
    let app = build_router(state).layer(cors_layer(&config.server.cors_origin)?);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Shutting down");
    db.close().await;
    Ok(())
}
