//! Mile Game Client
//!
//! Command-line front end: register a player, submit quiz answers, watch the
//! live ranking, or forget the saved player.

use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mile_game::{
    AnswerKey, AnswerSet, ChannelEvent, ClientConfig, FileStore, GameSession, RankingStore,
    RealtimeChannel, VERSION,
    network::{HttpApi, TracingListener},
};

/// Mile Game quiz client
#[derive(Parser, Debug)]
#[command(name = "mile-game-client")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new player
    Register {
        /// Player name
        name: String,

        /// Player avatar (emoji)
        #[arg(short, long, default_value = "")]
        avatar: String,
    },

    /// Submit answers from a JSON file
    Submit {
        /// Path to an answer set JSON file
        answers: PathBuf,
    },

    /// Follow the live ranking until Ctrl-C
    Watch,

    /// Forget the saved player
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mile_game=info,mile_game_client=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    info!("Mile Game Client v{}", VERSION);

    let api = HttpApi::new(config.api_url.clone(), config.request_timeout)?;
    let storage = FileStore::open(&config.storage_dir)
        .with_context(|| format!("opening storage in {}", config.storage_dir.display()))?;
    let mut session = GameSession::new(api, storage, AnswerKey::default());
    session.restore();

    match cli.command {
        Commands::Register { name, avatar } => {
            let player = session.register(&name, &avatar).await?;
            println!("Registered {} as {}", player.name, player.id);
        }
        Commands::Submit { answers: path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let answers: AnswerSet = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;

            let submission = session.submit_answers(&answers).await?;
            println!("Local score:  {}", submission.local_score);
            println!("Final score:  {}", submission.score);
        }
        Commands::Watch => watch(&mut session, &config).await,
        Commands::Reset => {
            session.reset()?;
            println!("Saved player cleared");
        }
    }

    Ok(())
}

async fn watch(session: &mut GameSession<HttpApi, FileStore>, config: &ClientConfig) {
    if let Err(e) = session.seed_ranking().await {
        warn!("Could not load initial ranking: {}", e);
    }
    print_ranking(session.ranking());

    let mut channel = RealtimeChannel::new(config.connector(), TracingListener, config.channel_config());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // Ctrl-C during the first handshake still reaches dispose.
    let mut running = tokio::select! {
        _ = channel.connect(&config.ws_url) => true,
        _ = &mut shutdown => false,
    };

    while running {
        tokio::select! {
            event = channel.next_event(session.ranking_mut()) => match event {
                ChannelEvent::Ranking { .. } => print_ranking(session.ranking()),
                ChannelEvent::Idle => running = false,
                _ => {}
            },
            _ = &mut shutdown => running = false,
        }
    }

    info!("Shutting down");
    channel.dispose().await;
}

fn print_ranking(store: &RankingStore) {
    println!("{:>4}  {:<24} {:>5}", "#", "Player", "Score");
    for entry in store.sorted_ranking() {
        let marker = if store.is_current(&entry.player.id) { "*" } else { " " };
        println!(
            "{:>3}{} {} {:<22} {:>5}",
            entry.position, marker, entry.player.avatar, entry.player.name, entry.player.score
        );
    }
}
