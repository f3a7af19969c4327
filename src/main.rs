//! Reverie — background self-reflection daemon
//!
//! Usage:
//!   reverie --data-dir ./reflections --daemon
//!   reverie --reflect          one-shot reflection, printed to stdout
//!   reverie --stats            show engine stats and exit
//!   reverie --dump-config      print the default config document
//!   reverie --reset-daily      zero the daily counter and exit

use clap::Parser;
use reverie::config::EngineConfig;
use reverie::engine::ReflectionEngine;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reverie", about = "Background self-reflection engine")]
struct Cli {
    /// Data directory for reflections, state and config
    #[arg(long, default_value = "./reflections")]
    data_dir: String,

    /// Run the scheduler loop until Ctrl-C (default when no mode is given)
    #[arg(long)]
    daemon: bool,

    /// Generate a single reflection now and exit
    #[arg(long)]
    reflect: bool,

    /// Show engine stats and exit
    #[arg(long)]
    stats: bool,

    /// Zero the daily reflection counter and exit
    #[arg(long)]
    reset_daily: bool,

    /// Print the default config document and exit
    #[arg(long)]
    dump_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reverie=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cli.dump_config {
        println!("{}", EngineConfig::default().to_json());
        return Ok(());
    }

    let data_dir = expand_tilde(&cli.data_dir);
    let mut engine = ReflectionEngine::new(&data_dir)?;

    if cli.stats {
        let stats = engine.get_stats().await;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if cli.reset_daily {
        engine.reset_daily_counter().await;
        return Ok(());
    }

    if cli.reflect {
        let reflection = engine.create_reflection_now(None).await;
        println!("{}", reflection.content);
        println!("  category: {}", reflection.category.as_str());
        println!("  depth: {}/10", reflection.depth_level);
        if !reflection.follow_up_questions.is_empty() {
            println!("  questions to sit with:");
            for q in &reflection.follow_up_questions {
                println!("    - {q}");
            }
        }
        return Ok(());
    }

    // Daemon is the default mode.
    println!("reverie v{} — data dir {}", env!("CARGO_PKG_VERSION"), data_dir.display());
    engine.start();
    tokio::signal::ctrl_c().await?;
    engine.stop().await;

    Ok(())
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
