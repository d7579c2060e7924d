use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frontedit::config::Config;
use frontedit::error::FrontEditErrorTrait;
use frontedit::models::Language;

mod commands;

#[derive(Parser)]
#[command(
    name = "frontedit",
    version,
    about = "Multilingual inline content editing backend with auto-translation",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (environment variables are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Create the database schema
    InitDb,

    /// Print a setting
    GetSetting {
        /// Setting key
        key: String,

        /// Display language (en, la, th, zh)
        #[arg(short, long, default_value = "en")]
        lang: Language,
    },

    /// Write one language of a setting
    SetSetting {
        /// Setting key
        key: String,

        /// New text
        text: String,

        /// Language the text is written in
        #[arg(short, long, default_value = "en")]
        lang: Language,

        /// Translate the text into the other three languages
        #[arg(long, default_value = "false")]
        translate: bool,

        /// Image URL to store with the setting
        #[arg(long)]
        image: Option<String>,
    },

    /// Translate text without saving
    Translate {
        /// Text to translate
        text: String,

        /// Source language
        #[arg(short, long, default_value = "en")]
        source: Language,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    frontedit::i18n::init_from_env();
    if let Err(e) = frontedit::metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics unavailable");
    }

    if let Err(e) = run(cli.command, config).await {
        tracing::error!(
            category = ?e.category(),
            recoverable = e.is_recoverable(),
            "{}",
            e.localized_desc()
        );
        return Err(e.into());
    }

    Ok(())
}

async fn run(command: Commands, config: Config) -> frontedit::error::Result<()> {
    match command {
        Commands::Serve { bind } => {
            tracing::info!(bind = ?bind, "Starting serve command");
            commands::serve(config, bind).await
        }

        Commands::InitDb => {
            tracing::info!(path = %config.database.sqlite_path.display(), "Starting init-db command");
            commands::init_db(&config)
        }

        Commands::GetSetting { key, lang } => commands::get_setting(&config, &key, lang).await,

        Commands::SetSetting {
            key,
            text,
            lang,
            translate,
            image,
        } => {
            tracing::info!(
                key = %key,
                lang = %lang,
                translate = %translate,
                "Starting set-setting command"
            );
            commands::set_setting(&config, &key, &text, lang, translate, image.as_deref()).await
        }

        Commands::Translate { text, source } => commands::translate(&config, &text, source).await,
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("frontedit=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("frontedit={level},warn")))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
