use std::sync::Arc;

use frontedit::config::Config;
use frontedit::error::{Error, Result};
use frontedit::models::{Actor, Language, Role};
use frontedit::orchestrator::TranslationOrchestrator;
use frontedit::storage::{Database, SettingsRepository};
use frontedit::translation::HttpTranslator;

/// Actor used for writes issued from the command line
fn cli_actor() -> Actor {
    Actor::new("cli", Role::Admin)
}

fn open_database(config: &Config) -> Result<Database> {
    Database::open(&config.database.sqlite_path).map_err(|e| {
        Error::with_source(
            format!(
                "Failed to open database: {}",
                config.database.sqlite_path.display()
            ),
            e,
        )
    })
}

pub fn init_db(config: &Config) -> Result<()> {
    open_database(config)?;
    println!(
        "Database ready: {}",
        config.database.sqlite_path.display()
    );
    Ok(())
}

pub async fn get_setting(config: &Config, key: &str, lang: Language) -> Result<()> {
    let db = open_database(config)?;

    match db.settings().fetch(key).await? {
        Some(entry) => {
            println!("{}", entry.value.get_or_fallback(lang));
            for lang in Language::ALL {
                println!("  [{lang}] {}", entry.value.get(lang));
            }
            if let Some(url) = entry.image_url {
                println!("  [image] {url}");
            }
            println!("  updated {}", entry.updated_at.to_rfc3339());
        }
        None => println!("Setting '{key}' is not set"),
    }

    Ok(())
}

pub async fn set_setting(
    config: &Config,
    key: &str,
    text: &str,
    lang: Language,
    translate: bool,
    image: Option<&str>,
) -> Result<()> {
    let db = open_database(config)?;
    let repo = db.settings();

    let mut value = repo
        .fetch(key)
        .await?
        .map(|entry| entry.value)
        .unwrap_or_default();
    value.set(lang, text);

    if translate {
        let translator = HttpTranslator::new(config.translation.clone())?;
        let orchestrator = TranslationOrchestrator::new(Arc::new(translator));

        let result = orchestrator.translate_to_other_languages(text, lang).await;
        result.apply_to(&mut value);
        for failure in &result.errors {
            println!("  Translation to {} failed: {}", failure.language, failure.reason);
        }
    }

    repo.upsert(&cli_actor(), key, &value, image).await?;

    println!("Saved '{key}'");
    for lang in Language::ALL {
        println!("  [{lang}] {}", value.get(lang));
    }
    Ok(())
}
