use std::sync::Arc;

use frontedit::config::Config;
use frontedit::error::{Error, Result};
use frontedit::models::Language;
use frontedit::orchestrator::TranslationOrchestrator;
use frontedit::translation::HttpTranslator;

pub async fn translate(config: &Config, text: &str, source: Language) -> Result<()> {
    let translator = HttpTranslator::new(config.translation.clone())?;
    let orchestrator = TranslationOrchestrator::new(Arc::new(translator));

    let result = orchestrator.translate_to_other_languages(text, source).await;

    println!("[{source}] {text}");
    for (lang, translated) in &result.translations {
        println!("[{lang}] {translated}");
    }
    for failure in &result.errors {
        println!("[{}] failed: {}", failure.language, failure.reason);
    }

    if !result.success {
        return Err(Error::other(format!(
            "Translation failed for {} language(s)",
            result.errors.len()
        )));
    }
    Ok(())
}
