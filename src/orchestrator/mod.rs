//! Change detection and translation fan-out
//!
//! Editors usually fill in one language and expect the other three to be
//! populated automatically. When they hand-edit several tabs in one session
//! their input is saved literally, so detection only reports a language when
//! it is the single slot that changed.
//!
//! Translation into the other languages runs concurrently and never fails as
//! a whole: each target language succeeds or fails independently and the
//! outcome is aggregated into a [`TranslationResult`].

use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::metrics;
use crate::models::{Language, MultilingualValue};
use crate::translation::{TranslationError, Translator};

/// Determine which single language changed between two snapshots
///
/// Slots are compared after trimming, so whitespace-only edits are not
/// changes. Returns `Some(lang)` only if exactly one slot differs and its new
/// value is non-empty after trimming. Zero or multiple changes, or a change
/// that leaves only whitespace, yield `None`.
pub fn detect_changed_language(
    original: &MultilingualValue,
    current: &MultilingualValue,
) -> Option<Language> {
    match original.diff(current).as_slice() {
        [lang] if !current.get(*lang).trim().is_empty() => Some(*lang),
        _ => None,
    }
}

/// Failure of one target language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageFailure {
    pub language: Language,
    pub reason: String,
    #[serde(skip)]
    pub error: TranslationError,
}

/// Aggregated outcome of translating into several languages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    /// True only if every target language succeeded
    pub success: bool,

    /// Successful translations by target language (kept on partial failure)
    pub translations: BTreeMap<Language, String>,

    /// One entry per failed target language
    pub errors: Vec<LanguageFailure>,
}

impl TranslationResult {
    fn empty() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Merge successful translations into `value`
    ///
    /// Failed languages keep whatever `value` already holds.
    pub fn apply_to(&self, value: &mut MultilingualValue) {
        for (lang, text) in &self.translations {
            value.set(*lang, text.clone());
        }
    }

    /// Languages that failed to translate
    pub fn failed_languages(&self) -> Vec<Language> {
        self.errors.iter().map(|f| f.language).collect()
    }
}

/// Runs translation fan-out against a [`Translator`]
#[derive(Clone)]
pub struct TranslationOrchestrator {
    translator: Arc<dyn Translator>,
}

impl TranslationOrchestrator {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Translate `text` from `source` into the three other languages
    pub async fn translate_to_other_languages(
        &self,
        text: &str,
        source: Language,
    ) -> TranslationResult {
        let targets: Vec<Language> = source.others().collect();
        self.translate_into(text, source, &targets).await
    }

    /// Translate English `text` into `la`, `th` and `zh`
    ///
    /// Used to fill a brand-new field rather than reacting to an edit.
    pub async fn translate_from_english(&self, text: &str) -> TranslationResult {
        self.translate_to_other_languages(text, Language::En).await
    }

    async fn translate_into(
        &self,
        text: &str,
        source: Language,
        targets: &[Language],
    ) -> TranslationResult {
        if text.trim().is_empty() {
            return TranslationResult::empty();
        }

        tracing::info!(
            %source,
            targets = ?targets,
            provider = self.translator.provider_name(),
            "Translating edited text"
        );

        let calls = targets.iter().map(|&target| {
            let translator = Arc::clone(&self.translator);
            async move { (target, translator.translate(text, source, target).await) }
        });

        let mut result = TranslationResult::empty();
        for (target, outcome) in join_all(calls).await {
            metrics::record_translation(target, outcome.is_ok());
            match outcome {
                Ok(translated) => {
                    result.translations.insert(target, translated);
                }
                Err(error) => {
                    tracing::warn!(%source, %target, error = %error, "Translation failed");
                    result.success = false;
                    result.errors.push(LanguageFailure {
                        language: target,
                        reason: error.to_string(),
                        error,
                    });
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::{MockMode, MockTranslator};
    use std::time::{Duration, Instant};

    fn value(en: &str, la: &str, th: &str, zh: &str) -> MultilingualValue {
        MultilingualValue {
            en: en.into(),
            la: la.into(),
            th: th.into(),
            zh: zh.into(),
        }
    }

    #[test]
    fn test_detect_single_change() {
        let original = value("Safety", "", "", "");
        let current = value("Safety First", "", "", "");
        assert_eq!(
            detect_changed_language(&original, &current),
            Some(Language::En)
        );
    }

    #[test]
    fn test_detect_no_change() {
        let original = value("a", "b", "c", "d");
        assert_eq!(detect_changed_language(&original, &original.clone()), None);
    }

    #[test]
    fn test_detect_multiple_changes() {
        let original = value("a", "", "", "");
        let current = value("b", "", "c", "");
        assert_eq!(detect_changed_language(&original, &current), None);
    }

    #[test]
    fn test_detect_whitespace_only() {
        let original = value("a", "", "", "");
        let current = value("a", "", "   ", "");
        assert_eq!(detect_changed_language(&original, &current), None);
    }

    #[test]
    fn test_detect_trailing_space_is_not_a_change() {
        let original = value("Safety", "", "ปลอดภัย", "");
        let current = value("Safety  ", "", "ปลอดภัย", "");
        assert_eq!(detect_changed_language(&original, &current), None);
    }

    #[test]
    fn test_detect_ignores_whitespace_on_other_tab() {
        let original = value("Safety", "", "ปลอดภัย", "");
        let current = value("Safety First", "", "ปลอดภัย ", "");
        assert_eq!(
            detect_changed_language(&original, &current),
            Some(Language::En)
        );
    }

    #[test]
    fn test_detect_cleared_slot_is_not_translated() {
        let original = value("a", "b", "", "");
        let current = value("a", "", "", "");
        assert_eq!(detect_changed_language(&original, &current), None);
    }

    #[tokio::test]
    async fn test_translate_to_others() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let orchestrator = TranslationOrchestrator::new(mock.clone());

        let result = orchestrator
            .translate_to_other_languages("สวัสดี", Language::Th)
            .await;

        assert!(result.success);
        assert_eq!(result.translations.len(), 3);
        assert_eq!(result.translations[&Language::En], "สวัสดี_en");
        assert!(!result.translations.contains_key(&Language::Th));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_partial_failure() {
        let mock = Arc::new(MockTranslator::failing_for([Language::Zh]));
        let orchestrator = TranslationOrchestrator::new(mock);

        let result = orchestrator.translate_from_english("Careers").await;

        assert!(!result.success);
        assert_eq!(result.translations.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.failed_languages(), vec![Language::Zh]);
    }

    #[tokio::test]
    async fn test_empty_text_skips_gateway() {
        let mock = Arc::new(MockTranslator::new(MockMode::Suffix));
        let orchestrator = TranslationOrchestrator::new(mock.clone());

        let result = orchestrator.translate_from_english("  ").await;

        assert!(result.success);
        assert!(result.translations.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_calls_run_concurrently() {
        let mock = Arc::new(MockTranslator::with_delay(
            MockMode::Suffix,
            Duration::from_millis(200),
        ));
        let orchestrator = TranslationOrchestrator::new(mock);

        let started = Instant::now();
        let result = orchestrator.translate_from_english("News").await;

        assert!(result.success);
        assert!(started.elapsed() < Duration::from_millis(550));
    }

    #[test]
    fn test_apply_keeps_failed_slots() {
        let mut target = value("Hello", "old-la", "old-th", "old-zh");
        let mut result = TranslationResult::empty();
        result.translations.insert(Language::Th, "new-th".to_string());
        result.apply_to(&mut target);

        assert_eq!(target, value("Hello", "old-la", "new-th", "old-zh"));
    }
}
