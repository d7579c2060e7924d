//! Mock translator for testing
//!
//! Deterministic, network-free [`Translator`] that also records every call,
//! so tests can assert how many gateway requests a workflow issued.
//!
//! ```rust,ignore
//! let mock = MockTranslator::new(MockMode::Suffix);
//! let result = mock.translate("hello", Language::En, Language::Th).await?;
//! assert_eq!(result, "hello_th");
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::{TranslationError, TranslationOutcome, Translator};
use crate::models::Language;

/// Translation behaviour of the mock
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target code: "hello" → "hello_th"
    Suffix,

    /// Predefined (text, target) → translation, suffix otherwise
    Mappings(HashMap<(String, Language), String>),

    /// Fail only for the listed target languages, suffix for the rest
    FailFor(HashSet<Language>),

    /// Every call fails with this message
    Error(String),
}

/// A recorded translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

/// Mock translator that records calls
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    delay: Duration,
    calls: Mutex<Vec<MockCall>>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock with a simulated network delay per call
    pub fn with_delay(mode: MockMode, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(mode)
        }
    }

    /// Mock failing only for `targets`
    pub fn failing_for(targets: impl IntoIterator<Item = Language>) -> Self {
        Self::new(MockMode::FailFor(targets.into_iter().collect()))
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn apply(&self, text: &str, target: Language) -> TranslationOutcome<String> {
        let suffixed = || format!("{text}_{}", target.code());

        match &self.mode {
            MockMode::Suffix => Ok(suffixed()),
            MockMode::Mappings(map) => Ok(map
                .get(&(text.to_string(), target))
                .cloned()
                .unwrap_or_else(suffixed)),
            MockMode::FailFor(failing) if failing.contains(&target) => {
                Err(TranslationError::Status(503))
            }
            MockMode::FailFor(_) => Ok(suffixed()),
            MockMode::Error(msg) => Err(TranslationError::Http(msg.clone())),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> TranslationOutcome<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                text: text.to_string(),
                source,
                target,
            });
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.apply(text, target)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix_mode() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", Language::En, Language::Zh).await;
        assert_eq!(result.unwrap(), "hello_zh");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mappings_mode() {
        let mut map = HashMap::new();
        map.insert(("Safety".to_string(), Language::Th), "ความปลอดภัย".to_string());
        let mock = MockTranslator::new(MockMode::Mappings(map));

        assert_eq!(
            mock.translate("Safety", Language::En, Language::Th).await.unwrap(),
            "ความปลอดภัย"
        );
        assert_eq!(
            mock.translate("Safety", Language::En, Language::La).await.unwrap(),
            "Safety_la"
        );
    }

    #[tokio::test]
    async fn test_fail_for_mode() {
        let mock = MockTranslator::failing_for([Language::La]);
        assert!(mock.translate("x", Language::En, Language::La).await.is_err());
        assert!(mock.translate("x", Language::En, Language::Th).await.is_ok());
    }

    #[tokio::test]
    async fn test_records_calls() {
        let mock = MockTranslator::new(MockMode::Error("offline".into()));
        let _ = mock.translate("hi", Language::Th, Language::En).await;
        assert_eq!(
            mock.calls(),
            vec![MockCall {
                text: "hi".to_string(),
                source: Language::Th,
                target: Language::En,
            }]
        );
    }
}
