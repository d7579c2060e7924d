//! Localization of user-facing messages
//!
//! Notification texts and error descriptions are looked up in
//! `locales/*.yml`. Supported UI locales match the content languages:
//! English (en), Lao (la), Thai (th), Chinese (zh).
//!
//! # Environment Variables
//!
//! - `FRONTEDIT_LANG`: Preferred UI locale. Defaults to English.
//!
//! # Usage
//!
//! ```rust,ignore
//! use frontedit::i18n::{set_locale, t};
//!
//! set_locale("th");
//! let msg = t!("editor.saved");
//! ```

use crate::models::Language;

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

/// Set the current locale for translations
///
/// Unknown locales fall back to English.
pub fn set_locale(locale: &str) {
    let normalized = normalize_locale(locale);
    rust_i18n::set_locale(normalized);
}

/// Get the current locale code
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Content language matching the current locale
pub fn language() -> Language {
    current_locale().parse().unwrap_or(Language::En)
}

/// Initialize i18n from `FRONTEDIT_LANG`
pub fn init_from_env() {
    let locale = std::env::var("FRONTEDIT_LANG").unwrap_or_else(|_| "en".to_string());
    set_locale(&locale);
}

/// Normalize locale code to supported format
///
/// - lo, lo-LA, la, lao -> la
/// - th-TH, th_TH, thai -> th
/// - zh-CN, zh_TW, chinese -> zh
/// - anything else -> en
pub fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();

    if lower.starts_with("lo") || lower.starts_with("la") {
        "la"
    } else if lower.starts_with("th") {
        "th"
    } else if lower.starts_with("zh") || lower == "chinese" {
        "zh"
    } else {
        "en"
    }
}

/// Translate a key with optional parameters
///
/// Re-export of `rust_i18n::t!`.
///
/// ```rust,ignore
/// let msg = t!("editor.translation_partial", languages = "ລາວ, ไทย");
/// ```
#[doc(inline)]
pub use rust_i18n::t;
