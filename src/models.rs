// Core data structures for frontedit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content languages supported by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    La,
    Th,
    Zh,
}

impl Language {
    /// All languages in tab order
    pub const ALL: [Language; 4] = [Language::En, Language::La, Language::Th, Language::Zh];

    /// Site language code, also used as column suffix
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::La => "la",
            Language::Th => "th",
            Language::Zh => "zh",
        }
    }

    /// Language code understood by the translation gateway
    pub fn gateway_code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::La => "lo",
            Language::Th => "th",
            Language::Zh => "zh-CN",
        }
    }

    /// Native display name for editor tabs
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::La => "ລາວ",
            Language::Th => "ไทย",
            Language::Zh => "中文",
        }
    }

    /// The three languages other than `self`
    pub fn others(self) -> impl Iterator<Item = Language> {
        Self::ALL.into_iter().filter(move |lang| *lang != self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "la" | "lo" | "lao" => Ok(Language::La),
            "th" | "thai" => Ok(Language::Th),
            "zh" | "zh-cn" | "chinese" => Ok(Language::Zh),
            other => Err(format!("Unsupported language: {other}")),
        }
    }
}

/// One piece of editable content in all four languages
///
/// Every slot is always present in memory; an unset slot is an empty string.
/// English is the fallback for every other language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultilingualValue {
    pub en: String,
    pub la: String,
    pub th: String,
    pub zh: String,
}

impl MultilingualValue {
    /// Value with only the English slot filled
    pub fn english(text: impl Into<String>) -> Self {
        Self {
            en: text.into(),
            ..Default::default()
        }
    }

    /// Build from nullable store columns
    pub fn from_columns(
        en: Option<String>,
        la: Option<String>,
        th: Option<String>,
        zh: Option<String>,
    ) -> Self {
        Self {
            en: en.unwrap_or_default(),
            la: la.unwrap_or_default(),
            th: th.unwrap_or_default(),
            zh: zh.unwrap_or_default(),
        }
    }

    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::La => &self.la,
            Language::Th => &self.th,
            Language::Zh => &self.zh,
        }
    }

    pub fn set(&mut self, lang: Language, text: impl Into<String>) {
        let slot = match lang {
            Language::En => &mut self.en,
            Language::La => &mut self.la,
            Language::Th => &mut self.th,
            Language::Zh => &mut self.zh,
        };
        *slot = text.into();
    }

    /// Slot for `lang`, or the English slot when that one is blank
    pub fn get_or_fallback(&self, lang: Language) -> &str {
        let value = self.get(lang);
        if value.trim().is_empty() {
            &self.en
        } else {
            value
        }
    }

    /// Languages whose slot differs from `other`, ignoring surrounding whitespace
    pub fn diff(&self, other: &MultilingualValue) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|lang| self.get(*lang).trim() != other.get(*lang).trim())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Language::ALL
            .iter()
            .all(|lang| self.get(*lang).trim().is_empty())
    }
}

/// Site-wide setting keyed by `setting_key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub setting_key: String,
    pub value: MultilingualValue,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Content tables that own multilingual fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTable {
    Services,
    Projects,
    News,
    Careers,
    AboutContent,
    Gallery,
}

impl ContentTable {
    pub const ALL: [ContentTable; 6] = [
        ContentTable::Services,
        ContentTable::Projects,
        ContentTable::News,
        ContentTable::Careers,
        ContentTable::AboutContent,
        ContentTable::Gallery,
    ];

    /// Table name in the store
    pub fn table_name(&self) -> &'static str {
        match self {
            ContentTable::Services => "services",
            ContentTable::Projects => "projects",
            ContentTable::News => "news",
            ContentTable::Careers => "careers",
            ContentTable::AboutContent => "about_content",
            ContentTable::Gallery => "gallery",
        }
    }

    /// Multilingual fields owned by the table
    pub fn fields(&self) -> &'static [FieldPrefix] {
        use FieldPrefix::*;
        match self {
            ContentTable::Services => &[Title, Description],
            ContentTable::Projects => &[Title, Description],
            ContentTable::News => &[Title, Excerpt, Content],
            ContentTable::Careers => &[Title, Description, Requirements],
            ContentTable::AboutContent => &[Title, Content],
            ContentTable::Gallery => &[Title, Description],
        }
    }

    pub fn has_field(&self, prefix: FieldPrefix) -> bool {
        self.fields().contains(&prefix)
    }

    /// Column definitions for the non-multilingual attributes
    pub(crate) fn attribute_columns(&self) -> &'static str {
        match self {
            ContentTable::Services => {
                "sort_order INTEGER NOT NULL DEFAULT 0, is_active INTEGER NOT NULL DEFAULT 1"
            }
            ContentTable::Projects => {
                "status TEXT NOT NULL DEFAULT 'ongoing', sort_order INTEGER NOT NULL DEFAULT 0"
            }
            ContentTable::News => "is_published INTEGER NOT NULL DEFAULT 0, published_at TEXT",
            ContentTable::Careers => "is_active INTEGER NOT NULL DEFAULT 1, deadline TEXT",
            ContentTable::AboutContent => {
                "section_key TEXT, sort_order INTEGER NOT NULL DEFAULT 0"
            }
            ContentTable::Gallery => "sort_order INTEGER NOT NULL DEFAULT 0",
        }
    }
}

impl fmt::Display for ContentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for ContentTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentTable::ALL
            .into_iter()
            .find(|table| table.table_name() == s)
            .ok_or_else(|| format!("Unknown content table: {s}"))
    }
}

/// Named multilingual field on a content record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPrefix {
    Title,
    Description,
    Content,
    Excerpt,
    Requirements,
}

impl FieldPrefix {
    pub const ALL: [FieldPrefix; 5] = [
        FieldPrefix::Title,
        FieldPrefix::Description,
        FieldPrefix::Content,
        FieldPrefix::Excerpt,
        FieldPrefix::Requirements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPrefix::Title => "title",
            FieldPrefix::Description => "description",
            FieldPrefix::Content => "content",
            FieldPrefix::Excerpt => "excerpt",
            FieldPrefix::Requirements => "requirements",
        }
    }

    /// Column name for one language of this field, e.g. `title_th`
    pub fn column(&self, lang: Language) -> String {
        format!("{}_{}", self.as_str(), lang.code())
    }
}

impl fmt::Display for FieldPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPrefix::ALL
            .into_iter()
            .find(|prefix| prefix.as_str() == s)
            .ok_or_else(|| format!("Unknown field prefix: {s}"))
    }
}

/// Access role carried by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    Editor,
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// The authenticated principal behind a request or UI session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Anonymous public visitor
    pub fn anonymous() -> Self {
        Self::new("anonymous", Role::Viewer)
    }

    /// Editors and admins may toggle edit mode and write content
    pub fn can_edit(&self) -> bool {
        matches!(self.role, Role::Editor | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_to_english() {
        let value = MultilingualValue {
            en: "Safety".to_string(),
            th: "ความปลอดภัย".to_string(),
            ..Default::default()
        };

        assert_eq!(value.get_or_fallback(Language::Th), "ความปลอดภัย");
        assert_eq!(value.get_or_fallback(Language::La), "Safety");
        assert_eq!(value.get_or_fallback(Language::Zh), "Safety");
    }

    #[test]
    fn test_whitespace_slot_falls_back() {
        let mut value = MultilingualValue::english("Hello");
        value.set(Language::Zh, "   ");
        assert_eq!(value.get_or_fallback(Language::Zh), "Hello");
    }

    #[test]
    fn test_from_null_columns() {
        let value = MultilingualValue::from_columns(Some("a".into()), None, None, Some("d".into()));
        assert_eq!(value.la, "");
        assert_eq!(value.th, "");
        assert_eq!(value.zh, "d");
    }

    #[test]
    fn test_partial_json_defaults_missing_slots() {
        let value: MultilingualValue = serde_json::from_str(r#"{"en":"Hi","th":"สวัสดี"}"#).unwrap();
        assert_eq!(value.en, "Hi");
        assert_eq!(value.la, "");
        assert_eq!(value.zh, "");
    }

    #[test]
    fn test_diff_ignores_surrounding_whitespace() {
        let before = MultilingualValue::english("Safety");
        let mut after = before.clone();
        after.en = "Safety  ".to_string();
        after.th = " ".to_string();
        assert!(before.diff(&after).is_empty());

        after.la = "ປອດໄພ".to_string();
        assert_eq!(before.diff(&after), vec![Language::La]);
    }

    #[test]
    fn test_language_others() {
        let others: Vec<_> = Language::Th.others().collect();
        assert_eq!(others, vec![Language::En, Language::La, Language::Zh]);
    }

    #[test]
    fn test_gateway_codes() {
        assert_eq!(Language::La.gateway_code(), "lo");
        assert_eq!(Language::Zh.gateway_code(), "zh-CN");
        assert_eq!(Language::Th.gateway_code(), "th");
    }

    #[test]
    fn test_table_fields() {
        assert!(ContentTable::Careers.has_field(FieldPrefix::Requirements));
        assert!(!ContentTable::Gallery.has_field(FieldPrefix::Requirements));
        assert!(ContentTable::News.has_field(FieldPrefix::Excerpt));
        assert_eq!(FieldPrefix::Title.column(Language::La), "title_la");
    }

    #[test]
    fn test_parse_table_names() {
        assert_eq!("about_content".parse::<ContentTable>(), Ok(ContentTable::AboutContent));
        assert!("users".parse::<ContentTable>().is_err());
    }

    #[test]
    fn test_actor_permissions() {
        assert!(Actor::new("a", Role::Admin).can_edit());
        assert!(Actor::new("e", Role::Editor).can_edit());
        assert!(!Actor::anonymous().can_edit());
    }
}
