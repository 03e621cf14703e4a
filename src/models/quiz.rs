use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

pub const FALLBACK_LOCALE: &str = "en";

/// Text keyed by locale code, e.g. `{"en": "Events", "ja": "イベント"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub BTreeMap<String, String>);

impl LocalizedText {
    pub fn new(locale: &str, text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(locale.to_string(), text.into());
        Self(map)
    }

    /// Requested locale, then the fallback locale, then whatever is present.
    pub fn resolve(&self, locale: &str) -> &str {
        self.0
            .get(locale)
            .or_else(|| self.0.get(FALLBACK_LOCALE))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[validate(length(min = 1))]
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    /// Whole-quiz limit in seconds, 0 means unlimited.
    #[serde(default, alias = "time_limit")]
    pub time_limit: u32,
    pub question_ids: Vec<String>,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub passing_score: Option<u32>,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default)]
    pub shuffle_options: bool,
}

impl Quiz {
    pub fn has_time_limit(&self) -> bool {
        self.time_limit > 0
    }
}
