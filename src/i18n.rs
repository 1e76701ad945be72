// ABOUTME: Language selection and localized content resolution for catalog text
// ABOUTME: Defines the Language enum and the Localized text container used by models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Localized content support
//!
//! Catalog text (program goals, exercise names, meal names, notification
//! messages) is stored once per supported language, with the base text as a
//! fallback. Machine translation is intentionally out of scope; admins supply
//! translations when creating content.

use serde::{Deserialize, Serialize};

/// Supported content languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
    Uz,
}

impl Language {
    /// Canonical two-letter code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
            Self::Uz => "uz",
        }
    }

    /// Parse from a two-letter code, `None` for unsupported codes
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" => Some(Self::En),
            "ru" => Some(Self::Ru),
            "uz" => Some(Self::Uz),
            _ => None,
        }
    }

    /// Parse from a two-letter code with English fallback
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of text carried in all supported languages
///
/// The base `text` is what the author entered; per-language variants are
/// optional and fall back to the base when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Localized {
    /// Base text as authored
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ru: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uz: Option<String>,
}

impl Localized {
    /// Create from base text only
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            en: None,
            ru: None,
            uz: None,
        }
    }

    /// Create with all per-language variants supplied
    pub fn with_translations(
        text: impl Into<String>,
        en: Option<String>,
        ru: Option<String>,
        uz: Option<String>,
    ) -> Self {
        Self {
            text: text.into(),
            en,
            ru,
            uz,
        }
    }

    /// Resolve the text for a language, falling back to the base text
    #[must_use]
    pub fn resolve(&self, language: Language) -> &str {
        let variant = match language {
            Language::En => self.en.as_deref(),
            Language::Ru => self.ru.as_deref(),
            Language::Uz => self.uz.as_deref(),
        };
        variant.unwrap_or(&self.text)
    }
}

impl From<&str> for Localized {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("ru"), Some(Language::Ru));
        assert_eq!(Language::parse("UZ"), Some(Language::Uz));
        assert_eq!(Language::parse("fr"), None);
        assert_eq!(Language::parse_or_default("fr"), Language::En);
    }

    #[test]
    fn test_localized_resolution_falls_back_to_base() {
        let goal = Localized::with_translations(
            "Weight Loss",
            None,
            Some("Похудение".into()),
            None,
        );
        assert_eq!(goal.resolve(Language::Ru), "Похудение");
        assert_eq!(goal.resolve(Language::Uz), "Weight Loss");
        assert_eq!(goal.resolve(Language::En), "Weight Loss");
    }
}
