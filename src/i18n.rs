use serde::{Deserialize, Serialize};
use sonic_rs::JsonValueTrait;

use crate::models::locale::Locale;

/// A translatable field pulled off an API record.
///
/// Backend records carry a base field plus optional per-locale variants
/// (`name`, `name_ru`, ...). This models that shape explicitly instead of
/// duck-typed suffix lookup: construct one at the API boundary with
/// [`LocalizedText::from_value`], then resolve per locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// The base (untranslated) value.
    pub base: Option<String>,
    /// The `_uz` variant.
    pub uz: Option<String>,
    /// The `_ru` variant.
    pub ru: Option<String>,
    /// The `_en` variant.
    pub en: Option<String>,
}

/// The resolved value for every supported locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translations {
    /// The value for Uzbek.
    pub uz: String,
    /// The value for Russian.
    pub ru: String,
    /// The value for English.
    pub en: String,
}

impl LocalizedText {
    /// Reads `field` and its per-locale variants off a JSON record.
    ///
    /// Missing or non-string values become `None`; a non-object record
    /// yields an empty `LocalizedText`.
    pub fn from_value(record: &sonic_rs::Value, field: &str) -> Self {
        let read = |key: &str| {
            record
                .get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };
        Self {
            base: read(field),
            uz: read(&format!("{}_uz", field)),
            ru: read(&format!("{}_ru", field)),
            en: read(&format!("{}_en", field)),
        }
    }

    /// Resolves the value for `locale`: the locale's variant if present
    /// and non-empty, else the base field, else the empty string.
    pub fn resolve(&self, locale: Locale) -> String {
        let variant = match locale {
            Locale::Uz => &self.uz,
            Locale::Ru => &self.ru,
            Locale::En => &self.en,
        };
        variant
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(self.base.as_deref().filter(|v| !v.is_empty()))
            .unwrap_or("")
            .to_string()
    }

    /// Resolves every supported locale at once.
    pub fn all(&self) -> Translations {
        Translations {
            uz: self.resolve(Locale::Uz),
            ru: self.resolve(Locale::Ru),
            en: self.resolve(Locale::En),
        }
    }
}

/// Null-safe field localization: `None` records resolve to `""`.
pub fn localize(text: Option<&LocalizedText>, locale: Locale) -> String {
    text.map(|t| t.resolve(locale)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> sonic_rs::Value {
        sonic_rs::from_str(json).unwrap()
    }

    #[test]
    fn variant_wins_over_base() {
        let value = record(r#"{"name": "Base", "name_ru": "База"}"#);
        let text = LocalizedText::from_value(&value, "name");
        assert_eq!(text.resolve(Locale::Ru), "База");
    }

    #[test]
    fn missing_variant_falls_back_to_base() {
        let value = record(r#"{"name": "Base", "name_ru": "База"}"#);
        let text = LocalizedText::from_value(&value, "name");
        assert_eq!(text.resolve(Locale::En), "Base");
    }

    #[test]
    fn empty_variant_falls_back_to_base() {
        let value = record(r#"{"name": "Base", "name_en": ""}"#);
        let text = LocalizedText::from_value(&value, "name");
        assert_eq!(text.resolve(Locale::En), "Base");
    }

    #[test]
    fn nothing_resolves_to_empty_string() {
        let value = record(r#"{"other": 1}"#);
        let text = LocalizedText::from_value(&value, "name");
        assert_eq!(text.resolve(Locale::Uz), "");
    }

    #[test]
    fn null_record_resolves_to_empty_string() {
        assert_eq!(localize(None, Locale::Ru), "");
    }

    #[test]
    fn non_string_fields_are_ignored() {
        let value = record(r#"{"name": 42, "name_ru": "Сорок два"}"#);
        let text = LocalizedText::from_value(&value, "name");
        assert_eq!(text.resolve(Locale::Ru), "Сорок два");
        assert_eq!(text.resolve(Locale::En), "");
    }

    #[test]
    fn all_produces_the_fixed_shape() {
        let value = record(r#"{"name": "Base", "name_uz": "Asos", "name_ru": "База"}"#);
        let text = LocalizedText::from_value(&value, "name");
        assert_eq!(
            text.all(),
            Translations {
                uz: "Asos".to_string(),
                ru: "База".to_string(),
                en: "Base".to_string(),
            }
        );
    }
}
