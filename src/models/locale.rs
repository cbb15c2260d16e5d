use serde::{Deserialize, Serialize};

/// A supported interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    /// Uzbek, the portal's primary language.
    #[default]
    #[serde(rename = "uz")]
    Uz,
    /// Russian.
    #[serde(rename = "ru")]
    Ru,
    /// English.
    #[serde(rename = "en")]
    En,
}

impl Locale {
    /// Every supported locale, in fallback-priority order.
    pub const ALL: [Locale; 3] = [Locale::Uz, Locale::Ru, Locale::En];

    /// Returns the wire code for this locale.
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Uz => "uz",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    /// Parses a wire code into a `Locale`.
    ///
    /// # Returns
    ///
    /// `None` when the code is not one of the supported languages.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "uz" => Some(Locale::Uz),
            "ru" => Some(Locale::Ru),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A language entry as returned by `GET /languages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    /// The language code, e.g. `"uz"`.
    pub code: String,
    /// The language's display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the language is currently enabled on the backend.
    pub active: bool,
}

/// Resolves the locale to use given what is persisted and which languages
/// the backend currently considers active.
///
/// The persisted locale wins if it maps to an active language; otherwise
/// the first active language wins; otherwise the hardcoded default.
pub fn resolve_active(
    persisted: Option<Locale>,
    languages: &[Language],
    default_locale: Locale,
) -> Locale {
    if let Some(locale) = persisted {
        if languages.iter().any(|l| l.active && l.code == locale.as_str()) {
            return locale;
        }
    }

    languages
        .iter()
        .filter(|l| l.active)
        .find_map(|l| Locale::parse(&l.code))
        .unwrap_or(default_locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str, active: bool) -> Language {
        Language {
            code: code.to_string(),
            name: None,
            active,
        }
    }

    #[test]
    fn persisted_active_locale_wins() {
        let langs = vec![lang("uz", true), lang("ru", true)];
        assert_eq!(
            resolve_active(Some(Locale::Ru), &langs, Locale::Uz),
            Locale::Ru
        );
    }

    #[test]
    fn inactive_persisted_locale_falls_back_to_first_active() {
        let langs = vec![lang("ru", false), lang("en", true)];
        assert_eq!(
            resolve_active(Some(Locale::Ru), &langs, Locale::Uz),
            Locale::En
        );
    }

    #[test]
    fn no_active_languages_falls_back_to_default() {
        let langs = vec![lang("ru", false)];
        assert_eq!(resolve_active(Some(Locale::Ru), &langs, Locale::Uz), Locale::Uz);
        assert_eq!(resolve_active(None, &[], Locale::Uz), Locale::Uz);
    }

    #[test]
    fn unknown_active_code_is_skipped() {
        let langs = vec![lang("de", true), lang("en", true)];
        assert_eq!(resolve_active(None, &langs, Locale::Uz), Locale::En);
    }
}
