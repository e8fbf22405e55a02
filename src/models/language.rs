use poise::ChoiceParameter;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

#[derive(ChoiceParameter, EnumIter, IntoStaticStr, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[name = "Português"]
    Pt,
    #[name = "English"]
    En,
    #[name = "Español"]
    Es,
}

impl Language {
    pub const FALLBACK: Language = Language::En;

    pub fn code(&self) -> &'static str {
        self.into()
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Language::iter().find(|language| language.code() == code)
    }

    pub fn native_name(&self) -> &'static str {
        use Language::*;

        match self {
            Pt => "Português",
            En => "English",
            Es => "Español",
        }
    }

    pub fn flag(&self) -> &'static str {
        use Language::*;

        match self {
            Pt => "🇧🇷",
            En => "🇺🇸",
            Es => "🇪🇸",
        }
    }

    /// Picks a language from a locale tag such as `pt-BR` or `en_US`.
    pub fn detect(locale: &str) -> Language {
        let locale = locale.trim().to_lowercase();

        if let Some(language) = Language::from_code(&locale) {
            return language;
        }

        locale
            .split(['-', '_'])
            .next()
            .and_then(Language::from_code)
            .unwrap_or(Language::FALLBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::Language;

    #[test]
    fn codes() {
        assert_eq!(Language::Pt.code(), "pt");
        assert_eq!(Language::En.code(), "en");
        assert_eq!(Language::Es.code(), "es");
    }

    #[test]
    fn parses_codes() {
        assert_eq!(Language::from_code("es"), Some(Language::Es));
        assert_eq!(Language::from_code("de"), None);
    }

    #[test]
    fn detects_regional_locales() {
        assert_eq!(Language::detect("pt-BR"), Language::Pt);
        assert_eq!(Language::detect("ES-es"), Language::Es);
        assert_eq!(Language::detect("en_GB"), Language::En);
    }

    #[test]
    fn falls_back_on_unknown_locales() {
        assert_eq!(Language::detect("ja"), Language::FALLBACK);
        assert_eq!(Language::detect(""), Language::FALLBACK);
    }
}
