//! Client languages understood by the pattern catalog.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FishwatchError;

/// Game client language that produced a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Locale {
    /// English client. Also the default.
    #[default]
    English,
    /// German client.
    German,
    /// French client.
    French,
    /// Japanese client.
    Japanese,
    /// Korean client.
    Korean,
}

impl Locale {
    /// Every supported locale in a stable order.
    pub const ALL: [Locale; 5] = [
        Locale::English,
        Locale::German,
        Locale::French,
        Locale::Japanese,
        Locale::Korean,
    ];

    /// Short language code (`en`, `de`, ...).
    pub const fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::German => "de",
            Locale::French => "fr",
            Locale::Japanese => "ja",
            Locale::Korean => "ko",
        }
    }

    /// Human-readable name.
    pub const fn label(self) -> &'static str {
        match self {
            Locale::English => "English",
            Locale::German => "German",
            Locale::French => "French",
            Locale::Japanese => "Japanese",
            Locale::Korean => "Korean",
        }
    }

    /// The locale following this one in [`Locale::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|locale| *locale == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = FishwatchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" | "english" => Ok(Locale::English),
            "de" | "german" | "deutsch" => Ok(Locale::German),
            "fr" | "french" | "francais" => Ok(Locale::French),
            "ja" | "jp" | "japanese" => Ok(Locale::Japanese),
            "ko" | "kr" | "korean" => Ok(Locale::Korean),
            _ => Err(FishwatchError::UnsupportedLocale(value.trim().to_string())),
        }
    }
}

impl Serialize for Locale {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_names_and_region_tags() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::English));
        assert_eq!("de_DE".parse::<Locale>(), Ok(Locale::German));
        assert_eq!(" French ".parse::<Locale>(), Ok(Locale::French));
        assert_eq!("ja-JP".parse::<Locale>(), Ok(Locale::Japanese));
        assert_eq!("KO".parse::<Locale>(), Ok(Locale::Korean));
    }

    #[test]
    fn rejects_unknown_languages() {
        assert_eq!(
            "zh".parse::<Locale>(),
            Err(FishwatchError::UnsupportedLocale("zh".to_string()))
        );
        assert!("".parse::<Locale>().is_err());
    }

    #[test]
    fn next_cycles_through_every_locale() {
        let mut locale = Locale::English;
        for _ in 0..Locale::ALL.len() {
            locale = locale.next();
        }
        assert_eq!(locale, Locale::English);
        assert_eq!(Locale::Korean.next(), Locale::English);
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&Locale::Japanese).expect("serialize");
        assert_eq!(json, "\"ja\"");
        let back: Locale = serde_json::from_str("\"german\"").expect("deserialize");
        assert_eq!(back, Locale::German);
        assert!(serde_json::from_str::<Locale>("\"xx\"").is_err());
    }
}
