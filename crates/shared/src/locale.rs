use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" => Ok(Locale::Ja),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

/// User-facing strings rendered by the page controller.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub required_fields: &'static str,
    pub loading: &'static str,
    pub no_results: &'static str,
    pub search_failed: &'static str,
    pub back_to_top: &'static str,
    pub score_label: &'static str,
}

const JA: Messages = Messages {
    required_fields: "必須項目を入力してください。",
    loading: "検索中...",
    no_results: "検索結果が見つかりませんでした。",
    search_failed: "検索に失敗しました。時間をおいて再度お試しください。",
    back_to_top: "ページトップへ戻る",
    score_label: "評価",
};

const EN: Messages = Messages {
    required_fields: "Please fill in the required fields.",
    loading: "Searching...",
    no_results: "No results found.",
    search_failed: "Search failed. Please try again later.",
    back_to_top: "Back to top",
    score_label: "Rating",
};

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::Ja => &JA,
            Locale::En => &EN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_suffixed_tags() {
        assert_eq!("EN-us".parse::<Locale>(), Ok(Locale::En));
        assert_eq!(" ja ".parse::<Locale>(), Ok(Locale::Ja));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn default_locale_is_japanese() {
        assert_eq!(Locale::default().messages().no_results, JA.no_results);
    }
}
