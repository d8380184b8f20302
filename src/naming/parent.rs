use crate::model::{DIVISION_CODES, ParentOfferingInfo};
use once_cell::sync::Lazy;
use regex::Regex;

static PARENT_INNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[Parent\s+(.*?)\]").expect("parent pattern compiles"));

pub(crate) fn is_division(token: &str) -> bool {
    DIVISION_CODES.contains(&token)
}

pub(crate) fn is_country(token: &str) -> bool {
    token.len() == 2 && token.chars().all(|c| c.is_ascii_uppercase()) && !is_division(token)
}

impl ParentOfferingInfo {
    /// Best-effort parse of `[Parent <tokens>] <description>`; missing parts are empty.
    pub fn parse(descriptor: &str) -> Self {
        let inner = PARENT_INNER
            .captures(descriptor)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or("");
        let catalog = match descriptor.split_once(']') {
            Some((_, rest)) => rest.trim(),
            None => descriptor.trim(),
        };

        let tokens: Vec<String> = inner.split_whitespace().map(str::to_string).collect();
        let country_idx = tokens.iter().position(|t| is_country(t));
        let division_idx = tokens.iter().position(|t| is_division(t));

        let topic = tokens
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != country_idx && Some(*idx) != division_idx)
            .map(|(_, token)| token.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            country: country_idx.map(|i| tokens[i].clone()).unwrap_or_default(),
            division: division_idx.map(|i| tokens[i].clone()).unwrap_or_default(),
            topic,
            catalog: catalog.to_string(),
            tokens,
        }
    }
}
