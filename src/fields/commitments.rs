use crate::model::OperatingMode;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::collections::BTreeSet;

static RSP_SCHEDULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RSP .*? P1-P4").expect("rsp pattern compiles"));
static RSL_SCHEDULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RSL .*? P1-P4").expect("rsl pattern compiles"));
static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"P1-P4 .*$").expect("duration pattern compiles"));

/// When an OLA line accompanies the SLA lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitmentRules {
    /// Countries whose fresh blocks carry an OLA line (SR mode only).
    pub ola_countries: BTreeSet<String>,
    /// Append an OLA line to rewritten commitments as well.
    pub ola_on_rewrite: bool,
}

impl CommitmentRules {
    fn wants_ola(&self, country: &str, mode: OperatingMode) -> bool {
        mode == OperatingMode::Sr && self.ola_countries.contains(country)
    }
}

/// Durations and schedule written into commitment lines.
#[derive(Debug, Clone, Copy)]
pub struct CommitmentTerms<'a> {
    pub country: &'a str,
    pub schedule: &'a str,
    pub rsp: &'a str,
    pub rsl: &'a str,
    pub mode: OperatingMode,
}

fn ola_line(terms: &CommitmentTerms<'_>) -> String {
    format!(
        "[{}] OLA SR RSL {} P1-P4 {}",
        terms.country, terms.schedule, terms.rsl
    )
}

/// SLA response and resolution lines, plus an OLA line where the rules ask for one.
pub fn fresh_block(terms: &CommitmentTerms<'_>, rules: &CommitmentRules) -> String {
    let mut lines = vec![
        format!(
            "[{}] SLA SR RSP {} P1-P4 {}",
            terms.country, terms.schedule, terms.rsp
        ),
        format!(
            "[{}] SLA SR RSL {} P1-P4 {}",
            terms.country, terms.schedule, terms.rsl
        ),
    ];
    if rules.wants_ola(terms.country, terms.mode) {
        lines.push(ola_line(terms));
    }
    lines.join("\n")
}

/// Replaces schedule and duration on RSP/RSL lines; other lines are kept verbatim.
pub fn rewrite(original: &str, schedule: &str, rsp: &str, rsl: &str) -> String {
    original
        .lines()
        .map(|line| {
            let (marker, label, duration) = if line.contains("RSP") {
                (&*RSP_SCHEDULE, "RSP", rsp)
            } else if line.contains("RSL") {
                (&*RSL_SCHEDULE, "RSL", rsl)
            } else {
                return line.to_string();
            };
            let scheduled = marker.replace_all(
                line,
                NoExpand(&format!("{label} {schedule} P1-P4")),
            );
            DURATION
                .replace_all(&scheduled, NoExpand(&format!("P1-P4 {duration}")))
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fresh block for blank or placeholder text, otherwise a rewrite of `original`.
pub fn derive(original: &str, terms: &CommitmentTerms<'_>, rules: &CommitmentRules) -> String {
    let original = original.trim();
    if original.is_empty() || original == crate::filter::COMMITMENT_PLACEHOLDER {
        return fresh_block(terms, rules);
    }
    let mut text = rewrite(original, terms.schedule, terms.rsp, terms.rsl);
    if rules.ola_on_rewrite && rules.wants_ola(terms.country, terms.mode) {
        text.push('\n');
        text.push_str(&ola_line(terms));
    }
    text
}
