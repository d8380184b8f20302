use crate::error::GeneratorResult;
use crate::model::{GenerationContext, Row, SourceTable, columns};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static CORP_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bCORP\b").expect("corp pattern compiles"));

pub const COMMITMENT_PLACEHOLDER: &str = "-";

/// How the CORP gate treats the delivering tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorpMatch {
    /// Only the `CORP` word is checked.
    #[default]
    Lenient,
    /// The delivering tag must also appear as a whole word in the name.
    Strict,
}

/// Which commitment texts disqualify a template row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitmentGate {
    /// Reject only the `-` placeholder; blank rows get a fresh block later.
    #[default]
    RejectPlaceholder,
    /// Reject blank text as well as the placeholder.
    RequireText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    /// Lower-cased lifecycle values that retire a row.
    pub discard_lifecycle: BTreeSet<String>,
    pub corp_match: CorpMatch,
    pub commitment_gate: CommitmentGate,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            discard_lifecycle: ["retired", "retiring", "end of life", "end of support"]
                .into_iter()
                .map(String::from)
                .collect(),
            corp_match: CorpMatch::default(),
            commitment_gate: CommitmentGate::default(),
        }
    }
}

/// Compiled per-run predicates selecting template rows.
#[derive(Debug, Clone)]
pub struct RowFilter {
    keywords: Vec<(String, Regex)>,
    name_prefix: String,
    require_corp: bool,
    delivering_word: Option<Regex>,
    rules: FilterRules,
}

fn whole_word(term: &str) -> anyhow::Result<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(term)))
        .with_context(|| format!("invalid whole-word pattern for {term:?}"))
}

impl RowFilter {
    pub fn new(ctx: &GenerationContext, rules: FilterRules) -> GeneratorResult<Self> {
        let keywords = ctx
            .keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|k| whole_word(&k).map(|re| (k, re)))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let delivering_word = if ctx.require_corp
            && rules.corp_match == CorpMatch::Strict
            && !ctx.delivering_tag.trim().is_empty()
        {
            Some(whole_word(&ctx.delivering_tag.trim().to_lowercase())?)
        } else {
            None
        };

        Ok(Self {
            keywords,
            name_prefix: format!("[{} ", ctx.mode.as_str().to_lowercase()),
            require_corp: ctx.require_corp,
            delivering_word,
            rules,
        })
    }

    /// Rows of `table` passing every predicate, in sheet order.
    pub fn select<'a>(&self, table: &'a SourceTable) -> Vec<&'a Row> {
        table.rows.iter().filter(|row| self.accepts(row)).collect()
    }

    pub fn accepts(&self, row: &Row) -> bool {
        self.keywords_ok(row)
            && self.name_prefix_ok(row.name())
            && self.lifecycle_ok(row)
            && self.commitments_ok(row)
            && self.corp_ok(row.name())
    }

    /// Both fields must hit at least one keyword and together cover all of them.
    pub fn keywords_ok(&self, row: &Row) -> bool {
        let parent = row.get(columns::PARENT_OFFERING).to_lowercase();
        let name = row.name().to_lowercase();

        let mut parent_hit = false;
        let mut name_hit = false;
        let mut covered = 0usize;
        for (_, re) in &self.keywords {
            let in_parent = re.is_match(&parent);
            let in_name = re.is_match(&name);
            parent_hit |= in_parent;
            name_hit |= in_name;
            if in_parent || in_name {
                covered += 1;
            }
        }
        parent_hit && name_hit && covered == self.keywords.len()
    }

    pub fn name_prefix_ok(&self, name: &str) -> bool {
        name.to_lowercase().starts_with(&self.name_prefix)
    }

    pub fn lifecycle_ok(&self, row: &Row) -> bool {
        columns::LIFECYCLE.iter().all(|column| {
            let value = row.get(column).trim().to_lowercase();
            !self.rules.discard_lifecycle.contains(&value)
        })
    }

    pub fn commitments_ok(&self, row: &Row) -> bool {
        let text = row.get(columns::COMMITMENTS).trim();
        match self.rules.commitment_gate {
            CommitmentGate::RejectPlaceholder => text != COMMITMENT_PLACEHOLDER,
            CommitmentGate::RequireText => !text.is_empty() && text != COMMITMENT_PLACEHOLDER,
        }
    }

    pub fn corp_ok(&self, name: &str) -> bool {
        let has_corp = CORP_WORD.is_match(name);
        if !self.require_corp {
            return !has_corp;
        }
        match &self.delivering_word {
            Some(re) => has_corp && re.is_match(&name.to_lowercase()),
            None => has_corp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperatingMode;
    use proptest::prelude::*;

    fn ctx(keywords: &[&str]) -> GenerationContext {
        GenerationContext {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            mode: OperatingMode::Sr,
            ..Default::default()
        }
    }

    fn row(parent: &str, name: &str) -> Row {
        [
            (columns::PARENT_OFFERING, parent),
            (columns::NAME, name),
            (columns::COMMITMENTS, "[PL] SLA SR RSP Mon-Fri 8-16 P1-P4 4h"),
        ]
        .into_iter()
        .collect()
    }

    fn filter(ctx: &GenerationContext) -> RowFilter {
        RowFilter::new(ctx, FilterRules::default()).unwrap()
    }

    #[test]
    fn keywords_must_cover_union_across_fields() {
        let f = filter(&ctx(&["lab", "sdms"]));
        assert!(f.keywords_ok(&row("[Parent HS PL Lab] x", "[SR HS PL] SDMS access")));
        assert!(!f.keywords_ok(&row("[Parent HS PL Lab] x", "[SR HS PL] lab access")));
        assert!(!f.keywords_ok(&row("[Parent HS PL] x", "[SR HS PL] lab SDMS")));
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let f = filter(&ctx(&["lab"]));
        assert!(!f.keywords_ok(&row("[Parent Labs] x", "[SR] laboratory")));
        assert!(f.keywords_ok(&row("[Parent LAB] x", "[SR] (lab)")));
    }

    #[test]
    fn no_keywords_never_match() {
        let f = filter(&ctx(&[]));
        assert!(!f.keywords_ok(&row("[Parent lab] x", "[SR] lab")));
    }

    #[test]
    fn name_prefix_is_case_insensitive() {
        let f = filter(&ctx(&["x"]));
        assert!(f.name_prefix_ok("[sr foo]"));
        assert!(f.name_prefix_ok("[SR HS PL] x"));
        assert!(!f.name_prefix_ok("[SRX] x"));
        assert!(!f.name_prefix_ok("[IM HS PL] x"));
    }

    #[test]
    fn lifecycle_exclusion_trims_and_ignores_case() {
        let f = filter(&ctx(&["x"]));
        let mut r = row("", "");
        assert!(f.lifecycle_ok(&r));
        r.set(columns::PHASE, "  Retired  ");
        assert!(!f.lifecycle_ok(&r));
        r.set(columns::PHASE, "Operational");
        r.set(columns::LIFE_CYCLE_STATUS, "END OF SUPPORT");
        assert!(!f.lifecycle_ok(&r));
    }

    #[test]
    fn commitment_gate_variants() {
        let lenient = filter(&ctx(&["x"]));
        let strict = RowFilter::new(
            &ctx(&["x"]),
            FilterRules {
                commitment_gate: CommitmentGate::RequireText,
                ..FilterRules::default()
            },
        )
        .unwrap();

        let mut r = row("", "");
        r.set(columns::COMMITMENTS, " - ");
        assert!(!lenient.commitments_ok(&r));
        assert!(!strict.commitments_ok(&r));

        r.set(columns::COMMITMENTS, "  ");
        assert!(lenient.commitments_ok(&r));
        assert!(!strict.commitments_ok(&r));
    }

    #[test]
    fn corp_gate_inverts_with_requirement() {
        let plain = filter(&ctx(&["x"]));
        assert!(plain.corp_ok("[SR HS PL IT] x"));
        assert!(!plain.corp_ok("[SR HS PL corp IT] x"));
        assert!(plain.corp_ok("[SR HS PL CORPORATE] x"));

        let mut corp_ctx = ctx(&["x"]);
        corp_ctx.require_corp = true;
        corp_ctx.delivering_tag = "HS PL".into();
        let corp = filter(&corp_ctx);
        assert!(corp.corp_ok("[SR DS DE CORP IT] x"));
        assert!(!corp.corp_ok("[SR HS PL IT] x"));
    }

    #[test]
    fn strict_corp_requires_delivering_tag() {
        let mut corp_ctx = ctx(&["x"]);
        corp_ctx.require_corp = true;
        corp_ctx.delivering_tag = "HS PL".into();
        let strict = RowFilter::new(
            &corp_ctx,
            FilterRules {
                corp_match: CorpMatch::Strict,
                ..FilterRules::default()
            },
        )
        .unwrap();
        assert!(strict.corp_ok("[SR hs pl CORP DS DE IT] x"));
        assert!(!strict.corp_ok("[SR DS DE CORP IT] x"));
    }

    #[test]
    fn select_keeps_sheet_order() {
        let f = filter(&ctx(&["lab"]));
        let table = SourceTable {
            path: "ALL_Service_Offering_PL.xlsx".into(),
            country: "PL".into(),
            columns: Vec::new(),
            rows: vec![
                row("[Parent Lab] a", "[SR Lab] first"),
                row("[Parent Lab] b", "[IM Lab] skipped"),
                row("[Parent Lab] c", "[SR Lab] second"),
            ],
        };
        let names: Vec<_> = f.select(&table).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["[SR Lab] first", "[SR Lab] second"]);
    }

    proptest! {
        #[test]
        fn keyword_predicate_matches_set_semantics(
            parent_words in prop::collection::btree_set("[a-e]", 0..4),
            name_words in prop::collection::btree_set("[a-e]", 0..4),
            keywords in prop::collection::btree_set("[a-e]", 1..4),
        ) {
            let parent_text = parent_words.iter().cloned().collect::<Vec<_>>().join(" ");
            let name_text = name_words.iter().cloned().collect::<Vec<_>>().join(" ");
            let kws: Vec<&str> = keywords.iter().map(String::as_str).collect();
            let f = filter(&ctx(&kws));

            let hit_p: BTreeSet<_> = keywords.intersection(&parent_words).cloned().collect();
            let hit_n: BTreeSet<_> = keywords.intersection(&name_words).cloned().collect();
            let union: BTreeSet<_> = hit_p.union(&hit_n).cloned().collect();
            let expected = !hit_p.is_empty() && !hit_n.is_empty() && union == keywords;

            prop_assert_eq!(f.keywords_ok(&row(&parent_text, &name_text)), expected);
        }
    }
}
