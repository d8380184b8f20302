use std::collections::{BTreeMap, BTreeSet};

/// Division+country tag implied by a receiver: `DS <cc>` for DS receivers,
/// `HS <cc>` otherwise (including the empty receiver).
pub fn receiver_tag(receiver: &str, country: &str) -> String {
    if receiver.starts_with("DS") {
        format!("DS {country}")
    } else {
        format!("HS {country}")
    }
}

/// Country-specific receiver rules applied when CORP is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverRules {
    /// Countries producing several receivers, in generation order.
    pub dual: BTreeMap<String, Vec<String>>,
    /// Countries served by their DS division only.
    pub ds_only: BTreeSet<String>,
    /// Countries whose division is read from the matched pool's names.
    pub probe_pool: BTreeSet<String>,
}

impl Default for ReceiverRules {
    fn default() -> Self {
        Self {
            dual: BTreeMap::from([(
                "DE".to_string(),
                vec!["DS DE".to_string(), "HS DE".to_string()],
            )]),
            ds_only: ["UA", "MD"].into_iter().map(String::from).collect(),
            probe_pool: ["PL"].into_iter().map(String::from).collect(),
        }
    }
}

impl ReceiverRules {
    /// Adds the Cyprus rule: both `HS CY` and `DS CY`.
    pub fn with_cyprus(mut self) -> Self {
        self.dual.insert(
            "CY".to_string(),
            vec!["HS CY".to_string(), "DS CY".to_string()],
        );
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReceiverResolver {
    rules: ReceiverRules,
}

impl ReceiverResolver {
    pub fn new(rules: ReceiverRules) -> Self {
        Self { rules }
    }

    /// Ordered receivers for one source table. `pool_names` are the names of
    /// every row that passed the filter in that table.
    pub fn resolve<S: AsRef<str>>(
        &self,
        country: &str,
        require_corp: bool,
        pool_names: &[S],
    ) -> Vec<String> {
        if !require_corp {
            return vec![String::new()];
        }
        if let Some(receivers) = self.rules.dual.get(country) {
            return receivers.clone();
        }
        if self.rules.ds_only.contains(country) {
            return vec![format!("DS {country}")];
        }
        if self.rules.probe_pool.contains(country) {
            let ds_tag = format!("DS {country}");
            let joined = pool_names
                .iter()
                .map(|name| name.as_ref())
                .collect::<Vec<&str>>()
                .join(" ");
            return if joined.contains(&ds_tag) {
                vec![ds_tag]
            } else {
                vec![format!("HS {country}")]
            };
        }
        vec![format!("DS {country}")]
    }
}
