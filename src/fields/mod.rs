//! Derived columns of generated rows.

pub mod commitments;

pub use commitments::{CommitmentRules, CommitmentTerms};

use crate::model::{GeneratedRow, GenerationContext, Row, columns};
use crate::receivers::receiver_tag;

const DE_HS_COMPANIES: &str = "DE Internal Patients\nDE External Patients";
const DE_DS_COMPANIES: &str = "DE IFLB Laboratories\nDE IMD Laboratories";
const UA_COMPANY: &str = "Сiнево Україна";

/// Target of one generated row within its source table.
#[derive(Debug, Clone, Copy)]
pub struct RowTarget<'a> {
    pub country: &'a str,
    pub receiver: &'a str,
    pub app: &'a str,
}

/// Rewrites a template row's derived columns for one app × receiver pair.
#[derive(Debug, Clone)]
pub struct FieldDeriver<'a> {
    ctx: &'a GenerationContext,
    commitment_rules: &'a CommitmentRules,
    aliases_placeholder: &'a str,
    schedule: String,
}

impl<'a> FieldDeriver<'a> {
    pub fn new(
        ctx: &'a GenerationContext,
        commitment_rules: &'a CommitmentRules,
        aliases_placeholder: &'a str,
    ) -> Self {
        Self {
            ctx,
            commitment_rules,
            aliases_placeholder,
            schedule: ctx.schedule(),
        }
    }

    pub fn derive(&self, base: &Row, name: String, target: RowTarget<'_>) -> GeneratedRow {
        let mut row = base.clone();
        let tag = receiver_tag(target.receiver, target.country);

        row.set(columns::NAME, name);
        row.set(columns::DELIVERY_MANAGER, &self.ctx.delivery_manager);
        row.set(columns::SUPPORT_GROUP, &self.ctx.support_group);
        row.set(columns::MANAGED_BY_GROUP, &self.ctx.managed_by_group);
        row.fill_matching(columns::ALIASES_MARKER, &self.aliases_value());
        row.set(
            columns::SUBSCRIBED_BY_COMPANY,
            subscribed_company(target.country, &tag),
        );

        let terms = CommitmentTerms {
            country: target.country,
            schedule: &self.schedule,
            rsp: &self.ctx.rsp_duration,
            rsl: &self.ctx.rsl_duration,
            mode: self.ctx.mode,
        };
        let commitments = commitments::derive(
            base.get(columns::COMMITMENTS),
            &terms,
            self.commitment_rules,
        );
        row.set(columns::COMMITMENTS, commitments);
        row.set(columns::DEPENDS_ON, self.dependency(target.app, &tag));

        GeneratedRow {
            country: target.country.to_string(),
            receiver: target.receiver.to_string(),
            app: target.app.to_string(),
            row,
        }
    }

    /// Aliases on writes the configured alias list, which is empty (so `""`) unless aliases were given.
    fn aliases_value(&self) -> String {
        if self.ctx.aliases_on {
            self.ctx.aliases.join(", ")
        } else {
            self.aliases_placeholder.to_string()
        }
    }

    /// `[<tag>] <app>` descriptor of the application service the offering depends on.
    pub fn dependency(&self, app: &str, receiver_tag: &str) -> String {
        let tag = if self.ctx.require_corp {
            format!("{} Prod", self.ctx.delivering_tag)
        } else if self.ctx.global_prod || app.to_lowercase().contains("servicenow") {
            "Global Prod".to_string()
        } else {
            format!("{receiver_tag} Prod")
        };
        format!("[{tag}] {app}")
    }
}

pub fn subscribed_company(country: &str, receiver_tag: &str) -> String {
    match country {
        "DE" if receiver_tag.starts_with("HS") => DE_HS_COMPANIES.to_string(),
        "DE" => DE_DS_COMPANIES.to_string(),
        "UA" => UA_COMPANY.to_string(),
        _ => receiver_tag.to_string(),
    }
}
