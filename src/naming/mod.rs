//! Offering name synthesis.
//!
//! Each [`NamingConvention`] is an independent pure function over the same
//! [`NameRequest`]; the convention is chosen by configuration.

mod parent;
mod parts;

pub use parts::NameParts;

use crate::model::{OperatingMode, ParentOfferingInfo};
use crate::receivers::receiver_tag;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

const DEFAULT_TOPIC: &str = "IT";
const DEFAULT_DIVISION: &str = "HS";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[value(rename_all = "snake_case")]
pub enum NamingConvention {
    /// Child level-1 software/permissions offering: app, `Prod`, schedule
    #[default]
    ChildLvl1Software,
    /// Child level-1 hardware offering: catalog and schedule only
    ChildLvl1Hardware,
    /// Like hardware, with an optional service-type suffix
    ChildLvl1Other,
    /// Child level-1 offering named after its parent: app and `Prod`, no schedule
    ChildLvl1Parent,
    /// Parent-level software asset offering: app and schedule without `Prod`
    ParentSam,
    /// Parent-level offering: catalog only
    ParentNonSoftware,
    /// Receiver-driven head followed by the parent's own bracket tokens
    Legacy,
}

/// Inputs shared by every naming convention.
#[derive(Debug, Clone, Copy)]
pub struct NameRequest<'a> {
    pub parent: &'a ParentOfferingInfo,
    /// Country of the source table, used when the parent names none.
    pub table_country: &'a str,
    pub mode: OperatingMode,
    pub app: &'a str,
    pub schedule: &'a str,
    pub require_corp: bool,
    pub receiver: &'a str,
    pub delivering_tag: &'a str,
    pub service_type: Option<&'a str>,
}

impl NameRequest<'_> {
    fn country(&self) -> &str {
        if self.parent.country.is_empty() {
            self.table_country
        } else {
            &self.parent.country
        }
    }

    fn topic_or_default(&self) -> &str {
        if self.parent.topic.is_empty() {
            DEFAULT_TOPIC
        } else {
            &self.parent.topic
        }
    }

    fn delivering_division(&self) -> &str {
        self.delivering_tag
            .split_whitespace()
            .find(|t| parent::is_division(t))
            .unwrap_or(DEFAULT_DIVISION)
    }

    fn delivering_country(&self) -> &str {
        self.delivering_tag
            .split_whitespace()
            .find(|t| parent::is_country(t))
            .unwrap_or_else(|| self.country())
    }
}

impl NamingConvention {
    pub fn synthesize(&self, req: &NameRequest<'_>) -> String {
        let parts = match self {
            NamingConvention::ChildLvl1Software => child_lvl1_software(req),
            NamingConvention::ChildLvl1Hardware => child_lvl1_hardware(req),
            NamingConvention::ChildLvl1Other => child_lvl1_other(req),
            NamingConvention::ChildLvl1Parent => child_lvl1_parent(req),
            NamingConvention::ParentSam => parent_sam(req),
            NamingConvention::ParentNonSoftware => parent_non_software(req),
            NamingConvention::Legacy => legacy(req),
        };
        parts.build()
    }
}

fn child_head(req: &NameRequest<'_>) -> NameParts {
    NameParts::new()
        .head(req.mode.as_str())
        .head(&req.parent.division)
        .head(req.country())
        .head(req.topic_or_default())
}

fn parent_head(req: &NameRequest<'_>) -> NameParts {
    NameParts::new()
        .head("Parent")
        .head(&req.parent.division)
        .head(req.country())
        .head(req.topic_or_default())
}

fn child_lvl1_software(req: &NameRequest<'_>) -> NameParts {
    let head = if req.require_corp {
        NameParts::new()
            .head(req.mode.as_str())
            .head(req.delivering_division())
            .head(req.delivering_country())
            .head("CORP")
            .head(req.receiver)
            .head(req.topic_or_default())
    } else {
        child_head(req)
    };
    head.body(&req.parent.catalog)
        .body_if(req.mode.is_incident(), "solving")
        .body(req.app)
        .body("Prod")
        .body(req.schedule)
}

fn child_lvl1_hardware(req: &NameRequest<'_>) -> NameParts {
    child_head(req)
        .body(&req.parent.catalog)
        .body_if(req.mode.is_incident(), "solving")
        .body(req.schedule)
}

fn child_lvl1_other(req: &NameRequest<'_>) -> NameParts {
    child_head(req)
        .body(&req.parent.catalog)
        .body(req.service_type.unwrap_or(""))
        .body_if(req.mode.is_incident(), "solving")
        .body(req.schedule)
}

fn child_lvl1_parent(req: &NameRequest<'_>) -> NameParts {
    child_head(req)
        .body(&req.parent.catalog)
        .body_if(req.mode.is_incident(), "solving")
        .body(req.app)
        .body("Prod")
}

fn parent_sam(req: &NameRequest<'_>) -> NameParts {
    parent_head(req)
        .body(&req.parent.catalog)
        .body(req.app)
        .body(req.schedule)
}

fn parent_non_software(req: &NameRequest<'_>) -> NameParts {
    parent_head(req).body(&req.parent.catalog)
}

fn legacy(req: &NameRequest<'_>) -> NameParts {
    let head = if req.require_corp {
        NameParts::new()
            .head(req.mode.as_str())
            .head(req.delivering_tag)
            .head("CORP")
            .head(req.receiver)
    } else {
        NameParts::new()
            .head(req.mode.as_str())
            .head(receiver_tag(req.receiver, req.table_country))
    };
    let receiver_tokens: Vec<&str> = req.receiver.split_whitespace().collect();
    let head = req
        .parent
        .tokens
        .iter()
        .filter(|token| !receiver_tokens.contains(&token.as_str()))
        .fold(head, |parts, token| parts.head(token));

    head.body(&req.parent.catalog)
        .body(req.app)
        .body("Prod")
        .body(req.schedule)
}
