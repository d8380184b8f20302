use crate::assembler::RuleSet;
use crate::error::{GeneratorError, GeneratorResult};
use crate::fields::CommitmentRules;
use crate::filter::{CommitmentGate, CorpMatch, FilterRules};
use crate::model::{GenerationContext, OperatingMode};
use crate::naming::NamingConvention;
use crate::receivers::ReceiverRules;
use crate::utils::split_list;
use crate::workbook::DEFAULT_SOURCE_PATTERN;
use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::BoolishValueParser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_OUTPUT_DIR: &str = ".";

/// Everything one generation run needs.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub source_pattern: String,
    pub context: GenerationContext,
    pub rules: RuleSet,
}

impl GeneratorConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            input_dir: cli_input_dir,
            output_dir: cli_output_dir,
            source_pattern: cli_source_pattern,
            keywords: cli_keywords,
            apps: cli_apps,
            days: cli_days,
            hours: cli_hours,
            delivery_manager: cli_delivery_manager,
            global_prod: cli_global_prod,
            rsp: cli_rsp,
            rsl: cli_rsl,
            sr_or_im: cli_sr_or_im,
            require_corp: cli_require_corp,
            delivering_tag: cli_delivering_tag,
            support_group: cli_support_group,
            aliases_on: cli_aliases_on,
            aliases: cli_aliases,
            aliases_placeholder: cli_aliases_placeholder,
            naming_convention: cli_naming_convention,
            service_type: cli_service_type,
            strict_corp_match: cli_strict_corp_match,
            cyprus_dual_receivers: cli_cyprus_dual_receivers,
            ola_countries: cli_ola_countries,
            ola_on_rewrite: cli_ola_on_rewrite,
            require_commitment_text: cli_require_commitment_text,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            input_dir: file_input_dir,
            output_dir: file_output_dir,
            source_pattern: file_source_pattern,
            keywords: file_keywords,
            apps: file_apps,
            days: file_days,
            hours: file_hours,
            delivery_manager: file_delivery_manager,
            global_prod: file_global_prod,
            rsp: file_rsp,
            rsl: file_rsl,
            sr_or_im: file_sr_or_im,
            require_corp: file_require_corp,
            delivering_tag: file_delivering_tag,
            support_group: file_support_group,
            aliases_on: file_aliases_on,
            aliases: file_aliases,
            aliases_placeholder: file_aliases_placeholder,
            naming_convention: file_naming_convention,
            service_type: file_service_type,
            strict_corp_match: file_strict_corp_match,
            cyprus_dual_receivers: file_cyprus_dual_receivers,
            ola_countries: file_ola_countries,
            ola_on_rewrite: file_ola_on_rewrite,
            require_commitment_text: file_require_commitment_text,
        } = file_config;

        let input_dir = cli_input_dir
            .or(file_input_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let output_dir = cli_output_dir
            .or(file_output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let source_pattern = cli_source_pattern
            .or(file_source_pattern)
            .unwrap_or_else(|| DEFAULT_SOURCE_PATTERN.to_string());

        let require_corp = cli_require_corp.or(file_require_corp).unwrap_or(false);
        let delivering_tag = if require_corp {
            cli_delivering_tag
                .or(file_delivering_tag)
                .unwrap_or_default()
                .trim()
                .to_uppercase()
        } else {
            String::new()
        };

        let (support_group, managed_by_group) =
            split_groups(&cli_support_group.or(file_support_group).unwrap_or_default());

        let context = GenerationContext {
            keywords: normalize_list(cli_keywords.or(file_keywords))
                .into_iter()
                .map(|k| k.to_lowercase())
                .collect(),
            new_apps: normalize_list(cli_apps.or(file_apps)),
            days: normalize_list(cli_days.or(file_days)),
            hours: normalize_list(cli_hours.or(file_hours)),
            delivery_manager: cli_delivery_manager
                .or(file_delivery_manager)
                .unwrap_or_default(),
            global_prod: cli_global_prod.or(file_global_prod).unwrap_or(false),
            rsp_duration: cli_rsp.or(file_rsp).unwrap_or_default(),
            rsl_duration: cli_rsl.or(file_rsl).unwrap_or_default(),
            mode: cli_sr_or_im.or(file_sr_or_im).unwrap_or_default(),
            require_corp,
            delivering_tag,
            support_group,
            managed_by_group,
            aliases_on: cli_aliases_on.or(file_aliases_on).unwrap_or(false),
            aliases: normalize_list(cli_aliases.or(file_aliases)),
            service_type: cli_service_type
                .or(file_service_type)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };

        let strict = cli_strict_corp_match.or(file_strict_corp_match).unwrap_or(false);
        let require_text =
            cli_require_commitment_text.or(file_require_commitment_text).unwrap_or(false);
        let filter = FilterRules {
            corp_match: if strict {
                CorpMatch::Strict
            } else {
                CorpMatch::Lenient
            },
            commitment_gate: if require_text {
                CommitmentGate::RequireText
            } else {
                CommitmentGate::RejectPlaceholder
            },
            ..FilterRules::default()
        };

        let receivers =
            if cli_cyprus_dual_receivers.or(file_cyprus_dual_receivers).unwrap_or(false) {
                ReceiverRules::default().with_cyprus()
            } else {
                ReceiverRules::default()
            };

        let commitments = CommitmentRules {
            ola_countries: normalize_list(cli_ola_countries.or(file_ola_countries))
                .into_iter()
                .map(|c| c.to_uppercase())
                .collect(),
            ola_on_rewrite: cli_ola_on_rewrite.or(file_ola_on_rewrite).unwrap_or(false),
        };

        let rules = RuleSet {
            filter,
            receivers,
            commitments,
            naming: cli_naming_convention
                .or(file_naming_convention)
                .unwrap_or_default(),
            aliases_placeholder: cli_aliases_placeholder
                .or(file_aliases_placeholder)
                .unwrap_or_default(),
        };

        Ok(Self {
            input_dir,
            output_dir,
            source_pattern,
            context,
            rules,
        })
    }

    /// Rejects configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> GeneratorResult<()> {
        if !self.input_dir.is_dir() {
            return Err(GeneratorError::invalid_config(format!(
                "input directory {:?} does not exist or is not a directory",
                self.input_dir
            )));
        }
        if self.context.new_apps.is_empty() {
            return Err(GeneratorError::invalid_config(
                "at least one application name is required",
            ));
        }
        if self.context.require_corp && self.context.delivering_tag.is_empty() {
            return Err(GeneratorError::invalid_config(
                "CORP mode needs the delivering tag (e.g. \"HS PL\")",
            ));
        }
        if self.source_pattern.trim().is_empty() {
            return Err(GeneratorError::invalid_config(
                "source pattern cannot be empty",
            ));
        }
        Ok(())
    }
}

/// `"SG/MBG"` → (`SG`, `MBG`); without a `/` both groups take the whole value.
pub fn split_groups(raw: &str) -> (String, String) {
    match raw.split_once('/') {
        Some((support, managed)) => (support.trim().to_string(), managed.trim().to_string()),
        None => (raw.trim().to_string(), raw.trim().to_string()),
    }
}

/// File lists may hold comma-joined entries; flatten and trim them.
fn normalize_list(list: Option<Vec<String>>) -> Vec<String> {
    list.unwrap_or_default()
        .iter()
        .flat_map(|item| split_list(item))
        .collect()
}

fn parse_mode(raw: &str) -> Result<OperatingMode, strum::ParseError> {
    OperatingMode::from_str(raw.trim())
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "offering-generator",
    about = "Generate Service Offering rows from country templates",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "OFFERING_GEN_INPUT_DIR",
        value_name = "DIR",
        help = "Directory containing ALL_Service_Offering_<CC>.xlsx templates"
    )]
    pub input_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "OFFERING_GEN_OUTPUT_DIR",
        value_name = "DIR",
        help = "Directory receiving the generated workbook"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "OFFERING_GEN_SOURCE_PATTERN",
        value_name = "GLOB",
        help = "File name pattern of template workbooks"
    )]
    pub source_pattern: Option<String>,

    #[arg(
        long,
        env = "OFFERING_GEN_KEYWORDS",
        value_name = "WORD",
        value_delimiter = ',',
        help = "Keywords that must all match as whole words"
    )]
    pub keywords: Option<Vec<String>>,

    #[arg(
        long,
        env = "OFFERING_GEN_APPS",
        value_name = "APP",
        value_delimiter = ',',
        help = "Application names to generate offerings for"
    )]
    pub apps: Option<Vec<String>>,

    #[arg(
        long,
        env = "OFFERING_GEN_DAYS",
        value_name = "DAYS",
        value_delimiter = ',',
        help = "Day blocks, e.g. Mon-Fri"
    )]
    pub days: Option<Vec<String>>,

    #[arg(
        long,
        env = "OFFERING_GEN_HOURS",
        value_name = "HOURS",
        value_delimiter = ',',
        help = "Hour blocks, e.g. 9-17, paired with days in order"
    )]
    pub hours: Option<Vec<String>>,

    #[arg(long, env = "OFFERING_GEN_DELIVERY_MANAGER", value_name = "NAME")]
    pub delivery_manager: Option<String>,

    #[arg(
        long,
        env = "OFFERING_GEN_GLOBAL_PROD",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        help = "Tag dependencies as [Global Prod]"
    )]
    pub global_prod: Option<bool>,

    #[arg(long, env = "OFFERING_GEN_RSP", value_name = "DURATION", help = "Response time, e.g. 2h")]
    pub rsp: Option<String>,

    #[arg(long, env = "OFFERING_GEN_RSL", value_name = "DURATION", help = "Resolution time, e.g. 5d")]
    pub rsl: Option<String>,

    #[arg(
        long,
        env = "OFFERING_GEN_SR_OR_IM",
        value_name = "MODE",
        value_parser = parse_mode,
        help = "SR or IM"
    )]
    pub sr_or_im: Option<OperatingMode>,

    #[arg(
        long,
        env = "OFFERING_GEN_REQUIRE_CORP",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        help = "Use CORP template rows and generate per receiver"
    )]
    pub require_corp: Option<bool>,

    #[arg(
        long,
        env = "OFFERING_GEN_DELIVERING_TAG",
        value_name = "TAG",
        help = "Who delivers the service when CORP is required, e.g. HS PL"
    )]
    pub delivering_tag: Option<String>,

    #[arg(
        long,
        env = "OFFERING_GEN_SUPPORT_GROUP",
        value_name = "SG/MBG",
        help = "Support group and managed-by group separated by '/'"
    )]
    pub support_group: Option<String>,

    #[arg(
        long,
        env = "OFFERING_GEN_ALIASES_ON",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        help = "Fill Aliases columns"
    )]
    pub aliases_on: Option<bool>,

    #[arg(
        long,
        env = "OFFERING_GEN_ALIASES",
        value_name = "ALIAS",
        value_delimiter = ',',
        help = "Alias values written when aliases are on"
    )]
    pub aliases: Option<Vec<String>>,

    #[arg(
        long,
        env = "OFFERING_GEN_ALIASES_PLACEHOLDER",
        value_name = "TEXT",
        help = "Aliases value when aliases are off (default: empty)"
    )]
    pub aliases_placeholder: Option<String>,

    #[arg(
        long,
        env = "OFFERING_GEN_NAMING_CONVENTION",
        value_enum,
        value_name = "CONVENTION"
    )]
    pub naming_convention: Option<NamingConvention>,

    #[arg(
        long,
        env = "OFFERING_GEN_SERVICE_TYPE",
        value_name = "TEXT",
        help = "Service-type suffix for the child_lvl1_other convention"
    )]
    pub service_type: Option<String>,

    #[arg(
        long,
        env = "OFFERING_GEN_STRICT_CORP_MATCH",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        help = "CORP rows must also name the delivering tag"
    )]
    pub strict_corp_match: Option<bool>,

    #[arg(
        long,
        env = "OFFERING_GEN_CYPRUS_DUAL_RECEIVERS",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        help = "Generate both HS CY and DS CY for Cyprus CORP runs"
    )]
    pub cyprus_dual_receivers: Option<bool>,

    #[arg(
        long,
        env = "OFFERING_GEN_OLA_COUNTRIES",
        value_name = "CC",
        value_delimiter = ',',
        help = "Countries whose SR commitments carry an OLA line"
    )]
    pub ola_countries: Option<Vec<String>>,

    #[arg(
        long,
        env = "OFFERING_GEN_OLA_ON_REWRITE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        help = "Append the OLA line to rewritten commitments too"
    )]
    pub ola_on_rewrite: Option<bool>,

    #[arg(
        long,
        env = "OFFERING_GEN_REQUIRE_COMMITMENT_TEXT",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        value_name = "BOOL",
        help = "Reject template rows with blank commitments"
    )]
    pub require_commitment_text: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    source_pattern: Option<String>,
    keywords: Option<Vec<String>>,
    apps: Option<Vec<String>>,
    days: Option<Vec<String>>,
    hours: Option<Vec<String>>,
    delivery_manager: Option<String>,
    global_prod: Option<bool>,
    rsp: Option<String>,
    rsl: Option<String>,
    sr_or_im: Option<OperatingMode>,
    require_corp: Option<bool>,
    delivering_tag: Option<String>,
    support_group: Option<String>,
    aliases_on: Option<bool>,
    aliases: Option<Vec<String>>,
    aliases_placeholder: Option<String>,
    naming_convention: Option<NamingConvention>,
    service_type: Option<String>,
    strict_corp_match: Option<bool>,
    cyprus_dual_receivers: Option<bool>,
    ola_countries: Option<Vec<String>>,
    ola_on_rewrite: Option<bool>,
    require_commitment_text: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
