pub mod assembler;
pub mod config;
pub mod error;
pub mod fields;
pub mod filter;
pub mod logging;
pub mod model;
pub mod naming;
pub mod receivers;
pub mod schedule;
pub mod utils;
pub mod workbook;

pub use assembler::{CatalogAssembler, RuleSet, TableReport, assemble};
pub use config::{CliArgs, GeneratorConfig};
pub use error::{ErrorKind, GeneratorError, GeneratorResult};
pub use logging::{LoggingConfig, init_logging};
pub use model::{CountrySheets, GeneratedRow, GenerationContext, OperatingMode, Row, SourceTable};
pub use naming::NamingConvention;

use std::path::PathBuf;
use workbook::TableLoad;

/// Reads every source workbook under the configured input directory, generates
/// offering rows and writes them into a fresh workbook in the output directory.
///
/// Nothing is written when no row is generated.
pub fn run_generator(config: &GeneratorConfig) -> GeneratorResult<PathBuf> {
    let span = logging::generation_span(&config.input_dir, &config.rules.naming.to_string());
    let _enter = span.enter();

    let sources = workbook::discover_sources(&config.input_dir, &config.source_pattern)?;
    let mut assembler = CatalogAssembler::new(&config.context, &config.rules)?;
    let mut skipped = 0;

    for path in &sources {
        let _source = logging::source_span(path).entered();
        match workbook::load_source_table(path)? {
            TableLoad::Loaded(table) => {
                assembler.add_table(&table);
            }
            TableLoad::Skipped { .. } => skipped += 1,
        }
    }

    let sheets = assembler.finish(sources.len(), skipped)?;
    workbook::write_offerings(&sheets, &config.output_dir)
}
