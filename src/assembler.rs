use crate::error::{GeneratorError, GeneratorResult};
use crate::fields::{CommitmentRules, FieldDeriver, RowTarget};
use crate::filter::{FilterRules, RowFilter};
use crate::model::{CountrySheets, GenerationContext, ParentOfferingInfo, SourceTable, columns};
use crate::naming::{NameRequest, NamingConvention};
use crate::receivers::{ReceiverResolver, ReceiverRules};
use std::collections::HashSet;

/// Rule configuration for one run, next to the operator's [`GenerationContext`].
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub filter: FilterRules,
    pub receivers: ReceiverRules,
    pub commitments: CommitmentRules,
    pub naming: NamingConvention,
    /// Written to Aliases columns when aliases are off.
    pub aliases_placeholder: String,
}

/// Outcome of feeding one source table to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub country: String,
    pub matched: usize,
    pub generated: usize,
    pub duplicates: usize,
}

/// Turns matching template rows into per-country generated rows.
pub struct CatalogAssembler<'a> {
    ctx: &'a GenerationContext,
    rules: &'a RuleSet,
    filter: RowFilter,
    resolver: ReceiverResolver,
    schedule: String,
    seen: HashSet<String>,
    sheets: CountrySheets,
}

impl<'a> CatalogAssembler<'a> {
    pub fn new(ctx: &'a GenerationContext, rules: &'a RuleSet) -> GeneratorResult<Self> {
        Ok(Self {
            ctx,
            rules,
            filter: RowFilter::new(ctx, rules.filter.clone())?,
            resolver: ReceiverResolver::new(rules.receivers.clone()),
            schedule: ctx.schedule(),
            seen: HashSet::new(),
            sheets: CountrySheets::default(),
        })
    }

    pub fn add_table(&mut self, table: &SourceTable) -> TableReport {
        let mut report = TableReport {
            country: table.country.clone(),
            matched: 0,
            generated: 0,
            duplicates: 0,
        };

        let pool = self.filter.select(table);
        report.matched = pool.len();
        let Some(base) = pool.first().copied() else {
            tracing::debug!(
                path = %table.path.display(),
                country = %table.country,
                rows = table.rows.len(),
                "no template row matched"
            );
            return report;
        };

        let pool_names: Vec<&str> = pool.iter().map(|row| row.name()).collect();
        let receivers = self
            .resolver
            .resolve(&table.country, self.ctx.require_corp, &pool_names);
        let parent = ParentOfferingInfo::parse(base.get(columns::PARENT_OFFERING));
        let deriver = FieldDeriver::new(
            self.ctx,
            &self.rules.commitments,
            &self.rules.aliases_placeholder,
        );

        for app in &self.ctx.new_apps {
            for receiver in &receivers {
                let request = NameRequest {
                    parent: &parent,
                    table_country: &table.country,
                    mode: self.ctx.mode,
                    app,
                    schedule: &self.schedule,
                    require_corp: self.ctx.require_corp,
                    receiver,
                    delivering_tag: &self.ctx.delivering_tag,
                    service_type: self.ctx.service_type.as_deref(),
                };
                let name = self.rules.naming.synthesize(&request);
                if !self.seen.insert(name.clone()) {
                    tracing::debug!(%name, "dropping duplicate generated name");
                    report.duplicates += 1;
                    continue;
                }

                let target = RowTarget {
                    country: &table.country,
                    receiver,
                    app,
                };
                self.sheets.push(deriver.derive(base, name, target));
                report.generated += 1;
            }
        }

        tracing::info!(
            path = %table.path.display(),
            country = %report.country,
            matched = report.matched,
            generated = report.generated,
            duplicates = report.duplicates,
            "template table processed"
        );
        report
    }

    /// Generated rows so far; fails with `NoMatch` when there are none.
    pub fn finish(self, tables_scanned: usize, tables_skipped: usize) -> GeneratorResult<CountrySheets> {
        if self.sheets.is_empty() {
            return Err(GeneratorError::NoMatch {
                tables_scanned,
                tables_skipped,
            });
        }
        Ok(self.sheets)
    }
}

/// Runs every table through one assembler.
pub fn assemble<'t, I>(
    ctx: &GenerationContext,
    rules: &RuleSet,
    tables: I,
) -> GeneratorResult<CountrySheets>
where
    I: IntoIterator<Item = &'t SourceTable>,
{
    let mut assembler = CatalogAssembler::new(ctx, rules)?;
    let mut scanned = 0;
    let mut skipped = 0;
    for table in tables {
        scanned += 1;
        let missing = table.missing_columns(columns::REQUIRED);
        if !missing.is_empty() {
            tracing::warn!(
                path = %table.path.display(),
                missing = ?missing,
                "skipping table without required columns"
            );
            skipped += 1;
            continue;
        }
        assembler.add_table(table);
    }
    assembler.finish(scanned, skipped)
}
