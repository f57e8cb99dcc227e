//! Cross-source consolidation into a single relational table

use crate::config::ConsolidateConfig;
use crate::error::{EtlError, EtlResult};
use crate::extract::{Source, source_from_config};
use crate::load::replace_table;
use crate::table::Dataset;
use crate::transform::combine;

#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidateReport {
    /// (source description, rows read) in extraction order
    pub sources: Vec<(String, usize)>,
    pub combined_rows: usize,
    pub columns: Vec<String>,
    pub table: String,
}

/// Extract every configured source, combine them and replace the target table
pub async fn run(config: &ConsolidateConfig) -> EtlResult<ConsolidateReport> {
    if config.sources.is_empty() {
        return Err(EtlError::malformed("consolidate config", "no sources configured"));
    }

    let sources: Vec<Box<dyn Source>> = config.sources.iter().map(source_from_config).collect();
    consolidate(&sources, &config.target.url, &config.target.table).await
}

/// Run the pipeline over already-built sources
pub async fn consolidate(
    sources: &[Box<dyn Source>],
    target_url: &str,
    table: &str,
) -> EtlResult<ConsolidateReport> {
    let mut extracted: Vec<Dataset> = Vec::with_capacity(sources.len());
    let mut counts = Vec::with_capacity(sources.len());

    for source in sources {
        let description = source.describe();
        log::debug!("Extracting {}", description);
        let dataset = source.extract().await?;
        log::info!(
            "Extracted {} rows, {} columns from {}",
            dataset.len(),
            dataset.columns().len(),
            description
        );
        counts.push((description, dataset.len()));
        extracted.push(dataset);
    }

    let combined = combine(&extracted);
    log::info!(
        "Combined {} sources into {} rows, {} columns",
        extracted.len(),
        combined.len(),
        combined.columns().len()
    );

    replace_table(target_url, table, &combined).await?;

    Ok(ConsolidateReport {
        sources: counts,
        combined_rows: combined.len(),
        columns: combined.columns().to_vec(),
        table: table.to_string(),
    })
}
