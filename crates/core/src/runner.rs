//! Drives the whole run: load, enrich each record in order, stream out.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::info;

use crate::config::DatasetConfig;
use crate::dataset::{load_products, DatasetError, RecordWriter};
use crate::enricher::{EnrichError, Enricher};
use crate::product::Product;
use crate::product_opener::ProductDatabase;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Failed to enrich product #{index} '{product_name}': {source}")]
    Enrich {
        index: usize,
        product_name: String,
        #[source]
        source: EnrichError,
    },
}

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records_written: usize,
    pub ingredients_updated: usize,
}

/// Receives progress as records are processed.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, total: usize);
    /// Called once per record, before it is enriched.
    fn advance(&self, index: usize, product: &Product);
    fn finish(&self, summary: &RunSummary);
}

/// Progress as `tracing` events, one line per record.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: AtomicUsize,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for LogProgress {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        info!("Enriching {} products", total);
    }

    fn advance(&self, index: usize, product: &Product) {
        let total = self.total.load(Ordering::Relaxed);
        info!("[{}/{}] {}", index + 1, total, product.product_name);
    }

    fn finish(&self, summary: &RunSummary) {
        info!(
            "Wrote {} products ({} ingredient percentages updated)",
            summary.records_written, summary.ingredients_updated
        );
    }
}

/// Sequential load → enrich → write pipeline.
pub struct PercentagesRunner<D: ProductDatabase> {
    dataset: DatasetConfig,
    enricher: Enricher<D>,
}

impl<D: ProductDatabase> PercentagesRunner<D> {
    pub fn new(dataset: DatasetConfig, enricher: Enricher<D>) -> Self {
        Self { dataset, enricher }
    }

    pub fn enricher(&self) -> &Enricher<D> {
        &self.enricher
    }

    /// Process every product of the input file, in order.
    ///
    /// The first error aborts the run. Records written before it stay in the
    /// output file, which is then not a complete document.
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunSummary, RunError> {
        let products = load_products(&self.dataset.input_path)?;
        info!(
            "Loaded {} products from {}",
            products.len(),
            self.dataset.input_path.display()
        );

        let mut writer = RecordWriter::create(&self.dataset.output_path, self.dataset.framing)?;
        let mut summary = RunSummary::default();

        progress.start(products.len());
        for (index, mut product) in products.into_iter().enumerate() {
            progress.advance(index, &product);

            let outcome = match self.enricher.enrich(&mut product).await {
                Ok(outcome) => outcome,
                Err(source) => {
                    return Err(RunError::Enrich {
                        index,
                        product_name: product.product_name,
                        source,
                    })
                }
            };
            writer.write_record(&product)?;

            summary.records_written += 1;
            summary.ingredients_updated += outcome.updated;
        }
        writer.finish()?;

        progress.finish(&summary);
        Ok(summary)
    }
}
