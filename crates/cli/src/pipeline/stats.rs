//! Pipeline statistics and metrics.

use dispatcher::{MetricsSnapshot as ClientMetricsSnapshot, ProduceSummary};
use ingestion::MetricsSnapshot as IngestionMetricsSnapshot;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Coordinator totals
    pub summary: ProduceSummary,

    /// Tokenizer counters
    pub ingestion: IngestionMetricsSnapshot,

    /// Delivery client counters
    pub client: ClientMetricsSnapshot,
}

impl PipelineStats {
    /// Records acknowledged per second
    pub fn records_per_sec(&self) -> f64 {
        let secs = self.summary.duration.as_secs_f64();
        if secs > 0.0 {
            self.summary.units_acknowledged as f64 / secs
        } else {
            0.0
        }
    }

    /// Print detailed summary to stderr (stdout carries delivery reports)
    pub fn print_summary(&self) {
        eprintln!("\n{}", self.summary);
        eprintln!("Throughput: {:.2} records/s", self.records_per_sec());
        eprintln!(
            "Input: {} bytes in {} reads",
            self.ingestion.bytes_read, self.ingestion.reads
        );
        eprintln!(
            "Client: {} written, {} failed",
            self.client.write_count, self.client.failure_count
        );
    }
}
