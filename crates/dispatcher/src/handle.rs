//! DeliveryHandle - delivery client backed by a sink with its own queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use contracts::{CompletionCallback, ContractError, DeliveryClient, RecordSink, RecordUnit};

use crate::metrics::ClientMetrics;

/// One accepted record awaiting delivery
struct Submission {
    unit: RecordUnit,
    on_complete: CompletionCallback,
}

/// Handle to a running delivery worker
///
/// `submit` waits only for queue space; the worker delivers records and
/// invokes each completion callback from its own task.
pub struct DeliveryHandle {
    /// Client name
    name: String,
    /// Channel to send records to worker
    tx: mpsc::Sender<Submission>,
    /// Shared metrics
    metrics: Arc<ClientMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl DeliveryHandle {
    /// Create a new DeliveryHandle and spawn the worker task
    pub fn spawn<S: RecordSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(ClientMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            delivery_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<ClientMetrics> {
        &self.metrics
    }

    /// Shutdown the worker gracefully
    ///
    /// Records already queued are still delivered and their callbacks invoked
    /// before the sink is flushed and closed.
    #[instrument(name = "delivery_handle_shutdown", skip(self), fields(client = %self.name))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(client = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(client = %self.name, "DeliveryHandle shutdown complete");
    }
}

impl DeliveryClient for DeliveryHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(
        &self,
        unit: RecordUnit,
        on_complete: CompletionCallback,
    ) -> Result<(), ContractError> {
        self.tx
            .send(Submission { unit, on_complete })
            .await
            .map_err(|_| ContractError::client_closed(&self.name))?;

        self.metrics.inc_submitted_count();
        self.metrics
            .set_queue_len(self.tx.max_capacity() - self.tx.capacity());
        Ok(())
    }
}

/// Worker task that consumes submissions and writes them to the sink
#[instrument(
    name = "delivery_worker_loop",
    skip(sink, rx, metrics),
    fields(client = %name)
)]
async fn delivery_worker<S: RecordSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<Submission>,
    metrics: Arc<ClientMetrics>,
    name: String,
) {
    debug!(client = %name, "Delivery worker started");

    while let Some(Submission { unit, on_complete }) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        match sink.write(&unit).await {
            Ok(receipt) => {
                metrics.inc_write_count();
                on_complete(unit, Ok(receipt));
            }
            Err(e) => {
                metrics.inc_failure_count();
                error!(
                    client = %name,
                    topic = %unit.topic,
                    error = %e,
                    "Write failed"
                );
                on_complete(unit, Err(e));
            }
        }
    }

    // Cleanup
    if let Err(e) = sink.flush().await {
        error!(client = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(client = %name, error = %e, "Close failed on shutdown");
    }

    debug!(client = %name, "Delivery worker stopped");
}
