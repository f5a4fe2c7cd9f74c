//! DispatchCoordinator - pairs tokens into records and tracks their delivery
//!
//! The coordinator is the single sequential driver of a produce run. It pulls
//! tokens, pairs them into [`RecordUnit`]s, submits each unit without waiting
//! for its delivery and reconciles completion events as they arrive. The run
//! ends cleanly only once every submitted unit has completed.

use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, trace};

use contracts::{CompletionCallback, DeliveryClient, DeliveryResult, RecordUnit};
use ingestion::TokenSource;
use observability::{RunningStats, StatsSummary};

use crate::barrier::CompletionBarrier;
use crate::error::DispatcherError;

/// How tokens are grouped into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingMode {
    /// Every token is one unkeyed record
    #[default]
    ValueOnly,
    /// Tokens alternate key, value
    KeyValue,
}

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Destination topic of every record
    pub topic: String,
    /// Token pairing
    pub mode: PairingMode,
    /// Report each successful delivery to the output writer
    pub verbose: bool,
}

impl CoordinatorConfig {
    pub fn new(topic: impl Into<String>, mode: PairingMode) -> Self {
        Self {
            topic: topic.into(),
            mode,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Totals of a completed run
#[derive(Debug, Clone)]
pub struct ProduceSummary {
    /// Tokens pulled from the source
    pub tokens: u64,
    /// Units handed to the client
    pub units_submitted: u64,
    /// Units whose delivery succeeded
    pub units_acknowledged: u64,
    /// Token payload bytes
    pub bytes: u64,
    /// Wall time of the run
    pub duration: Duration,
    /// Token size distribution
    pub token_sizes: StatsSummary,
}

impl fmt::Display for ProduceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Produce Summary ===")?;
        writeln!(f, "Tokens: {}", self.tokens)?;
        writeln!(f, "Records submitted: {}", self.units_submitted)?;
        writeln!(f, "Records acknowledged: {}", self.units_acknowledged)?;
        writeln!(f, "Bytes: {}", self.bytes)?;
        writeln!(f, "Token size (bytes): {}", self.token_sizes)?;
        write!(f, "Duration: {:.3}s", self.duration.as_secs_f64())
    }
}

/// Pairing state of the unit being assembled
#[derive(Debug)]
enum UnitState {
    AwaitingKey,
    AwaitingValue { key: Option<Bytes> },
}

/// Outcome of one submitted unit, posted by its completion callback
struct Completion {
    sequence: u64,
    unit: RecordUnit,
    result: DeliveryResult,
}

/// Driver of one produce run against an injected delivery client
pub struct DispatchCoordinator<'a, C> {
    client: &'a C,
    config: CoordinatorConfig,
    barrier: CompletionBarrier,
    events_tx: mpsc::UnboundedSender<Completion>,
    events_rx: mpsc::UnboundedReceiver<Completion>,
    state: UnitState,
    /// Sequence number of the next unit (1-based)
    next_sequence: u64,
    tokens: u64,
    bytes: u64,
    acknowledged: u64,
    token_sizes: RunningStats,
}

impl<'a, C: DeliveryClient> DispatchCoordinator<'a, C> {
    /// Create a coordinator for a single run
    pub fn new(client: &'a C, config: CoordinatorConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = initial_state(config.mode);

        Self {
            client,
            config,
            barrier: CompletionBarrier::new(),
            events_tx,
            events_rx,
            state,
            next_sequence: 1,
            tokens: 0,
            bytes: 0,
            acknowledged: 0,
            token_sizes: RunningStats::default(),
        }
    }

    /// Barrier tracking this run's in-flight units
    pub fn barrier(&self) -> &CompletionBarrier {
        &self.barrier
    }

    /// Run until the token source is exhausted and every unit has completed
    ///
    /// Verbose delivery reports are written to `out` in completion order.
    ///
    /// # Errors
    /// Returns on the first fatal condition: a tokenization error, a key
    /// without a value, a refused submission or a failed delivery. Units
    /// still in flight at that point are abandoned.
    #[instrument(
        name = "coordinator_run",
        skip(self, tokens, out),
        fields(topic = %self.config.topic, mode = ?self.config.mode, client = %self.client.name())
    )]
    pub async fn run<S, W>(
        mut self,
        tokens: &mut S,
        out: &mut W,
    ) -> Result<ProduceSummary, DispatcherError>
    where
        S: TokenSource,
        W: Write,
    {
        let started = Instant::now();
        info!("Produce run started");

        // Completions are reconciled while tokenizing
        loop {
            tokio::select! {
                biased;
                Some(event) = self.events_rx.recv() => self.reconcile(event, out)?,
                token = tokens.next_token() => match token? {
                    Some(token) => self.accept(token).await?,
                    None => break,
                },
            }
        }

        if let UnitState::AwaitingValue { key: Some(_) } = self.state {
            error!(sequence = self.next_sequence, "Input ended after a key without its value");
            return Err(DispatcherError::TruncatedPair {
                sequence: self.next_sequence,
            });
        }

        debug!(
            in_flight = self.barrier.in_flight(),
            "Token source exhausted, waiting for outstanding deliveries"
        );

        loop {
            tokio::select! {
                biased;
                Some(event) = self.events_rx.recv() => self.reconcile(event, out)?,
                _ = self.barrier.wait() => break,
            }
        }

        // Every callback posts before leaving, so nothing arrives after this
        while let Ok(event) = self.events_rx.try_recv() {
            self.reconcile(event, out)?;
        }
        out.flush()?;

        let summary = ProduceSummary {
            tokens: self.tokens,
            units_submitted: self.barrier.entered(),
            units_acknowledged: self.acknowledged,
            bytes: self.bytes,
            duration: started.elapsed(),
            token_sizes: StatsSummary::from(&self.token_sizes),
        };

        info!(
            tokens = summary.tokens,
            submitted = summary.units_submitted,
            acknowledged = summary.units_acknowledged,
            bytes = summary.bytes,
            "Produce run complete"
        );
        Ok(summary)
    }

    /// Feed one token into the pairing state machine
    async fn accept(&mut self, token: Bytes) -> Result<(), DispatcherError> {
        self.tokens += 1;
        self.bytes += token.len() as u64;
        self.token_sizes.push(token.len() as f64);
        observability::record_token(token.len());

        match std::mem::replace(&mut self.state, UnitState::AwaitingKey) {
            UnitState::AwaitingKey => {
                self.state = UnitState::AwaitingValue { key: Some(token) };
                Ok(())
            }
            UnitState::AwaitingValue { key } => {
                self.state = initial_state(self.config.mode);
                let unit = RecordUnit {
                    topic: self.config.topic.clone(),
                    key,
                    value: token,
                };
                self.dispatch(unit).await
            }
        }
    }

    /// Submit a unit; returns once the client has accepted it
    async fn dispatch(&mut self, unit: RecordUnit) -> Result<(), DispatcherError> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let events = self.events_tx.clone();
        let barrier = self.barrier.clone();
        let on_complete: CompletionCallback = Box::new(move |unit, result| {
            // A closed channel means the run already ended
            let _ = events.send(Completion {
                sequence,
                unit,
                result,
            });
            barrier.leave();
        });

        self.barrier.enter();
        if let Err(source) = self.client.submit(unit, on_complete).await {
            self.barrier.leave();
            error!(sequence, error = %source, "Submit failed");
            return Err(DispatcherError::Submit { sequence, source });
        }

        trace!(sequence, in_flight = self.barrier.in_flight(), "Record submitted");
        observability::record_unit_submitted(&self.config.topic);
        observability::record_in_flight(self.barrier.in_flight());
        Ok(())
    }

    /// Apply one completion event
    fn reconcile<W: Write>(&mut self, event: Completion, out: &mut W) -> Result<(), DispatcherError> {
        let Completion {
            sequence,
            unit,
            result,
        } = event;

        match result {
            Ok(receipt) => {
                self.acknowledged += 1;
                observability::record_unit_acknowledged(&receipt.topic);
                if self.config.verbose {
                    writeln!(out, "Successful send to {receipt}")?;
                }
                Ok(())
            }
            Err(source) => {
                observability::record_delivery_failure(&unit.topic);
                error!(sequence, topic = %unit.topic, error = %source, "Delivery failed");
                Err(DispatcherError::Delivery {
                    sequence,
                    topic: unit.topic,
                    source,
                })
            }
        }
    }
}

fn initial_state(mode: PairingMode) -> UnitState {
    match mode {
        PairingMode::KeyValue => UnitState::AwaitingKey,
        PairingMode::ValueOnly => UnitState::AwaitingValue { key: None },
    }
}
