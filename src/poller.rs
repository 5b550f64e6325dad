// Metrics poller
//
// Fetches the chain list and network TPS on mount and then on a fixed
// interval. Fetches run on a short-lived worker thread and report back over
// a channel; the UI thread applies results in drain(). Every result carries
// the generation it was started under, so anything that arrives after a
// teardown is dropped instead of applied.

use crate::api::{FetchError, MetricsSnapshot, MetricsSource};
use crate::scheduler::{IntervalId, Scheduler};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// State of the displayed data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Initial fetch in progress, nothing to show yet
    Loading,
    /// Showing fresh data
    Ready,
    /// Latest refresh failed; previous data still shown
    Stale { message: String },
    /// Initial fetch failed; retry is offered
    Failed { message: String },
    /// Torn down
    Stopped,
}

impl LoadState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "live",
            Self::Stale { .. } => "stale",
            Self::Failed { .. } => "error",
            Self::Stopped => "stopped",
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Stale { message } | Self::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Result of applying one fetch
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// New snapshot to replace the displayed data wholesale
    Updated(MetricsSnapshot),
    /// Fetch failed before any data was shown
    LoadFailed(String),
    /// Refresh failed; keep showing what we have
    RefreshFailed(String),
}

struct FetchMessage {
    generation: u64,
    result: Result<MetricsSnapshot, FetchError>,
}

/// Periodic fetcher bound to a Scheduler interval
pub struct Poller {
    source: Arc<dyn MetricsSource>,
    refresh_every: Duration,
    interval: Option<IntervalId>,
    generation: u64,
    in_flight: bool,
    has_data: bool,
    state: LoadState,
    last_success: Option<Instant>,
    tx: Sender<FetchMessage>,
    rx: Receiver<FetchMessage>,
}

impl Poller {
    pub fn new(source: Arc<dyn MetricsSource>, refresh_every: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            refresh_every,
            interval: None,
            generation: 0,
            in_flight: false,
            has_data: false,
            state: LoadState::Loading,
            last_success: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }

    pub fn refresh_every(&self) -> Duration {
        self.refresh_every
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Start polling: fetch now and register the refresh interval
    pub fn mount(&mut self, scheduler: &mut dyn Scheduler) {
        if self.interval.is_some() {
            return;
        }
        if !self.has_data {
            self.state = LoadState::Loading;
        }
        self.interval = Some(scheduler.schedule_interval(self.refresh_every));
        info!(
            source = %self.source.describe(),
            refresh_secs = self.refresh_every.as_secs(),
            "Metrics polling started"
        );
        self.request_fetch();
    }

    /// Stop polling; results still in flight will be discarded
    pub fn teardown(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.interval.take() {
            scheduler.cancel_interval(id);
        }
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = false;
        self.state = LoadState::Stopped;
        debug!("Metrics polling stopped");
    }

    /// Whether `id` is this poller's refresh interval
    pub fn owns_interval(&self, id: IntervalId) -> bool {
        self.interval == Some(id)
    }

    /// Handle a refresh interval tick
    pub fn on_interval(&mut self, id: IntervalId) -> bool {
        if !self.owns_interval(id) {
            return false;
        }
        self.request_fetch()
    }

    /// Manual retry/refresh (the `r` key)
    pub fn retry(&mut self) -> bool {
        if self.interval.is_none() {
            return false;
        }
        if matches!(self.state, LoadState::Failed { .. }) {
            self.state = LoadState::Loading;
        }
        self.request_fetch()
    }

    /// Start a fetch unless one is already running or we're torn down
    ///
    /// Returns whether a fetch was started.
    fn request_fetch(&mut self) -> bool {
        if self.in_flight || self.interval.is_none() {
            return false;
        }

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let generation = self.generation;

        let spawned = thread::Builder::new()
            .name("metrics-fetch".to_string())
            .spawn(move || {
                let result = source.fetch();
                // Receiver gone means the app already exited
                let _ = tx.send(FetchMessage { generation, result });
            });

        match spawned {
            Ok(_) => {
                self.in_flight = true;
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to spawn metrics fetch thread");
                false
            }
        }
    }

    /// Apply every result that has arrived so far
    pub fn drain(&mut self) -> Vec<PollEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            if let Some(event) = self.accept(message) {
                events.push(event);
            }
        }
        events
    }

    /// Block up to `timeout` for the next applicable result
    pub fn wait(&mut self, timeout: Duration) -> Option<PollEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(message) => {
                    if let Some(event) = self.accept(message) {
                        return Some(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    fn accept(&mut self, message: FetchMessage) -> Option<PollEvent> {
        if message.generation != self.generation {
            debug!(
                generation = message.generation,
                current = self.generation,
                "Discarding metrics result from a torn-down poller"
            );
            return None;
        }
        self.in_flight = false;

        match message.result {
            Ok(snapshot) => {
                debug!(chains = snapshot.chains.len(), "Metrics snapshot applied");
                self.has_data = true;
                self.last_success = Some(Instant::now());
                self.state = LoadState::Ready;
                Some(PollEvent::Updated(snapshot))
            }
            Err(e) => {
                let message = e.to_string();
                if self.has_data {
                    warn!(error = %message, "Metrics refresh failed, keeping previous data");
                    self.state = LoadState::Stale {
                        message: message.clone(),
                    };
                    Some(PollEvent::RefreshFailed(message))
                } else {
                    warn!(error = %message, "Initial metrics load failed");
                    self.state = LoadState::Failed {
                        message: message.clone(),
                    };
                    Some(PollEvent::LoadFailed(message))
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned MetricsSource implementations shared by poller and app tests

    use super::*;
    use crate::api::{ChainInfo, NetworkTps, TpsSample};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub fn chain(id: &str, tps: f64) -> ChainInfo {
        ChainInfo {
            chain_id: id.to_string(),
            chain_name: format!("{id} chain"),
            chain_logo_uri: None,
            validators: Some(serde_json::json!(10)),
            tps: Some(TpsSample {
                value: Some(tps),
                timestamp: Some(1_700_000_000),
            }),
        }
    }

    pub fn snapshot(chains: &[(&str, f64)]) -> MetricsSnapshot {
        MetricsSnapshot {
            chains: chains.iter().map(|(id, tps)| chain(id, *tps)).collect(),
            network: NetworkTps {
                total_tps: Some(chains.iter().map(|(_, t)| t).sum()),
                chain_count: Some(chains.len() as u64),
            },
        }
    }

    /// Replays queued results; repeats the last one when the queue runs dry
    pub struct ScriptedSource {
        script: Mutex<VecDeque<Result<MetricsSnapshot, String>>>,
    }

    impl ScriptedSource {
        pub fn new(script: Vec<Result<MetricsSnapshot, String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl MetricsSource for ScriptedSource {
        fn fetch(&self) -> Result<MetricsSnapshot, FetchError> {
            let mut script = self.script.lock().unwrap_or_else(|p| p.into_inner());
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            match next {
                Some(Ok(snapshot)) => Ok(snapshot),
                Some(Err(status)) => Err(FetchError::Status {
                    url: format!("test://{status}"),
                    status: 503,
                }),
                None => Err(FetchError::Status {
                    url: "test://empty".to_string(),
                    status: 500,
                }),
            }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    /// Blocks each fetch until the test releases it
    pub struct GatedSource {
        gate: Mutex<Receiver<()>>,
        snapshot: MetricsSnapshot,
    }

    impl GatedSource {
        pub fn new(snapshot: MetricsSnapshot) -> (Self, Sender<()>) {
            let (tx, rx) = mpsc::channel();
            (
                Self {
                    gate: Mutex::new(rx),
                    snapshot,
                },
                tx,
            )
        }
    }

    impl MetricsSource for GatedSource {
        fn fetch(&self) -> Result<MetricsSnapshot, FetchError> {
            let gate = self.gate.lock().unwrap_or_else(|p| p.into_inner());
            let _ = gate.recv_timeout(Duration::from_secs(5));
            Ok(self.snapshot.clone())
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }
}
