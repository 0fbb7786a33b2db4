//! Background resolver session.
//!
//! Keeps the presenting side responsive: fetch, probe and extraction run on
//! a worker thread, and every request carries an epoch so that a completion
//! arriving after the user has navigated on is recognized as stale, dropped
//! (releasing the handles it materialized), and never mutates the view now
//! showing someone else's content.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::resolve::fetch::BlobFetcher;
use crate::resolve::handle::UrlRegistry;
use crate::resolve::{resolve, Classification, ContentId};
use crate::util::Result;

/// Commands sent from the presenting side to the worker.
#[derive(Debug)]
enum Command {
    /// Resolve the given identifier.
    Resolve { id: ContentId, epoch: u64 },
    /// Stop the worker thread.
    Stop,
}

/// Results sent from the worker back to the presenting side.
struct Outcome {
    epoch: u64,
    id: ContentId,
    result: Result<Classification>,
}

/// A resolution delivered for the session's current epoch.
pub struct ResolvedContent {
    pub id: ContentId,
    pub result: Result<Classification>,
}

/// Handle to a background resolver worker.
pub struct ResolverSession {
    tx: Sender<Command>,
    rx: Receiver<Outcome>,
    handle: Option<JoinHandle<()>>,
    epoch: u64,
}

impl ResolverSession {
    /// Spawn a worker resolving against the given fetcher and registry.
    pub fn spawn(fetcher: Arc<dyn BlobFetcher>, registry: UrlRegistry) -> Self {
        let (cmd_tx, cmd_rx) = channel::<Command>();
        let (res_tx, res_rx) = channel::<Outcome>();

        let handle = thread::spawn(move || {
            worker_loop(fetcher, registry, cmd_rx, res_tx);
        });

        Self { tx: cmd_tx, rx: res_rx, handle: Some(handle), epoch: 0 }
    }

    /// Request resolution of an identifier, superseding any in-flight one.
    ///
    /// Returns the epoch assigned to this request.
    pub fn request(&mut self, id: ContentId) -> u64 {
        self.epoch += 1;
        let _ = self.tx.send(Command::Resolve { id, epoch: self.epoch });
        self.epoch
    }

    /// Epoch of the most recent request.
    pub fn current_epoch(&self) -> u64 {
        self.epoch
    }

    /// Check for a ready result (non-blocking).
    ///
    /// Stale completions from superseded requests are silently discarded;
    /// dropping them revokes whatever handles they had materialized.
    pub fn try_recv(&self) -> Option<ResolvedContent> {
        while let Ok(outcome) = self.rx.try_recv() {
            if let Some(resolved) = self.admit(outcome) {
                return Some(resolved);
            }
        }
        None
    }

    /// Wait up to `timeout` for a current-epoch result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ResolvedContent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    if let Some(resolved) = self.admit(outcome) {
                        return Some(resolved);
                    }
                }
                Err(_) => return None,
            }
        }
    }

    fn admit(&self, outcome: Outcome) -> Option<ResolvedContent> {
        if outcome.epoch != self.epoch {
            // Stale navigation; dropping the outcome releases its handles.
            tracing::debug!(
                epoch = outcome.epoch,
                current = self.epoch,
                id = %outcome.id,
                "discarding stale resolution"
            );
            return None;
        }
        Some(ResolvedContent { id: outcome.id, result: outcome.result })
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop(&mut self) {
        let _ = self.tx.send(Command::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ResolverSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Main worker loop - runs in the background thread.
fn worker_loop(
    fetcher: Arc<dyn BlobFetcher>,
    registry: UrlRegistry,
    rx: Receiver<Command>,
    tx: Sender<Outcome>,
) {
    loop {
        let cmd = match rx.recv() {
            Ok(cmd) => cmd,
            Err(_) => break, // Channel closed
        };

        match cmd {
            Command::Resolve { id, epoch } => {
                // Drain any newer requests first; rapid navigation only
                // pays for the latest identifier.
                let (id, epoch) = drain_to_latest(&rx, id, epoch);

                let _span = tracing::info_span!("resolve", %id, epoch).entered();
                let result = resolve(fetcher.as_ref(), &registry, &id);

                if tx.send(Outcome { epoch, id, result }).is_err() {
                    break; // Presenting side disconnected
                }
            }

            Command::Stop => break,
        }
    }
}

/// Drain queued commands to get the latest request, discarding older ones.
fn drain_to_latest(rx: &Receiver<Command>, mut id: ContentId, mut epoch: u64) -> (ContentId, u64) {
    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            Command::Resolve { id: i, epoch: e } => {
                id = i;
                epoch = e;
            }
            // Stop will be seen again on the next recv()
            Command::Stop => return (id, epoch),
        }
    }
    (id, epoch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::fetch::Payload;
    use crate::util::Error;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory fetcher with optional per-identifier delay.
    struct MapFetcher {
        blobs: Mutex<HashMap<String, Payload>>,
        delay: Mutex<HashMap<String, Duration>>,
    }

    impl MapFetcher {
        fn new() -> Self {
            Self { blobs: Mutex::new(HashMap::new()), delay: Mutex::new(HashMap::new()) }
        }

        fn insert(&self, id: &str, payload: Payload) {
            self.blobs.lock().insert(id.to_string(), payload);
        }

        fn slow(&self, id: &str, delay: Duration) {
            self.delay.lock().insert(id.to_string(), delay);
        }
    }

    impl BlobFetcher for MapFetcher {
        fn fetch(&self, id: &ContentId) -> Result<Payload> {
            if let Some(delay) = self.delay.lock().get(id.as_str()).copied() {
                thread::sleep(delay);
            }
            self.blobs
                .lock()
                .get(id.as_str())
                .cloned()
                .ok_or(Error::Fetch { status: 404 })
        }
    }

    #[test]
    fn test_session_resolves_image() {
        let fetcher = Arc::new(MapFetcher::new());
        fetcher.insert("pic", Payload::with_type(b"\x89PNG\r\n\x1a\n....".to_vec(), "image/png"));
        let registry = UrlRegistry::new();
        let mut session = ResolverSession::spawn(fetcher, registry.clone());

        session.request(ContentId::new("pic").unwrap());
        let resolved = session.recv_timeout(Duration::from_secs(5)).expect("result in time");
        assert_eq!(resolved.id.as_str(), "pic");
        match resolved.result.unwrap() {
            Classification::Image(handle) => assert_eq!(handle.content_type(), "image/png"),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_session_surfaces_fetch_error() {
        let fetcher = Arc::new(MapFetcher::new());
        let mut session = ResolverSession::spawn(fetcher, UrlRegistry::new());

        session.request(ContentId::new("missing").unwrap());
        let resolved = session.recv_timeout(Duration::from_secs(5)).expect("result in time");
        let err = resolved.result.unwrap_err();
        assert!(matches!(err, Error::Fetch { status: 404 }));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_stale_resolution_is_discarded_and_released() {
        let fetcher = Arc::new(MapFetcher::new());
        fetcher.insert("a", Payload::new(b"\x89PNG\r\n\x1a\n-a-".to_vec()));
        fetcher.insert("b", Payload::new(b"\x89PNG\r\n\x1a\n-b-".to_vec()));
        fetcher.slow("a", Duration::from_millis(200));

        let registry = UrlRegistry::new();
        let mut session = ResolverSession::spawn(fetcher, registry.clone());

        session.request(ContentId::new("a").unwrap());
        // Give the worker time to pick up "a" before superseding it.
        thread::sleep(Duration::from_millis(50));
        session.request(ContentId::new("b").unwrap());

        let resolved = session.recv_timeout(Duration::from_secs(5)).expect("result in time");
        assert_eq!(resolved.id.as_str(), "b");
        let classification = resolved.result.unwrap();

        // "a"'s late completion was dropped, so only "b"'s handle is live.
        assert_eq!(registry.len(), 1);
        drop(classification);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rapid_requests_drain_to_latest() {
        let fetcher = Arc::new(MapFetcher::new());
        for name in ["a", "b", "c"] {
            fetcher.insert(name, Payload::new(format!("not-a-zip-{name}").into_bytes()));
        }
        let registry = UrlRegistry::new();
        let mut session = ResolverSession::spawn(fetcher, registry.clone());

        session.request(ContentId::new("a").unwrap());
        session.request(ContentId::new("b").unwrap());
        session.request(ContentId::new("c").unwrap());

        let resolved = session.recv_timeout(Duration::from_secs(5)).expect("result in time");
        assert_eq!(resolved.id.as_str(), "c");
    }

    #[test]
    fn test_stop_joins_worker() {
        let fetcher = Arc::new(MapFetcher::new());
        let mut session = ResolverSession::spawn(fetcher, UrlRegistry::new());
        session.stop();
        // Stopping again is harmless.
        session.stop();
    }
}
