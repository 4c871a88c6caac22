//! Session termination: wipe the credential pair and raise one observable
//! "session invalid" signal so the surrounding application can force a
//! return to its login surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{Level, event, warn};

use crate::credentials::CredentialStore;

pub struct SessionSignal {
    store: Arc<CredentialStore>,
    fired: AtomicBool,
    tx: watch::Sender<bool>,
}

impl SessionSignal {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            store,
            fired: AtomicBool::new(false),
            tx,
        }
    }

    /// Receiver that flips to `true` exactly once per terminated session.
    pub fn invalidated(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_terminated(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Idempotent teardown. The store always ends with both tokens absent;
    /// the signal fires on the first call only, however many failure
    /// observers race here.
    pub async fn terminate(&self) {
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "failed to persist credential teardown");
        }
        if !self.fired.swap(true, Ordering::SeqCst) {
            event!(Level::WARN, "session.terminated");
            self.tx.send_replace(true);
        }
    }

    /// Re-arm after a successful login so a later session can terminate
    /// again.
    pub fn rearm(&self) {
        self.fired.store(false, Ordering::SeqCst);
        self.tx.send_replace(false);
    }
}
