use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Mutex;

/// Payload-free "something changed, reload" broadcast.
#[derive(Default)]
pub struct ChangeBus {
    subscribers: Mutex<Vec<Sender<()>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        Subscription { rx }
    }

    /// Wake every live subscriber. Dropped subscriptions are pruned.
    pub fn publish(&self) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.retain(|tx| tx.send(()).is_ok());
        log::debug!("change published to {} subscriber(s)", subscribers.len());
    }
}

pub struct Subscription {
    rx: Receiver<()>,
}

impl Subscription {
    /// True if at least one change arrived since the last call. Coalesces
    /// bursts into a single reload.
    pub fn changed(&self) -> bool {
        let mut seen = false;
        loop {
            match self.rx.try_recv() {
                Ok(()) => seen = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return seen,
            }
        }
    }
}
