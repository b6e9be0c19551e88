use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Payload-free reload signal fanned out to every connected view.
#[derive(Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<()>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// A send error only means nobody is connected; it is not surfaced.
    pub fn notify_all(&self) {
        let _ = self.tx.send(());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}
