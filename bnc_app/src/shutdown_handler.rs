use std::time::Duration;

use tokio::sync::watch;

/// Shutdown flag flipped by Ctrl+C
///
/// Can be polled with [`Shutdown::is_requested`] or awaited, so long sleeps
/// end as soon as the signal arrives.
#[derive(Debug, Clone)]
pub struct Shutdown {
    requested: watch::Receiver<bool>,
}

impl Shutdown {
    fn channel() -> (watch::Sender<bool>, Self) {
        let (sender, requested) = watch::channel(false);
        (sender, Self { requested })
    }

    pub fn is_requested(&self) -> bool {
        *self.requested.borrow()
    }

    /// Resolves once shutdown has been requested
    pub async fn requested(&self) {
        let mut requested = self.requested.clone();
        if requested.wait_for(|requested| *requested).await.is_err() {
            // signal source is gone, shutdown can no longer be requested
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration`; returns `false` if cut short by shutdown
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.requested() => false,
        }
    }
}

/// Sets up a Ctrl+C handler that flips the returned flag on shutdown signal
pub fn setup() -> Result<Shutdown, ctrlc::Error> {
    let (sender, shutdown) = Shutdown::channel();

    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        sender.send_replace(true);
    })?;

    Ok(shutdown)
}
