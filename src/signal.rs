use log::{debug, error, warn};
use std::future::Future;
use std::io;
use tokio::sync::watch;

/// Latched ctrl-C notification
///
/// Install it before touching the device so an early ctrl-C is still seen
/// once the capture starts waiting. The handler stays installed afterwards,
/// so later presses are logged and ignored while flags are restored and the
/// netlog is retrieved.
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Interrupt {
    /// Start listening for ctrl-C on the current runtime
    pub fn listen() -> Self {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(forward_interrupts(tokio::signal::ctrl_c, tx));
        Self { rx }
    }

    /// Wrap an existing channel; fires once it holds `true`
    pub fn from_channel(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once ctrl-C has been pressed
    pub async fn wait(mut self) {
        // A closed channel means the listener is gone; treat it as a stop.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

/// Latch the first signal into `tx`, then log repeats until the source fails
///
/// Returns how many repeats were ignored.
async fn forward_interrupts<F, Fut>(mut next_signal: F, tx: watch::Sender<bool>) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    match next_signal().await {
        Ok(()) => debug!("Received ctrl-C"),
        // Without a handler nothing could ever stop the capture.
        Err(e) => {
            error!("Unable to listen for ctrl-C, stopping now: {}", e);
            let _ = tx.send(true);
            return 0;
        }
    }
    let _ = tx.send(true);

    let mut ignored = 0;
    while next_signal().await.is_ok() {
        ignored += 1;
        warn!("Already stopping: restoring flags and pulling the netlog, please wait");
    }
    ignored
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Signal source yielding `presses` successes, then an error
    fn fake_signals(presses: usize) -> impl FnMut() -> std::future::Ready<io::Result<()>> {
        let mut queue: VecDeque<io::Result<()>> = (0..presses).map(|_| Ok(())).collect();
        move || {
            let next = queue
                .pop_front()
                .unwrap_or_else(|| Err(io::Error::other("signal stream closed")));
            std::future::ready(next)
        }
    }

    #[tokio::test]
    async fn test_repeated_interrupts_are_counted_not_lost() {
        let (tx, rx) = watch::channel(false);
        let ignored = forward_interrupts(fake_signals(3), tx).await;

        assert_eq!(ignored, 2);
        assert!(Interrupt::from_channel(rx).is_triggered());
    }

    #[tokio::test]
    async fn test_missing_handler_triggers_immediately() {
        let (tx, rx) = watch::channel(false);
        let ignored = forward_interrupts(fake_signals(0), tx).await;

        assert_eq!(ignored, 0);
        assert!(Interrupt::from_channel(rx).is_triggered());
    }

    #[tokio::test]
    async fn test_wait_returns_after_trigger() {
        let (tx, rx) = watch::channel(false);
        let interrupt = Interrupt::from_channel(rx);
        assert!(!interrupt.is_triggered());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), interrupt.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_trigger_before_wait_is_not_lost() {
        let (tx, rx) = watch::channel(false);
        let interrupt = Interrupt::from_channel(rx);
        tx.send(true).unwrap();
        drop(tx);

        assert!(interrupt.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), interrupt.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_blocks_until_triggered() {
        let (_tx, rx) = watch::channel(false);
        let interrupt = Interrupt::from_channel(rx);
        let waited = tokio::time::timeout(Duration::from_millis(50), interrupt.wait()).await;
        assert!(waited.is_err());
    }
}
