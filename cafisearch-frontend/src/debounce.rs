///! Keystroke debouncing
///!
///! Values pushed through the sender are held until no newer value has
///! arrived for the configured delay; only the latest one is delivered.

use std::time::Duration;
use tokio::sync::mpsc;

pub struct Debouncer<T> {
    rx: mpsc::UnboundedReceiver<T>,
    delay: Duration,
    pending: Option<T>,
}

/// Create a sender and the debounced stream fed by it
pub fn debounce<T>(delay: Duration) -> (mpsc::UnboundedSender<T>, Debouncer<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        tx,
        Debouncer {
            rx,
            delay,
            pending: None,
        },
    )
}

impl<T> Debouncer<T> {
    /// Wait for the next settled value.
    ///
    /// Returns `None` once every sender is dropped and nothing is pending.
    /// Cancel-safe: a pending value survives the future being dropped, the
    /// quiet period restarts on the next call.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            if self.pending.is_none() {
                self.pending = Some(self.rx.recv().await?);
            }
            match tokio::time::timeout(self.delay, self.rx.recv()).await {
                Ok(Some(value)) => self.pending = Some(value),
                Ok(None) | Err(_) => return self.pending.take(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_latest() {
        let (tx, mut debounced) = debounce(DELAY);
        for value in ["l", "la", "lam", "lamiz"] {
            tx.send(value.to_string()).unwrap();
        }
        assert_eq!(debounced.next().await.as_deref(), Some("lamiz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_delivers_each_value() {
        let (tx, mut debounced) = debounce(DELAY);
        tokio::spawn(async move {
            tx.send("sam").unwrap();
            tokio::time::sleep(Duration::from_millis(400)).await;
            tx.send("sam cafe").unwrap();
        });

        assert_eq!(debounced.next().await, Some("sam"));
        assert_eq!(debounced.next().await, Some("sam cafe"));
        assert_eq!(debounced.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_within_delay_restarts_timer() {
        let (tx, mut debounced) = debounce(DELAY);
        let start = tokio::time::Instant::now();
        tokio::spawn(async move {
            tx.send(1).unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(2).unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        assert_eq!(debounced.next().await, Some(2));
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_value_survives_cancellation() {
        let (tx, mut debounced) = debounce(DELAY);
        tx.send("naderi").unwrap();

        let cancelled = tokio::time::timeout(Duration::from_millis(100), debounced.next()).await;
        assert!(cancelled.is_err());

        assert_eq!(debounced.next().await, Some("naderi"));
    }
}
