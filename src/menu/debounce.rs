use std::time::Duration;

use tokio::sync::{mpsc, watch};

/// Quiet period applied to the raw search query before it reaches the
/// filter pipeline.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(250);

/// Standard debounce semantics over a watch channel: every new value
/// cancels and re-arms the timer, and only the last value inside the
/// window is emitted. The output channel closes when the input does,
/// after flushing the pending value.
pub fn debounced<T: Clone + Send + Sync + 'static>(
    mut input: watch::Receiver<T>,
    delay: Duration,
) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        loop {
            if input.changed().await.is_err() {
                break;
            }
            let mut closed = false;
            loop {
                let timer = tokio::time::sleep(delay);
                tokio::pin!(timer);
                tokio::select! {
                    changed = input.changed() => {
                        if changed.is_err() {
                            closed = true;
                            break;
                        }
                        // re-arm on the fresh value
                    }
                    () = &mut timer => break,
                }
            }
            let value = input.borrow_and_update().clone();
            if tx.send(value).await.is_err() || closed {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_coalesce_into_one_emission() {
        let (tx, rx) = watch::channel(String::new());
        let mut out = debounced(rx, SEARCH_DEBOUNCE);

        // "m", "mo", "moj" at 100ms intervals, all inside the 250ms window
        tx.send("m".into()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("mo".into()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send("moj".into()).unwrap();

        let got = out.recv().await.expect("one emission");
        assert_eq!(got, "moj");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(out.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_keystrokes_each_emit() {
        let (tx, rx) = watch::channel(String::new());
        let mut out = debounced(rx, SEARCH_DEBOUNCE);

        tx.send("idli".into()).unwrap();
        assert_eq!(out.recv().await.as_deref(), Some("idli"));

        tx.send("dosa".into()).unwrap();
        assert_eq!(out.recv().await.as_deref(), Some("dosa"));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_value_flushes_when_input_closes() {
        let (tx, rx) = watch::channel(String::new());
        let mut out = debounced(rx, SEARCH_DEBOUNCE);

        tx.send("margarita".into()).unwrap();
        drop(tx);

        assert_eq!(out.recv().await.as_deref(), Some("margarita"));
        assert!(out.recv().await.is_none());
    }
}
