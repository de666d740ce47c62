//! Timer-based coalescing of rapid value changes.
//!
//! Every received value restarts the quiescence timer. When the timer
//! expires the pending value is compared with the last one dispatched and
//! handed to the callback only if it differs.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawn the debounce loop on `handle`.
///
/// `initial` is the value the source starts out with; a burst that settles
/// back on it is dropped like any other repeat.
///
/// The task exits once every sender for `rx` is dropped; a value still
/// waiting for its window at that point is discarded.
pub fn spawn_debouncer<T, F>(
    handle: &Handle,
    window: Duration,
    initial: Option<T>,
    mut rx: mpsc::UnboundedReceiver<T>,
    mut on_fire: F,
) -> JoinHandle<()>
where
    T: PartialEq + Clone + Send + 'static,
    F: FnMut(T) + Send + 'static,
{
    handle.spawn(async move {
        let mut last_dispatched = initial;

        while let Some(first) = rx.recv().await {
            let mut pending = first;
            loop {
                match tokio::time::timeout(window, rx.recv()).await {
                    Ok(Some(next)) => pending = next,
                    Ok(None) => return,
                    Err(_elapsed) => break,
                }
            }

            if last_dispatched.as_ref() == Some(&pending) {
                continue;
            }
            last_dispatched = Some(pending.clone());
            on_fire(pending);
        }
    })
}
