use anyhow::{Context, Result};
use log::{debug, trace, warn};
use std::any::Any;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
struct Abandoned {
    name: String,
    value: Box<dyn Any + Send>,
}
/// Best-effort background reclamation of values nobody released explicitly.
///
/// Reclamation happens on a worker thread at an unspecified time relative to the
/// caller. Nothing that must happen before the next step of the program (closing a
/// handle that is about to be reopened, flushing a file that is about to be read) may
/// be routed through here; use [`crate::region::Scope`] for that.
pub struct Reclaimer {
    sender: Option<Sender<Abandoned>>,
    worker: Option<JoinHandle<usize>>,
}
impl Reclaimer {
    pub fn start() -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Abandoned>();
        let worker = std::thread::Builder::new()
            .name("reclaimer".to_string())
            .spawn(move || {
                let mut reclaimed = 0;
                for item in receiver {
                    trace!("reclaiming abandoned '{}'", item.name);
                    drop(item.value);
                    reclaimed += 1;
                }
                debug!("reclaimer stopped after {} value(s)", reclaimed);
                reclaimed
            })
            .context("failed to spawn reclaimer thread")?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }
    /// A reclaimer without a worker: abandoned values are dropped on the spot.
    pub fn disabled() -> Self {
        Self { sender: None, worker: None }
    }
    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }
    /// Hands `value` to the background worker. Returns false when it was dropped inline
    /// instead.
    pub fn abandon<T: Send + 'static>(&self, name: &str, value: T) -> bool {
        let item = Abandoned {
            name: name.to_string(),
            value: Box::new(value),
        };
        match &self.sender {
            Some(sender) => {
                match sender.send(item) {
                    Ok(()) => true,
                    Err(mpsc::SendError(item)) => {
                        warn!("reclaimer gone, dropping '{}' inline", item.name);
                        false
                    }
                }
            }
            None => {
                trace!("dropping abandoned '{}' inline", item.name);
                false
            }
        }
    }
    /// Stops the worker after it drained everything queued so far.
    pub fn shutdown(mut self) -> Result<usize> {
        self.stop()
    }
    fn stop(&mut self) -> Result<usize> {
        drop(self.sender.take());
        match self.worker.take() {
            Some(handle) => {
                handle.join().map_err(|_| anyhow::anyhow!("reclaimer thread panicked"))
            }
            None => Ok(0),
        }
    }
}
impl Drop for Reclaimer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("{e:?}");
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    struct Tracked(Arc<AtomicUsize>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
    #[test]
    fn test_abandoned_values_are_eventually_reclaimed() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let reclaimer = Reclaimer::start().unwrap();
        assert!(reclaimer.abandon("a", Tracked(Arc::clone(& dropped))));
        assert!(reclaimer.abandon("b", Tracked(Arc::clone(& dropped))));
        let reclaimed = reclaimer.shutdown().unwrap();
        assert_eq!(reclaimed, 2);
        assert_eq!(dropped.load(Ordering::SeqCst), 2);
    }
    #[test]
    fn test_disabled_reclaimer_drops_inline() {
        let dropped = Arc::new(AtomicUsize::new(0));
        let reclaimer = Reclaimer::disabled();
        assert!(! reclaimer.abandon("a", Tracked(Arc::clone(& dropped))));
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
        assert_eq!(reclaimer.shutdown().unwrap(), 0);
    }
}
