use crate::errors::{ErrorCondition, ErrorKind};
use log::{debug, error, warn};
use std::sync::{Arc, Mutex};
/// A resource with an explicit release step.
pub trait Disposable {
    fn dispose(&mut self) -> Result<(), ErrorCondition>;
}
/// Shared handle to a resource owned by a [`Scope`]. Once the scope releases it,
/// every access fails with `ObjectDisposed`.
pub struct Lease<T> {
    name: Arc<str>,
    slot: Arc<Mutex<Option<T>>>,
}
impl<T> Clone for Lease<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            slot: Arc::clone(&self.slot),
        }
    }
}
impl<T> Lease<T> {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn with<R, F>(&self, f: F) -> Result<R, ErrorCondition>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot.as_mut() {
            Some(resource) => Ok(f(resource)),
            None => {
                Err(
                    ErrorCondition::new(
                            ErrorKind::ObjectDisposed,
                            format!("'{}' was already released", self.name),
                        )
                        .with_attribute("resource", self.name.to_string()),
                )
            }
        }
    }
    pub fn is_released(&self) -> bool {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).is_none()
    }
}
trait Release: Send {
    fn name(&self) -> &str;
    fn release(&mut self) -> Result<(), ErrorCondition>;
}
impl<T: Disposable + Send> Release for Lease<T> {
    fn name(&self) -> &str {
        &self.name
    }
    fn release(&mut self) -> Result<(), ErrorCondition> {
        let taken = self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match taken {
            Some(mut resource) => resource.dispose(),
            None => Ok(()),
        }
    }
}
/// Scoped acquisition: resources are released in reverse order of acquisition on
/// every exit path, before the caller sees the scope's result.
pub struct Scope {
    label: String,
    held: Vec<Box<dyn Release>>,
}
impl Scope {
    pub fn enter<T, F>(label: &str, body: F) -> Result<T, ErrorCondition>
    where
        F: FnOnce(&mut Scope) -> Result<T, ErrorCondition>,
    {
        let mut scope = Scope {
            label: label.to_string(),
            held: Vec::new(),
        };
        let result = body(&mut scope);
        match scope.close() {
            Ok(()) => result,
            Err(raised) => {
                match &result {
                    Err(original) => {
                        warn!(
                            "releasing scope '{}' raised {}, replacing {}", scope.label,
                            raised, original
                        )
                    }
                    Ok(_) => {
                        warn!(
                            "releasing scope '{}' raised {} after the body had completed",
                            scope.label, raised
                        )
                    }
                }
                Err(raised)
            }
        }
    }
    pub fn acquire<T>(&mut self, name: &str, resource: T) -> Lease<T>
    where
        T: Disposable + Send + 'static,
    {
        let lease = Lease {
            name: Arc::from(name),
            slot: Arc::new(Mutex::new(Some(resource))),
        };
        debug!("scope '{}' acquired '{}'", self.label, name);
        self.held.push(Box::new(lease.clone()));
        lease
    }
    /// Nothing is registered when `open` fails.
    pub fn try_acquire<T, F>(&mut self, name: &str, open: F) -> Result<Lease<T>, ErrorCondition>
    where
        T: Disposable + Send + 'static,
        F: FnOnce() -> Result<T, ErrorCondition>,
    {
        let resource = open()?;
        Ok(self.acquire(name, resource))
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn held(&self) -> usize {
        self.held.len()
    }
    fn close(&mut self) -> Result<(), ErrorCondition> {
        let mut last = None;
        while let Some(mut entry) = self.held.pop() {
            debug!("scope '{}' releasing '{}'", self.label, entry.name());
            if let Err(raised) = entry.release() {
                if let Some(previous) = last.replace(raised) {
                    warn!("scope '{}': release failure {} superseded", self.label, previous);
                }
            }
        }
        last.map_or(Ok(()), Err)
    }
}
impl Drop for Scope {
    fn drop(&mut self) {
        if self.held.is_empty() {
            return;
        }
        if let Err(raised) = self.close() {
            error!("scope '{}' failed to release during unwind: {}", self.label, raised);
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HandlerChain;
    use crate::region::ProtectedRegion;
    struct Probe {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }
    impl Disposable for Probe {
        fn dispose(&mut self) -> Result<(), ErrorCondition> {
            self.log.lock().unwrap().push(format!("release {}", self.name));
            if self.fail {
                Err(ErrorCondition::new(ErrorKind::Io, format!("{} refused", self.name)))
            } else {
                Ok(())
            }
        }
    }
    fn probe(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Probe {
        Probe {
            name,
            log: Arc::clone(log),
            fail: false,
        }
    }
    #[test]
    fn test_reverse_release_on_success() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let value = Scope::enter(
                "pair",
                |scope| {
                    scope.acquire("first", probe("first", &log));
                    scope.acquire("second", probe("second", &log));
                    Ok(42)
                },
            )
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(
            * log.lock().unwrap(), vec!["release second".to_string(), "release first"
            .to_string()]
        );
    }
    #[test]
    fn test_release_on_early_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result: Result<(), _> = Scope::enter(
            "early",
            |scope| {
                scope.acquire("first", probe("first", &log));
                scope
                    .try_acquire(
                        "missing",
                        || -> Result<Probe, ErrorCondition> {
                            Err(ErrorCondition::new(ErrorKind::FileNotFound, "missing"))
                        },
                    )?;
                scope.acquire("never", probe("never", &log));
                Ok(())
            },
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::FileNotFound);
        assert_eq!(* log.lock().unwrap(), vec!["release first".to_string()]);
    }
    #[test]
    fn test_lease_disposed_after_scope() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let lease = Scope::enter("escape", |scope| Ok(scope.acquire("kept", probe("kept", &log))))
            .unwrap();
        assert!(lease.is_released());
        let err = lease.with(|p| p.name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectDisposed);
    }
    #[test]
    fn test_release_failure_replaces_result() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let result = Scope::enter(
            "faulty",
            |scope| {
                scope
                    .acquire(
                        "bad",
                        Probe {
                            name: "bad",
                            log: Arc::clone(&log),
                            fail: true,
                        },
                    );
                scope.acquire("good", probe("good", &log));
                Ok("done")
            },
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Io);
        assert_eq!(
            * log.lock().unwrap(), vec!["release good".to_string(), "release bad"
            .to_string()]
        );
    }
    #[test]
    fn test_release_precedes_enclosing_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler_log = Arc::clone(&log);
        let resolution = ProtectedRegion::new("guarded")
            .handler_chain(
                HandlerChain::new()
                    .catch(
                        "io",
                        ErrorKind::Io,
                        move |_| handler_log.lock().unwrap().push("handler".to_string()),
                    ),
            )
            .run(|| {
                Scope::enter(
                    "inner",
                    |scope| -> Result<(), ErrorCondition> {
                        scope.acquire("file", probe("file", &log));
                        Err(ErrorCondition::new(ErrorKind::Io, "disk gone"))
                    },
                )
            })
            .unwrap();
        assert!(resolution.is_recovered());
        assert_eq!(
            * log.lock().unwrap(), vec!["release file".to_string(), "handler".to_string()]
        );
    }
    #[test]
    fn test_lease_survives_poisoned_lock() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scope = Scope {
            label: "poison".to_string(),
            held: Vec::new(),
        };
        let lease = scope.acquire("held", probe("held", &log));
        let poisoner = lease.clone();
        let outcome = std::panic::catch_unwind(
            std::panic::AssertUnwindSafe(|| {
                let _ = poisoner.with(|_| panic!("poisoned while held"));
            }),
        );
        assert!(outcome.is_err());
        assert!(! lease.is_released());
        assert_eq!(lease.with(|p| p.name).unwrap(), "held");
        drop(scope);
        assert!(lease.is_released());
    }
    #[test]
    fn test_release_during_panic() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let panic_log = Arc::clone(&log);
        let outcome = std::panic::catch_unwind(move || {
            let _: Result<(), ErrorCondition> = Scope::enter(
                "panicking",
                |scope| {
                    scope.acquire("held", probe("held", &panic_log));
                    panic!("boom");
                },
            );
        });
        assert!(outcome.is_err());
        assert_eq!(* log.lock().unwrap(), vec!["release held".to_string()]);
    }
}
