use crate::errors::{evaluate, ErrorCondition, FatalTermination, HandlerChain, Outcome};
use log::{debug, error, warn};
pub type CleanupAction = Box<dyn FnOnce() -> Result<(), ErrorCondition> + Send>;
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Completed(T),
    Recovered { region: String, handler: String },
}
impl<T> Resolution<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Resolution::Completed(value) => Some(value),
            Resolution::Recovered { .. } => None,
        }
    }
    pub fn is_recovered(&self) -> bool {
        matches!(self, Resolution::Recovered { .. })
    }
    pub fn handler(&self) -> Option<&str> {
        match self {
            Resolution::Recovered { handler, .. } => Some(handler),
            Resolution::Completed(_) => None,
        }
    }
}
/// A block of logic guarded by a handler chain and an optional cleanup action.
///
/// Regions nest by calling [`ProtectedRegion::run`] inside another region's body and
/// forwarding the inner result with `?`: whatever the inner chain leaves unhandled
/// becomes the input of the outer chain, after the inner cleanup has run.
pub struct ProtectedRegion {
    name: String,
    chain: HandlerChain,
    cleanup: Option<CleanupAction>,
}
impl ProtectedRegion {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            chain: HandlerChain::new(),
            cleanup: None,
        }
    }
    pub fn handler_chain(mut self, chain: HandlerChain) -> Self {
        self.chain = chain;
        self
    }
    pub fn cleanup<F>(mut self, action: F) -> Self
    where
        F: FnOnce() -> Result<(), ErrorCondition> + Send + 'static,
    {
        self.cleanup = Some(Box::new(action));
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }
    pub fn run<T, F>(self, body: F) -> Result<Resolution<T>, ErrorCondition>
    where
        F: FnOnce() -> Result<T, ErrorCondition>,
    {
        let ProtectedRegion { name, chain, cleanup } = self;
        let guard = CleanupGuard {
            region: name.clone(),
            action: cleanup,
        };
        let result = match body() {
            Ok(value) => Ok(Resolution::Completed(value)),
            Err(condition) => {
                match evaluate(condition, &chain) {
                    Outcome::Handled { label, .. } => {
                        Ok(Resolution::Recovered {
                            region: name.clone(),
                            handler: label,
                        })
                    }
                    Outcome::Unhandled(condition) => {
                        debug!("{} propagating out of region '{}'", condition, name);
                        Err(condition)
                    }
                }
            }
        };
        match guard.finish() {
            Ok(()) => result,
            Err(raised) => {
                match &result {
                    Err(original) => {
                        warn!(
                            "cleanup of region '{}' raised {}, replacing propagating {}",
                            name, raised, original
                        )
                    }
                    Ok(_) => {
                        warn!(
                            "cleanup of region '{}' raised {} after the region had settled",
                            name, raised
                        )
                    }
                }
                Err(raised)
            }
        }
    }
}
impl std::fmt::Debug for ProtectedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedRegion")
            .field("name", &self.name)
            .field("chain", &self.chain)
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}
/// Holds the cleanup action so that a panicking body still releases the region.
struct CleanupGuard {
    region: String,
    action: Option<CleanupAction>,
}
impl CleanupGuard {
    fn finish(mut self) -> Result<(), ErrorCondition> {
        match self.action.take() {
            Some(action) => {
                debug!("running cleanup of region '{}'", self.region);
                action()
            }
            None => Ok(()),
        }
    }
}
impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            debug!("running cleanup of region '{}' during unwind", self.region);
            if let Err(raised) = action() {
                error!("cleanup of region '{}' failed during unwind: {}", self.region, raised);
            }
        }
    }
}
/// Runs the outermost level of a unit of execution. A condition still propagating here
/// has no enclosing region left and becomes a fatal termination of `unit`.
pub fn run_unit<T, F>(unit: &str, body: F) -> Result<T, FatalTermination>
where
    F: FnOnce() -> Result<T, ErrorCondition>,
{
    body()
        .map_err(|condition| {
            error!("unit '{}' terminated: unhandled {}", unit, condition);
            FatalTermination {
                unit: unit.to_string(),
                condition,
            }
        })
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    fn counted_region(counter: &Arc<AtomicUsize>) -> ProtectedRegion {
        let counter = Arc::clone(counter);
        ProtectedRegion::new("counted")
            .handler_chain(
                HandlerChain::new().catch("zero", ErrorKind::DivisionByZero, |_| {}),
            )
            .cleanup(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
    }
    #[test]
    fn test_cleanup_runs_once_per_exit_path() {
        let counter = Arc::new(AtomicUsize::new(0));
        let completed = counted_region(&counter).run(|| Ok::<_, ErrorCondition>(7));
        assert_eq!(completed.unwrap(), Resolution::Completed(7));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let handled = counted_region(&counter)
            .run(|| -> Result<(), ErrorCondition> {
                Err(ErrorCondition::new(ErrorKind::DivisionByZero, "1 / 0"))
            });
        assert!(handled.unwrap().is_recovered());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        let propagated = counted_region(&counter)
            .run(|| -> Result<(), ErrorCondition> {
                Err(ErrorCondition::new(ErrorKind::FileNotFound, "gone"))
            });
        assert_eq!(propagated.unwrap_err().kind(), ErrorKind::FileNotFound);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
    #[test]
    fn test_cleanup_condition_replaces_propagating_one() {
        let result = ProtectedRegion::new("hazard")
            .cleanup(|| Err(ErrorCondition::new(ErrorKind::InvalidOperation, "close")))
            .run(|| -> Result<(), ErrorCondition> {
                Err(ErrorCondition::new(ErrorKind::DivisionByZero, "1 / 0"))
            });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidOperation);
    }
    #[test]
    fn test_cleanup_runs_when_body_panics() {
        let counter = Arc::new(AtomicUsize::new(0));
        let region = counted_region(&counter);
        let outcome = std::panic::catch_unwind(
            std::panic::AssertUnwindSafe(|| {
                let _ = region.run(|| -> Result<(), ErrorCondition> { panic!("boom") });
            }),
        );
        assert!(outcome.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
    #[test]
    fn test_inner_cleanup_precedes_outer_handler() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let outer_trace = Arc::clone(&trace);
        let outer = ProtectedRegion::new("outer")
            .handler_chain(
                HandlerChain::new()
                    .catch(
                        "any",
                        ErrorKind::GenericFailure,
                        move |c| {
                            outer_trace.lock().unwrap().push(format!("outer handler {}", c.kind()))
                        },
                    ),
            );
        let inner_trace = Arc::clone(&trace);
        let resolution = outer
            .run(|| {
                let inner = ProtectedRegion::new("inner")
                    .handler_chain(
                        HandlerChain::new().catch("zero", ErrorKind::DivisionByZero, |_| {}),
                    )
                    .cleanup(move || {
                        inner_trace.lock().unwrap().push("inner cleanup".to_string());
                        Ok(())
                    });
                inner
                    .run(|| -> Result<(), ErrorCondition> {
                        Err(ErrorCondition::new(ErrorKind::Arithmetic, "bad operand"))
                    })?;
                Ok(())
            })
            .unwrap();
        assert_eq!(resolution.handler(), Some("any"));
        assert_eq!(
            * trace.lock().unwrap(), vec!["inner cleanup".to_string(),
            "outer handler Arithmetic".to_string()]
        );
    }
    #[test]
    fn test_run_unit_turns_propagation_into_fatal() {
        let fatal = run_unit(
                "worker",
                || {
                    ProtectedRegion::new("only")
                        .handler_chain(
                            HandlerChain::new().catch("file", ErrorKind::FileNotFound, |_| {}),
                        )
                        .run(|| -> Result<(), ErrorCondition> {
                            Err(ErrorCondition::new(ErrorKind::DivisionByZero, "1 / 0"))
                        })
                },
            )
            .unwrap_err();
        assert_eq!(fatal.unit, "worker");
        assert_eq!(fatal.condition.kind(), ErrorKind::DivisionByZero);
    }
    #[test]
    fn test_fatal_after_every_level_misses() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let outer_trace = Arc::clone(&trace);
        let inner_trace = Arc::clone(&trace);
        let fatal = run_unit(
                "worker",
                || {
                    ProtectedRegion::new("outer")
                        .handler_chain(
                            HandlerChain::new().catch("io", ErrorKind::Io, |_| {}),
                        )
                        .cleanup(move || {
                            outer_trace.lock().unwrap().push("outer cleanup".to_string());
                            Ok(())
                        })
                        .run(|| {
                            ProtectedRegion::new("inner")
                                .handler_chain(
                                    HandlerChain::new()
                                        .catch("disposed", ErrorKind::ObjectDisposed, |_| {}),
                                )
                                .cleanup(move || {
                                    inner_trace.lock().unwrap().push("inner cleanup".to_string());
                                    Ok(())
                                })
                                .run(|| -> Result<(), ErrorCondition> {
                                    Err(ErrorCondition::new(ErrorKind::Overflow, "i64::MAX + 1"))
                                })
                        })
                },
            )
            .unwrap_err();
        assert_eq!(fatal.condition.kind(), ErrorKind::Overflow);
        assert_eq!(
            * trace.lock().unwrap(), vec!["inner cleanup".to_string(), "outer cleanup"
            .to_string()]
        );
    }
}
