use crate::errors::{ErrorCondition, ErrorKind};
use super::units::panic_message;
use log::{error, info};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Ready,
    Failed,
}
/// One-time initialization whose outcome, success or failure, is cached for the
/// lifetime of the cell. Usable as a `static`.
///
/// A failed or panicking initializer is never retried: every later caller receives a
/// `FatalInitialization` condition describing the original cause.
pub struct InitCell<T> {
    name: &'static str,
    cell: OnceLock<Result<T, ErrorCondition>>,
}
impl<T> InitCell<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, cell: OnceLock::new() }
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn get_or_init<F>(&self, init: F) -> Result<&T, ErrorCondition>
    where
        F: FnOnce() -> Result<T, ErrorCondition>,
    {
        let outcome = self
            .cell
            .get_or_init(|| {
                info!("initializing '{}'", self.name);
                let outcome = panic::catch_unwind(AssertUnwindSafe(init))
                    .unwrap_or_else(|payload| {
                        Err(
                            ErrorCondition::new(
                                ErrorKind::GenericFailure,
                                format!("initializer panicked: {}", panic_message(payload)),
                            ),
                        )
                    });
                if let Err(cause) = &outcome {
                    error!("initialization of '{}' failed: {}", self.name, cause);
                }
                outcome
            });
        match outcome {
            Ok(value) => Ok(value),
            Err(cause) => Err(self.poisoned(cause)),
        }
    }
    /// Reads the cached value without ever running an initializer.
    pub fn get(&self) -> Option<Result<&T, ErrorCondition>> {
        self.cell
            .get()
            .map(|outcome| match outcome {
                Ok(value) => Ok(value),
                Err(cause) => Err(self.poisoned(cause)),
            })
    }
    pub fn state(&self) -> InitState {
        match self.cell.get() {
            None => InitState::Uninitialized,
            Some(Ok(_)) => InitState::Ready,
            Some(Err(_)) => InitState::Failed,
        }
    }
    fn poisoned(&self, cause: &ErrorCondition) -> ErrorCondition {
        ErrorCondition::new(
                ErrorKind::FatalInitialization,
                format!("'{}' failed to initialize: {}", self.name, cause.message()),
            )
            .with_attribute("unit", self.name)
            .with_attribute("cause_kind", cause.kind().name())
            .with_attribute("cause_message", cause.message())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    static RATES: InitCell<Vec<u32>> = InitCell::new("rates");
    #[test]
    fn test_success_is_cached() {
        let calls = AtomicUsize::new(0);
        let cell: InitCell<u32> = InitCell::new("answer");
        for _ in 0..3 {
            let value = cell
                .get_or_init(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .unwrap();
            assert_eq!(* value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.state(), InitState::Ready);
    }
    #[test]
    fn test_failure_poisons_every_dependent() {
        let calls = AtomicUsize::new(0);
        let cell: InitCell<u32> = InitCell::new("broken");
        for _ in 0..2 {
            let err = cell
                .get_or_init(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ErrorCondition::new(ErrorKind::DivisionByZero, "rate / 0"))
                })
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::FatalInitialization);
            assert_eq!(
                err.attribute("cause_kind").and_then(| v | v.as_text()),
                Some("DivisionByZero")
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.state(), InitState::Failed);
        assert!(cell.get().unwrap().is_err());
    }
    #[test]
    fn test_panicking_initializer_is_not_rerun() {
        let calls = AtomicUsize::new(0);
        let cell: InitCell<u32> = InitCell::new("exploding");
        let first = cell
            .get_or_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                panic!("rate table corrupt")
            })
            .unwrap_err();
        assert_eq!(first.kind(), ErrorKind::FatalInitialization);
        assert_eq!(
            first.attribute("cause_kind").and_then(| v | v.as_text()),
            Some("GenericFailure")
        );
        let second = cell
            .get_or_init(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(5)
            })
            .unwrap_err();
        assert_eq!(second.kind(), ErrorKind::FatalInitialization);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cell.state(), InitState::Failed);
    }
    #[test]
    fn test_static_cell() {
        let rates = RATES.get_or_init(|| Ok(vec![1, 2, 3])).unwrap();
        assert_eq!(rates.len(), 3);
        assert_eq!(RATES.name(), "rates");
    }
}
