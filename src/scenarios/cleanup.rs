use super::catch_order::divide;
use super::{describe, reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{ErrorCondition, ErrorKind, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
const SOURCE: &str = "cleanup";
pub fn guarded_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("divide-by-zero", ErrorKind::DivisionByZero, reporter(diagnostics, SOURCE))
}
pub fn hazard_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("invalid-operation", ErrorKind::InvalidOperation, reporter(diagnostics, SOURCE))
        .catch("arithmetic", ErrorKind::Arithmetic, reporter(diagnostics, SOURCE))
        .catch("any", ErrorKind::GenericFailure, reporter(diagnostics, SOURCE))
}
/// The same region definition for every exit path; `runs` counts cleanups.
pub fn counted_region(
    name: &str,
    diagnostics: &Arc<Diagnostics>,
    runs: &Arc<AtomicUsize>,
) -> ProtectedRegion {
    let runs = Arc::clone(runs);
    let sink = Arc::clone(diagnostics);
    let label = name.to_string();
    ProtectedRegion::new(name)
        .handler_chain(guarded_chain(diagnostics))
        .cleanup(move || {
            let count = runs.fetch_add(1, Ordering::SeqCst) + 1;
            sink.info(SOURCE, format!("cleanup of '{}' (run {})", label, count));
            Ok(())
        })
}
fn read_ledger() -> Result<i64, ErrorCondition> {
    Err(ErrorCondition::new(ErrorKind::Io, "ledger device not ready"))
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Cleanup,
                "cleanup runs exactly once on every exit path",
            );
            let runs = Arc::new(AtomicUsize::new(0));
            let completed = counted_region("completes", &ctx.diagnostics, &runs)
                .run(|| divide(10, 2))?;
            report.note(format!("normal exit: {}", describe(&completed)));
            let recovered = counted_region("recovers", &ctx.diagnostics, &runs)
                .run(|| divide(10, 0))?;
            report.note(format!("handled exit: {}", describe(&recovered)));
            let propagated = ProtectedRegion::new("enclosing")
                .handler_chain(hazard_chain(&ctx.diagnostics))
                .run(|| {
                    counted_region("propagates", &ctx.diagnostics, &runs).run(read_ledger)?;
                    Ok(())
                })?;
            report.note(format!("propagating exit: {}", describe(&propagated)));
            report
                .note(
                    format!(
                        "cleanup ran {} time(s) for 3 exits", runs.load(Ordering::SeqCst)
                    ),
                );
            let replaced = ProtectedRegion::new("enclosing")
                .handler_chain(hazard_chain(&ctx.diagnostics))
                .run(|| {
                    ProtectedRegion::new("closing")
                        .cleanup(|| {
                            Err(
                                ErrorCondition::new(
                                    ErrorKind::InvalidOperation,
                                    "ledger closed twice",
                                ),
                            )
                        })
                        .run(|| divide(1, 0))?;
                    Ok(())
                })?;
            report
                .note(
                    format!(
                        "cleanup raising during propagation: {} (the DivisionByZero was replaced)",
                        describe(& replaced)
                    ),
                );
            Ok(report)
        },
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_three_exits_three_cleanups() {
        let diagnostics = Arc::new(Diagnostics::new());
        let runs = Arc::new(AtomicUsize::new(0));
        counted_region("a", &diagnostics, &runs).run(|| divide(4, 2)).unwrap();
        counted_region("b", &diagnostics, &runs).run(|| divide(4, 0)).unwrap();
        let err = counted_region("c", &diagnostics, &runs).run(read_ledger).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
