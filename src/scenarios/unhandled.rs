use super::catch_order::divide;
use super::{reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{ErrorKind, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion};
use std::sync::Arc;
const SOURCE: &str = "unhandled";
/// Only prepared for a missing receipt file, nothing arithmetic.
pub fn checkout_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("file-not-found", ErrorKind::FileNotFound, reporter(diagnostics, SOURCE))
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Unhandled,
                "a condition no region handles terminates the unit",
            );
            let sink = Arc::clone(&ctx.diagnostics);
            let share = ProtectedRegion::new("checkout")
                .handler_chain(checkout_chain(&ctx.diagnostics))
                .cleanup(move || {
                    sink.info(SOURCE, "checkout released its cart");
                    Ok(())
                })
                .run(|| divide(100, 0))?;
            report.note(format!("unreachable: checkout settled with {:?}", share));
            Ok(report)
        },
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_checkout_only_catches_missing_files() {
        let diagnostics = Arc::new(Diagnostics::new());
        let chain = checkout_chain(&diagnostics);
        assert_eq!(chain.len(), 1);
        let fatal = run_unit(
                "checkout",
                || {
                    ProtectedRegion::new("checkout").handler_chain(chain).run(|| divide(1, 0))
                },
            )
            .unwrap_err();
        assert_eq!(fatal.condition.kind(), ErrorKind::DivisionByZero);
        assert_eq!(fatal.unit, "checkout");
    }
}
