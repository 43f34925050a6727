use super::catch_order::divide;
use super::{describe, reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{ErrorCondition, ErrorKind, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion};
use std::sync::Arc;
const SOURCE: &str = "nested";
pub fn multiply(left: i64, right: i64) -> Result<i64, ErrorCondition> {
    left.checked_mul(right)
        .ok_or_else(|| {
            ErrorCondition::new(ErrorKind::Overflow, format!("{} * {}", left, right))
        })
}
pub fn inner_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("divide-by-zero", ErrorKind::DivisionByZero, reporter(diagnostics, SOURCE))
}
pub fn outer_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new().catch("any", ErrorKind::GenericFailure, reporter(diagnostics, SOURCE))
}
fn announce(diagnostics: &Arc<Diagnostics>, message: &'static str) -> impl FnOnce() -> Result<(), ErrorCondition> + Send + 'static {
    let diagnostics = Arc::clone(diagnostics);
    move || {
        diagnostics.info(SOURCE, message);
        Ok(())
    }
}
/// Runs `operation` in an inner region that only knows division by zero, nested in an
/// outer region that accepts anything.
pub fn guarded<F>(diagnostics: &Arc<Diagnostics>, operation: F) -> Result<String, ErrorCondition>
where
    F: FnOnce() -> Result<i64, ErrorCondition>,
{
    let resolution = ProtectedRegion::new("outer")
        .handler_chain(outer_chain(diagnostics))
        .cleanup(announce(diagnostics, "outer cleanup"))
        .run(|| {
            let inner = ProtectedRegion::new("inner")
                .handler_chain(inner_chain(diagnostics))
                .cleanup(announce(diagnostics, "inner cleanup"))
                .run(operation)?;
            Ok(describe(&inner))
        })?;
    Ok(match resolution.completed() {
        Some(inner) => format!("inner {}", inner),
        None => "inner unhandled, outer recovered with 'any'".to_string(),
    })
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Nested,
                "unhandled conditions cross into the enclosing region after the inner cleanup",
            );
            let overflow = guarded(&ctx.diagnostics, || multiply(i64::MAX, 2))?;
            report.note(format!("i64::MAX * 2: {}", overflow));
            let zero = guarded(&ctx.diagnostics, || divide(7, 0))?;
            report.note(format!("7 / 0: {}", zero));
            Ok(report)
        },
    )
}
