use super::{describe, reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{
    AttributeValue, Attributes, ErrorCondition, ErrorKind, FatalTermination, HandlerChain,
};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion};
use std::sync::Arc;
const SOURCE: &str = "filters";
/// Stand-in for a remote call answering with `status`.
pub fn fetch(status: u16) -> Result<String, ErrorCondition> {
    if status < 400 {
        return Ok(format!("status {}", status));
    }
    Err(
        ErrorCondition::new(ErrorKind::DomainSpecific, format!("remote answered {}", status))
            .with_status(status),
    )
}
pub fn status_is(expected: i64) -> impl Fn(&Attributes) -> bool + Send + Sync + 'static {
    move |attributes: &Attributes| {
        attributes.get("status").and_then(AttributeValue::as_int) == Some(expected)
    }
}
pub fn status_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch_when(
            "server-error",
            ErrorKind::DomainSpecific,
            status_is(500),
            reporter(diagnostics, SOURCE),
        )
        .catch("domain", ErrorKind::DomainSpecific, reporter(diagnostics, SOURCE))
        .catch("any", ErrorKind::GenericFailure, reporter(diagnostics, SOURCE))
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Filters,
                "a guarded handler is skipped when its predicate rejects the attributes",
            );
            for status in [500, ctx.config.demo.status_code] {
                let resolution = ProtectedRegion::new("fetch")
                    .handler_chain(status_chain(&ctx.diagnostics))
                    .run(|| fetch(status))?;
                report.note(format!("status {}: {}", status, describe(&resolution)));
            }
            Ok(report)
        },
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    fn handler_for(status: u16) -> Option<String> {
        let diagnostics = Arc::new(Diagnostics::new());
        ProtectedRegion::new("fetch")
            .handler_chain(status_chain(&diagnostics))
            .run(|| fetch(status))
            .unwrap()
            .handler()
            .map(str::to_string)
    }
    #[test]
    fn test_guard_selects_by_status() {
        assert_eq!(handler_for(500).as_deref(), Some("server-error"));
        assert_eq!(handler_for(404).as_deref(), Some("domain"));
        assert_eq!(handler_for(200), None);
    }
}
