use super::catch_order::divide;
use super::{describe, reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{ErrorCondition, ErrorKind, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion};
use crate::runtime::InitCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
const SOURCE: &str = "init";
/// Converts "4,2,5" into per-mille shares `1000 / rate`. A zero rate fails.
pub fn load_rate_table(source: &str) -> Result<Vec<i64>, ErrorCondition> {
    source
        .split(',')
        .map(|raw| {
            let rate: i64 = raw
                .trim()
                .parse()
                .map_err(|_| {
                    ErrorCondition::new(
                            ErrorKind::DomainSpecific,
                            format!("'{}' is not a rate", raw.trim()),
                        )
                        .with_attribute("field", "rate")
                })?;
            divide(1000, rate)
        })
        .collect()
}
pub fn dependent_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("init-failed", ErrorKind::FatalInitialization, reporter(diagnostics, SOURCE))
        .catch("any", ErrorKind::GenericFailure, reporter(diagnostics, SOURCE))
}
/// A consumer of `table`: reads the first share, initializing the table if nobody has.
pub fn consume(
    table: &InitCell<Vec<i64>>,
    source: &str,
    attempts: &AtomicUsize,
) -> Result<i64, ErrorCondition> {
    let shares = table
        .get_or_init(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            load_rate_table(source)
        })?;
    Ok(shares.first().copied().unwrap_or_default())
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Init,
                "one-time initialization caches its failure; dependents are poisoned, not retried",
            );
            let attempts = AtomicUsize::new(0);
            let broken: InitCell<Vec<i64>> = InitCell::new("exchange-rates");
            for consumer in ["billing", "reporting"] {
                let resolution = ProtectedRegion::new(consumer)
                    .handler_chain(dependent_chain(&ctx.diagnostics))
                    .run(|| consume(&broken, "4,0,5", &attempts))?;
                report.note(format!("{}: {}", consumer, describe(&resolution)));
            }
            report
                .note(
                    format!(
                        "exchange-rates initializer ran {} time(s), state {:?}", attempts
                        .load(Ordering::SeqCst), broken.state()
                    ),
                );
            let healthy: InitCell<Vec<i64>> = InitCell::new("tax-rates");
            let resolution = ProtectedRegion::new("payroll")
                .handler_chain(dependent_chain(&ctx.diagnostics))
                .run(|| consume(&healthy, "4,8", &attempts))?;
            report.note(format!("payroll: {}", describe(&resolution)));
            Ok(report)
        },
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_load_rate_table() {
        assert_eq!(load_rate_table("4, 8").unwrap(), vec![250, 125]);
        assert_eq!(load_rate_table("4,0").unwrap_err().kind(), ErrorKind::DivisionByZero);
        assert_eq!(load_rate_table("x").unwrap_err().kind(), ErrorKind::DomainSpecific);
    }
    #[test]
    fn test_dependents_share_one_failed_attempt() {
        let attempts = AtomicUsize::new(0);
        let table: InitCell<Vec<i64>> = InitCell::new("rates");
        for _ in 0..3 {
            let err = consume(&table, "0", &attempts).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::FatalInitialization);
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
