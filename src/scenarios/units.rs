use super::catch_order::divide;
use super::init::consume;
use super::{reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{ErrorCondition, ErrorKind, FatalTermination, HandlerChain};
use crate::region::{run_unit, ProtectedRegion};
use crate::runtime::{InitCell, Unit, UnitReport, UnitStatus, UnitSupervisor};
use anyhow::{Context, Result};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
const SOURCE: &str = "units";
pub fn units(ctx: &ScenarioContext<'_>) -> Vec<Unit> {
    let rates: Arc<InitCell<Vec<i64>>> = Arc::new(InitCell::new("exchange-rates"));
    let attempts = Arc::new(AtomicUsize::new(0));
    let ledger_chain = HandlerChain::new()
        .catch("any", ErrorKind::GenericFailure, reporter(&ctx.diagnostics, SOURCE));
    let mut units = vec![
        Unit::new("ledger", move || {
            ProtectedRegion::new("ledger").handler_chain(ledger_chain).run(|| divide(10, 0))?;
            Ok(())
        }),
        Unit::new("auditor", || {
            divide(1, 0)?;
            Ok(())
        }),
    ];
    for name in ["billing", "reporting"] {
        let rates = Arc::clone(&rates);
        let attempts = Arc::clone(&attempts);
        units.push(Unit::new(name, move || {
            consume(&rates, "3,0", &attempts)?;
            Ok(())
        }));
    }
    units.push(Unit::new("archiver", || divide(100, 4).map(|_| ())));
    units
}
fn summarize(report: &UnitReport) -> String {
    match &report.status {
        UnitStatus::Completed => format!("{}: completed", report.name),
        UnitStatus::Terminated(condition) => {
            format!("{}: terminated by unhandled {}", report.name, condition)
        }
        UnitStatus::Panicked(message) => format!("{}: panicked ({})", report.name, message),
    }
}
/// Drives `units` on a runtime owned by a dedicated thread, so callers may already be
/// inside a tokio runtime.
fn supervise(supervisor: UnitSupervisor, units: Vec<Unit>) -> Result<Vec<UnitReport>> {
    let driver = std::thread::Builder::new()
        .name("units".to_string())
        .spawn(move || -> Result<Vec<UnitReport>> {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .context("cannot build unit runtime")?;
            runtime.block_on(supervisor.run(units))
        })
        .context("failed to spawn unit driver thread")?;
    driver.join().map_err(|_| anyhow::anyhow!("unit driver thread panicked"))?
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Units,
                "each unit evaluates its own chains; a fatal termination ends only that unit",
            );
            let supervisor = UnitSupervisor::new(ctx.config.runtime.max_concurrent_units);
            let reports = supervise(supervisor, units(ctx))
                .map_err(|e| ErrorCondition::new(ErrorKind::GenericFailure, format!("{e:#}")))?;
            for unit in &reports {
                report.note(summarize(unit));
            }
            let survivors = reports.iter().filter(|unit| unit.completed()).count();
            report.note(format!("{} of {} units completed", survivors, reports.len()));
            Ok(report)
        },
    )
}
