use super::{describe, reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::config::ChainValidator;
use crate::errors::{ErrorCondition, ErrorKind, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion};
use log::warn;
use std::sync::Arc;
const SOURCE: &str = "ordering";
/// Deliberately general-first: everything after `any` is dead.
pub fn misordered_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("any", ErrorKind::GenericFailure, reporter(diagnostics, SOURCE))
        .catch("io", ErrorKind::Io, reporter(diagnostics, SOURCE))
        .catch("file-not-found", ErrorKind::FileNotFound, reporter(diagnostics, SOURCE))
        .catch("directory-not-found", ErrorKind::DirectoryNotFound, reporter(diagnostics, SOURCE))
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Ordering,
                "handler order is a design decision; a misordered chain still runs",
            );
            let chain = misordered_chain(&ctx.diagnostics);
            let validation = ChainValidator::new().validate_chain("misordered", &chain);
            for warning in &validation.warnings {
                warn!("{}: {}", warning.field, warning.message);
                report.note(warning.message.clone());
            }
            let resolution = ProtectedRegion::new("lookup")
                .handler_chain(chain)
                .run(|| -> Result<(), ErrorCondition> {
                    Err(
                        ErrorCondition::new(ErrorKind::DirectoryNotFound, "archive/2019 is gone")
                            .with_attribute("path", "archive/2019/ledger.txt"),
                    )
                })?;
            report.note(format!("DirectoryNotFound: {}", describe(&resolution)));
            Ok(report)
        },
    )
}
