use super::files::TrackedFile;
use super::{describe, reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{ErrorKind, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion, Resolution, Scope};
use std::sync::Arc;
const SOURCE: &str = "dispose";
pub fn disposal_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("disposed", ErrorKind::ObjectDisposed, reporter(diagnostics, SOURCE))
        .catch("directory-not-found", ErrorKind::DirectoryNotFound, reporter(diagnostics, SOURCE))
        .catch("file-not-found", ErrorKind::FileNotFound, reporter(diagnostics, SOURCE))
        .catch("io", ErrorKind::Io, reporter(diagnostics, SOURCE))
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::Dispose,
                "scoped resources are released in reverse order on every exit path",
            );
            let diagnostics = &ctx.diagnostics;
            let ledger_path = ctx.scratch_dir.join("ledger.txt");
            let audit_path = ctx.scratch_dir.join("audit.txt");
            let written = ProtectedRegion::new("write-ledger")
                .handler_chain(disposal_chain(diagnostics))
                .run(|| {
                    Scope::enter(
                        "ledger",
                        |scope| {
                            let ledger = scope
                                .try_acquire("ledger", || TrackedFile::create(&ledger_path, diagnostics))?;
                            let audit = scope
                                .try_acquire("audit", || TrackedFile::create(&audit_path, diagnostics))?;
                            ledger.with(|file| file.write_line("credit 100"))??;
                            audit.with(|file| file.write_line("ledger credited"))??;
                            Ok(ledger)
                        },
                    )
                })?;
            let content = ProtectedRegion::new("reopen-ledger")
                .handler_chain(disposal_chain(diagnostics))
                .run(|| {
                    Scope::enter(
                        "reopen",
                        |scope| {
                            scope
                                .try_acquire("ledger", || TrackedFile::open(&ledger_path, diagnostics))?
                                .with(|file| file.read_to_string())?
                        },
                    )
                })?;
            report.note(format!("reopened ledger right after the scope: {}", describe(&content)));
            if let Resolution::Completed(lease) = written {
                let late = ProtectedRegion::new("late-write")
                    .handler_chain(disposal_chain(diagnostics))
                    .run(|| lease.with(|file| file.write_line("debit 5"))?)?;
                report.note(format!("writing through an escaped lease: {}", describe(&late)));
            }
            let missing = ctx.scratch_dir.join(&ctx.config.demo.missing_path);
            let partial = ProtectedRegion::new("partial-acquire")
                .handler_chain(disposal_chain(diagnostics))
                .run(|| {
                    Scope::enter(
                        "partial",
                        |scope| {
                            scope
                                .try_acquire("audit", || TrackedFile::create(&audit_path, diagnostics))?;
                            scope.try_acquire("missing", || TrackedFile::open(&missing, diagnostics))?;
                            Ok(())
                        },
                    )
                })?;
            report
                .note(
                    format!(
                        "failed acquisition after a successful one: {}", describe(& partial)
                    ),
                );
            let orphan = TrackedFile::create(&ctx.scratch_dir.join("orphan.txt"), diagnostics)?;
            let queued = ctx.reclaimer.abandon("orphan.txt", orphan);
            report
                .note(
                    format!(
                        "orphan.txt abandoned without release ({}); its handle closes whenever the reclaimer gets to it",
                        if queued { "queued for background reclamation" } else {
                        "dropped inline" }
                    ),
                );
            Ok(report)
        },
    )
}
