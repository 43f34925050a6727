use super::files::TrackedFile;
use super::{describe, reporter, Scenario, ScenarioContext, ScenarioReport};
use crate::errors::{ErrorCondition, ErrorKind, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{run_unit, ProtectedRegion};
use std::sync::Arc;
const SOURCE: &str = "catch-order";
pub fn divide(dividend: i64, divisor: i64) -> Result<i64, ErrorCondition> {
    if divisor == 0 {
        return Err(
            ErrorCondition::new(ErrorKind::DivisionByZero, format!("{} / 0", dividend))
                .with_attribute("dividend", dividend),
        );
    }
    dividend
        .checked_div(divisor)
        .ok_or_else(|| {
            ErrorCondition::new(
                ErrorKind::Overflow,
                format!("{} / {}", dividend, divisor),
            )
        })
}
pub fn arithmetic_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("divide-by-zero", ErrorKind::DivisionByZero, reporter(diagnostics, SOURCE))
        .catch("arithmetic", ErrorKind::Arithmetic, reporter(diagnostics, SOURCE))
        .catch("any", ErrorKind::GenericFailure, reporter(diagnostics, SOURCE))
}
pub fn io_chain(diagnostics: &Arc<Diagnostics>) -> HandlerChain {
    HandlerChain::new()
        .catch("directory-not-found", ErrorKind::DirectoryNotFound, reporter(diagnostics, SOURCE))
        .catch("file-not-found", ErrorKind::FileNotFound, reporter(diagnostics, SOURCE))
        .catch("io", ErrorKind::Io, reporter(diagnostics, SOURCE))
        .catch("any", ErrorKind::GenericFailure, reporter(diagnostics, SOURCE))
}
pub fn run(ctx: &ScenarioContext<'_>) -> Result<ScenarioReport, FatalTermination> {
    run_unit(
        SOURCE,
        || {
            let mut report = ScenarioReport::new(
                Scenario::CatchOrder,
                "the first handler accepting the kind or one of its ancestors is selected",
            );
            for (dividend, divisor) in [(10, 0), (i64::MIN, -1), (10, 4)] {
                let resolution = ProtectedRegion::new("divide")
                    .handler_chain(arithmetic_chain(&ctx.diagnostics))
                    .run(|| divide(dividend, divisor))?;
                report.note(format!("{} / {}: {}", dividend, divisor, describe(&resolution)));
            }
            let missing_directory = ctx.scratch_dir.join(&ctx.config.demo.missing_path);
            let missing_file = ctx.scratch_dir.join("absent.txt");
            for path in [missing_directory, missing_file] {
                let resolution = ProtectedRegion::new("open")
                    .handler_chain(io_chain(&ctx.diagnostics))
                    .run(|| TrackedFile::open(&path, &ctx.diagnostics).map(|file| file.display_name()))?;
                report.note(format!("open {}: {}", path.display(), describe(&resolution)));
            }
            Ok(report)
        },
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Resolution;
    #[test]
    fn test_divide() {
        assert_eq!(divide(10, 4).unwrap(), 2);
        assert_eq!(divide(10, 0).unwrap_err().kind(), ErrorKind::DivisionByZero);
        assert_eq!(divide(i64::MIN, - 1).unwrap_err().kind(), ErrorKind::Overflow);
    }
    #[test]
    fn test_arithmetic_chain_selection() {
        let diagnostics = Arc::new(Diagnostics::new());
        let zero = ProtectedRegion::new("divide")
            .handler_chain(arithmetic_chain(&diagnostics))
            .run(|| divide(1, 0))
            .unwrap();
        assert_eq!(zero.handler(), Some("divide-by-zero"));
        let overflow = ProtectedRegion::new("divide")
            .handler_chain(arithmetic_chain(&diagnostics))
            .run(|| divide(i64::MIN, - 1))
            .unwrap();
        assert_eq!(overflow.handler(), Some("arithmetic"));
        let fine = ProtectedRegion::new("divide")
            .handler_chain(arithmetic_chain(&diagnostics))
            .run(|| divide(9, 3))
            .unwrap();
        assert_eq!(fine, Resolution::Completed(3));
    }
}
