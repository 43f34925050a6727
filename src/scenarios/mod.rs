//! Small programs exercising the recovery machinery, one behavior each.
//!
//! Every scenario runs as its own unit: anything it leaves unhandled comes back as a
//! [`FatalTermination`] instead of a report.
use crate::config::{ChainValidator, ValidationResult};
use crate::errors::{ErrorCondition, FatalTermination, HandlerChain};
use crate::monitoring::Diagnostics;
use crate::region::{Reclaimer, Resolution};
use crate::RescueConfig;
use log::info;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
pub mod catch_order;
pub mod cleanup;
pub mod dispose;
pub mod files;
pub mod filters;
pub mod init;
pub mod nested;
pub mod ordering;
pub mod unhandled;
pub mod units;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    CatchOrder,
    Filters,
    Nested,
    Cleanup,
    Dispose,
    Ordering,
    Init,
    Units,
    Unhandled,
}
impl Scenario {
    /// Catalogue order. `Unhandled` comes last because it ends the run.
    pub const ALL: [Scenario; 9] = [
        Scenario::CatchOrder,
        Scenario::Filters,
        Scenario::Nested,
        Scenario::Cleanup,
        Scenario::Dispose,
        Scenario::Ordering,
        Scenario::Init,
        Scenario::Units,
        Scenario::Unhandled,
    ];
    pub fn name(self) -> &'static str {
        match self {
            Scenario::CatchOrder => "catch-order",
            Scenario::Filters => "filters",
            Scenario::Nested => "nested",
            Scenario::Cleanup => "cleanup",
            Scenario::Dispose => "dispose",
            Scenario::Ordering => "ordering",
            Scenario::Init => "init",
            Scenario::Units => "units",
            Scenario::Unhandled => "unhandled",
        }
    }
    pub fn description(self) -> &'static str {
        match self {
            Scenario::CatchOrder => {
                "Most specific handler wins for arithmetic and file-open failures"
            }
            Scenario::Filters => "Status predicates pick between handlers of the same kind",
            Scenario::Nested => "Inner region misses, inner cleanup runs, outer region recovers",
            Scenario::Cleanup => {
                "Cleanup runs once on completion, recovery and propagation; a failing cleanup replaces the condition"
            }
            Scenario::Dispose => {
                "Scoped resources release in reverse order before anyone observes the exit"
            }
            Scenario::Ordering => "A general handler placed first makes later handlers unreachable",
            Scenario::Init => "A failed one-time initialization poisons every dependent",
            Scenario::Units => "Independent units terminate alone",
            Scenario::Unhandled => "No handler anywhere: the run terminates abnormally",
        }
    }
}
impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
impl FromStr for Scenario {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Scenario::ALL.iter().map(|s| s.name()).collect();
                format!("unknown scenario '{}', expected one of: {}", s, names.join(", "))
            })
    }
}
pub struct ScenarioContext<'a> {
    pub config: &'a RescueConfig,
    pub diagnostics: Arc<Diagnostics>,
    pub reclaimer: &'a Reclaimer,
    pub scratch_dir: &'a Path,
}
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub summary: String,
    pub notes: Vec<String>,
}
impl ScenarioReport {
    pub fn new(scenario: Scenario, summary: &str) -> Self {
        Self {
            name: scenario.name().to_string(),
            summary: summary.to_string(),
            notes: Vec::new(),
        }
    }
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}
pub fn run(
    scenario: Scenario,
    ctx: &ScenarioContext<'_>,
) -> Result<ScenarioReport, FatalTermination> {
    info!("running scenario '{}'", scenario);
    match scenario {
        Scenario::CatchOrder => catch_order::run(ctx),
        Scenario::Filters => filters::run(ctx),
        Scenario::Nested => nested::run(ctx),
        Scenario::Cleanup => cleanup::run(ctx),
        Scenario::Dispose => dispose::run(ctx),
        Scenario::Ordering => ordering::run(ctx),
        Scenario::Init => init::run(ctx),
        Scenario::Units => units::run(ctx),
        Scenario::Unhandled => unhandled::run(ctx),
    }
}
/// Every handler chain the scenarios install, by name.
pub fn catalog(diagnostics: &Arc<Diagnostics>) -> Vec<(String, HandlerChain)> {
    vec![
        ("catch-order/arithmetic".to_string(), catch_order::arithmetic_chain(diagnostics)),
        ("catch-order/io".to_string(), catch_order::io_chain(diagnostics)),
        ("filters/status".to_string(), filters::status_chain(diagnostics)),
        ("nested/inner".to_string(), nested::inner_chain(diagnostics)),
        ("nested/outer".to_string(), nested::outer_chain(diagnostics)),
        ("cleanup/guarded".to_string(), cleanup::guarded_chain(diagnostics)),
        ("cleanup/hazard".to_string(), cleanup::hazard_chain(diagnostics)),
        ("dispose/disposal".to_string(), dispose::disposal_chain(diagnostics)),
        ("ordering/misordered".to_string(), ordering::misordered_chain(diagnostics)),
        ("init/dependent".to_string(), init::dependent_chain(diagnostics)),
        ("unhandled/checkout".to_string(), unhandled::checkout_chain(diagnostics)),
    ]
}
pub fn check_chains(diagnostics: &Arc<Diagnostics>) -> Vec<(String, ValidationResult)> {
    let validator = ChainValidator::new();
    catalog(diagnostics)
        .into_iter()
        .map(|(name, chain)| {
            let result = validator.validate_chain(&name, &chain);
            (name, result)
        })
        .collect()
}
/// Handler action emitting the per-kind diagnostic for whatever it recovers.
pub fn reporter(
    diagnostics: &Arc<Diagnostics>,
    source: &'static str,
) -> impl Fn(&ErrorCondition) + Send + Sync + 'static {
    let diagnostics = Arc::clone(diagnostics);
    move |condition: &ErrorCondition| diagnostics.handled(source, condition)
}
pub fn describe<T: std::fmt::Debug>(resolution: &Resolution<T>) -> String {
    match resolution {
        Resolution::Completed(value) => format!("completed with {:?}", value),
        Resolution::Recovered { region, handler } => {
            format!("recovered by '{}' in region '{}'", handler, region)
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_scenario_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::< Scenario > ().unwrap(), scenario);
        }
        assert!("bogus".parse::< Scenario > ().is_err());
    }
    #[test]
    fn test_only_the_ordering_demo_has_unreachable_handlers() {
        let diagnostics = Arc::new(Diagnostics::new());
        for (name, result) in check_chains(&diagnostics) {
            if name == "ordering/misordered" {
                assert_eq!(result.warnings.len(), 3);
            } else {
                assert!(result.warnings.is_empty(), "{} has warnings", name);
            }
        }
    }
}
