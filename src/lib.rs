use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, sync::Arc};
use tempfile::TempDir;
pub mod config;
pub mod errors;
pub mod monitoring;
pub mod region;
pub mod runtime;
pub mod scenarios;
pub use errors::{ErrorCondition, ErrorKind, FatalTermination, HandlerChain, Outcome};
pub use monitoring::{ConsoleSubscriber, Diagnostics, MemorySubscriber};
pub use region::{run_unit, ProtectedRegion, Reclaimer, Resolution, Scope};
pub use runtime::{InitCell, UnitSupervisor};
pub use scenarios::{Scenario, ScenarioReport};
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RescueConfig {
    pub runtime: RuntimeConfig,
    pub demo: DemoConfig,
    pub diagnostics: DiagnosticsConfig,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub fatal_exit_code: i32,
    pub max_concurrent_units: usize,
    pub reclaimer_enabled: bool,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub status_code: u16,
    pub scratch_dir: Option<PathBuf>,
    pub missing_path: PathBuf,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub console: bool,
}
impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fatal_exit_code: 70,
            max_concurrent_units: UnitSupervisor::default_concurrency(),
            reclaimer_enabled: true,
        }
    }
}
impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            status_code: 404,
            scratch_dir: None,
            missing_path: PathBuf::from("missing/ledger.txt"),
        }
    }
}
impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { console: true }
    }
}
impl RescueConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let config_data = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {:?}", path))?;
        let config = serde_json::from_str(&config_data)
            .with_context(|| format!("invalid config file {:?}", path))?;
        Ok(config)
    }
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {:?}", parent))?;
        }
        let config_data = serde_json::to_string_pretty(self)?;
        fs::write(path, config_data)
            .with_context(|| format!("cannot write config file {:?}", path))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }
        Ok(())
    }
    pub fn default_path() -> PathBuf {
        get_default_home_dir().join("config.json")
    }
}
pub fn get_default_home_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".rescue")
    } else if let Ok(user) = std::env::var("USERPROFILE") {
        PathBuf::from(user).join(".rescue")
    } else {
        PathBuf::from("/tmp/.rescue")
    }
}
enum ScratchDir {
    Temporary(TempDir),
    Fixed(PathBuf),
}
impl ScratchDir {
    fn path(&self) -> &Path {
        match self {
            ScratchDir::Temporary(dir) => dir.path(),
            ScratchDir::Fixed(path) => path,
        }
    }
}
/// Owns everything the scenarios share: configuration, the diagnostics hub, the
/// background reclaimer and a scratch directory.
pub struct RescueManager {
    config: RescueConfig,
    diagnostics: Arc<Diagnostics>,
    reclaimer: Reclaimer,
    scratch: ScratchDir,
}
impl RescueManager {
    pub fn new(config: RescueConfig) -> Result<Self> {
        let mut diagnostics = Diagnostics::new();
        if config.diagnostics.console {
            diagnostics.subscribe(Box::new(ConsoleSubscriber));
        }
        Self::with_diagnostics(config, diagnostics)
    }
    pub fn with_diagnostics(config: RescueConfig, diagnostics: Diagnostics) -> Result<Self> {
        let validation = config::ConfigValidator::new().validate_config(&config);
        for warning in &validation.warnings {
            warn!("{}: {}", warning.field, warning.message);
        }
        if !validation.is_valid {
            let problems: Vec<String> = validation
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            bail!("invalid configuration: {}", problems.join("; "));
        }
        let reclaimer = if config.runtime.reclaimer_enabled {
            Reclaimer::start()?
        } else {
            Reclaimer::disabled()
        };
        let scratch = match &config.demo.scratch_dir {
            Some(path) => {
                fs::create_dir_all(path)
                    .with_context(|| format!("cannot create scratch directory {:?}", path))?;
                ScratchDir::Fixed(path.clone())
            }
            None => {
                ScratchDir::Temporary(
                    tempfile::Builder::new()
                        .prefix("rescue-")
                        .tempdir()
                        .context("cannot create temporary scratch directory")?,
                )
            }
        };
        info!("scratch directory {:?}", scratch.path());
        Ok(Self {
            config,
            diagnostics: Arc::new(diagnostics),
            reclaimer,
            scratch,
        })
    }
    pub fn config(&self) -> &RescueConfig {
        &self.config
    }
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
    fn context(&self) -> scenarios::ScenarioContext<'_> {
        scenarios::ScenarioContext {
            config: &self.config,
            diagnostics: Arc::clone(&self.diagnostics),
            reclaimer: &self.reclaimer,
            scratch_dir: self.scratch.path(),
        }
    }
    /// Runs one scenario and announces how it ended: `Success` for a report, `Error`
    /// for a fatal termination.
    pub fn run(&self, scenario: Scenario) -> Result<ScenarioReport, FatalTermination> {
        let outcome = scenarios::run(scenario, &self.context());
        match &outcome {
            Ok(report) => {
                self.diagnostics
                    .success(scenario.name(), format!("{} note(s)", report.notes.len()))
            }
            Err(fatal) => {
                self.diagnostics
                    .error(
                        &fatal.unit,
                        format!("terminated: {}", fatal.condition.user_message()),
                    )
            }
        }
        outcome
    }
    /// Runs `selection` in order and stops at the first fatal termination, returning
    /// the reports gathered so far alongside it.
    pub fn run_all(
        &self,
        selection: &[Scenario],
    ) -> (Vec<ScenarioReport>, Option<FatalTermination>) {
        let mut reports = Vec::new();
        for scenario in selection {
            match self.run(*scenario) {
                Ok(report) => reports.push(report),
                Err(fatal) => return (reports, Some(fatal)),
            }
        }
        (reports, None)
    }
    /// Stops the reclaimer and returns how many abandoned values it released.
    pub fn shutdown(self) -> Result<usize> {
        let reclaimed = self.reclaimer.shutdown()?;
        debug!("reclaimer released {} value(s)", reclaimed);
        Ok(reclaimed)
    }
}
