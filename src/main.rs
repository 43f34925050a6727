use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use env_logger::Env;
use log::LevelFilter;
use rescue::config::ConfigValidator;
use rescue::scenarios::{self, ScenarioReport};
use rescue::{RescueConfig, RescueManager, Scenario};
use std::path::{Path, PathBuf};
use std::sync::Arc;
#[derive(Parser, Debug)]
#[command(
    name = "rsc",
    author,
    version,
    about = "Structured error recovery, cleanup and disposal demonstrations",
    long_about = r#"
Rescue - Structured Error Recovery

Runs small programs that raise typed error conditions inside protected regions and
shows which handler recovers them, when cleanup runs, and in which order scoped
resources are released.

EXAMPLES:
  rsc list                          # Show every scenario
  rsc run                           # Run all scenarios (the last one ends fatally)
  rsc run catch-order nested        # Run selected scenarios
  rsc -vv run dispose               # Run with debug logging
  rsc check                         # Validate configuration and handler chains
  rsc settings show                 # Display the effective configuration
  rsc --config ./rescue.json settings init --force

For more information on any command, use: rsc <command> --help
    "#
)]
struct Opt {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        help = "Configuration file to use",
        long_help = "Read settings from this file instead of ~/.rescue/config.json. \
                    A missing file means defaults."
    )]
    config: Option<PathBuf>,
}
#[derive(Subcommand, Debug)]
enum Commands {
    Run {
        #[arg(
            value_name = "SCENARIO",
            help = "Scenarios to run (default: all)",
            long_help = "Names as shown by 'rsc list'. Without names every scenario runs \
                        in catalogue order; 'unhandled' runs last and terminates the \
                        process with the configured fatal exit code."
        )]
        scenarios: Vec<Scenario>,
        #[arg(long, help = "Print reports as JSON")]
        json: bool,
    },
    List,
    Check,
    Settings { #[command(subcommand)] action: SettingsCommand },
}
#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Init {
        #[arg(short, long, help = "Overwrite an existing configuration file")]
        force: bool,
    },
}
fn main() -> Result<()> {
    let opt = Opt::parse();
    let log_level = match opt.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(
            Env::default().default_filter_or(log_level.to_string()),
        )
        .init();
    let config_path = opt.config.unwrap_or_else(RescueConfig::default_path);
    match opt.command {
        Commands::Run { scenarios, json } => {
            handle_run(&config_path, scenarios, json)?;
        }
        Commands::List => {
            handle_list();
        }
        Commands::Check => {
            handle_check(&config_path)?;
        }
        Commands::Settings { action } => {
            handle_settings(&config_path, action)?;
        }
    }
    Ok(())
}
fn print_report(report: &ScenarioReport) {
    println!("== {} ==", report.name);
    println!("{}", report.summary);
    for note in &report.notes {
        println!("  - {}", note);
    }
    println!();
}
fn handle_run(config_path: &Path, selection: Vec<Scenario>, json: bool) -> Result<()> {
    let config = RescueConfig::load(config_path)?;
    let exit_code = config.runtime.fatal_exit_code;
    let manager = RescueManager::new(config)?;
    let selection = if selection.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        selection
    };
    let (reports, fatal) = manager.run_all(&selection);
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        reports.iter().for_each(print_report);
    }
    let reclaimed = manager.shutdown()?;
    if reclaimed > 0 {
        println!("Reclaimer released {} abandoned value(s)", reclaimed);
    }
    if let Some(fatal) = fatal {
        eprintln!("fatal: {}", fatal);
        eprintln!("{}", fatal.condition.user_message());
        std::process::exit(exit_code);
    }
    Ok(())
}
fn handle_list() {
    println!("Available scenarios:");
    for scenario in Scenario::ALL {
        println!("  {:<12} {}", scenario.name(), scenario.description());
    }
}
fn handle_check(config_path: &Path) -> Result<()> {
    let config = RescueConfig::load(config_path)?;
    println!("Rescue Check");
    println!("============");
    println!();
    println!("Configuration: {}", config_path.display());
    let result = ConfigValidator::new().validate_config(&config);
    for error in &result.errors {
        println!("✗ {}: {}", error.field, error.message);
        if let Some(suggestion) = &error.suggestion {
            println!("    {}", suggestion);
        }
    }
    for warning in &result.warnings {
        println!("⚠ {}: {}", warning.field, warning.message);
        if let Some(suggestion) = &warning.suggestion {
            println!("    {}", suggestion);
        }
    }
    if result.errors.is_empty() && result.warnings.is_empty() {
        println!("✓ Configuration is valid");
    }
    println!();
    println!("Handler chains:");
    let diagnostics = Arc::new(rescue::Diagnostics::new());
    for (name, chain_result) in scenarios::check_chains(&diagnostics) {
        if chain_result.warnings.is_empty() {
            println!("✓ {}", name);
        } else {
            println!("⚠ {}", name);
            for warning in &chain_result.warnings {
                println!("    {}: {}", warning.field, warning.message);
            }
        }
    }
    if !result.is_valid {
        std::process::exit(1);
    }
    Ok(())
}
fn handle_settings(config_path: &Path, action: SettingsCommand) -> Result<()> {
    match action {
        SettingsCommand::Show => {
            let config = RescueConfig::load(config_path)?;
            println!("Settings from {}:", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        SettingsCommand::Init { force } => {
            if config_path.exists() && !force {
                println!(
                    "{} already exists; use --force to overwrite", config_path.display()
                );
                return Ok(());
            }
            RescueConfig::default().save(config_path)?;
            println!("Default settings written to {}", config_path.display());
        }
    }
    Ok(())
}
