use crate::errors::HandlerChain;
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}
pub struct ConfigValidator;
impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }
    pub fn validate_config(&self, config: &crate::RescueConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        self.validate_runtime_config(&config.runtime, &mut errors, &mut warnings);
        self.validate_demo_config(&config.demo, &mut errors, &mut warnings);
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
    fn validate_runtime_config(
        &self,
        config: &crate::RuntimeConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if !(1..=255).contains(&config.fatal_exit_code) {
            errors
                .push(ValidationError {
                    field: "runtime.fatal_exit_code".to_string(),
                    message: format!(
                        "Fatal exit code {} is not a failing process status",
                        config.fatal_exit_code
                    ),
                    suggestion: Some("Use a value between 1-255, e.g. 70".to_string()),
                });
        }
        if config.max_concurrent_units == 0 {
            errors
                .push(ValidationError {
                    field: "runtime.max_concurrent_units".to_string(),
                    message: "At least one unit must be allowed to run".to_string(),
                    suggestion: Some(
                        "Set max_concurrent_units to a value greater than 0".to_string(),
                    ),
                });
        }
        if config.max_concurrent_units > 256 {
            warnings
                .push(ValidationWarning {
                    field: "runtime.max_concurrent_units".to_string(),
                    message: "Very high unit concurrency only adds blocking threads"
                        .to_string(),
                    suggestion: Some("Consider the number of CPU cores".to_string()),
                });
        }
        if !config.reclaimer_enabled {
            warnings
                .push(ValidationWarning {
                    field: "runtime.reclaimer_enabled".to_string(),
                    message: "Abandoned values will be dropped inline".to_string(),
                    suggestion: None,
                });
        }
    }
    fn validate_demo_config(
        &self,
        config: &crate::DemoConfig,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if !(100..=599).contains(&config.status_code) {
            errors
                .push(ValidationError {
                    field: "demo.status_code".to_string(),
                    message: format!("Invalid status code: {}", config.status_code),
                    suggestion: Some("Use a status between 100-599".to_string()),
                });
        }
        if config.missing_path.is_absolute() {
            warnings
                .push(ValidationWarning {
                    field: "demo.missing_path".to_string(),
                    message: "Absolute path ignores the scratch directory".to_string(),
                    suggestion: Some("Use a path relative to the scratch directory".to_string()),
                });
        }
        if let Some(dir) = &config.scratch_dir {
            if dir.exists() && !dir.is_dir() {
                errors
                    .push(ValidationError {
                        field: "demo.scratch_dir".to_string(),
                        message: "Scratch path exists but is not a directory".to_string(),
                        suggestion: Some(
                            "Choose a different path or leave it unset".to_string(),
                        ),
                    });
            }
        }
    }
}
impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
/// Finds handlers that can never be selected because an earlier unguarded entry
/// accepts the same kind or a more general one. Such chains still run; the report
/// is advisory.
pub struct ChainValidator;
impl ChainValidator {
    pub fn new() -> Self {
        Self
    }
    pub fn validate_chain(&self, name: &str, chain: &HandlerChain) -> ValidationResult {
        let mut warnings = Vec::new();
        if chain.is_empty() {
            warnings
                .push(ValidationWarning {
                    field: name.to_string(),
                    message: "Chain has no handlers; every condition propagates".to_string(),
                    suggestion: None,
                });
        }
        let specs = chain.specs();
        for (index, spec) in specs.iter().enumerate() {
            let shadow = specs[..index]
                .iter()
                .enumerate()
                .find(|(_, earlier)| {
                    !earlier.is_guarded() && spec.match_kind().is_a(earlier.match_kind())
                });
            if let Some((earlier_index, earlier)) = shadow {
                warnings
                    .push(ValidationWarning {
                        field: format!("{}[{}]", name, index),
                        message: format!(
                            "Handler '{}' ({}) is unreachable: '{}' ({}) at position {} already catches it",
                            spec.label(), spec.match_kind(), earlier.label(), earlier
                            .match_kind(), earlier_index
                        ),
                        suggestion: Some(
                            format!(
                                "Move '{}' before '{}'", spec.label(), earlier.label()
                            ),
                        ),
                    });
            }
        }
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings,
        }
    }
}
impl Default for ChainValidator {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::path::PathBuf;
    #[test]
    fn test_config_validation() {
        let validator = ConfigValidator::new();
        let mut config = crate::RescueConfig::default();
        config.runtime.fatal_exit_code = 0;
        config.runtime.max_concurrent_units = 0;
        config.demo.status_code = 42;
        config.demo.missing_path = PathBuf::from("/abs/missing.txt");
        let result = validator.validate_config(&config);
        assert!(! result.is_valid);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.warnings.len(), 1);
    }
    #[test]
    fn test_default_config_is_valid() {
        let result = ConfigValidator::new().validate_config(&crate::RescueConfig::default());
        assert!(result.is_valid);
    }
    #[test]
    fn test_misordered_chain_reports_unreachable_handlers() {
        let chain = HandlerChain::new()
            .catch("io", ErrorKind::Io, |_| {})
            .catch("file", ErrorKind::FileNotFound, |_| {})
            .catch("zero", ErrorKind::DivisionByZero, |_| {})
            .catch("any", ErrorKind::GenericFailure, |_| {})
            .catch("disposed", ErrorKind::ObjectDisposed, |_| {});
        let result = ChainValidator::new().validate_chain("mixed", &chain);
        assert!(result.is_valid);
        let fields: Vec<&str> = result.warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["mixed[1]", "mixed[4]"]);
    }
    #[test]
    fn test_guarded_entry_does_not_shadow() {
        let chain = HandlerChain::new()
            .catch_when("server", ErrorKind::DomainSpecific, |_| false, |_| {})
            .catch("domain", ErrorKind::DomainSpecific, |_| {});
        let result = ChainValidator::new().validate_chain("filters", &chain);
        assert!(result.warnings.is_empty());
    }
}
