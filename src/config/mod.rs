pub mod validation;
pub use validation::{
    ChainValidator, ConfigValidator, ValidationError, ValidationResult, ValidationWarning,
};
