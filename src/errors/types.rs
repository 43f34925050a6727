use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;
/// Error categories. Specialization is explicit, see [`ErrorKind::parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    GenericFailure,
    Arithmetic,
    DivisionByZero,
    Overflow,
    Io,
    FileNotFound,
    DirectoryNotFound,
    AccessConflict,
    DomainSpecific,
    InvalidOperation,
    ObjectDisposed,
    FatalInitialization,
}
/// Immediate parent of every non-root kind.
const SPECIALIZES: &[(ErrorKind, ErrorKind)] = &[
    (ErrorKind::Arithmetic, ErrorKind::GenericFailure),
    (ErrorKind::DivisionByZero, ErrorKind::Arithmetic),
    (ErrorKind::Overflow, ErrorKind::Arithmetic),
    (ErrorKind::Io, ErrorKind::GenericFailure),
    (ErrorKind::FileNotFound, ErrorKind::Io),
    (ErrorKind::DirectoryNotFound, ErrorKind::FileNotFound),
    (ErrorKind::AccessConflict, ErrorKind::Io),
    (ErrorKind::DomainSpecific, ErrorKind::GenericFailure),
    (ErrorKind::InvalidOperation, ErrorKind::GenericFailure),
    (ErrorKind::ObjectDisposed, ErrorKind::InvalidOperation),
    (ErrorKind::FatalInitialization, ErrorKind::GenericFailure),
];
impl ErrorKind {
    pub const ALL: [ErrorKind; 12] = [
        ErrorKind::GenericFailure,
        ErrorKind::Arithmetic,
        ErrorKind::DivisionByZero,
        ErrorKind::Overflow,
        ErrorKind::Io,
        ErrorKind::FileNotFound,
        ErrorKind::DirectoryNotFound,
        ErrorKind::AccessConflict,
        ErrorKind::DomainSpecific,
        ErrorKind::InvalidOperation,
        ErrorKind::ObjectDisposed,
        ErrorKind::FatalInitialization,
    ];
    pub fn parent(self) -> Option<ErrorKind> {
        SPECIALIZES.iter().find(|(child, _)| *child == self).map(|(_, parent)| *parent)
    }
    /// True when `self` equals `ancestor` or specializes it through any number of steps.
    pub fn is_a(self, ancestor: ErrorKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == ancestor {
                return true;
            }
            current = kind.parent();
        }
        false
    }
    pub fn depth(self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(kind) = current {
            depth += 1;
            current = kind.parent();
        }
        depth
    }
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::GenericFailure => "GenericFailure",
            ErrorKind::Arithmetic => "Arithmetic",
            ErrorKind::DivisionByZero => "DivisionByZero",
            ErrorKind::Overflow => "Overflow",
            ErrorKind::Io => "Io",
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::DirectoryNotFound => "DirectoryNotFound",
            ErrorKind::AccessConflict => "AccessConflict",
            ErrorKind::DomainSpecific => "DomainSpecific",
            ErrorKind::InvalidOperation => "InvalidOperation",
            ErrorKind::ObjectDisposed => "ObjectDisposed",
            ErrorKind::FatalInitialization => "FatalInitialization",
        }
    }
}
impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Bool(bool),
    Text(String),
}
impl AttributeValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }
}
impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Int(value) => write!(f, "{}", value),
            AttributeValue::Bool(value) => write!(f, "{}", value),
            AttributeValue::Text(value) => f.write_str(value),
        }
    }
}
impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}
impl From<u16> for AttributeValue {
    fn from(value: u16) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}
impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}
impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}
impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}
pub type Attributes = BTreeMap<String, AttributeValue>;
/// A raised error. Attributes are attached with the builder methods before the
/// condition is returned; there are no mutators afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCondition {
    kind: ErrorKind,
    message: String,
    attributes: Attributes,
    raised_at: SystemTime,
}
impl ErrorCondition {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            attributes: Attributes::new(),
            raised_at: SystemTime::now(),
        }
    }
    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
    pub fn with_status(self, status: u16) -> Self {
        self.with_attribute("status", status)
    }
    /// Maps a filesystem failure on `path` onto the I/O branch of the taxonomy.
    pub fn from_io(err: &std::io::Error, path: &Path) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => {
                let parent_missing = path
                    .parent()
                    .map(|parent| !parent.as_os_str().is_empty() && !parent.exists())
                    .unwrap_or(false);
                if parent_missing {
                    ErrorKind::DirectoryNotFound
                } else {
                    ErrorKind::FileNotFound
                }
            }
            std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::AlreadyExists => {
                ErrorKind::AccessConflict
            }
            _ => ErrorKind::Io,
        };
        Self::new(kind, err.to_string())
            .with_attribute("path", path.display().to_string())
    }
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
    pub fn status(&self) -> Option<i64> {
        self.attribute("status").and_then(AttributeValue::as_int)
    }
    pub fn raised_at(&self) -> SystemTime {
        self.raised_at
    }
    pub fn is_a(&self, kind: ErrorKind) -> bool {
        self.kind.is_a(kind)
    }
    /// The diagnostic line shown when a handler for this kind recovers it.
    pub fn user_message(&self) -> String {
        let path = self
            .attribute("path")
            .map(|value| value.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        match self.kind {
            ErrorKind::DivisionByZero => "Attempted to divide by zero.".to_string(),
            ErrorKind::Overflow => {
                format!("Arithmetic operation resulted in an overflow ({}).", self.message)
            }
            ErrorKind::Arithmetic => format!("Arithmetic failure: {}", self.message),
            ErrorKind::DirectoryNotFound => {
                format!("Could not find a part of the path '{}'.", path)
            }
            ErrorKind::FileNotFound => format!("Could not find file '{}'.", path),
            ErrorKind::AccessConflict => {
                format!("Access to '{}' was denied or the file is in use.", path)
            }
            ErrorKind::Io => format!("I/O failure: {}", self.message),
            ErrorKind::DomainSpecific => match self.status() {
                Some(status) => format!("Request failed with status {}.", status),
                None => format!("Request failed: {}", self.message),
            },
            ErrorKind::ObjectDisposed => {
                format!("Cannot access a disposed object: {}", self.message)
            }
            ErrorKind::InvalidOperation => {
                format!("Operation is not valid: {}", self.message)
            }
            ErrorKind::FatalInitialization => {
                format!("Initialization failed, dependents cannot run: {}", self.message)
            }
            ErrorKind::GenericFailure => self.message.clone(),
        }
    }
}
impl std::fmt::Display for ErrorCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
impl std::error::Error for ErrorCondition {}
/// A condition that left the outermost region of a unit of execution unhandled.
#[derive(Debug, Clone)]
pub struct FatalTermination {
    pub unit: String,
    pub condition: ErrorCondition,
}
impl std::fmt::Display for FatalTermination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit '{}' terminated by unhandled {}", self.unit, self.condition)
    }
}
impl std::error::Error for FatalTermination {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.condition)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    #[test]
    fn test_specialization_table() {
        assert!(ErrorKind::DirectoryNotFound.is_a(ErrorKind::FileNotFound));
        assert!(ErrorKind::DirectoryNotFound.is_a(ErrorKind::Io));
        assert!(ErrorKind::DirectoryNotFound.is_a(ErrorKind::GenericFailure));
        assert!(! ErrorKind::FileNotFound.is_a(ErrorKind::DirectoryNotFound));
        assert!(! ErrorKind::DivisionByZero.is_a(ErrorKind::Io));
        assert!(ErrorKind::ObjectDisposed.is_a(ErrorKind::InvalidOperation));
        assert_eq!(ErrorKind::GenericFailure.parent(), None);
        assert_eq!(ErrorKind::DirectoryNotFound.depth(), 3);
    }
    #[test]
    fn test_every_kind_reaches_root() {
        for kind in ErrorKind::ALL {
            assert!(kind.is_a(ErrorKind::GenericFailure), "{} is detached", kind);
        }
    }
    #[test]
    fn test_from_io_distinguishes_missing_directory() {
        let temp_dir = tempdir().unwrap();
        let missing_file = temp_dir.path().join("absent.txt");
        let missing_dir = temp_dir.path().join("absent").join("file.txt");
        let err = std::fs::File::open(&missing_file).unwrap_err();
        assert_eq!(
            ErrorCondition::from_io(& err, & missing_file).kind(), ErrorKind::FileNotFound
        );
        let err = std::fs::File::open(&missing_dir).unwrap_err();
        let condition = ErrorCondition::from_io(&err, &missing_dir);
        assert_eq!(condition.kind(), ErrorKind::DirectoryNotFound);
        assert!(condition.user_message().contains("absent"));
    }
    #[test]
    fn test_status_attribute_and_display() {
        let condition = ErrorCondition::new(ErrorKind::DomainSpecific, "lookup failed")
            .with_status(404);
        assert_eq!(condition.status(), Some(404));
        assert_eq!(condition.to_string(), "[DomainSpecific] lookup failed");
        assert_eq!(condition.user_message(), "Request failed with status 404.");
    }
}
