pub mod notifications;
pub use notifications::{
    ConsoleSubscriber, DiagnosticSubscriber, Diagnostics, MemorySubscriber, Notification,
    NotificationLevel,
};
