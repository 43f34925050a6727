use crate::errors::ErrorCondition;
use anyhow::Result;
use std::sync::{
    mpsc::{self, Receiver, SyncSender, TrySendError},
    Arc, Mutex,
};
use std::time::SystemTime;
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}
impl NotificationLevel {
    fn label(self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "OK",
        }
    }
}
#[derive(Debug, Clone)]
pub struct Notification {
    pub source: String,
    pub message: String,
    pub timestamp: SystemTime,
    pub level: NotificationLevel,
}
/// Notifications kept for `receive`; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 256;
/// Diagnostic text sink shared by handler actions, cleanup actions and disposables.
pub struct Diagnostics {
    sender: SyncSender<Notification>,
    receiver: Mutex<Receiver<Notification>>,
    subscribers: Vec<Box<dyn DiagnosticSubscriber>>,
    enabled: bool,
}
impl Diagnostics {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::sync_channel(HISTORY_LIMIT);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            subscribers: Vec::new(),
            enabled: true,
        }
    }
    pub fn subscribe(&mut self, subscriber: Box<dyn DiagnosticSubscriber>) {
        self.subscribers.push(subscriber);
    }
    pub fn notify(&self, level: NotificationLevel, source: &str, message: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let notification = Notification {
            source: source.to_string(),
            message: message.into(),
            timestamp: SystemTime::now(),
            level,
        };
        for subscriber in &self.subscribers {
            subscriber.on_notification(&notification);
        }
        self.remember(notification);
    }
    fn remember(&self, notification: Notification) {
        let mut pending = notification;
        loop {
            match self.sender.try_send(pending) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(rejected)) => {
                    pending = rejected;
                    if let Ok(receiver) = self.receiver.lock() {
                        let _ = receiver.try_recv();
                    } else {
                        return;
                    }
                }
            }
        }
    }
    pub fn info(&self, source: &str, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, source, message);
    }
    pub fn success(&self, source: &str, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, source, message);
    }
    pub fn error(&self, source: &str, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, source, message);
    }
    /// Emits the per-kind diagnostic for a condition a handler just recovered.
    pub fn handled(&self, source: &str, condition: &ErrorCondition) {
        self.notify(NotificationLevel::Warning, source, condition.user_message());
    }
    pub fn receive(&self) -> Result<Option<Notification>> {
        let receiver = self
            .receiver
            .lock()
            .map_err(|_| anyhow::anyhow!("Diagnostics receiver poisoned"))?;
        match receiver.try_recv() {
            Ok(notification) => Ok(Some(notification)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("Diagnostics channel disconnected"))
            }
        }
    }
    pub fn drain(&self) -> Result<Vec<Notification>> {
        let mut drained = Vec::new();
        while let Some(notification) = self.receive()? {
            drained.push(notification);
        }
        Ok(drained)
    }
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}
pub trait DiagnosticSubscriber: Send + Sync {
    fn on_notification(&self, notification: &Notification);
}
pub struct ConsoleSubscriber;
impl DiagnosticSubscriber for ConsoleSubscriber {
    fn on_notification(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Error => {
                eprintln!(
                    "[{}] {}: {}", notification.level.label(), notification.source,
                    notification.message
                )
            }
            _ => {
                println!(
                    "[{}] {}: {}", notification.level.label(), notification.source,
                    notification.message
                )
            }
        }
    }
}
/// Keeps every notification in memory, in emission order.
#[derive(Clone, Default)]
pub struct MemorySubscriber {
    records: Arc<Mutex<Vec<Notification>>>,
}
impl MemorySubscriber {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.iter().map(|n| n.message.clone()).collect())
            .unwrap_or_default()
    }
    pub fn records(&self) -> Vec<Notification> {
        self.records.lock().map(|records| records.clone()).unwrap_or_default()
    }
}
impl DiagnosticSubscriber for MemorySubscriber {
    fn on_notification(&self, notification: &Notification) {
        if let Ok(mut records) = self.records.lock() {
            records.push(notification.clone());
        }
    }
}
