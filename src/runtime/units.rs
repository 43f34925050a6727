use crate::errors::ErrorCondition;
use crate::region::run_unit;
use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
pub type UnitBody = Box<dyn FnOnce() -> Result<(), ErrorCondition> + Send + 'static>;
/// An independent unit of execution: one body, its own regions, no shared mutable state.
pub struct Unit {
    name: String,
    body: UnitBody,
}
impl Unit {
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: FnOnce() -> Result<(), ErrorCondition> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            body: Box::new(body),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
#[derive(Debug, Clone, PartialEq)]
pub enum UnitStatus {
    Completed,
    Terminated(ErrorCondition),
    Panicked(String),
}
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub name: String,
    pub status: UnitStatus,
    pub duration: Duration,
}
impl UnitReport {
    pub fn completed(&self) -> bool {
        self.status == UnitStatus::Completed
    }
}
/// Runs units side by side. A unit that ends in fatal termination (or panics) is
/// reported and never affects its siblings.
pub struct UnitSupervisor {
    max_concurrent: usize,
}
impl UnitSupervisor {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }
    pub fn default_concurrency() -> usize {
        let num_cpus = num_cpus::get();
        (num_cpus * 3 / 4).max(1)
    }
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
    pub async fn run(&self, units: Vec<Unit>) -> Result<Vec<UnitReport>> {
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = Vec::new();
        for unit in units {
            let permits = Arc::clone(&permits);
            let task = tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .context("unit semaphore closed")?;
                let Unit { name, body } = unit;
                let start_time = Instant::now();
                let unit_name = name.clone();
                let status = match tokio::task::spawn_blocking(move || run_unit(&unit_name, body))
                    .await
                {
                    Ok(Ok(())) => UnitStatus::Completed,
                    Ok(Err(fatal)) => UnitStatus::Terminated(fatal.condition),
                    Err(join_error) if join_error.is_panic() => {
                        UnitStatus::Panicked(panic_message(join_error.into_panic()))
                    }
                    Err(join_error) => UnitStatus::Panicked(join_error.to_string()),
                };
                match &status {
                    UnitStatus::Completed => info!("unit '{}' completed", name),
                    UnitStatus::Terminated(condition) => {
                        warn!("unit '{}' terminated by {}", name, condition)
                    }
                    UnitStatus::Panicked(message) => {
                        warn!("unit '{}' panicked: {}", name, message)
                    }
                }
                Ok::<UnitReport, anyhow::Error>(UnitReport {
                    name,
                    status,
                    duration: start_time.elapsed(),
                })
            });
            tasks.push(task);
        }
        let mut reports = Vec::new();
        for task in tasks {
            reports.push(task.await.context("unit task failed to join")??);
        }
        Ok(reports)
    }
}
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
