use super::types::{Attributes, ErrorCondition, ErrorKind};
use log::{debug, trace};
use std::sync::Arc;
pub type Predicate = Arc<dyn Fn(&Attributes) -> bool + Send + Sync>;
pub type HandlerAction = Arc<dyn Fn(&ErrorCondition) + Send + Sync>;
/// One entry of a handler chain: a kind to accept (with all its specializations),
/// an optional attribute filter and the action to invoke on selection.
#[derive(Clone)]
pub struct HandlerSpec {
    label: String,
    match_kind: ErrorKind,
    predicate: Option<Predicate>,
    action: HandlerAction,
}
impl HandlerSpec {
    pub fn new<F>(label: &str, match_kind: ErrorKind, action: F) -> Self
    where
        F: Fn(&ErrorCondition) + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            match_kind,
            predicate: None,
            action: Arc::new(action),
        }
    }
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Attributes) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }
    pub fn label(&self) -> &str {
        &self.label
    }
    pub fn match_kind(&self) -> ErrorKind {
        self.match_kind
    }
    pub fn is_guarded(&self) -> bool {
        self.predicate.is_some()
    }
    pub fn matches(&self, condition: &ErrorCondition) -> bool {
        if !condition.is_a(self.match_kind) {
            return false;
        }
        match &self.predicate {
            Some(predicate) => predicate(condition.attributes()),
            None => true,
        }
    }
}
impl std::fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("label", &self.label)
            .field("match_kind", &self.match_kind)
            .field("guarded", &self.is_guarded())
            .finish()
    }
}
/// Handlers of one protected region, most specific first.
#[derive(Clone, Debug, Default)]
pub struct HandlerChain {
    specs: Vec<HandlerSpec>,
}
impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(mut self, spec: HandlerSpec) -> Self {
        self.specs.push(spec);
        self
    }
    pub fn catch<F>(self, label: &str, kind: ErrorKind, action: F) -> Self
    where
        F: Fn(&ErrorCondition) + Send + Sync + 'static,
    {
        self.push(HandlerSpec::new(label, kind, action))
    }
    pub fn catch_when<P, F>(self, label: &str, kind: ErrorKind, predicate: P, action: F) -> Self
    where
        P: Fn(&Attributes) -> bool + Send + Sync + 'static,
        F: Fn(&ErrorCondition) + Send + Sync + 'static,
    {
        self.push(HandlerSpec::new(label, kind, action).when(predicate))
    }
    pub fn specs(&self) -> &[HandlerSpec] {
        &self.specs
    }
    pub fn len(&self) -> usize {
        self.specs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
    /// First entry accepting `condition`; later entries are never consulted.
    pub fn select(&self, condition: &ErrorCondition) -> Option<(usize, &HandlerSpec)> {
        self.specs.iter().enumerate().find(|(index, spec)| {
            let matched = spec.matches(condition);
            trace!(
                "handler #{} '{}' ({}) vs {}: {}", index, spec.label, spec.match_kind,
                condition.kind(), matched
            );
            matched
        })
    }
}
#[derive(Debug)]
pub enum Outcome {
    Handled { index: usize, label: String },
    Unhandled(ErrorCondition),
}
impl Outcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Outcome::Handled { .. })
    }
}
/// Runs the action of the first matching handler. The condition is consumed when
/// handled and handed back untouched otherwise, ready for the enclosing chain.
pub fn evaluate(condition: ErrorCondition, chain: &HandlerChain) -> Outcome {
    match chain.select(&condition) {
        Some((index, spec)) => {
            debug!("{} handled by #{} '{}'", condition, index, spec.label);
            (spec.action)(&condition);
            Outcome::Handled {
                index,
                label: spec.label.clone(),
            }
        }
        None => {
            debug!("{} not handled by {} candidate(s)", condition, chain.len());
            Outcome::Unhandled(condition)
        }
    }
}
