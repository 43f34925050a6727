pub mod types;
pub mod recovery;
pub use types::{
    AttributeValue, Attributes, ErrorCondition, ErrorKind, FatalTermination,
};
pub use recovery::{evaluate, HandlerAction, HandlerChain, HandlerSpec, Outcome, Predicate};
