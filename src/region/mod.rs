pub mod protected;
pub mod reclaim;
pub mod scope;
pub use protected::{run_unit, CleanupAction, ProtectedRegion, Resolution};
pub use reclaim::Reclaimer;
pub use scope::{Disposable, Lease, Scope};
