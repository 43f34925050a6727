pub mod init;
pub mod units;
pub use init::{InitCell, InitState};
pub use units::{Unit, UnitReport, UnitStatus, UnitSupervisor};
