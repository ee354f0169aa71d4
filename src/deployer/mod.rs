//! Built-in deployers for recorded and simulated runs.

pub mod planned;
pub mod simulated;

pub use planned::PlannedDeployer;
pub use simulated::SimulatedDeployer;
