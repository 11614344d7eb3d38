pub mod evaluate;
pub mod features;
pub mod gates;
pub mod sharpe;

pub use evaluate::evaluate;
pub use gates::GateConfig;
pub use sharpe::compute_allocation;
