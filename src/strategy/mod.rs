pub mod metrics;
pub mod priority;
pub mod proportional;
pub mod traits;
