pub mod input;
pub mod reporting;
pub mod sample;
