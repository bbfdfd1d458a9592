pub mod chart;
pub mod common;
pub mod summary;
