pub mod aggregator;
pub mod error;
pub mod filtering;
pub mod frame_store;
pub mod store;
