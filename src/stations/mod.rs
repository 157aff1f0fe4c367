pub mod catalog;
pub mod error;
pub mod geo_filter;
