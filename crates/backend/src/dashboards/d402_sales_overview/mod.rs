pub mod aggregation;
pub mod cache;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod ranking;
pub mod service;
pub mod store;
