// Application layer - Fetch use cases and the store boundary
pub mod dashboard_service;
pub mod error;
pub mod query_builder;
pub mod sensor_fetcher;
pub mod sensor_repository;
