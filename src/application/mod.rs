// Application layer - Use cases and the ports they depend on
pub mod activity_service;
pub mod auth_service;
pub mod contributors;
pub mod dashboard_service;
pub mod dashboard_store;
pub mod identity_resolver;
pub mod source_control;
pub mod summary_service;
