// Domain layer - Core business models
pub mod activity;
pub mod dashboard;
pub mod identity;
