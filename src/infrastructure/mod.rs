// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod credential_cipher;
pub mod credential_store;
pub mod github_client;
pub mod oauth_client;
pub mod openai_client;
pub mod sqlite_store;
