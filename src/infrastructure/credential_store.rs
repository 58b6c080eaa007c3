// Client-side credential persistence over a key/value backend
use crate::infrastructure::credential_cipher::CredentialCipher;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub const TOKEN_KEY: &str = "githubRepositoriesViewer-accessToken";
pub const AUTH_METHOD_KEY: &str = "githubRepositoriesViewer-authMethod";

/// How the stored token was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    OAuth,
    PersonalToken,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::OAuth => "oauth",
            AuthMethod::PersonalToken => "token",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "oauth" => Some(AuthMethod::OAuth),
            "token" => Some(AuthMethod::PersonalToken),
            _ => None,
        }
    }
}

/// String key/value persistence, e.g. browser local storage.
pub trait CredentialStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

pub struct CredentialStore<S: CredentialStorage> {
    storage: S,
    cipher: CredentialCipher,
}

impl<S: CredentialStorage> CredentialStore<S> {
    pub fn new(storage: S, cipher: CredentialCipher) -> Self {
        Self { storage, cipher }
    }

    pub fn save(&self, token: &str, method: AuthMethod) {
        self.storage.set(TOKEN_KEY, self.cipher.encrypt(token));
        self.storage
            .set(AUTH_METHOD_KEY, method.as_str().to_string());
    }

    /// Decrypted token, or `""` when absent or unreadable.
    pub fn token(&self) -> String {
        self.storage
            .get(TOKEN_KEY)
            .map(|encrypted| self.cipher.decrypt(&encrypted))
            .unwrap_or_default()
    }

    pub fn auth_method(&self) -> Option<AuthMethod> {
        self.storage
            .get(AUTH_METHOD_KEY)
            .and_then(|m| AuthMethod::parse(&m))
    }

    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(AUTH_METHOD_KEY);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
