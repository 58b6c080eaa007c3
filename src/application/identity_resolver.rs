// Identity resolution - token to remote account, with a short-lived cache
use crate::application::source_control::SourceControl;
use crate::domain::identity::GithubUser;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_IDENTITY_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct CachedIdentity {
    pub user: GithubUser,
    pub expires_at: Instant,
}

/// In-memory identity cache keyed by token hash.
///
/// Expired entries are never returned and are swept on every `put`.
#[derive(Debug)]
pub struct IdentityCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedIdentity>>,
}

impl IdentityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, token_hash: &str, now: Instant) -> Option<CachedIdentity> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(token_hash)
            .filter(|entry| entry.expires_at > now)
            .cloned()
    }

    pub fn put(&self, token_hash: String, user: GithubUser, now: Instant) -> CachedIdentity {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.expires_at > now);

        let entry = CachedIdentity {
            user,
            expires_at: now + self.ttl,
        };
        entries.insert(token_hash, entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_TTL)
    }
}

/// Hex SHA-256 of the token, so raw tokens never sit in the cache.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct IdentityResolver {
    source: Arc<dyn SourceControl>,
    cache: Arc<IdentityCache>,
}

impl IdentityResolver {
    pub fn new(source: Arc<dyn SourceControl>, cache: Arc<IdentityCache>) -> Self {
        Self { source, cache }
    }

    pub async fn resolve(&self, token: &str) -> anyhow::Result<GithubUser> {
        let key = hash_token(token);
        if let Some(cached) = self.cache.get(&key, Instant::now()) {
            return Ok(cached.user);
        }

        let user = self.source.current_user(token).await?;
        tracing::debug!(login = %user.login, "resolved identity");
        self.cache.put(key, user.clone(), Instant::now());
        Ok(user)
    }
}
