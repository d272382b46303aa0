use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiResult;

/// Access and refresh tokens issued by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl Tokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh: Some(refresh.into()),
        }
    }
}

/// Shared token storage, optionally persisted to a JSON file.
///
/// Clones share the same tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Arc<RwLock<Tokens>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load tokens from `path`. A missing file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> ApiResult<Self> {
        let path = path.into();
        let tokens = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            serde_json::from_str(&json)?
        } else {
            Tokens::default()
        };
        debug!(path = %path.display(), has_access = tokens.access.is_some(), "loaded token store");
        Ok(Self {
            tokens: Arc::new(RwLock::new(tokens)),
            path: Some(path),
        })
    }

    pub fn access(&self) -> Option<String> {
        self.tokens.read().access.clone()
    }

    pub fn refresh(&self) -> Option<String> {
        self.tokens.read().refresh.clone()
    }

    pub fn snapshot(&self) -> Tokens {
        self.tokens.read().clone()
    }

    /// Store new tokens. Missing or empty values keep the current ones.
    pub fn set(&self, update: Tokens) {
        {
            let mut tokens = self.tokens.write();
            if let Some(access) = update.access.filter(|t| !t.is_empty()) {
                tokens.access = Some(access);
            }
            if let Some(refresh) = update.refresh.filter(|t| !t.is_empty()) {
                tokens.refresh = Some(refresh);
            }
        }
        self.persist();
    }

    /// Forget both tokens.
    pub fn clear(&self) {
        *self.tokens.write() = Tokens::default();
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_tokens(path, &self.snapshot()) {
            warn!(path = %path.display(), error = %e, "failed to persist tokens");
        }
    }
}

fn write_tokens(path: &Path, tokens: &Tokens) -> ApiResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(tokens)?;
    std::fs::write(path, json)?;
    Ok(())
}
