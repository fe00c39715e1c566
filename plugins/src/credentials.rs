//! Bearer token storage.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::Context;

pub const TOKEN_FILE_NAME: &str = "access_token";

/// Holds the access token in memory, mirrored to a file when a path is set.
#[derive(Debug, Default)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    token: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Token file under `dir`. A missing or blank file means "no token".
    pub fn in_dir(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(TOKEN_FILE_NAME);
        let token = match std::fs::read_to_string(&path) {
            Ok(s) => normalize(&s),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        Ok(Self {
            path: Some(path),
            token: RwLock::new(token),
        })
    }

    pub fn in_memory(token: Option<String>) -> Self {
        Self {
            path: None,
            token: RwLock::new(token.as_deref().and_then(normalize)),
        }
    }

    /// Replaces the in-memory token without touching the file.
    pub fn with_override(self, token: Option<String>) -> Self {
        if let Some(token) = token.as_deref().and_then(normalize) {
            *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        }
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn save(&self, token: &str) -> anyhow::Result<()> {
        let token = normalize(token).ok_or_else(|| anyhow::anyhow!("refusing to store an empty token"))?;
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, &token)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
        Ok(())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to remove {}", path.display()))
                }
            }
        }
        Ok(())
    }
}

fn normalize(token: &str) -> Option<String> {
    let t = token.trim();
    (!t.is_empty()).then(|| t.to_string())
}
