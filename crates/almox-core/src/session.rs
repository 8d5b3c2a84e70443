use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The only state that survives a restart: who is using the terminal and
/// whether they unlocked the admin pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub logged_in: bool,
}

/// JSON-backed session file. Without a path it only lives in memory.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    state: SessionState,
    path: Option<PathBuf>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from the default data directory
    pub fn load() -> crate::Result<Self> {
        Self::load_from(crate::Config::data_dir()?.join("session.json"))
    }

    pub fn load_from(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();

        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(state) => state,
                Err(e) => {
                    // A corrupt session shouldn't lock anyone out; start fresh
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    SessionState::default()
                }
            }
        } else {
            SessionState::default()
        };

        Ok(Self {
            state,
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user_name(&self) -> Option<&str> {
        self.state.user_name.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.logged_in
    }

    /// Remember the person's name. Blank input leaves the stored name alone.
    pub fn set_user_name(&mut self, name: &str) -> crate::Result<bool> {
        let name = name.trim();
        if name.is_empty() || self.user_name() == Some(name) {
            return Ok(false);
        }

        self.state.user_name = Some(name.to_string());
        self.save()?;
        Ok(true)
    }

    pub fn set_logged_in(&mut self, logged_in: bool) -> crate::Result<()> {
        self.state.logged_in = logged_in;
        self.save()
    }

    /// Logout: forget everything
    pub fn clear(&mut self) -> crate::Result<()> {
        self.state = SessionState::default();
        match &self.path {
            Some(path) if path.exists() => Ok(std::fs::remove_file(path)?),
            _ => Ok(()),
        }
    }

    fn save(&self) -> crate::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, serde_json::to_string_pretty(&self.state)?)?;
        Ok(())
    }
}
