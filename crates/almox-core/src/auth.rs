use crate::config::AuthConfig;

/// Gatekeeper for the admin pages.
///
/// The stock API has no login endpoint yet, so the only implementation checks
/// configured credentials. A server-backed one only needs to implement this trait.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, user: &str, password: &str) -> bool;
}

/// Checks against `[auth]` in the config file. With nothing configured, nobody gets in.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredAuthenticator {
    user: Option<String>,
    password: Option<String>,
}

impl ConfiguredAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            user: config.admin_user.clone(),
            password: config.admin_password.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.user.is_some() && self.password.is_some()
    }
}

#[async_trait::async_trait]
impl Authenticator for ConfiguredAuthenticator {
    async fn authenticate(&self, user: &str, password: &str) -> bool {
        match (&self.user, &self.password) {
            (Some(expected_user), Some(expected_password)) => {
                expected_user == user.trim() && expected_password == password
            }
            _ => {
                tracing::warn!("Admin login attempted but no credentials are configured");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_refuses_everyone() {
        let auth = ConfiguredAuthenticator::default();
        assert!(!auth.is_configured());
        assert!(!auth.authenticate("admin", "admin").await);
        assert!(!auth.authenticate("", "").await);
    }

    #[tokio::test]
    async fn test_configured_credentials() {
        let auth = ConfiguredAuthenticator::new(&AuthConfig {
            admin_user: Some("almoxarife".into()),
            admin_password: Some("s3nha".into()),
        });

        assert!(auth.authenticate("almoxarife", "s3nha").await);
        assert!(auth.authenticate(" almoxarife ", "s3nha").await);
        assert!(!auth.authenticate("almoxarife", "S3NHA").await);
        assert!(!auth.authenticate("outro", "s3nha").await);
    }
}
