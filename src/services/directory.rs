//! User directory consulted when issuing custom token claims.
use async_trait::async_trait;
use thiserror::Error;

/// Attributes looked up for a user principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub date_of_birth: String,
    pub custom_roles: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    async fn lookup(&self, user_principal_name: &str) -> Result<UserProfile, DirectoryError>;
}

/// Returns the same profile for every user. Stands in until a real store is wired up.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderDirectory;

#[async_trait]
impl UserDirectory for PlaceholderDirectory {
    async fn lookup(&self, user_principal_name: &str) -> Result<UserProfile, DirectoryError> {
        tracing::debug!(upn = user_principal_name, "placeholder directory lookup");
        Ok(UserProfile {
            date_of_birth: "01/01/2000".to_string(),
            custom_roles: vec!["Writer".to_string(), "Editor".to_string()],
        })
    }
}
