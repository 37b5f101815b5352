use std::sync::Arc;

use crate::error::CtrError;
use crate::models::{Role, UserAccount};
use crate::store::Repository;

/// Caller identified by basic authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Fails with Forbidden unless the caller holds `role`.
    pub fn require_role(&self, role: Role) -> Result<(), CtrError> {
        if self.has_role(role) {
            Ok(())
        } else {
            log::warn!("User '{}' lacks role {:?}", self.username, role);
            Err(CtrError::Forbidden)
        }
    }
}

/// Account management and credential checks.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn Repository<UserAccount>>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn Repository<UserAccount>>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, CtrError> {
        self.users
            .find_first(&|user: &UserAccount| user.username == username)
            .await
    }

    /// Registers an enabled account. Usernames are unique.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        roles: Vec<Role>,
    ) -> Result<UserAccount, CtrError> {
        if self.find_by_username(username).await?.is_some() {
            return Err(CtrError::Conflict(format!("user '{}' already exists", username)));
        }

        let cost = self.bcrypt_cost;
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| CtrError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| CtrError::Internal(format!("failed to hash password: {}", e)))?;

        self.users
            .create(UserAccount {
                id: 0,
                username: username.to_string(),
                password_hash,
                enabled: true,
                roles,
            })
            .await
    }

    /// Creates the admin account unless a user with that name already exists.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, CtrError> {
        if self.find_by_username(username).await?.is_some() {
            return Ok(false);
        }
        self.create_user(username, password, vec![Role::Admin]).await?;
        log::info!("Seeded admin user '{}'", username);
        Ok(true)
    }

    /// Checks credentials of an enabled account.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthenticatedUser, CtrError> {
        let user = match self.find_by_username(username).await? {
            Some(user) if user.enabled => user,
            _ => return Err(CtrError::Unauthorized),
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| CtrError::Internal(format!("verification task failed: {}", e)))?
            .unwrap_or(false);

        if !valid {
            log::debug!("Rejected credentials for user '{}'", username);
            return Err(CtrError::Unauthorized);
        }
        Ok(AuthenticatedUser { username: user.username, roles: user.roles })
    }
}
