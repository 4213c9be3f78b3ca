//! User store - accounts mirrored to `users.json`
//!
//! The full collection lives in memory behind one async mutex. Every
//! mutation holds the lock across the whole modify-then-persist sequence,
//! so two concurrent updates cannot lose each other's write.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use svchub_core::{dedup_preserving_order, Error, Result, User, ADMIN_ROLE};

use crate::password::{hash_password, verify_password};

const USERS_FILE: &str = "users.json";

/// Username the bootstrap administrator is created under
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";
/// Fixed bootstrap password, flagged for immediate rotation
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin123";

pub struct UserStore {
    path: PathBuf,
    users: Mutex<Vec<User>>,
}

impl UserStore {
    /// Load the collection from `data_dir`, creating the file if absent.
    ///
    /// If no user named `admin` exists, one is bootstrapped with the fixed
    /// default password and the `admin` role.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(USERS_FILE);
        if !path.exists() {
            tokio::fs::create_dir_all(data_dir).await?;
            tokio::fs::write(&path, "[]").await?;
        }
        let raw = tokio::fs::read_to_string(&path).await?;
        let users: Vec<User> = serde_json::from_str(&raw)?;
        let store = Self {
            path,
            users: Mutex::new(users),
        };

        let needs_admin = {
            let users = store.users.lock().await;
            !users.iter().any(|u| u.username == BOOTSTRAP_ADMIN_USERNAME)
        };
        if needs_admin {
            warn!(
                "[users] no '{}' account found - creating one with the default password; rotate it immediately",
                BOOTSTRAP_ADMIN_USERNAME
            );
            store
                .create(
                    BOOTSTRAP_ADMIN_USERNAME,
                    BOOTSTRAP_ADMIN_PASSWORD,
                    vec![ADMIN_ROLE.to_string()],
                    vec![],
                )
                .await?;
        }
        let count = store.users.lock().await.len();
        info!("[users] loaded {} users", count);
        Ok(store)
    }

    async fn persist(&self, users: &[User]) -> Result<()> {
        let json = serde_json::to_string_pretty(users)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Create a user from a plaintext password.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        roles: Vec<String>,
        services: Vec<String>,
    ) -> Result<User> {
        let password_hash = hash_password(password)?;
        self.create_from_hash(username, &password_hash, roles, services)
            .await
    }

    /// Create a user from an already-computed hash (registration approval
    /// promotes the stored request hash without re-hashing).
    pub async fn create_from_hash(
        &self,
        username: &str,
        password_hash: &str,
        roles: Vec<String>,
        services: Vec<String>,
    ) -> Result<User> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == username) {
            return Err(Error::DuplicateUsername);
        }
        let user = User::from_hash(username, password_hash, roles, services);
        users.push(user.clone());
        self.persist(&users).await?;
        Ok(user)
    }

    /// Check a username/password pair, returning the user on success.
    pub async fn validate_credentials(&self, username: &str, password: &str) -> Option<User> {
        let user = {
            let users = self.users.lock().await;
            users.iter().find(|u| u.username == username).cloned()
        };
        let user = user?;
        verify_password(&user.password_hash, password).then_some(user)
    }

    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().await.iter().find(|u| u.id == id).cloned()
    }

    pub async fn get_by_username(&self, username: &str) -> Option<User> {
        self.users
            .lock()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned()
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }

    /// Replace a user's roles and/or service grants.
    ///
    /// Incoming sets are de-duplicated and replace the stored values
    /// outright; omitted fields are left untouched.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        roles: Option<Vec<String>>,
        services: Option<Vec<String>>,
    ) -> Result<User> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(Error::UserNotFound)?;
        if let Some(roles) = roles {
            user.roles = dedup_preserving_order(roles);
        }
        if let Some(services) = services {
            user.services = dedup_preserving_order(services);
        }
        let updated = user.clone();
        self.persist(&users).await?;
        Ok(updated)
    }

    /// Same as [`update_user`], addressed by username.
    pub async fn update_by_username(
        &self,
        username: &str,
        roles: Option<Vec<String>>,
        services: Option<Vec<String>>,
    ) -> Result<User> {
        let id = {
            let users = self.users.lock().await;
            users
                .iter()
                .find(|u| u.username == username)
                .map(|u| u.id)
                .ok_or(Error::UserNotFound)?
        };
        self.update_user(id, roles, services).await
    }

    /// Rotate a password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(Error::UserNotFound)?;
        if !verify_password(&user.password_hash, old_password) {
            return Err(Error::WrongPassword);
        }
        user.password_hash = hash_password(new_password)?;
        self.persist(&users).await
    }

    /// Set a password without checking the old one (admin reset path).
    pub async fn update_password(&self, user_id: Uuid, new_password: &str) -> Result<()> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(Error::UserNotFound)?;
        user.password_hash = hash_password(new_password)?;
        self.persist(&users).await
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        let mut users = self.users.lock().await;
        let index = users
            .iter()
            .position(|u| u.id == user_id)
            .ok_or(Error::UserNotFound)?;
        users.remove(index);
        self.persist(&users).await
    }
}
