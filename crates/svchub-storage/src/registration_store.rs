//! Registration request store - mirrored to `registration_requests.json`
//!
//! Requests transition exactly once, pending -> approved | rejected.
//! Approval promotes the stored password hash into a real user; if the
//! username was taken in the meantime the error propagates and the
//! request stays pending.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use svchub_core::{
    Error, RegistrationRequest, RegistrationStatus, Result, User, DEFAULT_ROLE,
};

use crate::password::hash_password;
use crate::user_store::UserStore;

const REQUESTS_FILE: &str = "registration_requests.json";

pub struct RegistrationStore {
    path: PathBuf,
    requests: Mutex<Vec<RegistrationRequest>>,
}

impl RegistrationStore {
    /// Load the collection from `data_dir`, creating the file if absent.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(REQUESTS_FILE);
        if !path.exists() {
            tokio::fs::create_dir_all(data_dir).await?;
            tokio::fs::write(&path, "[]").await?;
        }
        let raw = tokio::fs::read_to_string(&path).await?;
        let requests: Vec<RegistrationRequest> = serde_json::from_str(&raw)?;
        info!("[registrations] loaded {} requests", requests.len());
        Ok(Self {
            path,
            requests: Mutex::new(requests),
        })
    }

    async fn persist(&self, requests: &[RegistrationRequest]) -> Result<()> {
        let json = serde_json::to_string_pretty(requests)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Submit a registration. At most one pending request may exist per
    /// username at a time; the password is stored as a salted hash only.
    pub async fn create(&self, username: &str, password: &str) -> Result<RegistrationRequest> {
        let mut requests = self.requests.lock().await;
        if requests
            .iter()
            .any(|r| r.username == username && r.is_pending())
        {
            return Err(Error::DuplicatePendingRequest);
        }
        let password_hash = hash_password(password)?;
        let request = RegistrationRequest::new(username, password_hash);
        requests.push(request.clone());
        self.persist(&requests).await?;
        Ok(request)
    }

    pub async fn list(&self, status: RegistrationStatus) -> Vec<RegistrationRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect()
    }

    /// Approve a pending request: create the user from the stored hash
    /// with the default role and no grants, then mark the request.
    pub async fn approve(
        &self,
        request_id: Uuid,
        users: &UserStore,
        reviewer_id: Uuid,
    ) -> Result<(RegistrationRequest, User)> {
        let mut requests = self.requests.lock().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(Error::RequestNotFound)?;
        if !request.is_pending() {
            return Err(Error::AlreadyProcessed);
        }
        // User creation first: on DuplicateUsername the request stays pending.
        let user = users
            .create_from_hash(
                &request.username,
                &request.password_hash,
                vec![DEFAULT_ROLE.to_string()],
                vec![],
            )
            .await?;
        request.status = RegistrationStatus::Approved;
        request.reviewed_at = Some(Utc::now());
        request.reviewer_id = Some(reviewer_id);
        let approved = request.clone();
        self.persist(&requests).await?;
        Ok((approved, user))
    }

    /// Reject a pending request, recording the reviewer and optional reason.
    pub async fn reject(
        &self,
        request_id: Uuid,
        reviewer_id: Uuid,
        reason: Option<String>,
    ) -> Result<RegistrationRequest> {
        let mut requests = self.requests.lock().await;
        let request = requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(Error::RequestNotFound)?;
        if !request.is_pending() {
            return Err(Error::AlreadyProcessed);
        }
        request.status = RegistrationStatus::Rejected;
        request.reviewed_at = Some(Utc::now());
        request.reviewer_id = Some(reviewer_id);
        request.reason = reason;
        let rejected = request.clone();
        self.persist(&requests).await?;
        Ok(rejected)
    }
}
