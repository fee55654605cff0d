use crate::auth::{AuthSession, AuthTransition};
use crate::errors::RemoteError;
use crate::models::{AppData, User};
use crate::storage::{coerce_number, normalize_entries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::Mutex;

/// A user's document as the remote store returns it. Fields are kept loose
/// because other clients may have written them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(default)]
    pub goal: Option<Value>,
    #[serde(default)]
    pub entries: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RemoteDocument {
    pub fn from_data(data: &AppData) -> Self {
        Self {
            goal: Some(Value::from(data.goal)),
            entries: serde_json::to_value(&data.entries).ok(),
            ..Self::default()
        }
    }
}

/// One document per user. Implementations stamp `createdAt`/`updatedAt`
/// themselves.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch(&self, uid: &str) -> Result<Option<RemoteDocument>, RemoteError>;

    async fn create(&self, uid: &str, data: &AppData) -> Result<(), RemoteError>;

    /// Merge-style upsert of `goal` and `entries`.
    async fn merge(&self, uid: &str, data: &AppData) -> Result<(), RemoteError>;
}

/// Overwrites local state with whatever the remote document carries. Goal
/// and entries are taken independently; malformed fields are ignored.
pub fn apply_remote(local: &mut AppData, remote: &RemoteDocument) -> bool {
    let before = local.clone();

    if let Some(goal) = remote.goal.as_ref().and_then(coerce_number) {
        local.goal = goal;
    }
    if let Some(entries) = remote.entries.as_ref().filter(|value| value.is_object()) {
        local.entries = normalize_entries(entries);
    }

    *local != before
}

pub struct SyncReconciler {
    remote: Arc<dyn RemoteStore>,
    session: Mutex<AuthSession>,
}

impl SyncReconciler {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            session: Mutex::new(AuthSession::default()),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.lock().await.current().cloned()
    }

    pub async fn transition(&self, next: Option<User>) -> AuthTransition {
        self.session.lock().await.transition(next)
    }

    /// Puts back a session recorded before a transition that could not be
    /// completed.
    pub async fn restore(&self, user: Option<User>) {
        self.session.lock().await.restore(user);
    }

    pub async fn fetch(&self, user: &User) -> Result<Option<RemoteDocument>, RemoteError> {
        self.remote.fetch(&user.uid).await
    }

    /// First sign-in on an account with no remote copy yet.
    pub async fn seed(&self, user: &User, data: &AppData) -> Result<(), RemoteError> {
        self.remote.create(&user.uid, data).await
    }

    /// Returns `false` without touching the network when nobody is signed in.
    pub async fn push(&self, user: Option<&User>, data: &AppData) -> Result<bool, RemoteError> {
        let Some(user) = user else {
            return Ok(false);
        };
        self.remote.merge(&user.uid, data).await?;
        Ok(true)
    }
}

/// In-process remote store, used when no remote URL is configured.
#[derive(Default)]
pub struct MemoryRemoteStore {
    documents: Mutex<HashMap<String, RemoteDocument>>,
    offline: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn insert(&self, uid: &str, document: RemoteDocument) {
        self.documents.lock().await.insert(uid.to_string(), document);
    }

    pub async fn document(&self, uid: &str) -> Option<RemoteDocument> {
        self.documents.lock().await.get(uid).cloned()
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch(&self, uid: &str) -> Result<Option<RemoteDocument>, RemoteError> {
        self.check_online()?;
        Ok(self.document(uid).await)
    }

    async fn create(&self, uid: &str, data: &AppData) -> Result<(), RemoteError> {
        self.check_online()?;
        let document = RemoteDocument {
            created_at: Some(Utc::now()),
            ..RemoteDocument::from_data(data)
        };
        self.insert(uid, document).await;
        Ok(())
    }

    async fn merge(&self, uid: &str, data: &AppData) -> Result<(), RemoteError> {
        self.check_online()?;
        let update = RemoteDocument::from_data(data);
        let mut documents = self.documents.lock().await;
        let document = documents.entry(uid.to_string()).or_default();
        document.goal = update.goal;
        document.entries = update.entries;
        document.updated_at = Some(Utc::now());
        Ok(())
    }
}
