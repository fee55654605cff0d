//! HTTP client for the per-user document store.
//!
//! Documents live at `{base}/{collection}/{uid}`. `GET` answers 404 for a
//! missing document, `PUT` creates one and `PATCH` merges fields into it. The
//! store assigns `createdAt`/`updatedAt`.

use crate::errors::RemoteError;
use crate::models::AppData;
use crate::sync::{RemoteDocument, RemoteStore};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;

pub const DEFAULT_COLLECTION: &str = "sobrietyStates";

pub struct RestRemoteStore {
    base_url: String,
    collection: String,
    http_client: Client,
}

impl RestRemoteStore {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            http_client: Client::new(),
        }
    }

    fn document_url(&self, uid: &str) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| RemoteError::Unavailable(format!("bad remote url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Unavailable("remote url cannot take a path".into()))?
            .pop_if_empty()
            .push(&self.collection)
            .push(uid);
        Ok(url)
    }

    fn body(data: &AppData) -> serde_json::Value {
        json!({
            "goal": data.goal,
            "entries": data.entries,
        })
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn fetch(&self, uid: &str) -> Result<Option<RemoteDocument>, RemoteError> {
        let resp = self
            .http_client
            .get(self.document_url(uid)?)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }
        Ok(Some(resp.json().await?))
    }

    async fn create(&self, uid: &str, data: &AppData) -> Result<(), RemoteError> {
        let resp = self
            .http_client
            .put(self.document_url(uid)?)
            .json(&Self::body(data))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }
        Ok(())
    }

    async fn merge(&self, uid: &str, data: &AppData) -> Result<(), RemoteError> {
        let resp = self
            .http_client
            .patch(self.document_url(uid)?)
            .json(&Self::body(data))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}
