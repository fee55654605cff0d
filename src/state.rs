use crate::models::AppData;
use crate::sync::{RemoteStore, SyncReconciler};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, broadcast};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrigin {
    Local,
    Remote,
}

/// Notifications for the presentation layer. Nothing in the core renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    Changed { origin: ChangeOrigin },
    Celebrate { date: String, streak: u32 },
    Notice { message: String },
}

impl StateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StateEvent::Changed { .. } => "changed",
            StateEvent::Celebrate { .. } => "celebrate",
            StateEvent::Notice { .. } => "notice",
        }
    }
}

/// Handle to the one state container. Cloning shares it.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub sync: Arc<SyncReconciler>,
    pub events: broadcast::Sender<StateEvent>,
    pub notice: Arc<Mutex<Option<String>>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, remote: Arc<dyn RemoteStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            sync: Arc::new(SyncReconciler::new(remote)),
            events,
            notice: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    pub fn emit(&self, event: StateEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub async fn set_notice(&self, message: impl Into<String>) {
        let message = message.into();
        *self.notice.lock().await = Some(message.clone());
        self.emit(StateEvent::Notice { message });
    }

    pub async fn take_notice(&self) -> Option<String> {
        self.notice.lock().await.take()
    }
}
