use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use medichat_core::{ChatMessage, Session, SessionStorage};

/// Process-local key-value store: one [`Session`] slot per id.
///
/// Writes replace a slot's messages wholesale. Concurrent sessions never
/// share a slot, so the lock is held only for the copy in or out.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list_sessions(&self) -> Vec<Uuid> {
        self.sessions.read().await.keys().copied().collect()
    }
}

#[async_trait]
impl SessionStorage for SessionStore {
    async fn get_or_create(&self, id: &Uuid) -> anyhow::Result<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(*id).or_insert_with(|| {
            info!("creating session slot {id}");
            let now = chrono::Utc::now();
            Session {
                id: *id,
                messages: Vec::new(),
                created_at: now,
                updated_at: now,
            }
        });
        Ok(session.clone())
    }

    async fn replace(&self, id: &Uuid, messages: &[ChatMessage]) -> anyhow::Result<()> {
        let mut sessions = self.sessions.write().await;
        let now = chrono::Utc::now();
        let session = sessions.entry(*id).or_insert_with(|| Session {
            id: *id,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        session.messages = messages.to_vec();
        session.updated_at = now;
        Ok(())
    }

    async fn reset(&self, id: &Uuid) -> anyhow::Result<()> {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!("dropped session slot {id}");
        }
        Ok(())
    }
}
