use std::sync::Arc;

use keepsake_db::Store;
use keepsake_types::{Message, MessageStatus};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::validate::{NAME_AND_MESSAGE_EMPTY, parse_status};

/// Guestbook moderation.
///
/// New messages always enter as `Pending`; only approved ones are public. Moderators may move
/// a message between any of the three states, any number of times, or delete it outright.
#[derive(Clone)]
pub struct MessageQueue {
    store: Arc<dyn Store>,
}

impl MessageQueue {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Queue a message for moderation. Fields are trimmed; the status is always `Pending`.
    pub async fn submit(&self, name: &str, message: &str) -> ApiResult<Message> {
        let (name, message) = (name.trim(), message.trim());
        if name.is_empty() || message.is_empty() {
            return Err(ApiError::validation(NAME_AND_MESSAGE_EMPTY));
        }

        let created = self.store.insert_message(name, message).await?;
        info!(id = created.id, "Message queued for moderation");
        Ok(created)
    }

    /// Approved messages, newest first.
    pub async fn list_public(&self) -> ApiResult<Vec<Message>> {
        Ok(self.store.messages_by_status(MessageStatus::Approved).await?)
    }

    pub async fn list_by_status(&self, status: &str) -> ApiResult<Vec<Message>> {
        let status = parse_status(status)?;
        Ok(self.store.messages_by_status(status).await?)
    }

    /// Every message regardless of status, newest first.
    pub async fn list_all(&self) -> ApiResult<Vec<Message>> {
        Ok(self.store.all_messages().await?)
    }

    pub async fn set_status(&self, id: i64, new_status: &str) -> ApiResult<Message> {
        let status = parse_status(new_status)?;

        let updated = self
            .store
            .update_message_status(id, status)
            .await?
            .ok_or(ApiError::NotFound {
                entity: "Message",
                id,
            })?;

        info!(id, status = %updated.status, "Message status changed");
        Ok(updated)
    }

    /// Permanently remove a message.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        if !self.store.delete_message(id).await? {
            return Err(ApiError::NotFound {
                entity: "Message",
                id,
            });
        }

        info!(id, "Message deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use keepsake_db::SqliteStore;

    use super::*;

    async fn queue() -> MessageQueue {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().await.unwrap();
        MessageQueue::new(Arc::new(store))
    }

    fn ids(messages: &[Message]) -> Vec<i64> {
        messages.iter().map(|m| m.id).collect()
    }

    #[tokio::test]
    async fn submit_always_starts_pending() {
        let queue = queue().await;
        let msg = queue.submit("Sam", "hi").await.unwrap();

        assert_eq!(msg.status, MessageStatus::Pending);
        assert!(queue.list_public().await.unwrap().is_empty());
        assert_eq!(ids(&queue.list_by_status("Pending").await.unwrap()), vec![msg.id]);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let queue = queue().await;
        assert!(matches!(queue.submit(" ", "hi").await, Err(ApiError::Validation(_))));
        assert!(matches!(queue.submit("Sam", "\n").await, Err(ApiError::Validation(_))));
        assert!(queue.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn approval_moves_message_to_public_list() {
        let queue = queue().await;
        let msg = queue.submit("Sam", "hi").await.unwrap();

        let approved = queue.set_status(msg.id, "Approved").await.unwrap();
        assert_eq!(approved.status, MessageStatus::Approved);
        assert_eq!(approved.message, "hi");

        assert!(queue.list_by_status("Pending").await.unwrap().is_empty());
        assert_eq!(ids(&queue.list_public().await.unwrap()), vec![msg.id]);
    }

    #[tokio::test]
    async fn denied_and_pending_stay_private() {
        let queue = queue().await;
        let a = queue.submit("A", "one").await.unwrap();
        let b = queue.submit("B", "two").await.unwrap();
        let c = queue.submit("C", "three").await.unwrap();

        queue.set_status(a.id, "Approved").await.unwrap();
        queue.set_status(b.id, "Denied").await.unwrap();

        let public = queue.list_public().await.unwrap();
        assert_eq!(ids(&public), vec![a.id]);
        assert!(public.iter().all(|m| m.status.is_public()));
        assert_eq!(ids(&queue.list_by_status("Denied").await.unwrap()), vec![b.id]);
        assert_eq!(ids(&queue.list_all().await.unwrap()), vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn transitions_are_unrestricted() {
        let queue = queue().await;
        let msg = queue.submit("Sam", "hi").await.unwrap();

        for status in ["Denied", "Approved", "Pending", "Approved", "Denied"] {
            let updated = queue.set_status(msg.id, status).await.unwrap();
            assert_eq!(updated.status.as_str(), status);
            assert_eq!(updated.created_at, msg.created_at);
        }
    }

    #[tokio::test]
    async fn invalid_status_leaves_row_unchanged() {
        let queue = queue().await;
        let msg = queue.submit("Sam", "hi").await.unwrap();

        assert!(matches!(
            queue.set_status(msg.id, "Archived").await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            queue.list_by_status("archived").await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(queue.list_all().await.unwrap()[0].status, MessageStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let queue = queue().await;
        let msg = queue.submit("Sam", "hi").await.unwrap();

        assert!(matches!(
            queue.set_status(msg.id + 100, "Approved").await,
            Err(ApiError::NotFound { id, .. }) if id == msg.id + 100
        ));
        assert!(matches!(queue.delete(msg.id + 100).await, Err(ApiError::NotFound { .. })));
        assert_eq!(queue.list_all().await.unwrap().len(), 1);
        assert_eq!(queue.list_all().await.unwrap()[0].status, MessageStatus::Pending);
    }

    #[tokio::test]
    async fn guestbook_scenario() {
        let queue = queue().await;
        let msg = queue.submit("Sam", "hi").await.unwrap();
        assert_eq!(msg.status, MessageStatus::Pending);

        queue.set_status(msg.id, "Approved").await.unwrap();
        assert_eq!(ids(&queue.list_public().await.unwrap()), vec![msg.id]);

        queue.delete(msg.id).await.unwrap();
        assert!(queue.list_public().await.unwrap().is_empty());
        assert!(queue.list_all().await.unwrap().is_empty());
        for status in MessageStatus::ALL {
            assert!(queue.list_by_status(status.as_str()).await.unwrap().is_empty());
        }
        assert!(matches!(queue.delete(msg.id).await, Err(ApiError::NotFound { .. })));
    }
}
