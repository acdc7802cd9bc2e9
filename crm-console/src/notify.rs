//! Dismissible user notices.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Queue of notices waiting to be dismissed, oldest first.
#[derive(Debug, Default)]
pub struct Notices {
    next_id: AtomicU64,
    queue: RwLock<Vec<Notice>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.queue.write().await.push(Notice {
            id,
            level,
            message: message.into(),
        });
        id
    }

    pub async fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Success, message).await
    }

    pub async fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message).await
    }

    /// Remove a notice. Returns false if it was already gone.
    pub async fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.queue.write().await;
        let before = queue.len();
        queue.retain(|n| n.id != id);
        queue.len() != before
    }

    pub async fn pending(&self) -> Vec<Notice> {
        self.queue.read().await.clone()
    }

    pub async fn clear(&self) {
        self.queue.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_and_dismiss() {
        let notices = Notices::new();
        let a = notices.error("Failed to add custom field. Please try again.").await;
        let b = notices.success("Layout saved successfully!").await;
        assert_ne!(a, b);

        let pending = notices.pending().await;
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].level, NoticeLevel::Error);

        assert!(notices.dismiss(a).await);
        assert!(!notices.dismiss(a).await);
        assert_eq!(notices.pending().await, vec![Notice {
            id: b,
            level: NoticeLevel::Success,
            message: "Layout saved successfully!".into(),
        }]);

        notices.clear().await;
        assert!(notices.pending().await.is_empty());
    }
}
