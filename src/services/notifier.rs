use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeEvent {
    pub resource: String,
    pub record_id: String,
    pub status: String,
    pub changed_by: String,
}

#[derive(Debug, Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification sender (transactional email, newsletter list, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn status_changed(&self, event: &StatusChangeEvent) -> Result<(), NotifyError>;
}

/// Default notifier: records the event in the log only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn status_changed(&self, event: &StatusChangeEvent) -> Result<(), NotifyError> {
        tracing::info!(
            resource = %event.resource,
            record = %event.record_id,
            status = %event.status,
            by = %event.changed_by,
            "status changed"
        );
        Ok(())
    }
}

/// Send a notification without letting its failure reach the caller.
/// Returns whether delivery succeeded.
pub async fn notify_best_effort(notifier: &dyn Notifier, event: &StatusChangeEvent) -> bool {
    match notifier.status_changed(event).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                resource = %event.resource,
                record = %event.record_id,
                "{}; continuing",
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl Notifier for Broken {
        async fn status_changed(&self, _event: &StatusChangeEvent) -> Result<(), NotifyError> {
            Err(NotifyError("smtp unreachable".into()))
        }
    }

    fn event() -> StatusChangeEvent {
        StatusChangeEvent {
            resource: "stories".into(),
            record_id: "s1".into(),
            status: "approved".into(),
            changed_by: "u1".into(),
        }
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        assert!(!notify_best_effort(&Broken, &event()).await);
        assert!(notify_best_effort(&LogNotifier, &event()).await);
    }
}
