use async_trait::async_trait;
use rovia_domain::events::{
    CarAssignedEvent, ClaimCreatedEvent, InvitationUpdatedEvent, ReassignmentInitiatedEvent,
    VehicleReassignedEvent,
};
use rovia_domain::Masked;
use std::sync::Arc;

/// Outbound message to a guest or host. Rendering and delivery (email/SMS)
/// belong to the external collaborator behind [`Notifier`].
#[derive(Debug, Clone)]
pub enum Notification {
    ClaimCreated {
        guest_email: Masked<String>,
        event: ClaimCreatedEvent,
    },
    CarAssigned {
        guest_email: Masked<String>,
        event: CarAssignedEvent,
    },
    /// Guest consent request carrying the single-use bearer token.
    ReassignmentConsent {
        guest_email: Masked<String>,
        token: String,
        event: ReassignmentInitiatedEvent,
    },
    VehicleReassigned {
        guest_email: Masked<String>,
        event: VehicleReassignedEvent,
    },
    InvitationDelivery {
        recipient_email: Option<String>,
        token: String,
    },
    InvitationProgress {
        counterparty_email: Option<String>,
        event: InvitationUpdatedEvent,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Notification boundary. Never awaited while an engine lock is held; use
/// [`dispatch`] after the transition commits.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Default sink: structured log lines in place of a real delivery channel.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::info!(?notification, "notification dispatched");
        Ok(())
    }
}

/// Fire-and-forget. A failed delivery is logged; it never unwinds the state
/// transition that produced the notification.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        if let Err(err) = notifier.deliver(notification).await {
            tracing::warn!("notification delivery failed: {}", err);
        }
    });
}
