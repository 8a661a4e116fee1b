// services/notification_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::{db::DBClient, notificationdb::NotificationExt},
    models::{notificationmodel::Notification, usermodel::User},
    service::error::ServiceError,
};

/// In-app inbox dispatcher. Delivery is a plain insert; callers that must
/// not fail on a missed notification wrap this in their own fire-and-forget.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        subject: &str,
        message: &str,
    ) -> Result<Notification, ServiceError> {
        tracing::info!("notification for {}: {}", user_id, subject);

        self.db_client
            .create_notification(user_id, subject, message)
            .await
            .map_err(|e| ServiceError::Notification(e.to_string()))
    }

    pub async fn notify_welcome(&self, user: &User) -> Result<Notification, ServiceError> {
        self.notify(
            user.id,
            "Welcome to the platform!",
            &format!(
                "Welcome {}! Invite friends with your referral code {} to start earning commission.",
                user.name, user.referral_code
            ),
        )
        .await
    }

    pub async fn inbox(&self, user_id: Uuid) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.db_client.get_notifications(user_id).await?)
    }

    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, ServiceError> {
        self.db_client
            .mark_notification_read(notification_id, user_id)
            .await?
            .ok_or(ServiceError::Validation(
                "Notification not found".to_string(),
            ))
    }
}
