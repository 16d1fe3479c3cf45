use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use shared_database::LocalStore;
use shared_models::auth::{User, UserRole};

use crate::error::NotificationError;
use crate::models::{Notification, NotificationKind, NotificationList, NotificationView, Recipient};

const NOTIFICATIONS_KEY: &str = "notificacoes";
const MAX_STORED_NOTIFICATIONS: usize = 1000;

pub struct NotificationService {
    store: Arc<LocalStore>,
}

impl NotificationService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    pub async fn notify_user(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification, NotificationError> {
        self.push(Recipient::User(user_id.to_string()), title, message, kind).await
    }

    pub async fn notify_role(
        &self,
        role: UserRole,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification, NotificationError> {
        self.push(Recipient::Role(role), title, message, kind).await
    }

    async fn push(
        &self,
        recipient: Recipient,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification, NotificationError> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            recipient,
            title: title.to_string(),
            message: message.to_string(),
            kind,
            read_by: Vec::new(),
            dismissed_by: Vec::new(),
            created_at: Utc::now(),
        };

        self.store
            .update::<Vec<Notification>, _, _>(NOTIFICATIONS_KEY, |all| {
                all.push(notification.clone());
                if all.len() > MAX_STORED_NOTIFICATIONS {
                    let excess = all.len() - MAX_STORED_NOTIFICATIONS;
                    all.drain(..excess);
                }
            })
            .await?;

        debug!("Notification {} queued for {:?}", notification.id, notification.recipient);
        Ok(notification)
    }

    /// Newest first.
    pub async fn list_for(&self, user: &User) -> Result<NotificationList, NotificationError> {
        let all: Vec<Notification> = self.store.get_or_default(NOTIFICATIONS_KEY).await?;
        let role = user.app_role();

        let mut notifications: Vec<NotificationView> = all
            .iter()
            .filter(|n| n.is_visible_to(&user.id, role))
            .map(|n| n.view_for(&user.id))
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let unread = notifications.iter().filter(|n| !n.read).count();
        Ok(NotificationList { notifications, unread })
    }

    pub async fn mark_read(&self, user: &User, id: &str) -> Result<NotificationView, NotificationError> {
        let role = user.app_role();
        let view = self
            .store
            .update::<Vec<Notification>, _, _>(NOTIFICATIONS_KEY, |all| {
                let notification = all
                    .iter_mut()
                    .find(|n| n.id == id && n.is_visible_to(&user.id, role))?;
                if !notification.read_by.contains(&user.id) {
                    notification.read_by.push(user.id.clone());
                }
                Some(notification.view_for(&user.id))
            })
            .await?;

        view.ok_or_else(|| NotificationError::NotFound(id.to_string()))
    }

    /// Returns how many notifications changed state.
    pub async fn mark_all_read(&self, user: &User) -> Result<usize, NotificationError> {
        let role = user.app_role();
        let changed = self
            .store
            .update::<Vec<Notification>, _, _>(NOTIFICATIONS_KEY, |all| {
                let mut changed = 0;
                for notification in all.iter_mut() {
                    if notification.is_visible_to(&user.id, role)
                        && !notification.read_by.contains(&user.id)
                    {
                        notification.read_by.push(user.id.clone());
                        changed += 1;
                    }
                }
                changed
            })
            .await?;

        Ok(changed)
    }

    /// Personal notifications are deleted; role-wide ones are hidden for this user only.
    pub async fn dismiss(&self, user: &User, id: &str) -> Result<(), NotificationError> {
        let role = user.app_role();
        let found = self
            .store
            .update::<Vec<Notification>, _, _>(NOTIFICATIONS_KEY, |all| {
                let index = all
                    .iter()
                    .position(|n| n.id == id && n.is_visible_to(&user.id, role))?;
                if matches!(all[index].recipient, Recipient::User(_)) {
                    all.remove(index);
                } else {
                    all[index].dismissed_by.push(user.id.clone());
                }
                Some(())
            })
            .await?;

        found.ok_or_else(|| NotificationError::NotFound(id.to_string()))
    }
}
