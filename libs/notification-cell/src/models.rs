use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::auth::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "lowercase")]
pub enum Recipient {
    User(String),
    Role(UserRole),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Stored notification. Role-wide notifications track read/dismissed state
/// per user so one record serves every member of the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub read_by: Vec<String>,
    #[serde(default)]
    pub dismissed_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_visible_to(&self, user_id: &str, role: Option<UserRole>) -> bool {
        if self.dismissed_by.iter().any(|u| u == user_id) {
            return false;
        }
        match &self.recipient {
            Recipient::User(id) => id == user_id,
            Recipient::Role(r) => Some(*r) == role,
        }
    }

    pub fn view_for(&self, user_id: &str) -> NotificationView {
        NotificationView {
            id: self.id.clone(),
            title: self.title.clone(),
            message: self.message.clone(),
            kind: self.kind,
            read: self.read_by.iter().any(|u| u == user_id),
            created_at: self.created_at,
        }
    }
}

/// A notification as seen by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationList {
    pub notifications: Vec<NotificationView>,
    pub unread: usize,
}
