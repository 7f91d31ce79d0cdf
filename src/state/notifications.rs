//! Unread-notification digest shown in the navigation badges.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

use crate::net::types::{Notification, TEAM_INVITATION};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationDigest {
    pub items: Vec<Notification>,
    pub unread_total: usize,
    /// Unread `team_invitation` notifications.
    pub unread_invitations: usize,
}

impl NotificationDigest {
    pub fn from_items(items: Vec<Notification>) -> Self {
        let unread_total = items.iter().filter(|n| !n.is_read).count();
        let unread_invitations = count_unread(&items, TEAM_INVITATION);
        Self { items, unread_total, unread_invitations }
    }

    pub fn unread_of_type(&self, kind: &str) -> usize {
        count_unread(&self.items, kind)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn count_unread(items: &[Notification], kind: &str) -> usize {
    items.iter().filter(|n| !n.is_read && n.kind == kind).count()
}
