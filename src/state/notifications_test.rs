use super::*;
use serde_json::json;

fn notifications() -> Vec<Notification> {
    serde_json::from_value(json!([
        { "type": "team_invitation", "isRead": false, "teamId": "t1" },
        { "type": "team_invitation", "isRead": true },
        { "type": "match_scheduled", "isRead": false },
        { "type": "match_scheduled" }
    ]))
    .unwrap()
}

#[test]
fn default_digest_is_empty() {
    let digest = NotificationDigest::default();
    assert!(digest.is_empty());
    assert_eq!(digest.unread_total, 0);
    assert_eq!(digest.unread_invitations, 0);
}

#[test]
fn from_items_counts_unread() {
    let digest = NotificationDigest::from_items(notifications());
    assert_eq!(digest.items.len(), 4);
    assert_eq!(digest.unread_total, 3);
    assert_eq!(digest.unread_invitations, 1);
}

#[test]
fn unread_of_type_filters_kind() {
    let digest = NotificationDigest::from_items(notifications());
    assert_eq!(digest.unread_of_type("match_scheduled"), 2);
    assert_eq!(digest.unread_of_type("tournament_started"), 0);
}

#[test]
fn extra_fields_are_preserved() {
    let digest = NotificationDigest::from_items(notifications());
    assert_eq!(digest.items[0].extra.get("teamId"), Some(&json!("t1")));
}
