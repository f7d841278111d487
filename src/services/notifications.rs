//! Site-wide notices shown on the customer-facing pages.

use serde_json::json;

use crate::errors::AppError;
use crate::models::Notification;
use crate::store::{collections, DocStore};

pub fn emit(
    store: &DocStore,
    title: &str,
    message: &str,
    link: Option<String>,
) -> Result<Notification, AppError> {
    let notification = Notification {
        id: String::new(),
        title: title.to_string(),
        message: message.to_string(),
        link,
        read: false,
        created_at: String::new(),
    };
    let id = store.create(collections::NOTIFICATIONS, &notification)?;
    store
        .get::<Notification>(collections::NOTIFICATIONS, &id)?
        .ok_or_else(|| anyhow::anyhow!("notification {id} missing after insert").into())
}

/// Newest first.
pub fn list(store: &DocStore) -> Result<Vec<Notification>, AppError> {
    let mut notices: Vec<Notification> = store.list(collections::NOTIFICATIONS)?;
    notices.reverse();
    Ok(notices)
}

/// Marking twice is fine; the second call is a no-op.
pub fn mark_read(store: &DocStore, id: &str) -> Result<(), AppError> {
    if !store.update(collections::NOTIFICATIONS, id, &json!({"read": true}))? {
        return Err(AppError::NotFound(format!("notification {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_and_mark_read() {
        let store = DocStore::open(":memory:").unwrap();
        let notice = emit(&store, "Booking Confirmed", "see details", Some("/x".to_string())).unwrap();
        assert!(!notice.read);

        mark_read(&store, &notice.id).unwrap();
        mark_read(&store, &notice.id).unwrap();

        let notices = list(&store).unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].read);
    }

    #[test]
    fn mark_read_missing_is_not_found() {
        let store = DocStore::open(":memory:").unwrap();
        assert!(matches!(
            mark_read(&store, "nope"),
            Err(AppError::NotFound(_))
        ));
    }
}
