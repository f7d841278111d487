//! Customer records, keyed by phone number. Every booking upserts one
//! so the admin screen has a contact list without a signup flow.

use serde_json::json;

use crate::errors::AppError;
use crate::models::Customer;
use crate::store::{collections, DocStore};

pub fn find_or_create(store: &DocStore, phone: &str, name: &str) -> Result<Customer, AppError> {
    if let Some(existing) = store.get_one_by::<Customer>(collections::USERS, "phone", phone)? {
        if !name.is_empty() && existing.name != name {
            store.update(collections::USERS, &existing.id, &json!({"name": name}))?;
            return Ok(Customer {
                name: name.to_string(),
                ..existing
            });
        }
        return Ok(existing);
    }

    let customer = Customer {
        id: String::new(),
        phone: phone.to_string(),
        name: name.to_string(),
        created_at: String::new(),
    };
    let id = store.create(collections::USERS, &customer)?;
    tracing::info!(customer_id = %id, "new customer recorded");
    store
        .get::<Customer>(collections::USERS, &id)?
        .ok_or_else(|| anyhow::anyhow!("customer {id} missing after insert").into())
}

/// Newest first.
pub fn list(store: &DocStore) -> Result<Vec<Customer>, AppError> {
    let mut customers: Vec<Customer> = store.list(collections::USERS)?;
    customers.reverse();
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_phone_reuses_the_record_and_refreshes_the_name() {
        let store = DocStore::open(":memory:").unwrap();
        let first = find_or_create(&store, "5550001111", "Asha").unwrap();
        let second = find_or_create(&store, "5550001111", "Asha Rao").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Asha Rao");

        let all = list(&store).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Asha Rao");
    }

    #[test]
    fn different_phones_get_separate_records() {
        let store = DocStore::open(":memory:").unwrap();
        find_or_create(&store, "5550001111", "Asha").unwrap();
        find_or_create(&store, "5550002222", "Ravi").unwrap();
        assert_eq!(list(&store).unwrap().len(), 2);
    }
}
