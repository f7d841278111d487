//! Admin-managed content: the service menu, promo codes, gallery,
//! studio updates, and partner terms.
//!
//! Service names must stay unique because bookings reference services
//! by name. Promo codes are looked up first-match and are allowed to
//! repeat.

use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{
    GalleryImage, NewGalleryImage, NewPromoCode, NewService, NewStudioUpdate, PartnerCondition,
    PromoCode, ServiceItem, ServiceUpdate, StudioUpdate, StudioUpdatePatch,
};
use crate::store::{collections, DocStore};

// ── Services ──────────────────────────────────────────────

pub fn list_services(store: &DocStore) -> Result<Vec<ServiceItem>, AppError> {
    Ok(store.list(collections::SERVICES)?)
}

pub fn create_service(store: &DocStore, new: NewService) -> Result<ServiceItem, AppError> {
    let name = new.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("service name is required".to_string()));
    }
    let price = new.price.trim().to_string();
    if price.is_empty() {
        return Err(AppError::Validation("price is required".to_string()));
    }
    if store
        .get_one_by::<ServiceItem>(collections::SERVICES, "name", &name)?
        .is_some()
    {
        return Err(AppError::Validation(format!(
            "a service named {name} already exists"
        )));
    }

    let item = ServiceItem {
        id: String::new(),
        name,
        description: new.description.trim().to_string(),
        price,
        image: new.image,
        created_at: String::new(),
    };
    let id = store.create(collections::SERVICES, &item)?;
    tracing::info!(service_id = %id, name = %item.name, "service created");
    store
        .get::<ServiceItem>(collections::SERVICES, &id)?
        .ok_or_else(|| anyhow::anyhow!("service {id} missing after insert").into())
}

pub fn update_service(
    store: &DocStore,
    id: &str,
    patch: ServiceUpdate,
) -> Result<ServiceItem, AppError> {
    let current = store
        .get::<ServiceItem>(collections::SERVICES, id)?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;

    let mut fields = serde_json::Map::new();
    if let Some(name) = patch.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("service name is required".to_string()));
        }
        if name != current.name {
            if store
                .get_one_by::<ServiceItem>(collections::SERVICES, "name", &name)?
                .is_some()
            {
                return Err(AppError::Validation(format!(
                    "a service named {name} already exists"
                )));
            }
            fields.insert("name".into(), json!(name));
        }
    }
    if let Some(description) = patch.description {
        fields.insert("description".into(), json!(description.trim()));
    }
    if let Some(price) = patch.price {
        let price = price.trim().to_string();
        if price.is_empty() {
            return Err(AppError::Validation("price is required".to_string()));
        }
        fields.insert("price".into(), json!(price));
    }
    if let Some(image) = patch.image {
        fields.insert("image".into(), json!(image));
    }

    if !fields.is_empty() {
        store.update(collections::SERVICES, id, &Value::Object(fields))?;
    }
    store
        .get::<ServiceItem>(collections::SERVICES, id)?
        .ok_or_else(|| AppError::NotFound(format!("service {id}")))
}

pub fn delete_service(store: &DocStore, id: &str) -> Result<(), AppError> {
    if !store.delete(collections::SERVICES, id)? {
        return Err(AppError::NotFound(format!("service {id}")));
    }
    tracing::info!(service_id = %id, "service deleted");
    Ok(())
}

// ── Promo codes ───────────────────────────────────────────

pub fn list_promos(store: &DocStore) -> Result<Vec<PromoCode>, AppError> {
    Ok(store.list(collections::PROMO_CODES)?)
}

pub fn create_promo(store: &DocStore, new: NewPromoCode) -> Result<PromoCode, AppError> {
    let code = new.code.trim().to_string();
    if code.is_empty() {
        return Err(AppError::Validation("promo code is required".to_string()));
    }
    let discount = new.discount.trim().to_string();
    if discount.is_empty() {
        return Err(AppError::Validation("discount is required".to_string()));
    }

    let promo = PromoCode {
        id: String::new(),
        code,
        discount,
        created_at: String::new(),
    };
    let id = store.create(collections::PROMO_CODES, &promo)?;
    store
        .get::<PromoCode>(collections::PROMO_CODES, &id)?
        .ok_or_else(|| anyhow::anyhow!("promo {id} missing after insert").into())
}

pub fn delete_promo(store: &DocStore, id: &str) -> Result<(), AppError> {
    if !store.delete(collections::PROMO_CODES, id)? {
        return Err(AppError::NotFound(format!("promo {id}")));
    }
    Ok(())
}

// ── Gallery ───────────────────────────────────────────────

/// Newest first.
pub fn list_gallery(store: &DocStore) -> Result<Vec<GalleryImage>, AppError> {
    let mut images: Vec<GalleryImage> = store.list(collections::GALLERY)?;
    images.reverse();
    Ok(images)
}

pub fn add_gallery_image(store: &DocStore, new: NewGalleryImage) -> Result<GalleryImage, AppError> {
    let src = new.src.trim().to_string();
    if src.is_empty() {
        return Err(AppError::Validation("image source is required".to_string()));
    }

    let image = GalleryImage {
        id: String::new(),
        src,
        alt: new.alt.trim().to_string(),
        created_at: String::new(),
    };
    let id = store.create(collections::GALLERY, &image)?;
    store
        .get::<GalleryImage>(collections::GALLERY, &id)?
        .ok_or_else(|| anyhow::anyhow!("gallery image {id} missing after insert").into())
}

pub fn delete_gallery_image(store: &DocStore, id: &str) -> Result<(), AppError> {
    if !store.delete(collections::GALLERY, id)? {
        return Err(AppError::NotFound(format!("gallery image {id}")));
    }
    Ok(())
}

// ── Studio updates ────────────────────────────────────────

/// Newest first.
pub fn list_updates(store: &DocStore) -> Result<Vec<StudioUpdate>, AppError> {
    let mut updates: Vec<StudioUpdate> = store.list(collections::UPDATES)?;
    updates.reverse();
    Ok(updates)
}

pub fn create_update(store: &DocStore, new: NewStudioUpdate) -> Result<StudioUpdate, AppError> {
    let title = new.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let update = StudioUpdate {
        id: String::new(),
        title,
        description: new.description.trim().to_string(),
        image_url: new.image_url,
        created_at: String::new(),
    };
    let id = store.create(collections::UPDATES, &update)?;
    store
        .get::<StudioUpdate>(collections::UPDATES, &id)?
        .ok_or_else(|| anyhow::anyhow!("update {id} missing after insert").into())
}

pub fn edit_update(
    store: &DocStore,
    id: &str,
    patch: StudioUpdatePatch,
) -> Result<StudioUpdate, AppError> {
    let mut fields = serde_json::Map::new();
    if let Some(title) = patch.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        fields.insert("title".into(), json!(title));
    }
    if let Some(description) = patch.description {
        fields.insert("description".into(), json!(description.trim()));
    }
    if let Some(image_url) = patch.image_url {
        fields.insert("image_url".into(), json!(image_url));
    }

    if !fields.is_empty() && !store.update(collections::UPDATES, id, &Value::Object(fields))? {
        return Err(AppError::NotFound(format!("update {id}")));
    }
    store
        .get::<StudioUpdate>(collections::UPDATES, id)?
        .ok_or_else(|| AppError::NotFound(format!("update {id}")))
}

pub fn delete_update(store: &DocStore, id: &str) -> Result<(), AppError> {
    if !store.delete(collections::UPDATES, id)? {
        return Err(AppError::NotFound(format!("update {id}")));
    }
    Ok(())
}

// ── Partner conditions ────────────────────────────────────

pub fn list_conditions(store: &DocStore) -> Result<Vec<PartnerCondition>, AppError> {
    Ok(store.list(collections::PARTNER_CONDITIONS)?)
}

pub fn create_condition(store: &DocStore, text: &str) -> Result<PartnerCondition, AppError> {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation("condition text is required".to_string()));
    }

    let condition = PartnerCondition {
        id: String::new(),
        text,
        created_at: String::new(),
    };
    let id = store.create(collections::PARTNER_CONDITIONS, &condition)?;
    store
        .get::<PartnerCondition>(collections::PARTNER_CONDITIONS, &id)?
        .ok_or_else(|| anyhow::anyhow!("condition {id} missing after insert").into())
}

pub fn edit_condition(
    store: &DocStore,
    id: &str,
    text: &str,
) -> Result<PartnerCondition, AppError> {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation("condition text is required".to_string()));
    }
    if !store.update(collections::PARTNER_CONDITIONS, id, &json!({"text": text}))? {
        return Err(AppError::NotFound(format!("condition {id}")));
    }
    store
        .get::<PartnerCondition>(collections::PARTNER_CONDITIONS, id)?
        .ok_or_else(|| AppError::NotFound(format!("condition {id}")))
}

pub fn delete_condition(store: &DocStore, id: &str) -> Result<(), AppError> {
    if !store.delete(collections::PARTNER_CONDITIONS, id)? {
        return Err(AppError::NotFound(format!("condition {id}")));
    }
    Ok(())
}
