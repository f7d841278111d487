use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub src: String,
    pub alt: String,
    pub created_at: String,
}

/// News/offer posts shown on the public site, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioUpdate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerCondition {
    pub id: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct NewGalleryImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Deserialize)]
pub struct NewStudioUpdate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Partial edit; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct StudioUpdatePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
