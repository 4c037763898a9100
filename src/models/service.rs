use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// A service offered on the website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub title: String,
    pub description: String,
    /// Image URL (remote download URL or data URL).
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

impl Service {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image: String::new(),
            category: String::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

impl Entity for Service {
    const COLLECTION: Collection = Collection::Services;
}
