use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub image: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub category: String,
}

impl GalleryItem {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            caption: String::new(),
            category: String::new(),
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

impl Entity for GalleryItem {
    const COLLECTION: Collection = Collection::Gallery;
}
