use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// A hero slider image on the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderImage {
    pub image: String,
    #[serde(default)]
    pub caption: String,
}

impl SliderImage {
    pub fn new(image: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            caption: caption.into(),
        }
    }
}

impl Entity for SliderImage {
    const COLLECTION: Collection = Collection::SliderImages;
}
