use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// A completed project shown as a before/after pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub before_image: String,
    #[serde(default)]
    pub after_image: String,
    #[serde(default)]
    pub client_name: String,
}

impl Project {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            before_image: String::new(),
            after_image: String::new(),
            client_name: String::new(),
        }
    }

    pub fn with_images(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.before_image = before.into();
        self.after_image = after.into();
        self
    }

    pub fn with_client(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }
}

impl Entity for Project {
    const COLLECTION: Collection = Collection::Projects;
}
