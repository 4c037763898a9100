use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named record collections shared by the remote store and the local mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Services,
    Projects,
    Gallery,
    Testimonials,
    SliderImages,
    AdminCredentials,
    Bookings,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Services,
        Collection::Projects,
        Collection::Gallery,
        Collection::Testimonials,
        Collection::SliderImages,
        Collection::AdminCredentials,
        Collection::Bookings,
    ];

    /// Collection name used by the remote store and the HTTP API.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Projects => "projects",
            Collection::Gallery => "gallery",
            Collection::Testimonials => "testimonials",
            Collection::SliderImages => "slider_images",
            Collection::AdminCredentials => "admin_credentials",
            Collection::Bookings => "bookings",
        }
    }

    /// Key under which the local store keeps this collection.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Services => "zentra_services",
            Collection::Projects => "zentra_projects",
            Collection::Gallery => "zentra_gallery",
            Collection::Testimonials => "zentra_testimonials",
            Collection::SliderImages => "zentra_slider_images",
            Collection::AdminCredentials => "zentra_admin_credentials",
            Collection::Bookings => "zentra_bookings",
        }
    }

    /// Parse from a collection name. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == s)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
            format!(
                "Invalid collection '{}'. Valid options: {}",
                s,
                valid.join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(Collection::parse("services"), Some(Collection::Services));
        assert_eq!(
            Collection::parse("slider_images"),
            Some(Collection::SliderImages)
        );
        assert_eq!(Collection::parse("BOOKINGS"), Some(Collection::Bookings));
    }

    #[test]
    fn test_parse_unknown_name() {
        assert_eq!(Collection::parse("invoices"), None);
        assert_eq!(Collection::parse(""), None);
        assert!(Collection::from_str("invoices")
            .unwrap_err()
            .contains("Valid options"));
    }

    #[test]
    fn test_storage_keys_are_prefixed_and_unique() {
        let mut keys: Vec<&str> = Collection::ALL.iter().map(|c| c.storage_key()).collect();
        assert!(keys.iter().all(|k| k.starts_with("zentra_")));
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Collection::ALL.len());
    }

    #[test]
    fn test_name_roundtrips_through_parse() {
        for collection in Collection::ALL {
            assert_eq!(Collection::parse(collection.name()), Some(collection));
            assert_eq!(collection.to_string(), collection.name());
        }
    }
}
