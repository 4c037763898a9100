//! Stored record envelope and the per-collection tagged union.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    timestamp, AdminCredential, Booking, Collection, GalleryItem, Project, Service, SliderImage,
    Testimonial,
};

/// A raw record as both stores keep it: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// A record shape bound to the collection that stores it.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
}

/// A record as persisted: its fields plus store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: String,
    #[serde(default, with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Entity> Stored<T> {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(doc))
    }
}

/// Any stored record, tagged by collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Service(Stored<Service>),
    Project(Stored<Project>),
    GalleryItem(Stored<GalleryItem>),
    Testimonial(Stored<Testimonial>),
    SliderImage(Stored<SliderImage>),
    Booking(Stored<Booking>),
    AdminCredential(Stored<AdminCredential>),
}

impl Record {
    /// Decodes a stored document using the shape of `collection`.
    pub fn from_document(collection: Collection, doc: Document) -> Result<Self, serde_json::Error> {
        Ok(match collection {
            Collection::Services => Record::Service(Stored::from_document(doc)?),
            Collection::Projects => Record::Project(Stored::from_document(doc)?),
            Collection::Gallery => Record::GalleryItem(Stored::from_document(doc)?),
            Collection::Testimonials => Record::Testimonial(Stored::from_document(doc)?),
            Collection::SliderImages => Record::SliderImage(Stored::from_document(doc)?),
            Collection::Bookings => Record::Booking(Stored::from_document(doc)?),
            Collection::AdminCredentials => Record::AdminCredential(Stored::from_document(doc)?),
        })
    }

    pub fn collection(&self) -> Collection {
        match self {
            Record::Service(_) => Collection::Services,
            Record::Project(_) => Collection::Projects,
            Record::GalleryItem(_) => Collection::Gallery,
            Record::Testimonial(_) => Collection::Testimonials,
            Record::SliderImage(_) => Collection::SliderImages,
            Record::Booking(_) => Collection::Bookings,
            Record::AdminCredential(_) => Collection::AdminCredentials,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Service(r) => &r.id,
            Record::Project(r) => &r.id,
            Record::GalleryItem(r) => &r.id,
            Record::Testimonial(r) => &r.id,
            Record::SliderImage(r) => &r.id,
            Record::Booking(r) => &r.id,
            Record::AdminCredential(r) => &r.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::Service(r) => r.created_at,
            Record::Project(r) => r.created_at,
            Record::GalleryItem(r) => r.created_at,
            Record::Testimonial(r) => r.created_at,
            Record::SliderImage(r) => r.created_at,
            Record::Booking(r) => r.created_at,
            Record::AdminCredential(r) => r.created_at,
        }
    }
}

/// Checks `value` against the record shape of `collection` and returns the
/// normalized field document (defaults filled in, unknown fields dropped).
pub fn normalize(collection: Collection, value: Value) -> Result<Document, serde_json::Error> {
    match collection {
        Collection::Services => normalize_as::<Service>(value),
        Collection::Projects => normalize_as::<Project>(value),
        Collection::Gallery => normalize_as::<GalleryItem>(value),
        Collection::Testimonials => normalize_as::<Testimonial>(value),
        Collection::SliderImages => normalize_as::<SliderImage>(value),
        Collection::Bookings => normalize_as::<Booking>(value),
        Collection::AdminCredentials => normalize_as::<AdminCredential>(value),
    }
}

fn normalize_as<T: Entity>(value: Value) -> Result<Document, serde_json::Error> {
    let data: T = serde_json::from_value(value)?;
    to_document(&data)
}

/// Serializes a record shape into a field document.
pub(crate) fn to_document<T: Serialize>(data: &T) -> Result<Document, serde_json::Error> {
    match serde_json::to_value(data)? {
        Value::Object(doc) => Ok(doc),
        other => Err(serde::ser::Error::custom(format!(
            "record must serialize to an object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_stored_flattens_fields() {
        let stored: Stored<Service> = Stored::from_document(doc(json!({
            "id": "abc",
            "title": "Lawn Mowing",
            "description": "Weekly mowing",
            "created_at": "2024-05-01T10:00:00.000Z"
        })))
        .unwrap();

        assert_eq!(stored.id, "abc");
        assert_eq!(stored.data.title, "Lawn Mowing");
        assert_eq!(stored.data.category, "");
        assert!(stored.updated_at.is_none());

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["title"], "Lawn Mowing");
        assert_eq!(value["created_at"], "2024-05-01T10:00:00.000Z");
        assert!(value.get("updated_at").is_none());
    }

    #[test]
    fn test_missing_created_at_defaults_to_epoch() {
        let stored: Stored<AdminCredential> = Stored::from_document(doc(json!({
            "id": "1",
            "username": "admin123",
            "password": "admin123"
        })))
        .unwrap();
        assert_eq!(stored.created_at.timestamp(), 0);
    }

    #[test]
    fn test_record_from_document_uses_collection_shape() {
        let record = Record::from_document(
            Collection::Testimonials,
            doc(json!({
                "id": "t1",
                "client_name": "Sarah",
                "review_text": "Great",
                "rating": 5,
                "status": "approved",
                "created_at": "2024-05-01T10:00:00.000Z"
            })),
        )
        .unwrap();

        assert_eq!(record.collection(), Collection::Testimonials);
        assert_eq!(record.id(), "t1");
        match record {
            Record::Testimonial(t) => assert_eq!(t.data.rating, 5),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_record_from_document_rejects_wrong_shape() {
        let result = Record::from_document(
            Collection::Bookings,
            doc(json!({"id": "b1", "title": "not a booking"})),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_fills_defaults_and_drops_unknown() {
        let normalized = normalize(
            Collection::Testimonials,
            json!({"client_name": "Mike", "review_text": "Nice", "rating": 4, "extra": true}),
        )
        .unwrap();

        assert_eq!(normalized["status"], "pending");
        assert!(normalized.get("extra").is_none());
    }

    #[test]
    fn test_normalize_rejects_missing_required_field() {
        assert!(normalize(Collection::Services, json!({"title": "No description"})).is_err());
    }
}
