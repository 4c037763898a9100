//! Demo content written into an empty local store.

use serde_json::{json, Value};

use super::{LocalStore, LocalStoreError};
use crate::models::{timestamp, Collection};

const PEXELS: &str = "https://images.pexels.com/photos";

fn photo(id: u32, width: u32) -> String {
    format!(
        "{PEXELS}/{id}/pexels-photo-{id}.jpeg?auto=compress&cs=tinysrgb&w={width}"
    )
}

fn seed_records(collection: Collection, now: &str) -> Value {
    match collection {
        Collection::Services => json!([
            {
                "id": "1",
                "title": "Professional Lawn Mowing",
                "description": "Regular lawn mowing service to keep your grass healthy and well-maintained.",
                "image": photo(1453499, 800),
                "category": "maintenance",
                "created_at": now
            },
            {
                "id": "2",
                "title": "Landscape Design",
                "description": "Custom landscape design services to transform your outdoor space.",
                "image": photo(1080696, 800),
                "category": "design",
                "created_at": now
            },
            {
                "id": "3",
                "title": "Tree Trimming & Pruning",
                "description": "Professional tree care services to maintain healthy and beautiful trees.",
                "image": photo(416978, 800),
                "category": "maintenance",
                "created_at": now
            }
        ]),
        Collection::Projects => json!([
            {
                "id": "1",
                "title": "Modern Front Yard Makeover",
                "description": "Complete transformation of a residential front yard with new landscaping.",
                "before_image": photo(1453499, 800),
                "after_image": photo(1080696, 800),
                "client_name": "John Smith",
                "created_at": now
            },
            {
                "id": "2",
                "title": "Backyard Garden Installation",
                "description": "Beautiful garden installation with native plants and irrigation system.",
                "before_image": photo(416978, 800),
                "after_image": photo(1049298, 800),
                "client_name": "Mary Johnson",
                "created_at": now
            }
        ]),
        Collection::Gallery => json!([
            {
                "id": "1",
                "image": photo(1453499, 800),
                "caption": "Beautiful lawn maintenance",
                "category": "lawn-care",
                "created_at": now
            },
            {
                "id": "2",
                "image": photo(1080696, 800),
                "caption": "Professional landscaping",
                "category": "landscaping",
                "created_at": now
            },
            {
                "id": "3",
                "image": photo(416978, 800),
                "caption": "Garden installation",
                "category": "garden",
                "created_at": now
            }
        ]),
        Collection::Testimonials => json!([
            {
                "id": "1",
                "client_name": "Sarah Johnson",
                "review_text": "Excellent service! My lawn has never looked better.",
                "rating": 5,
                "status": "approved",
                "created_at": now
            },
            {
                "id": "2",
                "client_name": "Mike Davis",
                "review_text": "Professional team and great results. Highly recommended!",
                "rating": 5,
                "status": "approved",
                "created_at": now
            },
            {
                "id": "3",
                "client_name": "Lisa Chen",
                "review_text": "Amazing transformation of our backyard. Thank you!",
                "rating": 4,
                "status": "pending",
                "created_at": now
            }
        ]),
        Collection::SliderImages => json!([
            {
                "id": "1",
                "image": photo(1453499, 1920),
                "caption": "Professional Lawn Care Services",
                "created_at": now
            },
            {
                "id": "2",
                "image": photo(1080696, 1920),
                "caption": "Beautiful Landscape Design",
                "created_at": now
            }
        ]),
        Collection::AdminCredentials => json!([
            {
                "id": "1",
                "username": "admin123",
                "password": "admin123",
                "created_at": now,
                "updated_at": now
            }
        ]),
        Collection::Bookings => json!([]),
    }
}

/// Seeds every collection whose key is absent from `store`.
///
/// Existing keys are left untouched, even if they hold an empty list.
/// Returns the number of collections that were seeded.
pub async fn seed_defaults(store: &dyn LocalStore) -> Result<usize, LocalStoreError> {
    let now = timestamp::now();
    let mut seeded = 0;

    for collection in Collection::ALL {
        let key = collection.storage_key();
        if store.get(key).await?.is_some() {
            continue;
        }
        store
            .set(key, &seed_records(collection, &now).to_string())
            .await?;
        seeded += 1;
    }

    if seeded > 0 {
        tracing::info!("Seeded {} local collection(s) with demo data", seeded);
    }

    Ok(seeded)
}
