use async_trait::async_trait;
use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use zentra_site::email::{EmailConfig, EmailError, EmailSender};
use zentra_site::local::{seed_defaults, LocalStore, SqliteStore};
use zentra_site::models::{
    Booking, BookingStatus, Collection, Document, GalleryItem, Service, Testimonial,
};
use zentra_site::remote::{RemoteError, RemoteStore};
use zentra_site::store::{AuthError, Backend, DataStore, StoreError};
use zentra_site::submit::SubmissionService;

struct TestContext {
    store: DataStore,
    local: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

async fn setup() -> TestContext {
    let temp_dir = TempDir::new().unwrap();
    let local = Arc::new(
        SqliteStore::open(&temp_dir.path().join("site.db"))
            .await
            .unwrap(),
    );
    seed_defaults(local.as_ref()).await.unwrap();
    TestContext {
        store: DataStore::new(local.clone()),
        local,
        _temp_dir: temp_dir,
    }
}

/// A remote that is configured but unreachable.
#[derive(Default)]
struct DownRemote {
    calls: AtomicUsize,
}

impl DownRemote {
    fn fail<T>(&self) -> Result<T, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RemoteError::HttpError("connection refused".to_string()))
    }
}

#[async_trait]
impl RemoteStore for DownRemote {
    async fn list(&self, _: Collection) -> Result<Vec<Document>, RemoteError> {
        self.fail()
    }

    async fn create(&self, _: Collection, _: &Document) -> Result<String, RemoteError> {
        self.fail()
    }

    async fn update(&self, _: Collection, _: &str, _: &Document) -> Result<(), RemoteError> {
        self.fail()
    }

    async fn delete(&self, _: Collection, _: &str) -> Result<(), RemoteError> {
        self.fail()
    }

    async fn find(
        &self,
        _: Collection,
        _: &[(&str, Value)],
    ) -> Result<Option<Document>, RemoteError> {
        self.fail()
    }

    async fn upload(&self, _: &str, _: &str, _: Vec<u8>) -> Result<String, RemoteError> {
        self.fail()
    }
}

/// Starts an email API stand-in that always answers with `status`.
async fn email_api(status: StatusCode) -> String {
    let app = Router::new().route(
        "/emails",
        post(move || async move { (status, Json(json!({"id": "msg-1"}))) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/emails", addr)
}

#[tokio::test]
async fn insert_then_fetch_returns_record_newest_first() {
    let ctx = setup().await;

    let inserted = ctx
        .store
        .insert(&Service::new("Irrigation Repair", "Sprinkler fixes"))
        .await
        .unwrap();
    assert_eq!(inserted.backend, Backend::Local);
    assert!(!inserted.value.id.is_empty());

    let services = ctx.store.fetch::<Service>().await.unwrap().value;
    assert_eq!(services.len(), 4);
    assert_eq!(services[0].id, inserted.value.id);
    assert_eq!(services[0].data.title, "Irrigation Repair");
}

#[tokio::test]
async fn records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("site.db");

    let id = {
        let local = Arc::new(SqliteStore::open(&path).await.unwrap());
        let store = DataStore::new(local);
        store
            .insert(&GalleryItem::new("patio.jpg"))
            .await
            .unwrap()
            .value
            .id
    };

    let store = DataStore::new(Arc::new(SqliteStore::open(&path).await.unwrap()));
    let gallery = store.fetch::<GalleryItem>().await.unwrap().value;
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0].id, id);
}

#[tokio::test]
async fn update_of_missing_id_changes_nothing() {
    let ctx = setup().await;
    let before = ctx.local.get("zentra_projects").await.unwrap();

    let patch = json!({"title": "Nope"}).as_object().cloned().unwrap();
    ctx.store
        .update(Collection::Projects, "missing", patch)
        .await
        .unwrap();

    assert_eq!(ctx.local.get("zentra_projects").await.unwrap(), before);
}

#[tokio::test]
async fn delete_removes_exactly_one_record() {
    let ctx = setup().await;

    ctx.store.delete(Collection::Services, "2").await.unwrap();

    let mut ids: Vec<String> = ctx
        .store
        .fetch::<Service>()
        .await
        .unwrap()
        .value
        .into_iter()
        .map(|s| s.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["1".to_string(), "3".to_string()]);
}

#[tokio::test]
async fn seeded_admin_authenticates() {
    let ctx = setup().await;

    assert!(ctx.store.authenticate("admin123", "admin123").await.is_ok());
    for (user, pass) in [("admin123", "admin"), ("admin", "admin123"), ("", "")] {
        assert_eq!(
            ctx.store.authenticate(user, pass).await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }
}

#[tokio::test]
async fn booking_persists_when_email_api_is_down() {
    let ctx = setup().await;
    let endpoint = email_api(StatusCode::SERVICE_UNAVAILABLE).await;
    let email = EmailSender::new(EmailConfig {
        api_key: Some("re_test".to_string()),
        endpoint,
        ..EmailConfig::default()
    });
    let service = SubmissionService::new(ctx.store.clone(), email);

    let mut booking = Booking::new("Kim", "kim@example.com", "555-0199", "9 Pine Ct", "Sod Install")
        .with_preferred_date("2024-07-04");
    booking.status = BookingStatus::Confirmed;

    let submission = service.submit_booking(booking).await.unwrap();
    let id = submission.record.value.id.clone();

    match submission.notification.wait().await {
        Err(EmailError::ApiError { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected API error, got {:?}", other),
    }

    let bookings = ctx.store.fetch::<Booking>().await.unwrap().value;
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, id);
    assert_eq!(bookings[0].data.status, BookingStatus::Pending);
}

#[tokio::test]
async fn review_notification_is_delivered() {
    let ctx = setup().await;
    let endpoint = email_api(StatusCode::OK).await;
    let email = EmailSender::new(EmailConfig {
        api_key: Some("re_test".to_string()),
        endpoint,
        ..EmailConfig::default()
    });
    let service = SubmissionService::new(ctx.store.clone(), email);

    let submission = service
        .submit_testimonial(Testimonial::new("Ola", "Lovely garden", 5))
        .await
        .unwrap();
    assert_eq!(submission.notification.wait().await.unwrap().id, "msg-1");
}

#[tokio::test]
async fn unknown_collection_fetches_empty() {
    let ctx = setup().await;
    let served = ctx.store.fetch_by_name("not_a_collection").await.unwrap();
    assert!(served.value.is_empty());
}

#[tokio::test]
async fn unreachable_remote_falls_back_and_mirror_receives_writes() {
    let ctx = setup().await;
    let remote = Arc::new(DownRemote::default());
    let store = ctx.store.clone().with_remote(remote.clone());

    let inserted = store
        .insert(&Service::new("Gutter Cleaning", "Seasonal"))
        .await
        .unwrap();
    assert_eq!(inserted.backend, Backend::Local);

    let served = store.fetch::<Service>().await.unwrap();
    assert_eq!(served.backend, Backend::Local);
    assert_eq!(served.value[0].id, inserted.value.id);

    let auth = store.authenticate("admin123", "admin123").await.unwrap();
    assert_eq!(auth.backend, Backend::Local);

    assert!(remote.calls.load(Ordering::SeqCst) >= 3);

    // The mirror holds the write even without the remote
    let raw = ctx.local.get("zentra_services").await.unwrap().unwrap();
    assert!(raw.contains(&inserted.value.id));
}

#[tokio::test]
async fn corrupt_local_data_is_reported() {
    let ctx = setup().await;
    ctx.local.set("zentra_gallery", "[{\"id\": 1").await.unwrap();

    assert!(ctx.store.fetch::<GalleryItem>().await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_bookings_all_persist() {
    let ctx = setup().await;
    let service = SubmissionService::new(
        ctx.store.clone(),
        EmailSender::new(EmailConfig::default()),
    );

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let booking = Booking::new(
                    format!("Client {}", i),
                    format!("client{}@example.com", i),
                    "555-0100",
                    "1 Elm St",
                    "Mulching",
                );
                service.submit_booking(booking).await.unwrap().record.value.id
            })
        })
        .collect();

    let mut submitted = Vec::new();
    for task in tasks {
        submitted.push(task.await.unwrap());
    }
    submitted.sort();

    let mut stored: Vec<String> = ctx
        .store
        .fetch::<Booking>()
        .await
        .unwrap()
        .value
        .into_iter()
        .map(|b| b.id)
        .collect();
    stored.sort();
    assert_eq!(stored.len(), 20);
    assert_eq!(stored, submitted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_updates_and_deletes_keep_every_change() {
    let ctx = setup().await;

    let mut ids = Vec::new();
    for i in 0..10 {
        let inserted = ctx
            .store
            .insert(&GalleryItem::new(format!("yard-{}.jpg", i)))
            .await
            .unwrap();
        ids.push(inserted.value.id);
    }

    let tasks: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let store = ctx.store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    store.delete(Collection::Gallery, &id).await.unwrap();
                } else {
                    let patch = json!({"caption": format!("caption {}", i)})
                        .as_object()
                        .cloned()
                        .unwrap();
                    store.update(Collection::Gallery, &id, patch).await.unwrap();
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let gallery = ctx.store.fetch::<GalleryItem>().await.unwrap().value;
    // Three seeded items plus the five that were not deleted
    assert_eq!(gallery.len(), 8);
    for (i, id) in ids.iter().enumerate() {
        let found = gallery.iter().find(|g| &g.id == id);
        if i % 2 == 0 {
            assert!(found.is_none());
        } else {
            assert_eq!(found.unwrap().data.caption, format!("caption {}", i));
        }
    }
}

#[tokio::test]
async fn shape_breaking_patch_is_rejected_and_collection_still_fetches() {
    let ctx = setup().await;
    let before = ctx.local.get("zentra_testimonials").await.unwrap();

    let patch = json!({"rating": "five"}).as_object().cloned().unwrap();
    let err = ctx
        .store
        .update(Collection::Testimonials, "1", patch)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidRecord {
            collection: Collection::Testimonials,
            ..
        }
    ));

    assert_eq!(ctx.local.get("zentra_testimonials").await.unwrap(), before);
    let reviews = ctx.store.fetch::<Testimonial>().await.unwrap().value;
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews.iter().find(|r| r.id == "1").unwrap().data.rating, 5);
}

#[tokio::test]
async fn out_of_range_rating_is_not_stored() {
    let ctx = setup().await;

    let result = ctx
        .store
        .insert_value(
            Collection::Testimonials,
            json!({"client_name": "Zed", "review_text": "Fine", "rating": 0}),
        )
        .await;
    assert!(matches!(result, Err(StoreError::InvalidRecord { .. })));
    assert_eq!(ctx.store.fetch::<Testimonial>().await.unwrap().value.len(), 3);
}
