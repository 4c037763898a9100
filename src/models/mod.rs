mod admin;
mod booking;
mod collection;
mod gallery;
mod project;
mod record;
mod service;
mod slider;
mod testimonial;
pub mod timestamp;

pub use admin::AdminCredential;
pub use booking::{Booking, BookingStatus};
pub use collection::Collection;
pub use gallery::GalleryItem;
pub use project::Project;
pub use record::{normalize, Document, Entity, Record, Stored};
pub(crate) use record::to_document;
pub use service::Service;
pub use slider::SliderImage;
pub use testimonial::{ReviewStatus, Testimonial};
