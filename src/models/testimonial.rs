use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Collection, Entity};

/// Moderation status of a customer review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Approved => write!(f, "approved"),
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            _ => Err(format!(
                "Invalid review status '{}'. Valid options: pending, approved",
                s
            )),
        }
    }
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub client_name: String,
    pub review_text: String,
    /// Star rating, 1 to 5.
    #[serde(deserialize_with = "deserialize_rating")]
    pub rating: u8,
    #[serde(default)]
    pub status: ReviewStatus,
}

fn deserialize_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = u8::deserialize(deserializer)?;
    if (1..=5).contains(&rating) {
        Ok(rating)
    } else {
        Err(serde::de::Error::custom(format!(
            "rating must be between 1 and 5, got {}",
            rating
        )))
    }
}

impl Testimonial {
    pub fn new(client_name: impl Into<String>, review_text: impl Into<String>, rating: u8) -> Self {
        Self {
            client_name: client_name.into(),
            review_text: review_text.into(),
            rating: rating.clamp(1, 5),
            status: ReviewStatus::Pending,
        }
    }

    pub fn with_status(mut self, status: ReviewStatus) -> Self {
        self.status = status;
        self
    }
}

impl Entity for Testimonial {
    const COLLECTION: Collection = Collection::Testimonials;
}
