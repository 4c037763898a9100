use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Collection, Entity};

/// Workflow status of a service booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!(
                "Invalid booking status '{}'. Valid options: pending, confirmed, completed, cancelled",
                s
            )),
        }
    }
}

/// A service booking request submitted from the website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Requested service, free text.
    pub service: String,
    /// Preferred date as entered in the form (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub preferred_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
}

impl Booking {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: address.into(),
            service: service.into(),
            preferred_date: None,
            preferred_time: String::new(),
            message: None,
            status: BookingStatus::Pending,
        }
    }

    pub fn with_preferred_date(mut self, date: impl Into<String>) -> Self {
        self.preferred_date = Some(date.into());
        self
    }

    pub fn with_preferred_time(mut self, time: impl Into<String>) -> Self {
        self.preferred_time = time.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Human-readable preferred date, e.g. "June 3, 2024".
    pub fn preferred_date_label(&self) -> String {
        match self.preferred_date.as_deref().map(str::trim) {
            None | Some("") => "Not specified".to_string(),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| d.format("%B %-d, %Y").to_string())
                .unwrap_or_else(|_| raw.to_string()),
        }
    }
}

impl Entity for Booking {
    const COLLECTION: Collection = Collection::Bookings;
}
