use clap::{Args, Subcommand};

use zentra_site::email::EmailError;
use zentra_site::models::{Booking, Testimonial};
use zentra_site::submit::{NotificationHandle, SubmissionService};

#[derive(Args)]
pub struct SubmitCommand {
    #[command(subcommand)]
    pub command: SubmitSubcommand,
}

#[derive(Subcommand)]
pub enum SubmitSubcommand {
    /// Submit a service booking request
    Booking {
        /// Customer name
        #[arg(long)]
        name: String,

        /// Customer email
        #[arg(long)]
        email: String,

        /// Customer phone
        #[arg(long)]
        phone: String,

        /// Service address
        #[arg(long)]
        address: String,

        /// Requested service
        #[arg(long)]
        service: String,

        /// Preferred date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// Preferred time
        #[arg(long)]
        time: Option<String>,

        /// Additional message
        #[arg(long)]
        message: Option<String>,
    },

    /// Submit a customer review
    Review {
        /// Customer name
        #[arg(long)]
        name: String,

        /// Review text
        #[arg(long)]
        text: String,

        /// Star rating, 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
    },
}

/// Waits for the notification and reports how it went.
async fn report_notification(handle: NotificationHandle) {
    match handle.wait().await {
        Ok(sent) => println!("Notification sent (id: {})", sent.id),
        Err(EmailError::NotConfigured) => {
            println!("Notification skipped: email is not configured")
        }
        Err(e) => println!("Notification failed: {}", e),
    }
}

impl SubmitCommand {
    pub async fn run(&self, service: &SubmissionService) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SubmitSubcommand::Booking {
                name,
                email,
                phone,
                address,
                service: requested,
                date,
                time,
                message,
            } => {
                let mut booking = Booking::new(name, email, phone, address, requested);
                if let Some(date) = date {
                    booking = booking.with_preferred_date(date);
                }
                if let Some(time) = time {
                    booking = booking.with_preferred_time(time);
                }
                if let Some(message) = message {
                    booking = booking.with_message(message);
                }

                let submission = service.submit_booking(booking).await?;
                println!(
                    "Booking {} received ({} store)",
                    submission.record.value.id, submission.record.backend
                );
                report_notification(submission.notification).await;
                Ok(())
            }

            SubmitSubcommand::Review { name, text, rating } => {
                let review = Testimonial::new(name, text, *rating);
                let submission = service.submit_testimonial(review).await?;
                println!(
                    "Review {} received and awaiting approval ({} store)",
                    submission.record.value.id, submission.record.backend
                );
                report_notification(submission.notification).await;
                Ok(())
            }
        }
    }
}
