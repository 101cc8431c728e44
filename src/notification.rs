// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Booking notification emails.
//!
//! Every stored booking triggers one email to the hotel operator. Delivery is
//! best effort: [`Notifier::dispatch`] runs on its own task with a timeout and
//! only logs failures, so a broken mail server never fails a booking.
//!
//! Transports:
//! - [`SmtpMailer`]: real delivery through an SMTP relay
//! - [`LogMailer`]: writes the email to the log, for development
//! - [`RecordingMailer`]: keeps sent emails in memory

use crate::booking::Booking;
use crate::rooms::RoomCatalog;
use crossbeam::queue::SegQueue;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Default bound on a single delivery attempt.
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification failures. These are logged and never reach the guest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// Sender or recipient is not a valid mailbox
    #[error("invalid address {0}")]
    InvalidAddress(String),

    /// Message could not be assembled
    #[error("failed to build email: {0}")]
    Build(String),

    /// Transport rejected or failed to deliver the message
    #[error("failed to send email: {0}")]
    Transport(String),

    /// Delivery did not finish in time
    #[error("email delivery timed out after {0:?}")]
    TimedOut(Duration),

    /// Delivery task panicked or was cancelled
    #[error("email task failed: {0}")]
    Task(String),
}

/// A rendered email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Delivers rendered emails.
///
/// Implementations may block; the [`Notifier`] calls them from a blocking
/// task.
pub trait MailTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`NotificationError`] if the email cannot be built or delivered.
    fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError>;
}

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    /// 465 uses implicit TLS, anything else STARTTLS.
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

/// SMTP transport backed by Lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the relay cannot be configured.
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let builder = if settings.port == 465 {
            SmtpTransport::relay(&settings.host)
        } else {
            SmtpTransport::starttls_relay(&settings.host)
        }
        .map_err(|e| NotificationError::Transport(format!("SMTP relay error: {e}")))?
        .port(settings.port)
        .timeout(Some(settings.timeout));

        let builder = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|_| NotificationError::InvalidAddress(email.from.clone()))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| NotificationError::InvalidAddress(email.to.clone()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| NotificationError::Transport(e.to_string()))
    }
}

/// Writes emails to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl MailTransport for LogMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        info!(to = %email.to, subject = %email.subject, "booking email (not sent, no SMTP relay configured)");
        debug!(body = %email.text_body, "booking email body");
        Ok(())
    }
}

/// Keeps every email it is given, in order.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    outbox: SegQueue<OutgoingEmail>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything sent so far.
    pub fn take(&self) -> Vec<OutgoingEmail> {
        std::iter::from_fn(|| self.outbox.pop()).collect()
    }

    pub fn len(&self) -> usize {
        self.outbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outbox.is_empty()
    }
}

impl MailTransport for RecordingMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<(), NotificationError> {
        self.outbox.push(email.clone());
        Ok(())
    }
}

/// Sender, recipient and time bound for booking notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub from: String,
    /// Operator mailbox that receives every new booking.
    pub operator: String,
    pub timeout: Duration,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            from: "Heritage Hotel <bookings@heritagehotel.com>".to_string(),
            operator: "admin@heritagehotel.com".to_string(),
            timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }
}

/// Renders and sends the new-booking email.
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    settings: MailSettings,
    rooms: Arc<RoomCatalog>,
}

impl Notifier {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        settings: MailSettings,
        rooms: Arc<RoomCatalog>,
    ) -> Self {
        Self {
            transport,
            settings,
            rooms,
        }
    }

    pub fn render(&self, booking: &Booking) -> OutgoingEmail {
        OutgoingEmail {
            from: self.settings.from.clone(),
            to: self.settings.operator.clone(),
            subject: format!("New Heritage Hotel Booking - {}", booking.booking_reference),
            html_body: self.render_html(booking),
            text_body: self.render_text(booking),
        }
    }

    /// Sends the notification for `booking`, waiting at most the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns the transport error, [`NotificationError::TimedOut`], or
    /// [`NotificationError::Task`] if the blocking send panicked.
    pub async fn notify(&self, booking: &Booking) -> Result<(), NotificationError> {
        let email = self.render(booking);
        let transport = Arc::clone(&self.transport);
        let send = tokio::task::spawn_blocking(move || transport.send(&email));

        match tokio::time::timeout(self.settings.timeout, send).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(NotificationError::Task(e.to_string())),
            Err(_) => Err(NotificationError::TimedOut(self.settings.timeout)),
        }
    }

    /// Fire-and-forget [`notify`](Self::notify). Failures are logged only.
    pub fn dispatch(self: &Arc<Self>, booking: Booking) -> JoinHandle<()> {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            match notifier.notify(&booking).await {
                Ok(()) => info!(reference = %booking.booking_reference, "booking notification sent"),
                Err(e) => error!(
                    reference = %booking.booking_reference,
                    error = %e,
                    "failed to send booking notification"
                ),
            }
        })
    }

    fn render_text(&self, booking: &Booking) -> String {
        let rooms: String = self
            .rooms
            .describe(&booking.selected_rooms)
            .iter()
            .map(|line| {
                format!(
                    "  {} x {} @ {} per night\n",
                    line.quantity, line.name, line.price_per_night
                )
            })
            .collect();
        let requests = booking
            .special_requests
            .as_deref()
            .map(|text| format!("Special requests: {text}\n"))
            .unwrap_or_default();

        format!(
            r#"New booking received: {reference}

Guest: {name}
Email: {email}
Phone: {phone}

Check-in: {check_in}
Check-out: {check_out}
Nights: {nights}
Guests: {adults} adults, {children} children

Rooms:
{rooms}
Total: {total}
{requests}Booked at: {booked_at}
"#,
            reference = booking.booking_reference,
            name = booking.full_name,
            email = booking.email,
            phone = booking.phone,
            check_in = booking.check_in,
            check_out = booking.check_out,
            nights = booking.nights,
            adults = booking.adults,
            children = booking.children,
            total = booking.total_price,
            booked_at = booking.booking_date.to_rfc3339(),
        )
    }

    fn render_html(&self, booking: &Booking) -> String {
        let rows: String = self
            .rooms
            .describe(&booking.selected_rooms)
            .iter()
            .map(|line| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&line.name),
                    line.quantity,
                    line.price_per_night,
                    line.total_price
                )
            })
            .collect();
        let requests = booking
            .special_requests
            .as_deref()
            .map(|text| format!("<p><strong>Special requests:</strong> {}</p>", escape_html(text)))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>New booking {reference}</title></head>
<body style="font-family: Arial, sans-serif; color: #333;">
<h2>New booking {reference}</h2>
<p><strong>Guest:</strong> {name}<br><strong>Email:</strong> {email}<br><strong>Phone:</strong> {phone}</p>
<p><strong>Check-in:</strong> {check_in}<br><strong>Check-out:</strong> {check_out}<br><strong>Nights:</strong> {nights}<br><strong>Guests:</strong> {adults} adults, {children} children</p>
<table>
<tr><th>Room</th><th>Qty</th><th>Per night</th><th>Line total</th></tr>
{rows}
</table>
<p><strong>Total:</strong> {total}</p>
{requests}
</body>
</html>"#,
            reference = booking.booking_reference,
            name = escape_html(&booking.full_name),
            email = escape_html(&booking.email),
            phone = escape_html(&booking.phone),
            check_in = booking.check_in,
            check_out = booking.check_out,
            nights = booking.nights,
            adults = booking.adults,
            children = booking.children,
            total = booking.total_price,
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
