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

//! Service configuration.
//!
//! Every option can be given as a flag or an environment variable, e.g.
//! `--smtp-host` or `SMTP_HOST`.

use crate::access::AccessPolicy;
use crate::notification::{MailSettings, SmtpSettings};
use crate::stats::DEFAULT_ROOM_CAPACITY;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Heritage Hotel booking service
///
/// Serves the booking REST API and emails the operator about new bookings.
#[derive(Parser, Debug, Clone)]
#[command(name = "heritage-bookings")]
#[command(about = "Room booking service for the Heritage Hotel", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Mailbox that receives new-booking notifications
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@heritagehotel.com")]
    pub admin_email: String,

    /// Sender of notification emails
    #[arg(
        long,
        env = "DEFAULT_FROM_EMAIL",
        default_value = "Heritage Hotel <bookings@heritagehotel.com>"
    )]
    pub from_email: String,

    /// SMTP relay host; emails are only logged when unset
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Upper bound on one notification attempt, in seconds
    #[arg(long, env = "NOTIFICATION_TIMEOUT_SECS", default_value_t = 10)]
    pub notification_timeout_secs: u64,

    /// Rooms assumed available when computing occupancy
    #[arg(long, env = "ROOM_CAPACITY", default_value_t = DEFAULT_ROOM_CAPACITY)]
    pub room_capacity: u32,

    /// Bearer token required for status updates and deletes; open when unset
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,
}

impl Config {
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }

    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            from: self.from_email.clone(),
            operator: self.admin_email.clone(),
            timeout: self.notification_timeout(),
        }
    }

    /// SMTP settings, if a relay host is configured.
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        self.smtp_host.as_ref().map(|host| SmtpSettings {
            host: host.clone(),
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            timeout: self.notification_timeout(),
        })
    }

    pub fn access_policy(&self) -> AccessPolicy {
        match self.admin_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => AccessPolicy::AdminToken(token.to_string()),
            _ => AccessPolicy::Open,
        }
    }
}
