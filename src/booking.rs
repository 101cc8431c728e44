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

//! Booking records and the payloads that create them.

use crate::base::{BookingId, BookingReference, RoomId};
use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Booking lifecycle status.
///
/// No transition rules apply: any status can be set from any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    /// Parses the exact lowercase status name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| BookingError::InvalidStatus(s.to_string()))
    }
}

/// Booking payload as submitted by a guest.
///
/// Every field is optional so that missing values surface as field-level
/// validation errors instead of parse failures. Server-assigned fields
/// (`id`, `booking_reference`, `booking_date`, `status`, `nights`) are not
/// accepted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adults: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<i64>,
    /// Room id (as a string key) to quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_rooms: Option<BTreeMap<String, i64>>,
    /// Accepted as a JSON string (`"17000.00"`) or number (`17000.00`).
    #[serde(
        default,
        deserialize_with = "deserialize_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_price: Option<Decimal>,
}

/// Raw price as it may appear in a payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceInput {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(input) = Option::<PriceInput>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = match input {
        PriceInput::Text(text) => text,
        PriceInput::Number(number) => number.to_string(),
    };
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map(Some)
        .map_err(|_| de::Error::custom(format!("invalid decimal number: {raw}")))
}

/// A payload that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub special_requests: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub selected_rooms: BTreeMap<RoomId, u32>,
    /// Always carries exactly two decimal places.
    pub total_price: Decimal,
    pub nights: u32,
}

/// A stored reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub special_requests: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub selected_rooms: BTreeMap<RoomId, u32>,
    pub total_price: Decimal,
    pub nights: u32,
    pub booking_date: DateTime<Utc>,
    pub booking_reference: BookingReference,
    pub status: BookingStatus,
}

impl Booking {
    /// Assembles a pending booking from validated input and server-assigned fields.
    pub fn new(
        id: BookingId,
        booking_reference: BookingReference,
        new: NewBooking,
        booking_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            special_requests: new.special_requests,
            check_in: new.check_in,
            check_out: new.check_out,
            adults: new.adults,
            children: new.children,
            selected_rooms: new.selected_rooms,
            total_price: new.total_price,
            nights: new.nights,
            booking_date,
            booking_reference,
            status: BookingStatus::Pending,
        }
    }

    pub fn guests(&self) -> u64 {
        u64::from(self.adults) + u64::from(self.children)
    }

    /// Case-insensitive substring match against name, email or reference.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.full_name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
            || self
                .booking_reference
                .as_str()
                .to_lowercase()
                .contains(needle)
    }
}
