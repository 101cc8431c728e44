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

//! # Heritage Bookings
//!
//! This library provides the room booking service of the Heritage Hotel:
//! validating booking requests, assigning booking references, reporting on
//! stored bookings, and notifying the operator about new ones.
//!
//! ## Core Components
//!
//! - [`BookingStore`]: Owns every booking; create, lookup, listing, status, delete
//! - [`validate`]: Field and booking rules applied before anything is stored
//! - [`ReferenceGenerator`]: Source of `HH` + 8 character booking references
//! - [`BookingStats`]: Dashboard figures over the stored bookings
//! - [`Notifier`]: Best-effort email to the operator for each new booking
//! - [`create_router`]: The REST API on top of the store
//!
//! ## Example
//!
//! ```
//! use heritage_bookings::{BookingRequest, BookingStatus, BookingStore};
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use std::collections::BTreeMap;
//!
//! let store = BookingStore::new();
//!
//! let booking = store
//!     .create(BookingRequest {
//!         full_name: Some("Amal Perera".into()),
//!         email: Some("amal@example.com".into()),
//!         phone: Some("0771234567".into()),
//!         check_in: NaiveDate::from_ymd_opt(2024, 6, 1),
//!         check_out: NaiveDate::from_ymd_opt(2024, 6, 3),
//!         selected_rooms: Some(BTreeMap::from([("1".into(), 2)])),
//!         total_price: Some(dec!(17000.00)),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! assert_eq!(booking.nights, 2);
//! assert_eq!(booking.status, BookingStatus::Pending);
//! assert!(booking.booking_reference.as_str().starts_with("HH"));
//! ```
//!
//! ## Thread Safety
//!
//! The store is built on sharded concurrent maps. Reference uniqueness is
//! enforced atomically by the store's index, so concurrent creates never
//! share a reference.

pub mod access;
mod base;
mod booking;
pub mod config;
pub mod error;
pub mod export;
pub mod notification;
pub mod query;
pub mod reference;
mod rooms;
pub mod server;
mod stats;
mod store;
pub mod validator;

pub use access::AccessPolicy;
pub use base::{BookingId, BookingReference, RoomId};
pub use booking::{Booking, BookingRequest, BookingStatus, NewBooking};
pub use config::Config;
pub use error::{BookingError, ValidationErrors};
pub use notification::{MailSettings, MailTransport, Notifier, NotificationError};
pub use query::{ListQuery, SortField, SortOrder};
pub use reference::{RandomReferenceGenerator, ReferenceGenerator};
pub use rooms::{RoomCatalog, RoomLine, RoomType};
pub use server::{AppState, create_router};
pub use stats::{BookingStats, DEFAULT_ROOM_CAPACITY};
pub use store::{BookingStore, MAX_REFERENCE_ATTEMPTS};
pub use validator::validate;
