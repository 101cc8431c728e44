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

//! Booking persistence.

use crate::base::{BookingId, BookingReference};
use crate::booking::{Booking, BookingRequest, BookingStatus, NewBooking};
use crate::error::BookingError;
use crate::query::ListQuery;
use crate::reference::{RandomReferenceGenerator, ReferenceGenerator};
use crate::rooms::RoomCatalog;
use crate::stats::{BookingStats, DEFAULT_ROOM_CAPACITY};
use crate::validator;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Attempts at drawing an unused reference before giving up.
pub const MAX_REFERENCE_ATTEMPTS: usize = 8;

/// Window and size of the recent-bookings feed.
pub const RECENT_FEED_HOURS: i64 = 24;
pub const RECENT_FEED_LIMIT: usize = 10;

/// In-memory booking store.
///
/// Bookings live in a sharded map keyed by id. A second map from reference to
/// id is the unique index: inserting into it uses the entry API, so two
/// concurrent creates that draw the same reference cannot both succeed.
pub struct BookingStore {
    /// Bookings indexed by surrogate id.
    bookings: DashMap<BookingId, Booking>,
    /// Unique index on `booking_reference`.
    references: DashMap<BookingReference, BookingId>,
    next_id: AtomicU64,
    generator: Arc<dyn ReferenceGenerator>,
    rooms: Arc<RoomCatalog>,
    room_capacity: u32,
}

impl BookingStore {
    /// Creates an empty store with the default room catalog and random references.
    pub fn new() -> Self {
        Self::with_parts(
            Arc::new(RoomCatalog::default()),
            Arc::new(RandomReferenceGenerator),
            DEFAULT_ROOM_CAPACITY,
        )
    }

    pub fn with_parts(
        rooms: Arc<RoomCatalog>,
        generator: Arc<dyn ReferenceGenerator>,
        room_capacity: u32,
    ) -> Self {
        BookingStore {
            bookings: DashMap::new(),
            references: DashMap::new(),
            next_id: AtomicU64::new(1),
            generator,
            rooms,
            room_capacity,
        }
    }

    pub fn rooms(&self) -> &RoomCatalog {
        &self.rooms
    }

    /// Validates and stores a new booking, stamped with the current time.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Validation`] - The payload broke a field or booking rule.
    /// - [`BookingError::Persistence`] - No unused reference was found within
    ///   [`MAX_REFERENCE_ATTEMPTS`] draws.
    pub fn create(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        self.create_at(request, Utc::now())
    }

    /// Like [`create`](Self::create) with an explicit creation timestamp.
    pub fn create_at(
        &self,
        request: BookingRequest,
        booking_date: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        let new = validator::validate(request, &self.rooms)?;
        self.insert(new, booking_date)
    }

    /// Stores an already validated booking, retrying on reference collisions.
    pub fn insert(
        &self,
        new: NewBooking,
        booking_date: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let reference = self.generator.generate();
            match self.try_insert(&new, reference, booking_date) {
                Ok(booking) => {
                    debug!(
                        id = %booking.id,
                        reference = %booking.booking_reference,
                        attempt,
                        "booking stored"
                    );
                    return Ok(booking);
                }
                Err(BookingError::ReferenceConflict(reference)) => {
                    warn!(%reference, attempt, "booking reference collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(BookingError::Persistence(format!(
            "no unused booking reference after {MAX_REFERENCE_ATTEMPTS} attempts"
        )))
    }

    /// Claims `reference` in the unique index and stores the booking under a fresh id.
    fn try_insert(
        &self,
        new: &NewBooking,
        reference: BookingReference,
        booking_date: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        // Entry API keeps check-and-insert atomic within the shard.
        match self.references.entry(reference) {
            Entry::Occupied(entry) => Err(BookingError::ReferenceConflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                let id = BookingId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let booking = Booking::new(id, entry.key().clone(), new.clone(), booking_date);
                self.bookings.insert(id, booking.clone());
                entry.insert(id);
                Ok(booking)
            }
        }
    }

    /// # Errors
    ///
    /// [`BookingError::NotFound`] if no booking has this id.
    pub fn get_by_id(&self, id: BookingId) -> Result<Booking, BookingError> {
        self.bookings
            .get(&id)
            .map(|booking| booking.value().clone())
            .ok_or(BookingError::NotFound)
    }

    /// # Errors
    ///
    /// [`BookingError::NotFound`] if no booking has this reference.
    pub fn get_by_reference(&self, reference: &str) -> Result<Booking, BookingError> {
        let id = self
            .references
            .get(&BookingReference::new(reference))
            .map(|id| *id)
            .ok_or(BookingError::NotFound)?;
        self.get_by_id(id)
    }

    /// Returns the bookings matching `query`, sorted and truncated.
    ///
    /// Ties under the requested ordering fall back to newest id first.
    pub fn list(&self, query: &ListQuery) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| query.keeps(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        bookings.sort_by(|a, b| query.order.compare(a, b).then_with(|| b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            bookings.truncate(limit);
        }
        bookings
    }

    /// Overwrites the status of a booking. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidStatus`] - `status` is not a known status; nothing changes.
    /// - [`BookingError::NotFound`] - No booking has this id.
    pub fn update_status(&self, id: BookingId, status: &str) -> Result<Booking, BookingError> {
        let status: BookingStatus = status.parse()?;
        let mut booking = self.bookings.get_mut(&id).ok_or(BookingError::NotFound)?;
        booking.status = status;
        Ok(booking.value().clone())
    }

    /// Permanently removes a booking and frees its reference.
    ///
    /// # Errors
    ///
    /// [`BookingError::NotFound`] if no booking has this id.
    pub fn delete(&self, id: BookingId) -> Result<Booking, BookingError> {
        let (_, booking) = self.bookings.remove(&id).ok_or(BookingError::NotFound)?;
        self.references.remove(&booking.booking_reference);
        Ok(booking)
    }

    /// Copies every stored booking, in no particular order.
    pub fn snapshot(&self) -> Vec<Booking> {
        self.bookings.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn stats(&self) -> BookingStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> BookingStats {
        BookingStats::compute(&self.snapshot(), now, self.room_capacity)
    }

    /// Bookings created in the last 24 hours, newest first, at most ten.
    pub fn recent(&self, now: DateTime<Utc>) -> Vec<Booking> {
        let since = now - Duration::hours(RECENT_FEED_HOURS);
        let mut bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|entry| entry.booking_date >= since)
            .map(|entry| entry.value().clone())
            .collect();
        bookings.sort_by(|a, b| {
            b.booking_date
                .cmp(&a.booking_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        bookings.truncate(RECENT_FEED_LIMIT);
        bookings
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}
