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

//! Listing filters and ordering.
//!
//! Ordering is limited to the [`SortField`] allow-list; field names coming
//! from a request never reach the store unchecked.

use crate::booking::Booking;
use crate::error::BookingError;
use serde::Deserialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Sortable booking fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    FullName,
    Email,
    Phone,
    CheckIn,
    CheckOut,
    Adults,
    Children,
    Nights,
    TotalPrice,
    BookingDate,
    BookingReference,
    Status,
}

impl SortField {
    fn compare(&self, a: &Booking, b: &Booking) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::FullName => a.full_name.cmp(&b.full_name),
            Self::Email => a.email.cmp(&b.email),
            Self::Phone => a.phone.cmp(&b.phone),
            Self::CheckIn => a.check_in.cmp(&b.check_in),
            Self::CheckOut => a.check_out.cmp(&b.check_out),
            Self::Adults => a.adults.cmp(&b.adults),
            Self::Children => a.children.cmp(&b.children),
            Self::Nights => a.nights.cmp(&b.nights),
            Self::TotalPrice => a.total_price.cmp(&b.total_price),
            Self::BookingDate => a.booking_date.cmp(&b.booking_date),
            Self::BookingReference => a.booking_reference.cmp(&b.booking_reference),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
        }
    }
}

impl FromStr for SortField {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => Self::Id,
            "full_name" => Self::FullName,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "check_in" => Self::CheckIn,
            "check_out" => Self::CheckOut,
            "adults" => Self::Adults,
            "children" => Self::Children,
            "nights" => Self::Nights,
            "total_price" => Self::TotalPrice,
            "booking_date" => Self::BookingDate,
            "booking_reference" => Self::BookingReference,
            "status" => Self::Status,
            other => return Err(BookingError::InvalidOrdering(other.to_string())),
        })
    }
}

/// A sort key with direction, written `field` or `-field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl SortOrder {
    /// Newest bookings first.
    pub const DEFAULT: SortOrder = SortOrder {
        field: SortField::BookingDate,
        descending: true,
    };

    pub fn compare(&self, a: &Booking, b: &Booking) -> Ordering {
        let ordering = self.field.compare(a, b);
        if self.descending { ordering.reverse() } else { ordering }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for SortOrder {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, name) = match s.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, s),
        };
        Ok(SortOrder {
            field: name.parse()?,
            descending,
        })
    }
}

/// Raw query string of the listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<String>,
}

/// A checked listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Lowercased needle matched against name, email or reference.
    pub search: Option<String>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters on `needle` as given, without trimming. An empty needle keeps everything.
    pub fn search(mut self, needle: &str) -> Self {
        self.search = (!needle.is_empty()).then(|| needle.to_lowercase());
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn keeps(&self, booking: &Booking) -> bool {
        self.search
            .as_deref()
            .is_none_or(|needle| booking.matches(needle))
    }
}

impl TryFrom<ListParams> for ListQuery {
    type Error = BookingError;

    /// Checks the ordering against the allow-list.
    ///
    /// A limit that is not a non-negative integer is ignored rather than
    /// rejected. An empty ordering falls back to the default.
    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let mut query = ListQuery::new();
        if let Some(search) = params.search.as_deref() {
            query = query.search(search);
        }
        if let Some(ordering) = params.ordering.as_deref().filter(|o| !o.trim().is_empty()) {
            query = query.order(ordering.parse()?);
        }
        if let Some(limit) = params.limit.as_deref().and_then(|l| l.trim().parse().ok()) {
            query = query.limit(limit);
        }
        Ok(query)
    }
}
