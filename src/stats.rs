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

//! Dashboard statistics.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use heritage_bookings::BookingStats;
//!
//! let stats = BookingStats::compute(&[], Utc::now(), 100);
//! assert_eq!(stats.total_bookings, 0);
//! assert_eq!(stats.total_revenue.to_string(), "0.00");
//! assert_eq!(stats.occupancy_rate, 0.0);
//! ```

use crate::booking::{Booking, BookingStatus};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rooms assumed available when computing occupancy.
pub const DEFAULT_ROOM_CAPACITY: u32 = 100;

/// Window counted by `recent_bookings_count`.
pub const RECENT_WINDOW_DAYS: i64 = 7;

const MONEY_DP: u32 = 2;

/// Aggregate figures over every stored booking.
///
/// Money fields serialize as strings with two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingStats {
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub confirmed_bookings: u64,
    pub cancelled_bookings: u64,
    pub completed_bookings: u64,
    pub total_revenue: Decimal,
    pub monthly_revenue: Decimal,
    pub average_booking_value: Decimal,
    /// Percentage with one decimal place.
    pub occupancy_rate: f64,
    pub total_guests: u64,
    pub recent_bookings_count: u64,
}

impl BookingStats {
    /// Computes every figure in a single pass over `bookings`.
    ///
    /// `now` anchors the current calendar month (UTC) and the trailing
    /// seven-day window. An empty slice yields all zeros.
    pub fn compute(bookings: &[Booking], now: DateTime<Utc>, room_capacity: u32) -> Self {
        let month_start = month_start(now);
        let recent_since = now - Duration::days(RECENT_WINDOW_DAYS);

        let mut stats = BookingStats {
            total_bookings: 0,
            pending_bookings: 0,
            confirmed_bookings: 0,
            cancelled_bookings: 0,
            completed_bookings: 0,
            total_revenue: Decimal::ZERO,
            monthly_revenue: Decimal::ZERO,
            average_booking_value: Decimal::ZERO,
            occupancy_rate: 0.0,
            total_guests: 0,
            recent_bookings_count: 0,
        };

        for booking in bookings {
            stats.total_bookings += 1;
            match booking.status {
                BookingStatus::Pending => stats.pending_bookings += 1,
                BookingStatus::Confirmed => stats.confirmed_bookings += 1,
                BookingStatus::Cancelled => stats.cancelled_bookings += 1,
                BookingStatus::Completed => stats.completed_bookings += 1,
            }
            stats.total_revenue += booking.total_price;
            if booking.booking_date >= month_start {
                stats.monthly_revenue += booking.total_price;
            }
            if booking.booking_date >= recent_since {
                stats.recent_bookings_count += 1;
            }
            stats.total_guests += booking.guests();
        }

        if stats.total_bookings > 0 {
            stats.average_booking_value =
                (stats.total_revenue / Decimal::from(stats.total_bookings)).round_dp(MONEY_DP);
        }
        stats.occupancy_rate = occupancy_rate(
            stats.confirmed_bookings + stats.completed_bookings,
            room_capacity,
        );

        stats.total_revenue.rescale(MONEY_DP);
        stats.monthly_revenue.rescale(MONEY_DP);
        stats.average_booking_value.rescale(MONEY_DP);
        stats
    }
}

/// `occupied / capacity * 100`, rounded to one decimal. Zero capacity gives 0.
pub fn occupancy_rate(occupied: u64, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    let rate = occupied as f64 / f64::from(capacity) * 100.0;
    (rate * 10.0).round() / 10.0
}

/// Midnight UTC on the first day of `now`'s month.
fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{BookingId, BookingReference, RoomId};
    use crate::booking::NewBooking;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn booking(id: u64, price: Decimal, status: BookingStatus, created: DateTime<Utc>) -> Booking {
        let new = NewBooking {
            full_name: format!("Guest {id}"),
            email: format!("guest{id}@example.com"),
            phone: "0771234567".to_string(),
            special_requests: None,
            check_in: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            adults: 2,
            children: 1,
            selected_rooms: BTreeMap::from([(RoomId(1), 1)]),
            total_price: price,
            nights: 1,
        };
        let mut booking = Booking::new(
            BookingId(id),
            BookingReference::new(format!("HHTEST{id:04}")),
            new,
            created,
        );
        booking.status = status;
        booking
    }

    #[test]
    fn empty_store_yields_zeros() {
        let stats = BookingStats::compute(&[], at(2024, 6, 15), DEFAULT_ROOM_CAPACITY);
        assert_eq!(stats.total_bookings, 0);
        assert_eq!(stats.pending_bookings, 0);
        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert_eq!(stats.average_booking_value.to_string(), "0.00");
        assert_eq!(stats.monthly_revenue.to_string(), "0.00");
        assert_eq!(stats.occupancy_rate, 0.0);
        assert_eq!(stats.total_guests, 0);
        assert_eq!(stats.recent_bookings_count, 0);
    }

    #[test]
    fn counts_by_status_and_occupancy() {
        let now = at(2024, 6, 15);
        let bookings = vec![
            booking(1, dec!(100.00), BookingStatus::Pending, now),
            booking(2, dec!(200.00), BookingStatus::Confirmed, now),
            booking(3, dec!(300.00), BookingStatus::Completed, now),
            booking(4, dec!(400.00), BookingStatus::Cancelled, now),
            booking(5, dec!(500.00), BookingStatus::Confirmed, now),
        ];

        let stats = BookingStats::compute(&bookings, now, DEFAULT_ROOM_CAPACITY);

        assert_eq!(stats.total_bookings, 5);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.confirmed_bookings, 2);
        assert_eq!(stats.completed_bookings, 1);
        assert_eq!(stats.cancelled_bookings, 1);
        assert_eq!(stats.occupancy_rate, 3.0);
        assert_eq!(stats.total_guests, 15);
        assert_eq!(stats.total_revenue.to_string(), "1500.00");
        assert_eq!(stats.average_booking_value.to_string(), "300.00");
    }

    #[test]
    fn monthly_revenue_uses_calendar_month() {
        let now = at(2024, 6, 15);
        let bookings = vec![
            booking(1, dec!(100.00), BookingStatus::Pending, at(2024, 6, 1)),
            booking(2, dec!(250.50), BookingStatus::Pending, at(2024, 5, 31)),
            booking(3, dec!(75.25), BookingStatus::Pending, at(2024, 6, 14)),
        ];

        let stats = BookingStats::compute(&bookings, now, DEFAULT_ROOM_CAPACITY);

        assert_eq!(stats.monthly_revenue.to_string(), "175.25");
        assert_eq!(stats.total_revenue.to_string(), "425.75");
    }

    #[test]
    fn recent_count_covers_trailing_week() {
        let now = at(2024, 6, 15);
        let bookings = vec![
            booking(1, dec!(1.00), BookingStatus::Pending, now - Duration::days(1)),
            booking(2, dec!(1.00), BookingStatus::Pending, now - Duration::days(6)),
            booking(3, dec!(1.00), BookingStatus::Pending, now - Duration::days(8)),
        ];

        let stats = BookingStats::compute(&bookings, now, DEFAULT_ROOM_CAPACITY);

        assert_eq!(stats.recent_bookings_count, 2);
    }

    #[test]
    fn average_rounds_to_cents() {
        let now = at(2024, 6, 15);
        let bookings = vec![
            booking(1, dec!(100.00), BookingStatus::Pending, now),
            booking(2, dec!(100.00), BookingStatus::Pending, now),
            booking(3, dec!(100.01), BookingStatus::Pending, now),
        ];

        let stats = BookingStats::compute(&bookings, now, DEFAULT_ROOM_CAPACITY);

        assert_eq!(stats.average_booking_value.to_string(), "100.00");
    }

    #[test]
    fn occupancy_rounds_to_one_decimal() {
        assert_eq!(occupancy_rate(1, 3), 33.3);
        assert_eq!(occupancy_rate(2, 3), 66.7);
        assert_eq!(occupancy_rate(5, 0), 0.0);
        assert_eq!(occupancy_rate(150, 100), 150.0);
    }

    #[test]
    fn stats_serialize_money_as_strings() {
        let now = at(2024, 6, 15);
        let bookings = vec![booking(1, dec!(17000.00), BookingStatus::Pending, now)];
        let json = serde_json::to_value(BookingStats::compute(&bookings, now, 100)).unwrap();
        assert_eq!(json["total_revenue"], "17000.00");
        assert_eq!(json["average_booking_value"], "17000.00");
        assert_eq!(json["occupancy_rate"], 0.0);
        assert_eq!(json["recent_bookings_count"], 1);
    }
}
