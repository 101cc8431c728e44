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

//! CSV export of the booking list.

use crate::booking::{Booking, BookingStatus};
use chrono::{DateTime, NaiveDate, Utc};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One exported row.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    booking_reference: &'a str,
    full_name: &'a str,
    email: &'a str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    nights: u32,
    total_price: Decimal,
    booking_date: DateTime<Utc>,
    status: BookingStatus,
}

impl<'a> From<&'a Booking> for ExportRow<'a> {
    fn from(booking: &'a Booking) -> Self {
        ExportRow {
            booking_reference: booking.booking_reference.as_str(),
            full_name: &booking.full_name,
            email: &booking.email,
            check_in: booking.check_in,
            check_out: booking.check_out,
            nights: booking.nights,
            total_price: booking.total_price,
            booking_date: booking.booking_date,
            status: booking.status,
        }
    }
}

/// Writes bookings as CSV, one row per booking in the given order.
///
/// # CSV Format
///
/// Columns: `booking_reference, full_name, email, check_in, check_out,
/// nights, total_price, booking_date, status`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_bookings<W: Write>(bookings: &[Booking], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for booking in bookings {
        wtr.serialize(ExportRow::from(booking))?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{BookingId, BookingReference, RoomId};
    use crate::booking::NewBooking;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn booking() -> Booking {
        let new = NewBooking {
            full_name: "Perera, Amal".to_string(),
            email: "amal@example.com".to_string(),
            phone: "0771234567".to_string(),
            special_requests: None,
            check_in: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            adults: 2,
            children: 0,
            selected_rooms: BTreeMap::from([(RoomId(1), 2)]),
            total_price: dec!(17000.00),
            nights: 2,
        };
        Booking::new(
            BookingId(1),
            BookingReference::new("HHABCD1234"),
            new,
            Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap(),
        )
    }

    #[test]
    fn writes_header_and_rows() {
        let mut output = Vec::new();
        write_bookings(&[booking()], &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("booking_reference,full_name,email,check_in,check_out,nights,total_price,booking_date,status")
        );
        assert_eq!(
            lines.next(),
            Some("HHABCD1234,\"Perera, Amal\",amal@example.com,2024-06-01,2024-06-03,2,17000.00,2024-05-20T09:30:00Z,pending")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_list_writes_nothing() {
        let mut output = Vec::new();
        write_bookings(&[], &mut output).unwrap();
        assert!(output.is_empty());
    }
}
