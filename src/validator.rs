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

//! Booking payload validation.
//!
//! [`validate`] is a pure function: it never touches the store. All problems
//! are collected so the guest sees every bad field at once.

use crate::base::RoomId;
use crate::booking::{BookingRequest, NewBooking};
use crate::error::{NON_FIELD_ERRORS, ValidationErrors};
use crate::rooms::RoomCatalog;
use lettre::Address;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub const CHECK_OUT_BEFORE_CHECK_IN: &str = "Check-out date must be after check-in date.";
pub const NO_ROOMS_SELECTED: &str = "At least one room must be selected.";

const REQUIRED: &str = "This field is required.";

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PHONE_LEN: usize = 20;
const PRICE_MAX_DIGITS: u32 = 10;
const PRICE_DECIMAL_PLACES: u32 = 2;

/// Validates a booking payload against the field rules and the room catalog.
///
/// # Errors
///
/// Returns the collected [`ValidationErrors`] when any rule fails. The two
/// booking rules are reported under `non_field_errors`:
/// - check-out must be strictly after check-in
/// - at least one room must be selected
pub fn validate(
    request: BookingRequest,
    rooms: &RoomCatalog,
) -> Result<NewBooking, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let full_name = required_text(&mut errors, "full_name", request.full_name, MAX_NAME_LEN);
    let phone = required_text(&mut errors, "phone", request.phone, MAX_PHONE_LEN);
    let email = required_text(&mut errors, "email", request.email, MAX_EMAIL_LEN).and_then(|email| {
        match email.parse::<Address>() {
            Ok(_) => Some(email),
            Err(_) => {
                errors.add("email", "Enter a valid email address.");
                None
            }
        }
    });
    let special_requests = request
        .special_requests
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    let check_in = required(&mut errors, "check_in", request.check_in);
    let check_out = required(&mut errors, "check_out", request.check_out);

    let adults = count(&mut errors, "adults", request.adults.unwrap_or(1), 1);
    let children = count(&mut errors, "children", request.children.unwrap_or(0), 0);

    let total_price = required(&mut errors, "total_price", request.total_price)
        .and_then(|price| price_field(&mut errors, price));

    let selected_rooms = request
        .selected_rooms
        .map(|selection| room_selection(&mut errors, selection, rooms))
        .unwrap_or_default();

    let nights = match (check_in, check_out) {
        (Some(check_in), Some(check_out)) if check_out <= check_in => {
            errors.add(NON_FIELD_ERRORS, CHECK_OUT_BEFORE_CHECK_IN);
            None
        }
        (Some(check_in), Some(check_out)) => {
            match u32::try_from((check_out - check_in).num_days()) {
                Ok(nights) => Some(nights),
                Err(_) => {
                    errors.add("check_out", "Stay is too long.");
                    None
                }
            }
        }
        _ => None,
    };

    if selected_rooms.values().all(|quantity| *quantity == 0) {
        errors.add(NON_FIELD_ERRORS, NO_ROOMS_SELECTED);
    }

    match (
        full_name,
        email,
        phone,
        check_in,
        check_out,
        adults,
        children,
        total_price,
        nights,
    ) {
        (
            Some(full_name),
            Some(email),
            Some(phone),
            Some(check_in),
            Some(check_out),
            Some(adults),
            Some(children),
            Some(total_price),
            Some(nights),
        ) if errors.is_empty() => Ok(NewBooking {
            full_name,
            email,
            phone,
            special_requests,
            check_in,
            check_out,
            adults,
            children,
            selected_rooms: selected_rooms
                .into_iter()
                .filter(|(_, quantity)| *quantity > 0)
                .collect(),
            total_price,
            nights,
        }),
        _ => Err(errors),
    }
}

fn required<T>(errors: &mut ValidationErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string());
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) if v.is_empty() => {
            errors.add(field, "This field may not be blank.");
            None
        }
        Some(v) if v.chars().count() > max_len => {
            errors.add(
                field,
                format!("Ensure this field has no more than {max_len} characters."),
            );
            None
        }
        Some(v) => Some(v),
    }
}

fn count(errors: &mut ValidationErrors, field: &str, value: i64, min: u32) -> Option<u32> {
    if value < i64::from(min) {
        errors.add(
            field,
            format!("Ensure this value is greater than or equal to {min}."),
        );
        return None;
    }
    match u32::try_from(value) {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, format!("Ensure this value is less than or equal to {}.", u32::MAX));
            None
        }
    }
}

/// Price must be non-negative with at most 10 digits, 2 of them decimal.
fn price_field(errors: &mut ValidationErrors, price: Decimal) -> Option<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        errors.add("total_price", "Ensure this value is greater than or equal to 0.");
        return None;
    }
    let normalized = price.normalize();
    if normalized.scale() > PRICE_DECIMAL_PLACES {
        errors.add(
            "total_price",
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        );
        return None;
    }
    let mut price = normalized;
    price.rescale(PRICE_DECIMAL_PLACES);
    if price.mantissa().unsigned_abs().to_string().len() > PRICE_MAX_DIGITS as usize {
        errors.add(
            "total_price",
            format!("Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."),
        );
        return None;
    }
    Some(price.abs())
}

fn room_selection(
    errors: &mut ValidationErrors,
    selection: BTreeMap<String, i64>,
    rooms: &RoomCatalog,
) -> BTreeMap<RoomId, u32> {
    let mut selected = BTreeMap::new();
    for (key, quantity) in selection {
        let Some(id) = key.trim().parse::<u8>().ok().map(RoomId).filter(|id| rooms.contains(*id))
        else {
            errors.add("selected_rooms", format!("Unknown room type: {key}."));
            continue;
        };
        match u32::try_from(quantity) {
            Ok(quantity) => {
                *selected.entry(id).or_insert(0) += quantity;
            }
            Err(_) => errors.add(
                "selected_rooms",
                format!("Quantity for room {key} must be greater than or equal to 0."),
            ),
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_request() -> BookingRequest {
        BookingRequest {
            full_name: Some("Amal Perera".to_string()),
            email: Some("amal@example.com".to_string()),
            phone: Some("+94771234567".to_string()),
            special_requests: Some("Late arrival".to_string()),
            check_in: Some(date(2024, 6, 1)),
            check_out: Some(date(2024, 6, 3)),
            adults: Some(2),
            children: Some(0),
            selected_rooms: Some(BTreeMap::from([("1".to_string(), 2)])),
            total_price: Some(dec!(17000.00)),
        }
    }

    #[test]
    fn valid_request_computes_nights() {
        let booking = validate(valid_request(), &RoomCatalog::default()).unwrap();
        assert_eq!(booking.nights, 2);
        assert_eq!(booking.selected_rooms.get(&RoomId(1)), Some(&2));
        assert_eq!(booking.total_price.to_string(), "17000.00");
        assert_eq!(booking.special_requests.as_deref(), Some("Late arrival"));
    }

    #[test]
    fn same_day_checkout_is_rejected() {
        let mut request = valid_request();
        request.check_out = request.check_in;
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field(NON_FIELD_ERRORS), &[CHECK_OUT_BEFORE_CHECK_IN.to_string()]);
    }

    #[test]
    fn earlier_checkout_is_rejected() {
        let mut request = valid_request();
        request.check_out = Some(date(2024, 5, 30));
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field(NON_FIELD_ERRORS), &[CHECK_OUT_BEFORE_CHECK_IN.to_string()]);
    }

    #[test]
    fn empty_room_selection_is_rejected() {
        let mut request = valid_request();
        request.selected_rooms = Some(BTreeMap::new());
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field(NON_FIELD_ERRORS), &[NO_ROOMS_SELECTED.to_string()]);
    }

    #[test]
    fn zero_quantities_count_as_empty() {
        let mut request = valid_request();
        request.selected_rooms = Some(BTreeMap::from([("1".to_string(), 0), ("2".to_string(), 0)]));
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field(NON_FIELD_ERRORS), &[NO_ROOMS_SELECTED.to_string()]);
    }

    #[test]
    fn missing_room_selection_is_rejected() {
        let mut request = valid_request();
        request.selected_rooms = None;
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field(NON_FIELD_ERRORS), &[NO_ROOMS_SELECTED.to_string()]);
    }

    #[test]
    fn zero_quantity_lines_are_dropped() {
        let mut request = valid_request();
        request.selected_rooms = Some(BTreeMap::from([("1".to_string(), 1), ("4".to_string(), 0)]));
        let booking = validate(request, &RoomCatalog::default()).unwrap();
        assert_eq!(booking.selected_rooms.len(), 1);
    }

    #[test]
    fn unknown_room_is_rejected() {
        let mut request = valid_request();
        request.selected_rooms = Some(BTreeMap::from([("9".to_string(), 1), ("1".to_string(), 1)]));
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field("selected_rooms"), &["Unknown room type: 9.".to_string()]);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut request = valid_request();
        request.selected_rooms = Some(BTreeMap::from([("1".to_string(), -1), ("2".to_string(), 1)]));
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field("selected_rooms").len(), 1);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = validate(BookingRequest::default(), &RoomCatalog::default()).unwrap_err();
        for field in ["full_name", "email", "phone", "check_in", "check_out", "total_price"] {
            assert_eq!(errors.field(field), &[REQUIRED.to_string()], "{field}");
        }
        assert_eq!(errors.field(NON_FIELD_ERRORS), &[NO_ROOMS_SELECTED.to_string()]);
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut request = valid_request();
        request.email = Some("not-an-email".to_string());
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field("email"), &["Enter a valid email address.".to_string()]);
    }

    #[test]
    fn blank_and_long_text_is_rejected() {
        let mut request = valid_request();
        request.full_name = Some("   ".to_string());
        request.phone = Some("1".repeat(21));
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(errors.field("full_name"), &["This field may not be blank.".to_string()]);
        assert_eq!(
            errors.field("phone"),
            &["Ensure this field has no more than 20 characters.".to_string()]
        );
    }

    #[test]
    fn adults_and_children_bounds() {
        let mut request = valid_request();
        request.adults = Some(0);
        request.children = Some(-1);
        let errors = validate(request, &RoomCatalog::default()).unwrap_err();
        assert_eq!(
            errors.field("adults"),
            &["Ensure this value is greater than or equal to 1.".to_string()]
        );
        assert_eq!(
            errors.field("children"),
            &["Ensure this value is greater than or equal to 0.".to_string()]
        );
    }

    #[test]
    fn guest_counts_default_when_omitted() {
        let mut request = valid_request();
        request.adults = None;
        request.children = None;
        let booking = validate(request, &RoomCatalog::default()).unwrap();
        assert_eq!((booking.adults, booking.children), (1, 0));
    }

    #[test]
    fn price_rules() {
        let catalog = RoomCatalog::default();

        let mut request = valid_request();
        request.total_price = Some(dec!(-1.00));
        assert!(!validate(request, &catalog).unwrap_err().field("total_price").is_empty());

        let mut request = valid_request();
        request.total_price = Some(dec!(10.005));
        assert!(!validate(request, &catalog).unwrap_err().field("total_price").is_empty());

        let mut request = valid_request();
        request.total_price = Some(dec!(123456789.00));
        assert!(!validate(request, &catalog).unwrap_err().field("total_price").is_empty());

        let mut request = valid_request();
        request.total_price = Some(dec!(17000));
        assert_eq!(validate(request, &catalog).unwrap().total_price.to_string(), "17000.00");

        let mut request = valid_request();
        request.total_price = Some(dec!(0));
        assert_eq!(validate(request, &catalog).unwrap().total_price.to_string(), "0.00");
    }

    #[test]
    fn blank_special_requests_become_none() {
        let mut request = valid_request();
        request.special_requests = Some("  ".to_string());
        let booking = validate(request, &RoomCatalog::default()).unwrap();
        assert_eq!(booking.special_requests, None);
    }
}
