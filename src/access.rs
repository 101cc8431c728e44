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

//! Who may change or delete bookings.

use crate::error::BookingError;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Authorization rule for the mutating booking endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone may update status or delete.
    #[default]
    Open,
    /// Requires `Authorization: Bearer <token>` with this exact token.
    AdminToken(String),
}

impl AccessPolicy {
    /// # Errors
    ///
    /// [`BookingError::Unauthorized`] if the policy requires a token and the
    /// request does not carry the right one.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), BookingError> {
        match self {
            AccessPolicy::Open => Ok(()),
            AccessPolicy::AdminToken(expected) => {
                let presented = headers
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(str::trim)
                    .ok_or(BookingError::Unauthorized)?;
                if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
                    Ok(())
                } else {
                    Err(BookingError::Unauthorized)
                }
            }
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn open_policy_allows_anyone() {
        assert_eq!(AccessPolicy::Open.authorize(&HeaderMap::new()), Ok(()));
    }

    #[test]
    fn token_policy_checks_bearer() {
        let policy = AccessPolicy::AdminToken("s3cret".to_string());
        assert_eq!(policy.authorize(&headers("Bearer s3cret")), Ok(()));
        assert_eq!(
            policy.authorize(&headers("Bearer wrong")),
            Err(BookingError::Unauthorized)
        );
        assert_eq!(
            policy.authorize(&headers("Basic s3cret")),
            Err(BookingError::Unauthorized)
        );
        assert_eq!(
            policy.authorize(&HeaderMap::new()),
            Err(BookingError::Unauthorized)
        );
    }
}
