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

//! Booking reference codes.
//!
//! A reference is `HH` followed by eight characters from `[A-Z0-9]`, giving
//! 36^8 (about 2.8 × 10^12) codes. Generators do not check uniqueness; the
//! store's reference index rejects duplicates and asks for a fresh code.

use crate::base::BookingReference;
use rand::Rng;

pub const REFERENCE_PREFIX: &str = "HH";
pub const REFERENCE_SUFFIX_LEN: usize = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of candidate booking references.
pub trait ReferenceGenerator: Send + Sync {
    fn generate(&self) -> BookingReference;
}

/// Draws references from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReferenceGenerator;

impl ReferenceGenerator for RandomReferenceGenerator {
    fn generate(&self) -> BookingReference {
        let mut rng = rand::thread_rng();
        let mut code = String::with_capacity(REFERENCE_PREFIX.len() + REFERENCE_SUFFIX_LEN);
        code.push_str(REFERENCE_PREFIX);
        for _ in 0..REFERENCE_SUFFIX_LEN {
            code.push(ALPHABET[rng.gen_range(0..ALPHABET.len())] as char);
        }
        BookingReference::new(code)
    }
}

/// Returns `true` if `code` has the shape of a generated reference.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == REFERENCE_PREFIX.len() + REFERENCE_SUFFIX_LEN
        && code.starts_with(REFERENCE_PREFIX)
        && code[REFERENCE_PREFIX.len()..]
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_references_are_well_formed() {
        let generator = RandomReferenceGenerator;
        for _ in 0..500 {
            let reference = generator.generate();
            assert!(is_well_formed(reference.as_str()), "{reference}");
        }
    }

    #[test]
    fn generated_references_vary() {
        let generator = RandomReferenceGenerator;
        let codes: HashSet<_> = (0..100).map(|_| generator.generate()).collect();
        assert_eq!(codes.len(), 100);
    }

    #[test]
    fn well_formed_rejects_other_shapes() {
        assert!(is_well_formed("HHABCD1234"));
        assert!(!is_well_formed("HHabcd1234"));
        assert!(!is_well_formed("XXABCD1234"));
        assert!(!is_well_formed("HHABCD123"));
        assert!(!is_well_formed("HHABCD12345"));
        assert!(!is_well_formed("HHABCD-234"));
    }
}
