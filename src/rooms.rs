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

//! Room type lookup table.
//!
//! The catalog is plain data handed to the validator and the notification
//! renderer; nothing in the crate reads room names or prices from globals.
//!
//! # Example
//!
//! ```
//! use heritage_bookings::{RoomCatalog, RoomId};
//! use rust_decimal_macros::dec;
//!
//! let catalog = RoomCatalog::default();
//! let room = catalog.get(RoomId(2)).unwrap();
//! assert_eq!(room.nightly_price, dec!(10500));
//! ```

use crate::base::RoomId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// A bookable room type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomType {
    pub id: RoomId,
    pub name: String,
    pub nightly_price: Decimal,
}

/// One line of a described room selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomLine {
    pub name: String,
    pub quantity: u32,
    pub price_per_night: Decimal,
    /// `price_per_night * quantity`, for a single night.
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCatalog {
    rooms: BTreeMap<RoomId, RoomType>,
}

impl RoomCatalog {
    pub fn new(rooms: impl IntoIterator<Item = RoomType>) -> Self {
        Self {
            rooms: rooms.into_iter().map(|room| (room.id, room)).collect(),
        }
    }

    pub fn get(&self, id: RoomId) -> Option<&RoomType> {
        self.rooms.get(&id)
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomType> {
        self.rooms.values()
    }

    /// Describes a room selection line by line.
    ///
    /// Unknown rooms and zero quantities are skipped.
    pub fn describe(&self, selection: &BTreeMap<RoomId, u32>) -> Vec<RoomLine> {
        selection
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .filter_map(|(id, quantity)| {
                let room = self.rooms.get(id)?;
                Some(RoomLine {
                    name: room.name.clone(),
                    quantity: *quantity,
                    price_per_night: room.nightly_price,
                    total_price: room.nightly_price * Decimal::from(*quantity),
                })
            })
            .collect()
    }

    /// Short human summary such as `2 x The President's Chamber — Deluxe`.
    pub fn summarize(&self, selection: &BTreeMap<RoomId, u32>) -> String {
        let lines = self.describe(selection);
        if lines.is_empty() {
            return "a room".to_string();
        }
        lines
            .iter()
            .map(|line| format!("{} x {}", line.quantity, line.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for RoomCatalog {
    /// The hotel's five room types.
    fn default() -> Self {
        let room = |id: u8, name: &str, price: i64| RoomType {
            id: RoomId(id),
            name: name.to_string(),
            nightly_price: Decimal::from(price),
        };
        Self::new([
            room(1, "The President's Chamber — Deluxe", 8500),
            room(2, "The Magistrate's Chamber — Executive", 10500),
            room(3, "The Collector's Chamber — Deluxe", 7500),
            room(4, "The Residency Room — Executive", 9500),
            room(5, "The Plantation Room — Deluxe", 6500),
        ])
    }
}
