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

//! Benchmarks for the booking store.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Validation alone
//! - Single-threaded and parallel creates
//! - Listing with search and ordering
//! - Statistics over stores of growing size

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use heritage_bookings::{BookingRequest, BookingStore, ListQuery, RoomCatalog, SortOrder, validate};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

// =============================================================================
// Helper Functions
// =============================================================================

fn make_request(i: usize) -> BookingRequest {
    BookingRequest {
        full_name: Some(format!("Guest {i}")),
        email: Some(format!("guest{i}@example.com")),
        phone: Some("0771234567".to_string()),
        check_in: NaiveDate::from_ymd_opt(2024, 6, 1),
        check_out: NaiveDate::from_ymd_opt(2024, 6, 3),
        adults: Some(2),
        children: Some((i % 3) as i64),
        selected_rooms: Some(BTreeMap::from([(((i % 5) + 1).to_string(), 1)])),
        total_price: Some(Decimal::new(1_000_000 + i as i64, 2)),
        ..Default::default()
    }
}

fn seeded_store(count: usize) -> BookingStore {
    let store = BookingStore::new();
    for i in 0..count {
        store.create(make_request(i)).unwrap();
    }
    store
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_validate(c: &mut Criterion) {
    let rooms = RoomCatalog::default();
    let request = make_request(1);

    c.bench_function("validate", |b| {
        b.iter(|| validate(black_box(request.clone()), &rooms).unwrap())
    });
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, &count| {
            b.iter(|| {
                let store = BookingStore::new();
                for i in 0..count {
                    store.create(make_request(i)).unwrap();
                }
                black_box(store.len())
            })
        });

        group.bench_with_input(BenchmarkId::new("parallel", count), &count, |b, &count| {
            b.iter(|| {
                let store = BookingStore::new();
                (0..count).into_par_iter().for_each(|i| {
                    store.create(make_request(i)).unwrap();
                });
                black_box(store.len())
            })
        });
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");
    let store = seeded_store(10_000);

    group.bench_function("default_order", |b| {
        b.iter(|| black_box(store.list(&ListQuery::new())))
    });

    let by_price = ListQuery::new()
        .order("-total_price".parse::<SortOrder>().unwrap())
        .limit(50);
    group.bench_function("ordered_limited", |b| {
        b.iter(|| black_box(store.list(&by_price)))
    });

    let search = ListQuery::new().search("guest42");
    group.bench_function("search", |b| b.iter(|| black_box(store.list(&search))));

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    for count in [100, 1_000, 10_000] {
        let store = seeded_store(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &store, |b, store| {
            b.iter(|| black_box(store.stats()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validate, bench_create, bench_list, bench_stats);
criterion_main!(benches);
