// Dualsim: Simulating Diffusing-Update Route Convergence
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use crate::sim::Metric;

#[test]
fn metric_addition_saturates() {
    assert_eq!(Metric::new(1) + Metric::new(2), Metric::new(3));
    assert_eq!(Metric::new(1) + Metric::INFINITY, Metric::INFINITY);
    assert_eq!(Metric::INFINITY + Metric::new(1), Metric::INFINITY);
    assert_eq!(Metric::INFINITY + Metric::INFINITY, Metric::INFINITY);
    // finite sums beyond the clamp threshold are infinite as well
    assert_eq!(
        Metric::new(2_000_000_000) + Metric::new(2_000_000_000),
        Metric::INFINITY
    );
}

#[test]
fn metric_constructor_clamps() {
    assert!(Metric::new(u32::MAX).is_infinite());
    assert!(Metric::new(u32::MAX / 2 + 1).is_infinite());
    assert!(Metric::new(u32::MAX / 2).is_finite());
    assert!(Metric::ZERO.is_finite());
}

#[test]
fn metric_ordering_treats_infinity_as_maximal() {
    assert!(Metric::ZERO < Metric::new(1));
    assert!(Metric::new(1) < Metric::INFINITY);
    assert!(Metric::new(u32::MAX / 2) < Metric::INFINITY);
    assert_eq!(Metric::INFINITY, Metric::INFINITY);
    assert!(!(Metric::INFINITY < Metric::INFINITY));
}

#[test]
fn metric_display() {
    assert_eq!(format!("{}", Metric::new(7)), "7");
    assert_eq!(format!("{}", Metric::ZERO), "0");
    assert_eq!(format!("{}", Metric::INFINITY), "INF");
}
