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

//! Module containing the per-router topology table.

use crate::sim::types::{Metric, RouterId};
use std::collections::HashMap;

/// Table storing, for every destination, the distance each neighbor most recently advertised for
/// it. It is represented as a hashmap, mapping the destinations to another hashmap, which maps the
/// advertising neighbor to the distance. The table is a pure function of the most recent
/// advertisement per (destination, neighbor) pair.
///
/// Invariant: a neighbor whose link is down has no entries anywhere in the table; all of its
/// entries are purged when the link goes down. An infinite distance advertised over a live link is
/// stored like any other value.
#[derive(Debug, Clone, Default)]
pub struct TopologyTable {
    table: HashMap<RouterId, HashMap<RouterId, Metric>>,
}

impl TopologyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the distance `neighbor` most recently advertised for `dest`.
    pub fn set(&mut self, dest: &str, neighbor: &str, metric: Metric) {
        self.table
            .entry(dest.to_string())
            .or_default()
            .insert(neighbor.to_string(), metric);
    }

    /// Return the distance `neighbor` last advertised for `dest`, or infinity if it never
    /// advertised anything.
    pub fn get(&self, dest: &str, neighbor: &str) -> Metric {
        self.table
            .get(dest)
            .and_then(|advs| advs.get(neighbor))
            .copied()
            .unwrap_or(Metric::INFINITY)
    }

    /// Iterate over all neighbors that have advertised a distance for `dest`.
    pub fn advertisers(&self, dest: &str) -> impl Iterator<Item = (&RouterId, Metric)> {
        self.table
            .get(dest)
            .into_iter()
            .flat_map(|advs| advs.iter().map(|(n, m)| (n, *m)))
    }

    /// Remove every advertisement made by `neighbor`, across all destinations. Called when the
    /// link to the neighbor goes down.
    pub fn forget_neighbor(&mut self, neighbor: &str) {
        for advs in self.table.values_mut() {
            advs.remove(neighbor);
        }
    }

    /// Iterate over all destinations known to the table.
    pub fn destinations(&self) -> impl Iterator<Item = &RouterId> {
        self.table.keys()
    }
}
