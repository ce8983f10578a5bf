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

//! Module defining a simulated router running the diffusing update algorithm.

use crate::sim::dual::{DualEngine, RouteEntry};
use crate::sim::event::{Event, EventQueue};
use crate::sim::topology::TopologyTable;
use crate::sim::types::{Metric, RouterId};
use log::*;
use std::collections::{BTreeSet, HashMap};

/// A simulated router. It owns its link costs, its topology table and its routing table (inside
/// the [`DualEngine`]), dispatches inbound events to the engine, and emits outbound messages into
/// the event queue handed to every handler.
///
/// Handlers never fail: an invalid event (a message from a router without a finite link, or a
/// stale reply) is logged and dropped, and nothing propagates across the message boundary.
#[derive(Debug, Clone)]
pub struct RouterNode {
    name: RouterId,
    link_costs: HashMap<RouterId, Metric>,
    topology: TopologyTable,
    engine: DualEngine,
}

impl RouterNode {
    pub(crate) fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            engine: DualEngine::new(name.clone()),
            name,
            link_costs: HashMap::new(),
            topology: TopologyTable::new(),
        }
    }

    /// Return the id of the router.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Return the configured cost of the link towards a neighbor, or `None` if the neighbor was
    /// never configured. An infinite cost means the link is down, but still referenced.
    pub fn link_cost(&self, neighbor: &str) -> Option<Metric> {
        self.link_costs.get(neighbor).copied()
    }

    /// Return the route entry for a destination, if the destination was ever mentioned.
    pub fn route(&self, dest: &str) -> Option<&RouteEntry> {
        self.engine.route(dest)
    }

    /// Iterate over the full routing table as (destination, route entry) pairs.
    pub fn routing_table(&self) -> impl Iterator<Item = (&RouterId, &RouteEntry)> {
        self.engine.routes()
    }

    /// Return a reference to the topology table: the last distance each neighbor advertised, per
    /// destination.
    pub fn topology_table(&self) -> &TopologyTable {
        &self.topology
    }

    /// Configure the link towards a neighbor. The first configuration only records the neighbor
    /// and its cost; reconfiguring an already known neighbor is a link change and triggers the
    /// full recomputation of [`RouterNode::on_link_change`].
    pub(crate) fn configure_link(&mut self, neighbor: &str, cost: Metric, queue: &mut EventQueue) {
        if self.link_costs.contains_key(neighbor) {
            self.on_link_change(neighbor, cost, queue);
        } else {
            debug!("[{}] link added to {} with cost {}", self.name, neighbor, cost);
            self.link_costs.insert(neighbor.to_string(), cost);
        }
    }

    /// Change the cost of the link towards a neighbor.
    ///
    /// When the link goes down, the neighbor's advertisements are purged from the topology table,
    /// and a reply with infinite distance is synthesized for every destination whose diffusing
    /// computation was awaiting that neighbor. Afterwards, every destination known to either the
    /// routing table or the topology table is recomputed, and the router's own route (distance
    /// zero to itself) is created and advertised if it did not exist yet.
    pub(crate) fn on_link_change(&mut self, neighbor: &str, new_cost: Metric, queue: &mut EventQueue) {
        debug!(
            "[{}] link event: cost to {} changed to {}",
            self.name, neighbor, new_cost
        );
        self.link_costs.insert(neighbor.to_string(), new_cost);

        if new_cost.is_infinite() {
            self.topology.forget_neighbor(neighbor);
            self.engine
                .neighbor_lost(neighbor, &self.link_costs, &self.topology, queue);
        }

        // the router itself is a destination with distance zero
        let name = self.name.clone();
        self.topology.set(&name, &name, Metric::ZERO);

        // iterate one stable set: the union of the destinations known to both tables
        let mut dests: BTreeSet<RouterId> = BTreeSet::new();
        dests.extend(self.engine.destinations().cloned());
        dests.extend(self.topology.destinations().cloned());
        for dest in dests {
            self.engine
                .recompute(&dest, &self.link_costs, &self.topology, queue);
        }
    }

    /// Handle an [`Event`] addressed to this router, and enqueue the resulting messages.
    pub(crate) fn handle_event(&mut self, event: Event, queue: &mut EventQueue) {
        match event {
            Event::Update { from, dest, distance, .. } => {
                self.on_update(&from, &dest, distance, queue)
            }
            Event::Query { from, dest, origin_fd, .. } => {
                self.on_query(&from, &dest, origin_fd, queue)
            }
            Event::Reply { from, dest, distance, .. } => {
                self.on_reply(&from, &dest, distance, queue)
            }
        }
    }

    /// Returns true if the router is a direct neighbor, i.e. the link towards it is configured
    /// and has a finite cost.
    fn is_neighbor(&self, router: &str) -> bool {
        self.link_costs
            .get(router)
            .map(|c| c.is_finite())
            .unwrap_or(false)
    }

    fn on_update(&mut self, from: &str, dest: &str, distance: Metric, queue: &mut EventQueue) {
        if !self.is_neighbor(from) {
            debug!(
                "[{}] dropping update from non-neighbor {} for dest={}",
                self.name, from, dest
            );
            return;
        }
        debug!(
            "[{}] rx update from {} for dest={} with ad={}",
            self.name, from, dest, distance
        );
        self.topology.set(dest, from, distance);
        self.engine
            .recompute(dest, &self.link_costs, &self.topology, queue);
    }

    fn on_query(&mut self, from: &str, dest: &str, origin_fd: Metric, queue: &mut EventQueue) {
        if !self.is_neighbor(from) {
            debug!(
                "[{}] dropping query from non-neighbor {} for dest={}",
                self.name, from, dest
            );
            return;
        }
        debug!(
            "[{}] rx query from {} for dest={} (originator fd={})",
            self.name, from, dest, origin_fd
        );

        // a query for the router itself is answered with distance zero right away
        if dest == self.name {
            queue.push_back(Event::Reply {
                from: self.name.clone(),
                to: from.to_string(),
                dest: dest.to_string(),
                distance: Metric::ZERO,
            });
            return;
        }

        // the querying neighbor has, by querying, no usable route of its own
        self.topology.set(dest, from, Metric::INFINITY);

        if self.engine.is_active(dest) {
            // the reply is withheld until the local diffusing computation completes
            self.engine
                .query_while_active(dest, from, &self.link_costs, &self.topology, queue);
            return;
        }

        self.engine
            .recompute(dest, &self.link_costs, &self.topology, queue);
        let distance = self.engine.reply_distance(dest);
        debug!(
            "[{}] replying to {} for dest={} with rd={}",
            self.name, from, dest, distance
        );
        queue.push_back(Event::Reply {
            from: self.name.clone(),
            to: from.to_string(),
            dest: dest.to_string(),
            distance,
        });
    }

    fn on_reply(&mut self, from: &str, dest: &str, distance: Metric, queue: &mut EventQueue) {
        if !self.is_neighbor(from) {
            debug!(
                "[{}] dropping reply from non-neighbor {} for dest={}",
                self.name, from, dest
            );
            return;
        }
        if !self.engine.is_active(dest) {
            debug!(
                "[{}] dropping stale reply from {} for dest={}",
                self.name, from, dest
            );
            return;
        }
        debug!(
            "[{}] rx reply from {} for dest={} with ad={}",
            self.name, from, dest, distance
        );
        self.topology.set(dest, from, distance);
        self.engine
            .reply_received(dest, from, &self.link_costs, &self.topology, queue);
    }
}
