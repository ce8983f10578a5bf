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

//! # Top-level Network module
//!
//! This module owns the router registry and the message bus, delivers events between the
//! simulated routers, and exposes the harness surface for configuring links and inspecting
//! routing state.

use crate::sim::event::{Event, EventQueue};
use crate::sim::router::RouterNode;
use crate::sim::types::{Metric, NetworkError, RouterId};
use log::*;
use rand::Rng;
use std::collections::{HashMap, HashSet};

static DEFAULT_STOP_AFTER: usize = 10_000;

/// # Network struct
///
/// The struct manages all simulated routers and handles all events between them. Routers are
/// registered by their string id; links are configured per direction, and a link towards an id
/// that is not registered is rejected. There is no hidden global state: the registry and the
/// event queue live here, and message delivery looks routers up by id.
///
/// Events are delivered one at a time ([`Network::step`]) or until the queue is empty
/// ([`Network::drain`]); handlers enqueue their outbound messages, they never deliver within
/// their own scope. The queue is FIFO, which guarantees that messages from one router to another
/// arrive in emission order. [`Network::step_random`] delivers a randomly chosen message instead,
/// while still respecting the per-sender FIFO guarantee, to exercise different fair
/// interleavings.
#[derive(Debug, Clone)]
pub struct Network {
    routers: HashMap<RouterId, RouterNode>,
    queue: EventQueue,
    stop_after: Option<usize>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Generate an empty network.
    pub fn new() -> Self {
        Self {
            routers: HashMap::new(),
            queue: EventQueue::new(),
            stop_after: Some(DEFAULT_STOP_AFTER),
        }
    }

    /// Add a new router to the network and return its id. The id must be unique; registering the
    /// same id twice replaces the old router.
    pub fn add_router<S: Into<String>>(&mut self, name: S) -> RouterId {
        let router = RouterNode::new(name);
        let id = router.name().to_string();
        self.routers.insert(id.clone(), router);
        id
    }

    /// Configure the link from `router` towards `neighbor` with the given cost. Both ids must be
    /// registered; linking towards an unknown router is a configuration error and changes
    /// nothing. Reconfiguring an existing link behaves like [`Network::set_link_cost`].
    ///
    /// Links are directed at this level: configure both directions for a symmetric link.
    pub fn configure_link(
        &mut self,
        router: &str,
        neighbor: &str,
        cost: Metric,
    ) -> Result<(), NetworkError> {
        if !self.routers.contains_key(neighbor) {
            return Err(NetworkError::UnknownPeer(
                router.to_string(),
                neighbor.to_string(),
            ));
        }
        let node = self
            .routers
            .get_mut(router)
            .ok_or_else(|| NetworkError::UnknownRouter(router.to_string()))?;
        node.configure_link(neighbor, cost, &mut self.queue);
        Ok(())
    }

    /// Change the cost of the link from `router` towards `neighbor`. An infinite cost takes the
    /// link down. The resulting messages are enqueued, not delivered; call [`Network::drain`] to
    /// let the network converge.
    pub fn set_link_cost(
        &mut self,
        router: &str,
        neighbor: &str,
        cost: Metric,
    ) -> Result<(), NetworkError> {
        if !self.routers.contains_key(neighbor) {
            return Err(NetworkError::UnknownPeer(
                router.to_string(),
                neighbor.to_string(),
            ));
        }
        let node = self
            .routers
            .get_mut(router)
            .ok_or_else(|| NetworkError::UnknownRouter(router.to_string()))?;
        node.on_link_change(neighbor, cost, &mut self.queue);
        Ok(())
    }

    /// Take the link between two routers down in both directions.
    pub fn fail_link(&mut self, a: &str, b: &str) -> Result<(), NetworkError> {
        self.set_link_cost(a, b, Metric::INFINITY)?;
        self.set_link_cost(b, a, Metric::INFINITY)
    }

    /// Make a router announce itself as a destination, by applying a zero-cost link change
    /// towards itself. This creates the router's self route (distance zero, successor itself) and
    /// advertises it to all neighbors.
    pub fn announce_self(&mut self, router: &str) -> Result<(), NetworkError> {
        let name = router.to_string();
        let node = self
            .routers
            .get_mut(router)
            .ok_or(NetworkError::UnknownRouter(name.clone()))?;
        node.on_link_change(&name, Metric::ZERO, &mut self.queue);
        Ok(())
    }

    /// Enqueue a synthetic event, bypassing any router. Useful for tests that need to feed a
    /// router a hand-crafted message.
    pub fn inject(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Deliver the first queued event. Returns `Ok(true)` if an event was delivered, and
    /// `Ok(false)` if the queue was empty.
    pub fn step(&mut self) -> Result<bool, NetworkError> {
        match self.queue.pop_front() {
            Some(event) => {
                self.dispatch(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deliver a randomly chosen queued event. The pick is rewound to the earliest queued message
    /// with the same (sender, receiver) pair, so the per-sender FIFO guarantee holds for every
    /// interleaving this produces. Returns `Ok(true)` if an event was delivered.
    pub fn step_random<R: Rng>(&mut self, rng: &mut R) -> Result<bool, NetworkError> {
        if self.queue.is_empty() {
            return Ok(false);
        }
        let pos = rng.gen_range(0..self.queue.len());
        let (from, to) = {
            let picked = &self.queue[pos];
            (picked.from().clone(), picked.to().clone())
        };
        let first = self
            .queue
            .iter()
            .position(|e| *e.from() == from && *e.to() == to)
            .expect("the picked event matches itself");
        let event = self.queue.remove(first).expect("position is in range");
        self.dispatch(event)?;
        Ok(true)
    }

    /// Deliver queued events until the queue is empty. Gives up with
    /// [`NetworkError::NoConvergence`] when the configured message budget is exhausted (see
    /// [`Network::set_msg_limit`]).
    pub fn drain(&mut self) -> Result<(), NetworkError> {
        let mut remaining_iter = self.stop_after;
        while !self.queue.is_empty() {
            if let Some(rem) = remaining_iter {
                if rem == 0 {
                    warn!("network cannot converge within the message budget");
                    return Err(NetworkError::NoConvergence);
                }
                remaining_iter = Some(rem - 1);
            }
            self.step()?;
        }
        Ok(())
    }

    /// Configure the network to give up on [`Network::drain`] after the given number of
    /// messages. If set to `None`, draining continues until the queue is empty, no matter how
    /// long it takes.
    pub fn set_msg_limit(&mut self, stop_after: Option<usize>) {
        self.stop_after = stop_after;
    }

    /// Returns the number of currently queued events.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Iterate over the currently queued events, in delivery order.
    pub fn queued_events(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }

    /// Returns a reference to a registered router.
    pub fn get_device(&self, router: &str) -> Option<&RouterNode> {
        self.routers.get(router)
    }

    /// Returns a sorted list of all registered router ids.
    pub fn get_routers(&self) -> Vec<RouterId> {
        let mut routers: Vec<RouterId> = self.routers.keys().cloned().collect();
        routers.sort();
        routers
    }

    /// Return the path from `source` towards `dest` by following the chosen successors, starting
    /// at the source and ending at the destination. Fails with
    /// [`NetworkError::ForwardingLoop`] if the successor chain visits a router twice, and with
    /// [`NetworkError::ForwardingBlackHole`] if a router on the path has no successor for the
    /// destination.
    pub fn get_path(&self, source: &str, dest: &str) -> Result<Vec<RouterId>, NetworkError> {
        if !self.routers.contains_key(dest) {
            return Err(NetworkError::UnknownRouter(dest.to_string()));
        }
        let mut visited: HashSet<RouterId> = HashSet::new();
        let mut path: Vec<RouterId> = Vec::new();
        let mut current = source.to_string();
        loop {
            let node = self
                .routers
                .get(&current)
                .ok_or_else(|| NetworkError::UnknownRouter(current.clone()))?;
            path.push(current.clone());
            if current == dest {
                return Ok(path);
            }
            if !visited.insert(current.clone()) {
                debug!("forwarding loop detected: {:?}", path);
                return Err(NetworkError::ForwardingLoop(path));
            }
            match node.route(dest).and_then(|e| e.successor.clone()) {
                Some(successor) => current = successor,
                None => {
                    debug!("black hole detected: {:?}", path);
                    return Err(NetworkError::ForwardingBlackHole(path));
                }
            }
        }
    }

    /// Print a summary of the routing table of one router. Destinations that are unreachable and
    /// were never part of a computation worth reporting (no successor, not active) are skipped.
    pub fn print_routing_table(&self, router: &str) -> Result<(), NetworkError> {
        let node = self
            .routers
            .get(router)
            .ok_or_else(|| NetworkError::UnknownRouter(router.to_string()))?;
        println!("--- Routing table for {} ---", node.name());
        let mut dests: Vec<&RouterId> = node.routing_table().map(|(d, _)| d).collect();
        dests.sort();
        for dest in dests {
            let entry = node.route(dest).expect("destination comes from the table");
            if entry.reported_distance.is_infinite() && entry.successor.is_none() && !entry.active
            {
                continue;
            }
            let state = if entry.active {
                format!("ACTIVE (wait: {})", entry.outstanding_replies.len())
            } else {
                "passive".to_string()
            };
            println!(
                "  dest: {} | successor: {} | rd: {} | fd: {} | state: {}",
                dest,
                entry.successor.as_deref().unwrap_or("none"),
                entry.reported_distance,
                entry.feasible_distance,
                state
            );
        }
        Ok(())
    }

    /// Deliver a single event to the router it is addressed to.
    fn dispatch(&mut self, event: Event) -> Result<(), NetworkError> {
        trace!("delivering {:?}", event);
        let to = event.to().clone();
        match self.routers.get_mut(&to) {
            Some(node) => {
                node.handle_event(event, &mut self.queue);
                Ok(())
            }
            None => Err(NetworkError::UndeliverableMessage(to)),
        }
    }
}
