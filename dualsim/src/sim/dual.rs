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

//! Module implementing the diffusing update algorithm: the per-destination route state and the
//! state machine that recomputes it.

use crate::sim::event::{Event, EventQueue};
use crate::sim::topology::TopologyTable;
use crate::sim::types::{Metric, RouterId};
use log::*;
use std::collections::{HashMap, HashSet};

/// Route state for a single destination.
///
/// A route is either *passive* (a successor is chosen and stable, or the destination is known to
/// be unreachable) or *active* (a diffusing computation is in progress and replies are pending).
/// While passive with a successor, the reported distance equals the link cost to the successor
/// plus the distance the successor advertised, and the feasible distance never exceeds it. While
/// active, there is no successor and the outstanding reply set is non-empty.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// The neighbor chosen as next hop, or `None` while active or unreachable.
    pub successor: Option<RouterId>,
    /// The lowest reported distance held during the current passive epoch. This is the bound a
    /// candidate's advertised distance must stay strictly below for the feasibility condition.
    pub feasible_distance: Metric,
    /// The current total cost to the destination via the successor, infinite without a successor.
    pub reported_distance: Metric,
    /// True while a diffusing computation is in progress.
    pub active: bool,
    /// The neighbors from which a reply is still pending; non-empty iff the route is active.
    pub outstanding_replies: HashSet<RouterId>,
    /// Neighbors whose queries arrived while the route was active. They receive the withheld
    /// reply as soon as the computation completes.
    pub(crate) deferred_replies: HashSet<RouterId>,
}

impl Default for RouteEntry {
    fn default() -> Self {
        Self {
            successor: None,
            feasible_distance: Metric::INFINITY,
            reported_distance: Metric::INFINITY,
            active: false,
            outstanding_replies: HashSet::new(),
            deferred_replies: HashSet::new(),
        }
    }
}

/// The per-router path computation. The engine owns the routing table (one [`RouteEntry`] per
/// destination, lazily created and never deleted) and implements the feasibility check and the
/// passive/active transitions. It reads the owning router's link costs and topology table, and
/// emits protocol messages into the event queue it is handed.
#[derive(Debug, Clone)]
pub struct DualEngine {
    router: RouterId,
    routes: HashMap<RouterId, RouteEntry>,
}

impl DualEngine {
    pub(crate) fn new(router: RouterId) -> Self {
        Self { router, routes: HashMap::new() }
    }

    /// Returns the route entry for the given destination, if it was ever mentioned.
    pub fn route(&self, dest: &str) -> Option<&RouteEntry> {
        self.routes.get(dest)
    }

    /// Iterate over all (destination, route entry) pairs.
    pub fn routes(&self) -> impl Iterator<Item = (&RouterId, &RouteEntry)> {
        self.routes.iter()
    }

    /// Iterate over all destinations with a route entry.
    pub fn destinations(&self) -> impl Iterator<Item = &RouterId> {
        self.routes.keys()
    }

    /// Returns true if a diffusing computation is in progress for the destination.
    pub fn is_active(&self, dest: &str) -> bool {
        self.routes.get(dest).map(|e| e.active).unwrap_or(false)
    }

    /// The distance to answer a query with: the reported distance while passive with a successor,
    /// infinite otherwise.
    pub(crate) fn reply_distance(&self, dest: &str) -> Metric {
        match self.routes.get(dest) {
            Some(e) if !e.active && e.successor.is_some() => e.reported_distance,
            _ => Metric::INFINITY,
        }
    }

    /// Recompute the route for one destination.
    ///
    /// While a diffusing computation is waiting for replies, this does nothing (the computation
    /// can only be resumed by the replies arriving). Otherwise the best candidate is selected, and
    /// the route either goes passive via it (feasibility condition), or a diffusing computation is
    /// started, or the destination is settled as unreachable.
    pub(crate) fn recompute(
        &mut self,
        dest: &str,
        links: &HashMap<RouterId, Metric>,
        topology: &TopologyTable,
        queue: &mut EventQueue,
    ) {
        trace!("[{}] computing paths for dest={}", self.router, dest);

        let (old_successor, old_rd, fd, was_active, replies_pending) = match self.routes.get(dest)
        {
            Some(e) => (
                e.successor.clone(),
                e.reported_distance,
                e.feasible_distance,
                e.active,
                !e.outstanding_replies.is_empty(),
            ),
            None => (None, Metric::INFINITY, Metric::INFINITY, false, false),
        };

        if was_active && replies_pending {
            // the diffusing computation owns this entry until every reply arrived
            trace!("[{}] still active for dest={}, waiting for replies", self.router, dest);
            return;
        }

        let best = self.best_candidate(dest, links, topology);

        // Feasibility condition, evaluated only for a non-empty candidate. The self route is
        // always feasible (its advertised distance equals its feasible distance, so the strict
        // classical check cannot hold).
        let feasible = match &best {
            Some((candidate, total)) => {
                let ad = if dest == self.router {
                    Metric::ZERO
                } else {
                    topology.get(dest, candidate)
                };
                dest == self.router
                    || ad < fd
                    || (old_successor.as_deref() == Some(candidate.as_str()) && *total < old_rd)
                    || (old_successor.is_none() && total.is_finite())
            }
            None => false,
        };

        if feasible {
            let (successor, total) = best.expect("feasibility implies a candidate");
            let entry = self.routes.entry(dest.to_string()).or_default();
            entry.active = false;
            entry.outstanding_replies.clear();
            entry.successor = Some(successor);
            entry.reported_distance = total;
            if total < entry.feasible_distance {
                entry.feasible_distance = total;
            }
            debug!(
                "[{}] passive for dest={}: successor={:?}, rd={}, fd={}",
                self.router, dest, entry.successor, entry.reported_distance, entry.feasible_distance
            );
            if total != old_rd || self.routes[dest].successor != old_successor {
                self.advertise(dest, total, links, queue);
            }
            self.flush_deferred(dest, links, queue);
            return;
        }

        if was_active {
            // every reply arrived and no candidate survived the feasibility check; the diffusing
            // round is complete and must not re-issue queries
            self.settle_unreachable(dest, old_rd, &old_successor, links, queue);
            return;
        }

        // passive without a feasible successor: start a diffusing computation
        let mut targets: Vec<RouterId> = links
            .iter()
            .filter(|(n, c)| c.is_finite() && **n != self.router)
            .map(|(n, _)| n.clone())
            .collect();
        targets.sort();

        if targets.is_empty() {
            debug!(
                "[{}] no feasible successor and no neighbors to query for dest={}",
                self.router, dest
            );
            self.settle_unreachable(dest, old_rd, &old_successor, links, queue);
            return;
        }

        debug!(
            "[{}] no feasible successor for dest={}, going active (fd={})",
            self.router, dest, fd
        );
        let entry = self.routes.entry(dest.to_string()).or_default();
        entry.active = true;
        entry.successor = None;
        entry.outstanding_replies = targets.iter().cloned().collect();
        for target in targets {
            queue.push_back(Event::Query {
                from: self.router.clone(),
                to: target,
                dest: dest.to_string(),
                origin_fd: fd,
            });
        }
    }

    /// Handle a reply for an active destination: clear the sender from the outstanding set, and
    /// resume the computation once the set drains. The caller has already recorded the advertised
    /// distance in the topology table and verified the entry is active.
    pub(crate) fn reply_received(
        &mut self,
        dest: &str,
        from: &str,
        links: &HashMap<RouterId, Metric>,
        topology: &TopologyTable,
        queue: &mut EventQueue,
    ) {
        let remaining = match self.routes.get_mut(dest) {
            Some(e) => {
                e.outstanding_replies.remove(from);
                e.outstanding_replies.len()
            }
            None => return,
        };
        if remaining == 0 {
            debug!("[{}] all replies received for dest={}, recomputing", self.router, dest);
            self.recompute(dest, links, topology, queue);
        } else {
            trace!(
                "[{}] still waiting for {} replies for dest={}",
                self.router, remaining, dest
            );
        }
    }

    /// Handle a query that arrived while the destination is active. The reply is withheld until
    /// the local computation completes; the querier is recorded so the reply can be sent then. A
    /// query from a neighbor we are awaiting a reply from counts as that reply (with infinite
    /// distance): a router asking us for a route cannot owe us a usable answer.
    pub(crate) fn query_while_active(
        &mut self,
        dest: &str,
        from: &str,
        links: &HashMap<RouterId, Metric>,
        topology: &TopologyTable,
        queue: &mut EventQueue,
    ) {
        let entry = match self.routes.get_mut(dest) {
            Some(e) => e,
            None => return,
        };
        if entry.successor.as_deref() == Some(from) {
            debug!(
                "[{}] successor {} queried for dest={} and is no longer a valid reply source",
                self.router, from, dest
            );
        }
        entry.deferred_replies.insert(from.to_string());
        if entry.outstanding_replies.remove(from) && entry.outstanding_replies.is_empty() {
            debug!(
                "[{}] query from {} stands in for its reply, recomputing dest={}",
                self.router, from, dest
            );
            self.recompute(dest, links, topology, queue);
        }
    }

    /// Handle the link to a neighbor going down: synthesize a reply with infinite distance for
    /// every destination whose diffusing computation was awaiting that neighbor, so no route stays
    /// active forever. The topology table is untouched (the caller purged the neighbor already).
    pub(crate) fn neighbor_lost(
        &mut self,
        neighbor: &str,
        links: &HashMap<RouterId, Metric>,
        topology: &TopologyTable,
        queue: &mut EventQueue,
    ) {
        let mut drained = Vec::new();
        for (dest, entry) in self.routes.iter_mut() {
            entry.deferred_replies.remove(neighbor);
            if entry.active && entry.outstanding_replies.remove(neighbor) {
                debug!(
                    "[{}] link to {} is down, synthesizing reply INF for dest={}",
                    self.router, neighbor, dest
                );
                if entry.outstanding_replies.is_empty() {
                    drained.push(dest.clone());
                }
            }
        }
        drained.sort();
        for dest in drained {
            self.recompute(&dest, links, topology, queue);
        }
    }

    /// Find the best candidate successor for a destination: the neighbor minimizing link cost
    /// plus advertised distance, over all neighbors with a finite link and a finite
    /// advertisement. Ties are broken towards the lexicographically smallest neighbor id. The
    /// router itself is no candidate, except when it is the destination, in which case the result
    /// is always `(self, 0)`.
    fn best_candidate(
        &self,
        dest: &str,
        links: &HashMap<RouterId, Metric>,
        topology: &TopologyTable,
    ) -> Option<(RouterId, Metric)> {
        if dest == self.router {
            return Some((self.router.clone(), Metric::ZERO));
        }
        let mut best: Option<(RouterId, Metric)> = None;
        for (neighbor, ad) in topology.advertisers(dest) {
            if ad.is_infinite() || *neighbor == self.router {
                continue;
            }
            let cost = match links.get(neighbor) {
                Some(c) if c.is_finite() => *c,
                _ => continue,
            };
            let total = cost + ad;
            let better = match &best {
                None => true,
                Some((bn, bt)) => total < *bt || (total == *bt && neighbor < bn),
            };
            if better {
                best = Some((neighbor.clone(), total));
            }
        }
        best
    }

    /// Declare the destination unreachable and return to the passive state. This ends the passive
    /// epoch, so the feasible distance restarts at infinity; the next adopted route begins a new
    /// one.
    fn settle_unreachable(
        &mut self,
        dest: &str,
        old_rd: Metric,
        old_successor: &Option<RouterId>,
        links: &HashMap<RouterId, Metric>,
        queue: &mut EventQueue,
    ) {
        let entry = self.routes.entry(dest.to_string()).or_default();
        entry.active = false;
        entry.outstanding_replies.clear();
        entry.successor = None;
        entry.reported_distance = Metric::INFINITY;
        entry.feasible_distance = Metric::INFINITY;
        debug!("[{}] dest={} is unreachable", self.router, dest);
        if old_rd.is_finite() || old_successor.is_some() {
            self.advertise(dest, Metric::INFINITY, links, queue);
        }
        self.flush_deferred(dest, links, queue);
    }

    /// Advertise the reported distance for a destination to every neighbor with a finite link,
    /// except the current successor (split horizon) and except the router itself. No poison
    /// reverse is emitted.
    fn advertise(
        &self,
        dest: &str,
        rd: Metric,
        links: &HashMap<RouterId, Metric>,
        queue: &mut EventQueue,
    ) {
        let successor = self.routes.get(dest).and_then(|e| e.successor.as_deref());
        let mut neighbors: Vec<&RouterId> = links
            .iter()
            .filter(|(n, c)| c.is_finite() && **n != self.router)
            .map(|(n, _)| n)
            .collect();
        neighbors.sort();
        debug!("[{}] advertising dest={} with rd={}", self.router, dest, rd);
        for neighbor in neighbors {
            if Some(neighbor.as_str()) == successor {
                trace!(
                    "[{}] split horizon: not advertising dest={} to successor {}",
                    self.router,
                    dest,
                    neighbor
                );
                continue;
            }
            queue.push_back(Event::Update {
                from: self.router.clone(),
                to: neighbor.clone(),
                dest: dest.to_string(),
                distance: rd,
            });
        }
    }

    /// Send the withheld replies recorded while the destination was active. The computation has
    /// completed, so each querier receives the settled distance.
    fn flush_deferred(
        &mut self,
        dest: &str,
        links: &HashMap<RouterId, Metric>,
        queue: &mut EventQueue,
    ) {
        let deferred = match self.routes.get_mut(dest) {
            Some(e) if !e.deferred_replies.is_empty() => std::mem::take(&mut e.deferred_replies),
            _ => return,
        };
        let distance = self.reply_distance(dest);
        let mut queriers: Vec<RouterId> = deferred.into_iter().collect();
        queriers.sort();
        for querier in queriers {
            if links.get(&querier).map(|c| c.is_finite()) != Some(true) {
                continue;
            }
            debug!(
                "[{}] answering withheld query from {} for dest={} with {}",
                self.router, querier, dest, distance
            );
            queue.push_back(Event::Reply {
                from: self.router.clone(),
                to: querier,
                dest: dest.to_string(),
                distance,
            });
        }
    }
}
