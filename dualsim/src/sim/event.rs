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

//! Module for defining events

use crate::sim::types::{Metric, RouterId};
use std::collections::VecDeque;

/// Protocol message exchanged between two routers. The three message kinds form a closed sum,
/// dispatched at a single site in the receiving router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Advertisement of the sender's reported distance to a destination.
    Update {
        /// Sending router.
        from: RouterId,
        /// Receiving router.
        to: RouterId,
        /// Destination the advertisement talks about.
        dest: RouterId,
        /// The sender's reported distance to `dest`.
        distance: Metric,
    },
    /// Request for the receiver's distance to a destination, sent while the originator performs
    /// a diffusing computation.
    Query {
        /// Sending router.
        from: RouterId,
        /// Receiving router.
        to: RouterId,
        /// Destination the diffusing computation is about.
        dest: RouterId,
        /// The feasible distance the originator holds for `dest`.
        origin_fd: Metric,
    },
    /// Answer to a [`Event::Query`], carrying the sender's distance to the destination.
    Reply {
        /// Sending router.
        from: RouterId,
        /// Receiving router.
        to: RouterId,
        /// Destination the reply talks about.
        dest: RouterId,
        /// The sender's distance to `dest`, infinite if it has no route.
        distance: Metric,
    },
}

impl Event {
    /// Returns the sending router.
    pub fn from(&self) -> &RouterId {
        match self {
            Event::Update { from, .. } => from,
            Event::Query { from, .. } => from,
            Event::Reply { from, .. } => from,
        }
    }

    /// Returns the receiving router.
    pub fn to(&self) -> &RouterId {
        match self {
            Event::Update { to, .. } => to,
            Event::Query { to, .. } => to,
            Event::Reply { to, .. } => to,
        }
    }

    /// Returns the destination this event talks about.
    pub fn dest(&self) -> &RouterId {
        match self {
            Event::Update { dest, .. } => dest,
            Event::Query { dest, .. } => dest,
            Event::Reply { dest, .. } => dest,
        }
    }

    /// Returns true if the event is an update message.
    pub fn is_update(&self) -> bool {
        matches!(self, Event::Update { .. })
    }

    /// Returns true if the event is a query message.
    pub fn is_query(&self) -> bool {
        matches!(self, Event::Query { .. })
    }

    /// Returns true if the event is a reply message.
    pub fn is_reply(&self) -> bool {
        matches!(self, Event::Reply { .. })
    }
}

/// Event queue for enqueuing events. Delivery order over the whole queue is FIFO, which in
/// particular preserves the per-sender FIFO guarantee of the protocol.
pub type EventQueue = VecDeque<Event>;
