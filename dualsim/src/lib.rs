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

#![deny(missing_docs)]

//! # Dualsim: Simulating Diffusing-Update Route Convergence
//!
//! This is a library for simulating the convergence behavior of a distance-vector routing
//! protocol built on the diffusing update algorithm. A set of routers maintain, per destination,
//! a loop-free next-hop choice; when a link change or a neighbor advertisement invalidates a
//! route, the owning router coordinates a diffusing computation with its neighbors before
//! settling on a new successor.
//!
//! ## Structure
//!
//! - **[`sim`]**: the simulator itself. See the main structure [`Network`](sim::Network), which
//!   owns the router registry and the message bus, and [`RouterNode`](sim::RouterNode), which
//!   handles the protocol events. The route computation lives in
//!   [`DualEngine`](sim::DualEngine).
//!
//! - **[`spf`]**: an independent single-source shortest-path utility over a static weighted
//!   graph. It shares no state with the simulator; the tests use it as the ground truth the
//!   converged simulator is compared against.
//!
//! The simulator is single threaded and event driven: every handler runs to completion, and the
//! messages it emits are enqueued on the network and delivered later, in per-sender FIFO order.

pub mod sim;
pub mod spf;

// test modules
mod test;
