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

#![deny(missing_docs, missing_debug_implementations)]

//! # DUAL simulator
//!
//! This module simulates a set of routers running a distance-vector protocol built on the
//! diffusing update algorithm. Every router keeps, per destination, a successor chosen under the
//! feasibility condition (the candidate's own advertised distance must stay strictly below the
//! lowest distance we ever reported). When an event invalidates a route and no candidate is
//! feasible, the router goes *active*: it queries all its neighbors and only selects a new
//! successor once every reply arrived.
//!
//! Routers communicate exclusively through typed events on the central [`Network`], which owns
//! the router registry and the message queue. Handlers run to completion and enqueue their
//! outbound messages; the harness delivers them with [`Network::step`] or [`Network::drain`].
//!
//! ## Example usage
//!
//! The following example builds two routers with a symmetric unit-cost link, lets both announce
//! themselves, and drains the message queue until the network converged.
//!
//! ```rust
//! use dualsim::sim::{Metric, Network};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut net = Network::new();
//!     net.add_router("R1");
//!     net.add_router("R2");
//!
//!     net.configure_link("R1", "R2", Metric::new(1))?;
//!     net.configure_link("R2", "R1", Metric::new(1))?;
//!
//!     net.announce_self("R1")?;
//!     net.announce_self("R2")?;
//!     net.drain()?;
//!
//!     let route = net.get_device("R2").unwrap().route("R1").unwrap();
//!     assert_eq!(route.successor.as_deref(), Some("R1"));
//!     assert_eq!(route.reported_distance, Metric::new(1));
//!
//!     assert_eq!(net.get_path("R2", "R1")?, vec!["R2".to_string(), "R1".to_string()]);
//!     Ok(())
//! }
//! ```

pub mod dual;
pub(crate) mod event;
pub mod router;
pub(crate) mod topology;
pub(crate) mod types;

pub(crate) mod network;

pub use dual::{DualEngine, RouteEntry};
pub use event::{Event, EventQueue};
pub use network::Network;
pub use router::RouterNode;
pub use topology::TopologyTable;
pub use types::{Metric, NetworkError, RouterId};
