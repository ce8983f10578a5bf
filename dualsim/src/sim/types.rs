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

//! Module containing all type definitions

use std::fmt;
use std::ops::Add;
use thiserror::Error;

/// Router identification. Router ids are opaque strings, globally unique among all simulated
/// routers, and double as the lookup key into the central registry.
pub type RouterId = String;

/// Distance to a destination. A metric is either a finite non-negative integer, or the sentinel
/// [`Metric::INFINITY`], which is used both for "unreachable" and for "link down". Addition
/// saturates: adding anything to infinity yields infinity, and any finite sum beyond the clamp
/// threshold is treated as infinity as well. Infinity compares strictly greater than every finite
/// value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Metric(u32);

impl Metric {
    /// The unreachable sentinel.
    pub const INFINITY: Metric = Metric(u32::MAX);

    /// The zero distance (a router to itself).
    pub const ZERO: Metric = Metric(0);

    /// Largest value still treated as finite. Everything beyond clamps to infinity.
    const CLAMP: u32 = u32::MAX >> 1;

    /// Create a new metric. Values beyond the clamp threshold are treated as infinite.
    pub fn new(value: u32) -> Self {
        if value > Self::CLAMP {
            Self::INFINITY
        } else {
            Metric(value)
        }
    }

    /// Returns true if the metric is the unreachable sentinel.
    pub fn is_infinite(self) -> bool {
        self == Self::INFINITY
    }

    /// Returns true if the metric is a finite distance.
    pub fn is_finite(self) -> bool {
        !self.is_infinite()
    }
}

impl Add for Metric {
    type Output = Metric;

    fn add(self, rhs: Metric) -> Metric {
        if self.is_infinite() || rhs.is_infinite() {
            Metric::INFINITY
        } else {
            // saturation clamps to infinity, it never raises an error
            Metric::new(self.0.saturating_add(rhs.0))
        }
    }
}

impl From<u32> for Metric {
    fn from(value: u32) -> Self {
        Metric::new(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "INF")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Network Errors
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    /// The router id is not registered in the network.
    #[error("Router {0:?} is not registered in the network")]
    UnknownRouter(RouterId),
    /// A link was configured towards a router id that is not registered.
    #[error("Cannot link {0:?} to unknown router {1:?}")]
    UnknownPeer(RouterId, RouterId),
    /// A queued message is addressed to a router id that is not registered.
    #[error("Message addressed to unregistered router {0:?}")]
    UndeliverableMessage(RouterId),
    /// The message budget was exhausted while draining the queue.
    #[error("Network cannot converge in the given message budget!")]
    NoConvergence,
    /// Successor tracing visited the same router twice.
    #[error("Forwarding loop occurred! path: {0:?}")]
    ForwardingLoop(Vec<RouterId>),
    /// Successor tracing reached a router without a successor for the destination.
    #[error("Black hole occurred! path: {0:?}")]
    ForwardingBlackHole(Vec<RouterId>),
}
