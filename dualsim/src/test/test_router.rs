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

use crate::sim::{Event, EventQueue, Metric, RouterNode, TopologyTable};
use maplit::hashset;

fn update(from: &str, to: &str, dest: &str, distance: Metric) -> Event {
    Event::Update {
        from: from.to_string(),
        to: to.to_string(),
        dest: dest.to_string(),
        distance,
    }
}

fn query(from: &str, to: &str, dest: &str, origin_fd: Metric) -> Event {
    Event::Query {
        from: from.to_string(),
        to: to.to_string(),
        dest: dest.to_string(),
        origin_fd,
    }
}

fn reply(from: &str, to: &str, dest: &str, distance: Metric) -> Event {
    Event::Reply {
        from: from.to_string(),
        to: to.to_string(),
        dest: dest.to_string(),
        distance,
    }
}

#[test]
fn topology_table_stores_latest_advertisement() {
    let mut tt = TopologyTable::new();
    assert_eq!(tt.get("D", "R2"), Metric::INFINITY);

    tt.set("D", "R2", Metric::new(4));
    tt.set("D", "R3", Metric::new(7));
    tt.set("E", "R2", Metric::new(1));
    assert_eq!(tt.get("D", "R2"), Metric::new(4));

    // the most recent advertisement wins
    tt.set("D", "R2", Metric::new(2));
    assert_eq!(tt.get("D", "R2"), Metric::new(2));

    let mut dests: Vec<String> = tt.destinations().cloned().collect();
    dests.sort();
    assert_eq!(dests, vec!["D".to_string(), "E".to_string()]);

    tt.forget_neighbor("R2");
    assert_eq!(tt.get("D", "R2"), Metric::INFINITY);
    assert_eq!(tt.get("E", "R2"), Metric::INFINITY);
    assert_eq!(tt.get("D", "R3"), Metric::new(7));
}

#[test]
fn self_announcement_creates_and_advertises_the_self_route() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();

    // the first configuration of a link only records it
    r.configure_link("R2", Metric::new(1), &mut queue);
    assert!(queue.is_empty());
    assert!(r.route("R1").is_none());

    r.on_link_change("R1", Metric::ZERO, &mut queue);
    let entry = r.route("R1").unwrap();
    assert_eq!(entry.successor.as_deref(), Some("R1"));
    assert_eq!(entry.reported_distance, Metric::ZERO);
    assert_eq!(entry.feasible_distance, Metric::ZERO);
    assert!(!entry.active);

    assert_eq!(
        queue.pop_front(),
        Some(update("R1", "R2", "R1", Metric::ZERO))
    );
    assert!(queue.is_empty());

    // applying the same change again must not re-advertise
    r.on_link_change("R1", Metric::ZERO, &mut queue);
    assert!(queue.is_empty());
}

#[test]
fn updates_from_non_neighbors_are_dropped() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);

    r.handle_event(update("R9", "R1", "D", Metric::new(1)), &mut queue);
    assert!(r.route("D").is_none());
    assert!(queue.is_empty());

    // a neighbor whose link went down is no sender either
    r.on_link_change("R2", Metric::INFINITY, &mut queue);
    queue.clear();
    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);
    assert!(r.route("D").is_none());
    assert!(queue.is_empty());
}

#[test]
fn equal_cost_candidates_tie_break_lexicographically() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);
    r.configure_link("R3", Metric::new(1), &mut queue);

    r.handle_event(update("R3", "R1", "D", Metric::new(1)), &mut queue);
    // learned via R3 first, advertised to everyone but the successor
    assert_eq!(r.route("D").unwrap().successor.as_deref(), Some("R3"));
    assert_eq!(queue.pop_front(), Some(update("R1", "R2", "D", Metric::new(2))));
    assert!(queue.is_empty());

    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);
    let entry = r.route("D").unwrap();
    // both candidates cost 2: the lexicographically smaller neighbor wins
    assert_eq!(entry.successor.as_deref(), Some("R2"));
    assert_eq!(entry.reported_distance, Metric::new(2));
    // the successor changed, so the route is re-advertised (split horizon towards R2 now)
    assert_eq!(queue.pop_front(), Some(update("R1", "R3", "D", Metric::new(2))));
    assert!(queue.is_empty());
}

#[test]
fn infeasible_candidate_starts_a_diffusing_computation() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);

    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);
    let entry = r.route("D").unwrap();
    assert_eq!(entry.reported_distance, Metric::new(2));
    assert_eq!(entry.feasible_distance, Metric::new(2));
    // the only neighbor is the successor: split horizon suppresses every advertisement
    assert!(queue.is_empty());

    // the successor's distance worsens beyond the feasible distance
    r.handle_event(update("R2", "R1", "D", Metric::new(3)), &mut queue);
    let entry = r.route("D").unwrap();
    assert!(entry.active);
    assert_eq!(entry.successor, None);
    assert_eq!(entry.outstanding_replies, hashset! {"R2".to_string()});
    assert_eq!(queue.pop_front(), Some(query("R1", "R2", "D", Metric::new(2))));
    assert!(queue.is_empty());

    // the reply resolves the computation; the feasible distance of the epoch is preserved
    r.handle_event(reply("R2", "R1", "D", Metric::new(3)), &mut queue);
    let entry = r.route("D").unwrap();
    assert!(!entry.active);
    assert_eq!(entry.successor.as_deref(), Some("R2"));
    assert_eq!(entry.reported_distance, Metric::new(4));
    assert_eq!(entry.feasible_distance, Metric::new(2));
    assert!(entry.outstanding_replies.is_empty());
    assert!(queue.is_empty());
}

#[test]
fn stale_replies_are_dropped() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);
    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);
    queue.clear();

    r.handle_event(reply("R2", "R1", "D", Metric::new(9)), &mut queue);
    let entry = r.route("D").unwrap();
    assert_eq!(entry.reported_distance, Metric::new(2));
    assert_eq!(r.topology_table().get("D", "R2"), Metric::new(1));
    assert!(queue.is_empty());
}

#[test]
fn query_for_the_router_itself_is_answered_immediately() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);

    r.handle_event(query("R2", "R1", "R1", Metric::INFINITY), &mut queue);
    assert_eq!(queue.pop_front(), Some(reply("R1", "R2", "R1", Metric::ZERO)));
    assert!(queue.is_empty());
}

#[test]
fn query_while_passive_is_answered_with_the_reported_distance() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);
    r.configure_link("R3", Metric::new(1), &mut queue);
    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);
    queue.clear();

    r.handle_event(query("R3", "R1", "D", Metric::INFINITY), &mut queue);
    // a querying neighbor has no route of its own anymore
    assert_eq!(r.topology_table().get("D", "R3"), Metric::INFINITY);
    assert_eq!(queue.pop_front(), Some(reply("R1", "R3", "D", Metric::new(2))));
    assert!(queue.is_empty());
    assert!(!r.route("D").unwrap().active);
}

#[test]
fn query_from_the_successor_propagates_the_computation() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);
    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);
    queue.clear();

    // the successor itself asks for the destination: its advertisement is void, no candidate
    // remains, and the diffusing computation spreads
    r.handle_event(query("R2", "R1", "D", Metric::new(1)), &mut queue);
    let entry = r.route("D").unwrap();
    assert!(entry.active);
    assert_eq!(entry.outstanding_replies, hashset! {"R2".to_string()});
    assert_eq!(queue.pop_front(), Some(query("R1", "R2", "D", Metric::new(2))));
    // the querier still gets an answer right away, with no usable distance
    assert_eq!(queue.pop_front(), Some(reply("R1", "R2", "D", Metric::INFINITY)));
    assert!(queue.is_empty());
}

#[test]
fn query_while_active_is_withheld_and_answered_on_completion() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);
    r.configure_link("R3", Metric::new(1), &mut queue);
    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);

    // losing the only advertisement activates the route, querying both neighbors
    r.handle_event(update("R2", "R1", "D", Metric::INFINITY), &mut queue);
    assert!(r.route("D").unwrap().active);
    assert_eq!(
        r.route("D").unwrap().outstanding_replies,
        hashset! {"R2".to_string(), "R3".to_string()}
    );
    queue.clear();

    // R3 queries us while we are waiting for its reply: the reply to R3 is withheld, and the
    // query itself stands in for R3's reply
    r.handle_event(query("R3", "R1", "D", Metric::INFINITY), &mut queue);
    assert!(queue.is_empty());
    let entry = r.route("D").unwrap();
    assert!(entry.active);
    assert_eq!(entry.outstanding_replies, hashset! {"R2".to_string()});

    // the last reply completes the computation; the withheld reply is answered with the settled
    // distance
    r.handle_event(reply("R2", "R1", "D", Metric::new(4)), &mut queue);
    let entry = r.route("D").unwrap();
    assert!(!entry.active);
    assert_eq!(entry.successor.as_deref(), Some("R2"));
    assert_eq!(entry.reported_distance, Metric::new(5));
    assert_eq!(queue.pop_front(), Some(update("R1", "R3", "D", Metric::new(5))));
    assert_eq!(queue.pop_front(), Some(reply("R1", "R3", "D", Metric::new(5))));
    assert!(queue.is_empty());
}

#[test]
fn link_down_purges_the_topology_and_releases_the_computation() {
    let mut r = RouterNode::new("R1");
    let mut queue = EventQueue::new();
    r.configure_link("R2", Metric::new(1), &mut queue);
    r.configure_link("R3", Metric::new(1), &mut queue);
    r.handle_event(update("R2", "R1", "D", Metric::new(1)), &mut queue);

    // worsening beyond the feasible distance activates the route
    r.handle_event(update("R2", "R1", "D", Metric::new(9)), &mut queue);
    assert!(r.route("D").unwrap().active);
    assert_eq!(
        r.route("D").unwrap().outstanding_replies,
        hashset! {"R2".to_string(), "R3".to_string()}
    );
    queue.clear();

    // R3 going down synthesizes its reply, the computation keeps waiting for R2
    r.on_link_change("R3", Metric::INFINITY, &mut queue);
    let entry = r.route("D").unwrap();
    assert!(entry.active);
    assert_eq!(entry.outstanding_replies, hashset! {"R2".to_string()});
    queue.clear();

    // R2 going down releases the computation; nothing remains, the destination is unreachable
    r.on_link_change("R2", Metric::INFINITY, &mut queue);
    let entry = r.route("D").unwrap();
    assert!(!entry.active);
    assert_eq!(entry.successor, None);
    assert!(entry.reported_distance.is_infinite());
    assert!(entry.feasible_distance.is_infinite());
    assert_eq!(r.topology_table().get("D", "R2"), Metric::INFINITY);
    assert!(queue.is_empty());
}
