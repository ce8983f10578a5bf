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

use crate::spf::{graph_from_edges, shortest_paths, vertex, GraphError};

#[test]
fn shortest_path_with_relaxation() {
    let graph = graph_from_edges(
        5,
        &[(1, 2, 2), (1, 3, 5), (2, 3, 1), (2, 4, 2), (3, 4, 3), (4, 5, 1)],
    )
    .unwrap();
    let paths = shortest_paths(&graph, vertex(1));

    assert_eq!(paths.distance(vertex(5)), Some(5));
    assert_eq!(
        paths.path(vertex(5)),
        Some(vec![vertex(1), vertex(2), vertex(4), vertex(5)])
    );

    // the direct edge to vertex 3 is relaxed away by the cheaper detour via vertex 2
    assert_eq!(paths.distance(vertex(3)), Some(3));
    assert_eq!(
        paths.path(vertex(3)),
        Some(vec![vertex(1), vertex(2), vertex(3)])
    );
}

#[test]
fn source_is_reachable_at_distance_zero() {
    let graph = graph_from_edges(2, &[(1, 2, 3)]).unwrap();
    let paths = shortest_paths(&graph, vertex(1));
    assert_eq!(paths.distance(vertex(1)), Some(0));
    assert_eq!(paths.path(vertex(1)), Some(vec![vertex(1)]));
}

#[test]
fn disconnected_vertices_are_unreachable() {
    let graph = graph_from_edges(4, &[(1, 2, 1)]).unwrap();
    let paths = shortest_paths(&graph, vertex(1));
    assert_eq!(paths.distance(vertex(2)), Some(1));
    assert_eq!(paths.distance(vertex(3)), None);
    assert_eq!(paths.path(vertex(3)), None);
    assert_eq!(paths.distance(vertex(4)), None);
}

#[test]
fn parallel_edges_keep_the_cheapest() {
    let graph = graph_from_edges(2, &[(1, 2, 3), (1, 2, 1)]).unwrap();
    let paths = shortest_paths(&graph, vertex(1));
    assert_eq!(paths.distance(vertex(2)), Some(1));
}

#[test]
fn edges_outside_the_vertex_range_are_rejected() {
    assert_eq!(
        graph_from_edges(3, &[(1, 4, 1)]).unwrap_err(),
        GraphError::VertexOutOfRange(4, 3)
    );
    assert_eq!(
        graph_from_edges(3, &[(0, 2, 1)]).unwrap_err(),
        GraphError::VertexOutOfRange(0, 3)
    );
}
