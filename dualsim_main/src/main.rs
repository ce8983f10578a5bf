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

use dualsim::sim::{Metric, Network};
use dualsim::spf;

use clap::{Parser, Subcommand};
use log::*;
use std::convert::TryFrom;
use std::error::Error;
use std::io::Read;

#[derive(Parser)]
#[clap(
    name = "dualsim",
    about = "Distance-vector convergence simulator and shortest-path utility"
)]
struct CommandLineArguments {
    #[clap(subcommand)]
    cmd: Option<MainCommand>,
}

#[derive(Subcommand)]
enum MainCommand {
    /// Read a weighted graph from stdin (`n e` followed by `e` lines of `u v w`) and print the
    /// shortest path from vertex 1 to vertex n. This is the default command.
    Spf,
    /// Replay the canned four-router convergence and link-failure scenario, printing every
    /// router's routing table.
    Demo,
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let args = CommandLineArguments::parse();
    match args.cmd.unwrap_or(MainCommand::Spf) {
        MainCommand::Spf => spf_from_stdin(),
        MainCommand::Demo => demo(),
    }
}

fn spf_from_stdin() -> Result<(), Box<dyn Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let (n, edges) = parse_graph(&input)?;

    let graph = spf::graph_from_edges(n, &edges)?;
    let paths = spf::shortest_paths(&graph, spf::vertex(1));

    match paths.path(spf::vertex(n)) {
        Some(path) => {
            println!(
                "Shortest distance to {} is: {}",
                n,
                paths.distance(spf::vertex(n)).expect("path implies a distance")
            );
            let hops: Vec<String> = path.iter().map(|v| (v.index() + 1).to_string()).collect();
            println!("Path: {}", hops.join(" "));
        }
        None => println!("No path found from router 1 to {}.", n),
    }
    Ok(())
}

/// Parse the textual graph format: the pair `n e`, followed by `e` whitespace-separated triples
/// `u v w` with 1-based vertex numbers.
fn parse_graph(input: &str) -> Result<(usize, Vec<(usize, usize, u32)>), Box<dyn Error>> {
    let mut tokens = input.split_whitespace();
    let n = next_number(&mut tokens)?;
    let e = next_number(&mut tokens)?;
    if n == 0 {
        return Err("the graph needs at least one vertex".into());
    }
    let mut edges = Vec::with_capacity(e);
    for _ in 0..e {
        let u = next_number(&mut tokens)?;
        let v = next_number(&mut tokens)?;
        let w = next_number(&mut tokens)?;
        edges.push((u, v, u32::try_from(w)?));
    }
    Ok((n, edges))
}

fn next_number<'a, I>(tokens: &mut I) -> Result<usize, Box<dyn Error>>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or("unexpected end of input")?;
    Ok(token.parse::<usize>()?)
}

/// Build the four-router chain of the classic scenario, converge it, take the middle link down,
/// and print the routing tables before and after.
fn demo() -> Result<(), Box<dyn Error>> {
    let routers = ["R1", "R2", "R3", "R4"];

    let mut net = Network::new();
    for &r in &routers {
        net.add_router(r);
    }
    for &(a, b) in &[("R1", "R2"), ("R2", "R3"), ("R3", "R4")] {
        net.configure_link(a, b, Metric::new(1))?;
        net.configure_link(b, a, Metric::new(1))?;
    }
    for &r in &routers {
        net.announce_self(r)?;
    }
    net.drain()?;
    info!("initial convergence complete");

    println!("=== converged ===");
    for &r in &routers {
        net.print_routing_table(r)?;
    }

    println!();
    println!("=== link R2 -- R3 goes down ===");
    net.fail_link("R2", "R3")?;
    net.drain()?;
    for &r in &routers {
        net.print_routing_table(r)?;
    }

    Ok(())
}
