use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::warn;

use crate::network::{Network, NodeIndex, Weight};
use crate::Path;

// Run Dijkstra from start to end. Returns None once the frontier is exhausted, or when more than
// max_visited nodes were settled without reaching end.
//
// Ties are broken by node index (the heap orders on (cost, node)) and a parent is only replaced on a
// strict improvement, so a fixed network always yields the same path.
pub fn dijkstra_query(network: &Network, start: NodeIndex, end: NodeIndex, max_visited: Option<usize>) -> Option<Path> {
    if start == end {
        return Path::new(vec![start], 0);
    }

    let num_nodes = network.num_nodes();
    let mut dist = vec![Weight::MAX; num_nodes];
    let mut parent: Vec<Option<NodeIndex>> = vec![None; num_nodes];
    let mut settled = vec![false; num_nodes];
    let mut num_settled = 0;

    let mut queue: BinaryHeap<Reverse<(Weight, NodeIndex)>> = BinaryHeap::new();
    dist[start as usize] = 0;
    queue.push(Reverse((0, start)));

    while let Some(Reverse((cost, node))) = queue.pop() {
        let node_idx = node as usize;
        if settled[node_idx] {
            continue;
        }
        settled[node_idx] = true;

        if node == end {
            return reconstruct(&parent, start, end, cost);
        }

        num_settled += 1;
        if max_visited.is_some_and(|max_visited| num_settled > max_visited) {
            warn!("Gave up on {} -> {} after settling {num_settled} nodes.", network.get_key(start), network.get_key(end));
            return None;
        }

        for neighbour in network.get_neighbours(node) {
            let next = neighbour.node as usize;
            if settled[next] {
                continue;
            }
            let next_cost = cost.saturating_add(neighbour.weight);
            if next_cost < dist[next] {
                dist[next] = next_cost;
                parent[next] = Some(node);
                queue.push(Reverse((next_cost, neighbour.node)));
            }
        }
    }

    None
}

// Reconstruct path from parent pointers.
fn reconstruct(parent: &[Option<NodeIndex>], start: NodeIndex, end: NodeIndex, weight: Weight) -> Option<Path> {
    let mut nodes = vec![end];
    let mut current = end;
    while current != start {
        // A path can't be longer than the network; anything else is a broken parent chain.
        if nodes.len() > parent.len() {
            return None;
        }
        current = parent[current as usize]?;
        nodes.push(current);
    }
    nodes.reverse();
    Path::new(nodes, weight)
}
