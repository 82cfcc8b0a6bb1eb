//! Cycle detection over the entanglement graph.
//!
//! Nodes are ledger indices of uncollapsed moves. Edges come from live
//! entanglements only, and parallel edges between the same two moves are
//! merged into one adjacency entry. Each connected component reports at
//! most one cycle: the first closed loop its depth-first search runs into.

use crate::entanglement::Entanglement;
use crate::types::QuantumMove;
use tracing::{debug, instrument};

/// A closed loop of moves, as ledger indices in traversal order.
pub type Cycle = Vec<usize>;

/// Undirected graph over uncollapsed moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntanglementGraph {
    /// Uncollapsed ledger indices, in ledger order.
    nodes: Vec<usize>,
    /// Sorted, deduplicated neighbours, indexed by ledger index.
    adjacency: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    parent: Option<usize>,
    next: usize,
}

impl EntanglementGraph {
    /// Builds the graph from the ledger and the full entanglement history.
    #[instrument(skip_all, fields(moves = moves.len(), entanglements = entanglements.len()))]
    pub fn build(moves: &[QuantumMove], entanglements: &[Entanglement]) -> Self {
        let nodes: Vec<usize> = moves
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_quantum())
            .map(|(idx, _)| idx)
            .collect();

        let mut adjacency = vec![Vec::new(); moves.len()];
        for ent in entanglements.iter().filter(|e| e.is_live(moves)) {
            if ent.existing == ent.placed {
                continue;
            }
            adjacency[ent.existing].push(ent.placed);
            adjacency[ent.placed].push(ent.existing);
        }
        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
            neighbours.dedup();
        }

        Self { nodes, adjacency }
    }

    /// Neighbours of a node.
    pub fn neighbours(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether two nodes share an edge.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbours(a).binary_search(&b).is_ok()
    }

    /// Finds one cycle per connected component, in ledger order of the
    /// component's first node.
    #[instrument(skip(self))]
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut visited = vec![false; self.adjacency.len()];
        let mut cycles = Vec::new();

        for &start in &self.nodes {
            if visited[start] {
                continue;
            }
            if let Some(cycle) = self.cycle_from(start, &mut visited) {
                debug!(?cycle, "Cycle found in component");
                self.mark_component(start, &mut visited);
                cycles.push(cycle);
            }
        }

        cycles
    }

    /// Iterative depth-first search from `start`, stopping at the first
    /// neighbour (other than the parent) that is already on the path.
    fn cycle_from(&self, start: usize, visited: &mut [bool]) -> Option<Cycle> {
        let mut on_path = vec![false; self.adjacency.len()];
        let mut path = vec![start];
        let mut stack = vec![Frame {
            node: start,
            parent: None,
            next: 0,
        }];
        visited[start] = true;
        on_path[start] = true;

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let parent = frame.parent;
            let Some(&next) = self.neighbours(node).get(frame.next) else {
                on_path[node] = false;
                path.pop();
                stack.pop();
                continue;
            };
            frame.next += 1;

            if Some(next) == parent {
                continue;
            }
            if on_path[next] {
                let pos = path.iter().position(|&m| m == next)?;
                return Some(path[pos..].to_vec());
            }
            if !visited[next] {
                visited[next] = true;
                on_path[next] = true;
                path.push(next);
                stack.push(Frame {
                    node: next,
                    parent: Some(node),
                    next: 0,
                });
            }
        }

        None
    }

    /// Marks every node reachable from `start` as visited.
    fn mark_component(&self, start: usize, visited: &mut [bool]) {
        let mut pending = vec![start];
        visited[start] = true;
        while let Some(node) = pending.pop() {
            for &next in self.neighbours(node) {
                if !visited[next] {
                    visited[next] = true;
                    pending.push(next);
                }
            }
        }
    }

    /// Checks that `cycle` is a closed loop of distinct, adjacent nodes.
    pub fn is_valid_cycle(&self, cycle: &[usize]) -> bool {
        if cycle.len() < 3 {
            return false;
        }
        let mut seen = cycle.to_vec();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != cycle.len() {
            return false;
        }
        cycle
            .iter()
            .zip(cycle.iter().cycle().skip(1))
            .all(|(&a, &b)| self.are_adjacent(a, b))
    }
}

/// Builds the graph and returns one cycle per component that has one.
pub fn detect_cycles(moves: &[QuantumMove], entanglements: &[Entanglement]) -> Vec<Cycle> {
    EntanglementGraph::build(moves, entanglements).find_cycles()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entanglement::detect;
    use crate::types::{MoveId, Player};

    fn ledger(pairs: &[[usize; 2]]) -> (Vec<QuantumMove>, Vec<Entanglement>) {
        let mut moves = Vec::new();
        let mut ents = Vec::new();
        for (i, cells) in pairs.iter().enumerate() {
            let player = if i % 2 == 0 { Player::X } else { Player::O };
            moves.push(QuantumMove::new(
                MoveId::new(player, (i / 2 + 1) as u32),
                *cells,
            ));
            ents.extend(detect(i, &moves));
        }
        (moves, ents)
    }

    #[test]
    fn test_chain_has_no_cycle() {
        let (moves, ents) = ledger(&[[0, 4], [4, 8], [8, 2]]);
        assert!(detect_cycles(&moves, &ents).is_empty());
    }

    #[test]
    fn test_triangle_is_detected() {
        let (moves, ents) = ledger(&[[0, 4], [4, 8], [8, 0]]);
        let cycles = detect_cycles(&moves, &ents);
        assert_eq!(cycles.len(), 1);
        let mut members = cycles[0].clone();
        members.sort_unstable();
        assert_eq!(members, vec![0, 1, 2]);
    }

    #[test]
    fn test_parallel_edges_merge() {
        // Same pair of cells twice: two entanglement records, one edge.
        let (moves, ents) = ledger(&[[0, 1], [1, 0]]);
        assert_eq!(ents.len(), 2);
        let graph = EntanglementGraph::build(&moves, &ents);
        assert_eq!(graph.neighbours(0), &[1]);
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn test_one_cycle_per_component() {
        let (moves, ents) = ledger(&[
            [0, 1],
            [1, 2],
            [2, 0],
            [3, 4],
            [4, 5],
            [5, 3],
            // second loop inside the first component
            [0, 2],
        ]);
        let cycles = detect_cycles(&moves, &ents);
        assert_eq!(cycles.len(), 2);
        let graph = EntanglementGraph::build(&moves, &ents);
        for cycle in &cycles {
            assert!(graph.is_valid_cycle(cycle), "{cycle:?}");
        }
    }

    #[test]
    fn test_collapsed_moves_leave_the_graph() {
        let (mut moves, ents) = ledger(&[[0, 4], [4, 8], [8, 0]]);
        moves[1].collapse_to(4);
        assert!(detect_cycles(&moves, &ents).is_empty());
    }

    #[test]
    fn test_edge_order_does_not_change_verdict() {
        let (moves, ents) = ledger(&[[0, 4], [4, 8], [8, 2], [2, 0], [5, 6]]);
        let forward = !detect_cycles(&moves, &ents).is_empty();

        let mut reversed = ents.clone();
        reversed.reverse();
        let backward = detect_cycles(&moves, &reversed);

        let mut rotated = ents.clone();
        rotated.rotate_left(2);
        let shifted = detect_cycles(&moves, &rotated);

        assert!(forward);
        assert!(!backward.is_empty());
        assert!(!shifted.is_empty());
        let graph = EntanglementGraph::build(&moves, &ents);
        assert!(graph.is_valid_cycle(&backward[0]));
        assert!(graph.is_valid_cycle(&shifted[0]));
    }
}
