//! Connected components of the operand graph.
//!
//! Two operands are adjacent when they share a label that the output does
//! not keep. Components are contracted independently and joined by outer
//! products afterwards.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use crate::shape::Labels;

/// Partitions operands into connected components.
///
/// Each component is found by breadth-first search from its lowest operand
/// index, visiting neighbours in ascending order, so the result is
/// deterministic. Components are listed by their smallest member.
pub fn find_subgraphs(labels: &[Labels], output: &[char]) -> Vec<Vec<usize>> {
    let n = labels.len();
    let mut visited = vec![false; n];
    let mut components = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            component.push(current);
            for next in 0..n {
                if !visited[next] && connected(&labels[current], &labels[next], output) {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        components.push(component);
    }

    components
}

fn connected(a: &Labels, b: &Labels, output: &[char]) -> bool {
    a.iter().any(|c| b.contains(c) && !output.contains(c))
}
