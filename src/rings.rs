// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::Way;

/// Result of [assemble_rings].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingAssembly {
    /// Indices of closed ways: the closed input ways (in input order),
    /// followed by the newly created rings (in creation order).
    pub rings: Vec<usize>,

    /// Indices of open input ways which couldn't be merged into any ring.
    pub leftover: Vec<usize>,
}

/// Turns a list of way indices (the outer or inner members of an area)
/// into a list of closed ways.
///
/// Repeated indices in `members` are considered only once.
/// Already-closed ways are kept as-is. Open ways are joined on shared endpoints
/// (reversing them if necessary) until the chain closes back on its first node;
/// every such chain is appended to `ways` as a new [Way] with `osm_id == 0`.
/// Existing ways are never modified.
///
/// Candidates are tried in the order of `members`, and the first complete ring wins.
/// The search backtracks out of dead ends, and is exponential in the number of open ways.
pub fn assemble_rings(ways: &mut Vec<Way>, members: &[usize]) -> RingAssembly {
    let mut result = RingAssembly::default();
    let mut open: Vec<usize> = Vec::default();
    let mut seen: HashSet<usize> = HashSet::default();

    for &idx in members {
        if !seen.insert(idx) {
            log::debug!("way {} listed more than once - ignoring the duplicate", idx);
            continue;
        }

        match ways.get(idx) {
            Some(w) if w.is_closed() => result.rings.push(idx),
            Some(w) if !w.nodes.is_empty() => open.push(idx),
            _ => result.leftover.push(idx),
        }
    }

    let mut used = vec![false; open.len()];
    loop {
        let found = {
            let segments: Vec<&[usize]> = open.iter().map(|&i| ways[i].nodes.as_slice()).collect();
            find_ring(&segments, &used)
        };

        let Some((taken, nodes)) = found else {
            break;
        };

        taken.iter().for_each(|&i| used[i] = true);
        ways.push(Way { osm_id: 0, nodes });
        result.rings.push(ways.len() - 1);
    }

    result.leftover.extend(
        open.iter()
            .zip(used.iter())
            .filter_map(|(&idx, &used)| if used { None } else { Some(idx) }),
    );

    result
}

/// Tries every unused segment as the start of a ring.
/// Returns the positions (in `segments`) of the consumed segments and the ring's nodes.
fn find_ring(segments: &[&[usize]], used: &[bool]) -> Option<(Vec<usize>, Vec<usize>)> {
    (0..segments.len())
        .filter(|&i| !used[i])
        .find_map(|i| extend_chain(segments, used, vec![i], segments[i].to_vec()))
}

/// Recursively extends `chain` by unused segments attached to its tail,
/// until the chain closes. Every call frame owns its copy of the chain.
fn extend_chain(
    segments: &[&[usize]],
    used: &[bool],
    taken: Vec<usize>,
    chain: Vec<usize>,
) -> Option<(Vec<usize>, Vec<usize>)> {
    if chain.len() > 1 && chain.first() == chain.last() {
        return Some((taken, chain));
    }

    let tail = *chain.last()?;

    for (i, segment) in segments.iter().enumerate() {
        if used[i] || taken.contains(&i) {
            continue;
        }

        let extension: Vec<usize> = if segment.first() == Some(&tail) {
            segment[1..].to_vec()
        } else if segment.last() == Some(&tail) {
            segment.iter().rev().skip(1).copied().collect()
        } else {
            continue;
        };

        let mut next_taken = taken.clone();
        next_taken.push(i);

        let mut next_chain = chain.clone();
        next_chain.extend(extension);

        if let Some(ring) = extend_chain(segments, used, next_taken, next_chain) {
            return Some(ring);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ways(nodes: &[&[usize]]) -> Vec<Way> {
        nodes
            .iter()
            .enumerate()
            .map(|(i, n)| Way {
                osm_id: i as i64 + 1,
                nodes: n.to_vec(),
            })
            .collect()
    }

    #[test]
    fn closed_ways_are_kept() {
        let mut ways = make_ways(&[&[0, 1, 2, 0], &[3, 4, 5, 3]]);
        let result = assemble_rings(&mut ways, &[1, 0]);
        assert_eq!(result.rings, vec![1, 0]);
        assert!(result.leftover.is_empty());
        assert_eq!(ways.len(), 2);
    }

    #[test]
    fn two_segments() {
        let mut ways = make_ways(&[&[0, 1, 2], &[2, 3, 0]]);
        let result = assemble_rings(&mut ways, &[0, 1]);

        assert_eq!(result.rings, vec![2]);
        assert!(result.leftover.is_empty());
        assert_eq!(ways[2].nodes, vec![0, 1, 2, 3, 0]);
        assert_eq!(ways[2].osm_id, 0);

        // Source ways are untouched
        assert_eq!(ways[0].nodes, vec![0, 1, 2]);
        assert_eq!(ways[1].nodes, vec![2, 3, 0]);
    }

    #[test]
    fn reversed_segment() {
        let mut ways = make_ways(&[&[0, 1, 2], &[4, 3, 2], &[4, 5, 0]]);
        let result = assemble_rings(&mut ways, &[0, 1, 2]);

        assert_eq!(result.rings, vec![3]);
        assert_eq!(ways[3].nodes, vec![0, 1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn backtracks_out_of_dead_ends() {
        // 0-1-2 could continue with the dead end 2-9,
        // but only 2-3-0 closes the ring
        let mut ways = make_ways(&[&[0, 1, 2], &[2, 9], &[2, 3, 0]]);
        let result = assemble_rings(&mut ways, &[0, 1, 2]);

        assert_eq!(result.rings, vec![3]);
        assert_eq!(result.leftover, vec![1]);
        assert_eq!(ways[3].nodes, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn multiple_rings_and_closed_ways() {
        let mut ways = make_ways(&[
            &[0, 1],
            &[10, 11, 12, 10],
            &[20, 21, 22],
            &[1, 2, 0],
            &[22, 20],
        ]);
        let result = assemble_rings(&mut ways, &[0, 1, 2, 3, 4]);

        assert_eq!(result.rings, vec![1, 5, 6]);
        assert!(result.leftover.is_empty());
        assert_eq!(ways[5].nodes, vec![0, 1, 2, 0]);
        assert_eq!(ways[6].nodes, vec![20, 21, 22, 20]);
    }

    #[test]
    fn union_of_nodes() {
        let mut ways = make_ways(&[&[3, 4], &[0, 1], &[2, 3], &[4, 0], &[1, 2]]);
        let result = assemble_rings(&mut ways, &[0, 1, 2, 3, 4]);

        assert_eq!(result.rings, vec![5]);
        let ring = &ways[5];
        assert!(ring.is_closed());
        assert_eq!(ring.nodes, vec![3, 4, 0, 1, 2, 3]);
    }

    #[test]
    fn unclosable_segments_are_leftover() {
        let mut ways = make_ways(&[&[0, 1, 2], &[2, 3], &[], &[7, 8, 9, 7]]);
        let result = assemble_rings(&mut ways, &[0, 1, 2, 3, 42]);

        assert_eq!(result.rings, vec![3]);
        assert_eq!(result.leftover, vec![2, 42, 0, 1]);
        assert_eq!(ways.len(), 4);
    }

    #[test]
    fn repeated_members_are_used_once() {
        let mut ways = make_ways(&[&[0, 1, 2]]);
        let result = assemble_rings(&mut ways, &[0, 0]);

        assert!(result.rings.is_empty());
        assert_eq!(result.leftover, vec![0]);
        assert_eq!(ways.len(), 1);
    }

    #[test]
    fn repeated_members_of_a_ring() {
        let mut ways = make_ways(&[&[0, 1, 2], &[2, 3, 0], &[5, 6, 7, 5]]);
        let result = assemble_rings(&mut ways, &[0, 2, 1, 0, 2]);

        assert_eq!(result.rings, vec![2, 3]);
        assert!(result.leftover.is_empty());
        assert_eq!(ways.len(), 4);
        assert_eq!(ways[3].nodes, vec![0, 1, 2, 3, 0]);
    }
}
