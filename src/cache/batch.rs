use std::collections::BTreeMap;

use crate::types::identifiers::Token;
use crate::types::results::{BatchAnalysis, SharedPrefix};

/// Uncompressed counting trie: one node per token position, each counting the
/// sequences that pass through it. Children are always created after their
/// parent, so a reverse index walk visits children first.
struct CountNode {
    children: BTreeMap<Token, usize>,
    count: usize,
    depth: usize,
}

const ROOT: usize = 0;

/// Measure prefix sharing inside `sequences` alone.
///
/// Aggregation rule: replaying the batch through a cache that stores every
/// sequence, each sequence is served its longest common prefix with an
/// earlier one, provided that prefix reaches `min_prefix_length`. The total
/// is order independent: a token position shared by `k >= 2` sequences of one
/// cluster saves `k - 1` computations, counted once per position and never
/// per pair, and positions shared only across clusters save nothing extra.
pub(crate) fn analyze<S: AsRef<[Token]>>(sequences: &[S], min_prefix_length: usize) -> BatchAnalysis {
    let mut nodes = vec![CountNode {
        children: BTreeMap::new(),
        count: sequences.len(),
        depth: 0,
    }];

    let mut total_tokens = 0;
    for seq in sequences {
        let seq = seq.as_ref();
        total_tokens += seq.len();

        let mut cur = ROOT;
        for &token in seq {
            let next = match nodes[cur].children.get(&token) {
                Some(&child) => child,
                None => {
                    let child = nodes.len();
                    let depth = nodes[cur].depth + 1;
                    nodes.push(CountNode {
                        children: BTreeMap::new(),
                        count: 0,
                        depth,
                    });
                    nodes[cur].children.insert(token, child);
                    child
                }
            };
            nodes[next].count += 1;
            cur = next;
        }
    }

    let threshold = min_prefix_length.max(1);

    // Sequences sharing their first `threshold` tokens with at least one other
    // form a cluster; only cluster members can ever be served from cache.
    // Down to the threshold depth, track per node how many clustered sequences pass
    // through it and how many clusters they belong to.
    let mut clustered = vec![(0usize, 0usize); nodes.len()];
    for id in (1..nodes.len()).rev() {
        let node = &nodes[id];
        if node.depth == threshold {
            if node.count >= 2 {
                clustered[id] = (node.count, 1);
            }
        } else if node.depth < threshold {
            let (members, clusters) = node
                .children
                .values()
                .fold((0, 0), |(m, c), &child| (m + clustered[child].0, c + clustered[child].1));
            clustered[id] = (members, clusters);
        }
    }

    let mut potential_savings_tokens = 0;
    let mut is_maximal = vec![false; nodes.len()];
    for id in 1..nodes.len() {
        let node = &nodes[id];
        if node.depth < threshold {
            // each cluster computes this token once
            let (members, clusters) = clustered[id];
            potential_savings_tokens += members - clusters;
            continue;
        }
        if node.count < 2 {
            continue;
        }
        potential_savings_tokens += node.count - 1;
        is_maximal[id] = node.children.values().all(|&c| nodes[c].count < 2);
    }

    // A path crosses at most one maximal shared node.
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, seq) in sequences.iter().enumerate() {
        let mut cur = ROOT;
        for token in seq.as_ref() {
            let Some(&child) = nodes[cur].children.get(token) else {
                break;
            };
            if nodes[child].count < 2 {
                break;
            }
            cur = child;
            if is_maximal[cur] {
                groups.entry(cur).or_default().push(idx);
                break;
            }
        }
    }

    let shared_prefixes = groups
        .into_iter()
        .map(|(id, members)| SharedPrefix {
            length: nodes[id].depth,
            sequences: members,
        })
        .collect();

    BatchAnalysis {
        batch_size: sequences.len(),
        total_tokens,
        potential_savings_tokens,
        shared_prefixes,
    }
}
