//! Degree and betweenness centrality over a keyword graph.
//!
//! Both measures are normalized to `[0, 1]`:
//! - degree centrality divides a node's degree by `N - 1`
//! - betweenness centrality counts, for every ordered pair of other nodes,
//!   the fraction of shortest paths passing through the node (Brandes'
//!   algorithm, unweighted), scaled by `1 / ((N - 1)(N - 2))`

use super::builder::KeywordGraph;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// One row of a centrality ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityRecord {
    pub keyword: String,
    pub score: f64,
}

/// Centrality rankings for one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Centrality {
    Ranked {
        degree: Vec<CentralityRecord>,
        betweenness: Vec<CentralityRecord>,
    },
    /// The graph has fewer than two nodes, so neither measure means anything.
    Vacuous { node_count: usize },
}

/// Degree centrality per node, indexed by node ID.
pub fn degree_centrality(graph: &KeywordGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n < 2 {
        return vec![0.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n as u32).map(|id| graph.degree(id) as f64 * scale).collect()
}

/// Betweenness centrality per node, indexed by node ID.
pub fn betweenness_centrality(graph: &KeywordGraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut betweenness = vec![0.0; n];
    if n < 3 {
        return betweenness;
    }

    for source in 0..n {
        // Single-source shortest paths by BFS
        let mut stack: Vec<usize> = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        sigma[source] = 1.0;
        distance[source] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let dv = distance[v].unwrap_or(0);
            for (w, _) in graph.neighbors(v as u32) {
                let w = w as usize;
                if distance[w].is_none() {
                    distance[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if distance[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        // Accumulate dependencies in reverse BFS order
        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                betweenness[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    for b in &mut betweenness {
        *b *= scale;
    }
    betweenness
}

/// Rank scores descending (ties in node order) and keep the top `k`.
pub fn rank(graph: &KeywordGraph, scores: &[f64], k: usize) -> Vec<CentralityRecord> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
        .into_iter()
        .take(k)
        .map(|id| CentralityRecord {
            keyword: graph.label(id as u32).to_string(),
            score: scores[id],
        })
        .collect()
}

/// Compute both rankings, or report that they are vacuous.
#[instrument(level = "info", skip(graph), fields(nodes = graph.node_count()))]
pub fn compute_centrality(graph: &KeywordGraph, top_k: usize) -> Centrality {
    if graph.node_count() < 2 {
        debug!("Graph too small for centrality");
        return Centrality::Vacuous {
            node_count: graph.node_count(),
        };
    }
    let degree = rank(graph, &degree_centrality(graph), top_k);
    let betweenness = rank(graph, &betweenness_centrality(graph), top_k);
    Centrality::Ranked { degree, betweenness }
}
