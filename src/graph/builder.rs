//! Keyword co-occurrence graph construction
//!
//! Each document contributes its set of unique qualifying nouns. Every
//! unordered pair in that set gains one unit of weight, so an edge weight
//! is the number of documents in which both keywords appear. After the
//! whole corpus is counted, weak pairs are dropped and the graph is capped
//! to its best-connected nodes.

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// A keyword pair and the number of documents containing both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCount {
    /// Endpoint seen first in the document that introduced the pair.
    pub a: String,
    pub b: String,
    pub weight: usize,
}

/// Accumulates document-level co-occurrence counts for a corpus.
#[derive(Debug, Default)]
pub struct CooccurrenceCounter {
    /// Canonical (sorted) pair -> position in `pairs`
    index: FxHashMap<(String, String), usize>,
    pairs: Vec<PairCount>,
    documents: usize,
    contributing_documents: usize,
}

impl CooccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every document's noun list.
    pub fn from_documents<I, D, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut counter = Self::new();
        for doc in documents {
            counter.add_document(doc.as_ref());
        }
        counter
    }

    fn canonical(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// Add one document's nouns, returning the number of pairs it contributed.
    ///
    /// Repeated nouns are collapsed first, so a word repeated within a
    /// document never inflates a pair's weight. Documents with fewer than
    /// two distinct nouns contribute nothing.
    pub fn add_document<S: AsRef<str>>(&mut self, nouns: &[S]) -> usize {
        self.documents += 1;
        let unique: Vec<&str> = nouns.iter().map(|n| n.as_ref()).unique().collect();
        if unique.len() < 2 {
            return 0;
        }
        self.contributing_documents += 1;

        let mut added = 0;
        for (a, b) in unique.into_iter().tuple_combinations() {
            let key = Self::canonical(a, b);
            match self.index.get(&key) {
                Some(&pos) => self.pairs[pos].weight += 1,
                None => {
                    self.index.insert(key, self.pairs.len());
                    self.pairs.push(PairCount {
                        a: a.to_string(),
                        b: b.to_string(),
                        weight: 1,
                    });
                }
            }
            added += 1;
        }
        added
    }

    /// Number of documents sharing both keywords, in either order.
    pub fn weight(&self, a: &str, b: &str) -> usize {
        self.index
            .get(&Self::canonical(a, b))
            .map(|&pos| self.pairs[pos].weight)
            .unwrap_or(0)
    }

    /// Pairs in the order they were first seen.
    pub fn pairs(&self) -> &[PairCount] {
        &self.pairs
    }

    /// Documents processed so far.
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Documents that yielded at least one pair.
    pub fn contributing_documents(&self) -> usize {
        self.contributing_documents
    }
}

/// A weighted undirected keyword graph.
///
/// Nodes keep insertion order, which is also the tie-break order for every
/// ranking computed over the graph.
#[derive(Debug, Clone, Default)]
pub struct KeywordGraph {
    labels: Vec<String>,
    ids: FxHashMap<String, u32>,
    /// Adjacency list: (neighbor ID, index into `edges`), in insertion order
    adjacency: Vec<Vec<(u32, usize)>>,
    edges: Vec<(u32, u32, usize)>,
    /// Canonical (low ID, high ID) pair -> index into `edges`
    edge_index: FxHashMap<(u32, u32), usize>,
}

impl KeywordGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a node for the given keyword, returning its ID
    pub fn get_or_create_node(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.labels.len() as u32;
        self.ids.insert(label.to_string(), id);
        self.labels.push(label.to_string());
        self.adjacency.push(Vec::new());
        id
    }

    /// Add weight to the edge between two keywords, creating it if needed.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: usize) {
        if a == b {
            return; // No self-loops
        }
        let ia = self.get_or_create_node(a);
        let ib = self.get_or_create_node(b);

        let key = (ia.min(ib), ia.max(ib));
        if let Some(&pos) = self.edge_index.get(&key) {
            self.edges[pos].2 += weight;
            return;
        }

        let pos = self.edges.len();
        self.edge_index.insert(key, pos);
        self.edges.push((ia, ib, weight));
        self.adjacency[ia as usize].push((ib, pos));
        self.adjacency[ib as usize].push((ia, pos));
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn node_id(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    pub fn label(&self, id: u32) -> &str {
        &self.labels[id as usize]
    }

    /// Node labels in insertion order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of distinct neighbors.
    pub fn degree(&self, id: u32) -> usize {
        self.adjacency[id as usize].len()
    }

    /// Sum of incident edge weights.
    pub fn weighted_degree(&self, id: u32) -> usize {
        self.adjacency[id as usize].iter().map(|&(_, pos)| self.edges[pos].2).sum()
    }

    pub fn neighbors(&self, id: u32) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.adjacency[id as usize]
            .iter()
            .map(|&(neighbor, pos)| (neighbor, self.edges[pos].2))
    }

    /// Weight of the edge between two keywords, if present.
    pub fn weight(&self, a: &str, b: &str) -> Option<usize> {
        let ia = self.node_id(a)?;
        let ib = self.node_id(b)?;
        let pos = self.edge_index.get(&(ia.min(ib), ia.max(ib)))?;
        Some(self.edges[*pos].2)
    }

    /// Edges as (source, target, weight) in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, usize)> + '_ {
        self.edges
            .iter()
            .map(|&(a, b, w)| (self.label(a), self.label(b), w))
    }

    /// The subgraph induced by `keep`, without nodes left isolated.
    ///
    /// Surviving nodes keep their relative order; edges with an endpoint
    /// outside `keep` are dropped.
    pub fn induced_subgraph(&self, keep: &[u32]) -> KeywordGraph {
        let mut kept = vec![false; self.node_count()];
        for &id in keep {
            kept[id as usize] = true;
        }
        let surviving_edges: Vec<&(u32, u32, usize)> = self
            .edges
            .iter()
            .filter(|(a, b, _)| kept[*a as usize] && kept[*b as usize])
            .collect();

        let mut connected = vec![false; self.node_count()];
        for (a, b, _) in &surviving_edges {
            connected[*a as usize] = true;
            connected[*b as usize] = true;
        }

        let mut sub = KeywordGraph::new();
        for (id, label) in self.labels.iter().enumerate() {
            if connected[id] {
                sub.get_or_create_node(label);
            }
        }
        for &&(a, b, w) in &surviving_edges {
            sub.add_edge(self.label(a), self.label(b), w);
        }
        sub
    }

    /// Keep only the `cap` highest-degree nodes when the graph is larger.
    ///
    /// Ties in degree keep insertion order.
    pub fn cap_nodes(self, cap: usize) -> KeywordGraph {
        if self.node_count() <= cap {
            return self;
        }
        let mut ranked: Vec<u32> = (0..self.node_count() as u32).collect();
        ranked.sort_by(|&a, &b| self.degree(b).cmp(&self.degree(a)));
        ranked.truncate(cap);
        let capped = self.induced_subgraph(&ranked);
        debug!(
            before = self.node_count(),
            after = capped.node_count(),
            cap,
            "Capped keyword graph to top-degree nodes"
        );
        capped
    }

    /// Serializable view for reports and renderers.
    pub fn snapshot(&self) -> NetworkSnapshot {
        let nodes = (0..self.node_count() as u32)
            .map(|id| NodeView {
                keyword: self.label(id).to_string(),
                degree: self.degree(id),
                weighted_degree: self.weighted_degree(id),
            })
            .collect();
        let edges = self
            .edges()
            .map(|(source, target, weight)| EdgeView {
                source: source.to_string(),
                target: target.to_string(),
                weight,
            })
            .collect();
        NetworkSnapshot { nodes, edges }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub keyword: String,
    pub degree: usize,
    pub weighted_degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

/// Result of network construction.
#[derive(Debug, Clone)]
pub enum NetworkOutcome {
    Built(KeywordGraph),
    /// No pair reached the weight threshold; lowering it may help.
    NoQualifyingNetwork {
        min_weight: usize,
        /// Strongest pair weight actually observed.
        max_observed_weight: usize,
    },
}

/// Build the pruned co-occurrence graph.
///
/// Pairs with weight below `min_weight` are dropped; if more than
/// `node_cap` keywords remain, only the highest-degree ones are kept.
///
/// # Arguments
///
/// * `counter` - Pair weights accumulated over the corpus
/// * `min_weight` - Smallest pair weight that becomes an edge
/// * `node_cap` - Maximum number of keywords in the returned graph
///
/// # Returns
///
/// [`NetworkOutcome::Built`] with the pruned graph, or
/// [`NetworkOutcome::NoQualifyingNetwork`] carrying the strongest observed
/// weight when no pair reaches `min_weight`.
///
/// # Examples
///
/// ```
/// use fandom_lens::graph::{build_network, CooccurrenceCounter, NetworkOutcome};
///
/// let docs = [vec!["케이팝", "노래"], vec!["케이팝", "노래", "한국"]];
/// let counter = CooccurrenceCounter::from_documents::<_, _, &str>(&docs);
///
/// match build_network(&counter, 2, 50) {
///     NetworkOutcome::Built(graph) => assert_eq!(graph.weight("노래", "케이팝"), Some(2)),
///     other => panic!("expected a graph, got {other:?}"),
/// }
/// assert!(matches!(
///     build_network(&counter, 3, 50),
///     NetworkOutcome::NoQualifyingNetwork { max_observed_weight: 2, .. }
/// ));
/// ```
#[instrument(level = "info", skip(counter), fields(pairs = counter.pairs().len()))]
pub fn build_network(counter: &CooccurrenceCounter, min_weight: usize, node_cap: usize) -> NetworkOutcome {
    let mut graph = KeywordGraph::new();
    for pair in counter.pairs().iter().filter(|p| p.weight >= min_weight) {
        graph.add_edge(&pair.a, &pair.b, pair.weight);
    }

    if graph.is_empty() {
        let max_observed_weight = counter.pairs().iter().map(|p| p.weight).max().unwrap_or(0);
        info!(min_weight, max_observed_weight, "No keyword pair meets the weight threshold");
        return NetworkOutcome::NoQualifyingNetwork {
            min_weight,
            max_observed_weight,
        };
    }

    let graph = graph.cap_nodes(node_cap);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        min_weight,
        node_cap,
        "Built keyword network"
    );
    NetworkOutcome::Built(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&[&str]]) -> CooccurrenceCounter {
        CooccurrenceCounter::from_documents::<_, _, &str>(raw.iter().map(|d| d.to_vec()))
    }

    #[test]
    fn test_pair_counts_scenario() {
        let counter = docs(&[&["A", "B"], &["A", "B", "C"], &["B", "C"]]);
        assert_eq!(counter.weight("A", "B"), 2);
        assert_eq!(counter.weight("B", "A"), 2);
        assert_eq!(counter.weight("A", "C"), 1);
        assert_eq!(counter.weight("B", "C"), 2);
        assert_eq!(counter.documents(), 3);
    }

    #[test]
    fn test_pruned_scenario() {
        let counter = docs(&[&["A", "B"], &["A", "B", "C"], &["B", "C"]]);
        let NetworkOutcome::Built(graph) = build_network(&counter, 2, 50) else {
            panic!("expected a network");
        };

        assert_eq!(graph.labels(), &["A", "B", "C"]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight("A", "B"), Some(2));
        assert_eq!(graph.weight("B", "C"), Some(2));
        assert_eq!(graph.weight("A", "C"), None);
    }

    #[test]
    fn test_small_documents_contribute_nothing() {
        let mut counter = CooccurrenceCounter::new();
        assert_eq!(counter.add_document(&["A"]), 0);
        assert_eq!(counter.add_document::<&str>(&[]), 0);
        assert_eq!(counter.add_document(&["A", "A", "A"]), 0);
        assert!(counter.pairs().is_empty());
        assert_eq!(counter.documents(), 3);
        assert_eq!(counter.contributing_documents(), 0);
    }

    #[test]
    fn test_repeated_words_count_once_per_document() {
        let counter = docs(&[&["A", "B", "A", "B"], &["B", "A"]]);
        assert_eq!(counter.weight("A", "B"), 2);
        assert_eq!(counter.pairs().len(), 1);
    }

    #[test]
    fn test_weight_never_exceeds_corpus_size() {
        let corpus: Vec<Vec<&str>> = (0..7)
            .map(|i| if i % 2 == 0 { vec!["A", "B", "C", "A"] } else { vec!["B", "C"] })
            .collect();
        let counter = CooccurrenceCounter::from_documents::<_, _, &str>(&corpus);
        for pair in counter.pairs() {
            let expected = corpus
                .iter()
                .filter(|d| d.contains(&pair.a.as_str()) && d.contains(&pair.b.as_str()))
                .count();
            assert_eq!(pair.weight, expected);
            assert!(pair.weight <= counter.documents());
        }
    }

    #[test]
    fn test_no_qualifying_network() {
        let counter = docs(&[&["A", "B"], &["C", "D"]]);
        match build_network(&counter, 3, 50) {
            NetworkOutcome::NoQualifyingNetwork {
                min_weight,
                max_observed_weight,
            } => {
                assert_eq!(min_weight, 3);
                assert_eq!(max_observed_weight, 1);
            }
            NetworkOutcome::Built(_) => panic!("no pair reaches weight 3"),
        }
    }

    #[test]
    fn test_pruned_edges_meet_threshold_without_isolated_nodes() {
        let counter = docs(&[
            &["A", "B", "C", "D"],
            &["A", "B", "C"],
            &["A", "B"],
            &["C", "D", "E"],
            &["D", "E"],
        ]);
        let NetworkOutcome::Built(graph) = build_network(&counter, 2, 50) else {
            panic!("expected a network");
        };
        for (_, _, w) in graph.edges() {
            assert!(w >= 2);
        }
        for id in 0..graph.node_count() as u32 {
            assert!(graph.degree(id) > 0);
        }
    }

    #[test]
    fn test_node_cap_keeps_highest_degree_and_induced_edges() {
        // Hub connects to everyone; the leaves pair up among themselves.
        let counter = docs(&[
            &["hub", "l1"],
            &["hub", "l2"],
            &["hub", "l3"],
            &["hub", "l4"],
            &["l1", "l2"],
            &["l1", "l3"],
        ]);
        let NetworkOutcome::Built(graph) = build_network(&counter, 1, 3) else {
            panic!("expected a network");
        };
        // Degrees: hub 4, l1 3, l2 2, l3 2, l4 1 -> keep hub, l1, l2
        assert_eq!(graph.labels(), &["hub", "l1", "l2"]);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.weight("hub", "l3").is_none());
        for (a, b, _) in graph.edges() {
            assert!(graph.node_id(a).is_some() && graph.node_id(b).is_some());
        }
    }

    #[test]
    fn test_cap_drops_nodes_left_isolated() {
        let mut graph = KeywordGraph::new();
        graph.add_edge("A", "B", 1);
        graph.add_edge("A", "C", 1);
        graph.add_edge("B", "C", 1);
        graph.add_edge("D", "E", 1);
        // Keep A, B and D: D loses its only neighbor.
        let sub = graph.induced_subgraph(&[0, 1, 3]);
        assert_eq!(sub.labels(), &["A", "B"]);
        assert_eq!(sub.edge_count(), 1);
    }

    #[test]
    fn test_add_edge_merges_and_ignores_self_loops() {
        let mut graph = KeywordGraph::new();
        graph.add_edge("A", "B", 2);
        graph.add_edge("B", "A", 3);
        graph.add_edge("A", "A", 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.weight("A", "B"), Some(5));
        assert_eq!(graph.weight("B", "A"), Some(5));
        assert_eq!(graph.weighted_degree(0), 5);
    }

    #[test]
    fn test_snapshot() {
        let mut graph = KeywordGraph::new();
        graph.add_edge("노래", "한국", 4);
        let snapshot = graph.snapshot();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].keyword, "노래");
        assert_eq!(snapshot.nodes[0].weighted_degree, 4);
        assert_eq!(snapshot.edges[0].weight, 4);
    }

    #[test]
    fn test_large_corpus_builds_every_pair() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use std::time::{Duration, Instant};

        let mut rng = StdRng::seed_from_u64(7);
        let vocabulary: Vec<String> = (0..400).map(|i| format!("단어{i}")).collect();
        let corpus: Vec<Vec<&str>> = (0..600)
            .map(|_| {
                (0..20)
                    .map(|_| vocabulary[rng.random_range(0..vocabulary.len())].as_str())
                    .collect()
            })
            .collect();
        let counter = CooccurrenceCounter::from_documents::<_, _, &str>(&corpus);
        assert!(counter.pairs().len() > 30_000);

        let t0 = Instant::now();
        let NetworkOutcome::Built(graph) = build_network(&counter, 1, usize::MAX) else {
            panic!("expected a network");
        };
        let capped = build_network(&counter, 1, 50);
        assert!(t0.elapsed() < Duration::from_secs(10));

        assert_eq!(graph.edge_count(), counter.pairs().len());
        for pair in counter.pairs() {
            assert_eq!(graph.weight(&pair.a, &pair.b), Some(pair.weight));
        }
        let NetworkOutcome::Built(capped) = capped else {
            panic!("expected a capped network");
        };
        assert!(capped.node_count() <= 50);
    }
}
