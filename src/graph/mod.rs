//! Keyword co-occurrence network and its centrality measures.

pub mod builder;
pub mod centrality;

pub use builder::{
    build_network, CooccurrenceCounter, EdgeView, KeywordGraph, NetworkOutcome, NetworkSnapshot, NodeView, PairCount,
};
pub use centrality::{betweenness_centrality, compute_centrality, degree_centrality, Centrality, CentralityRecord};
