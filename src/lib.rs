//! Best overlap graph construction and path-seed ordering for long-read assembly.
//!
//! `BestOverlapGraph` reduces an all-pairs overlap relation to at most one best edge per
//! read end, filtering on error rate, containment, coverage gaps, lopsided ends and spurs.
//! `PathSeedOrder` ranks reads by the length of the best-edge path through them.

pub mod best_edge;
pub mod best_overlap_graph;
pub mod cli;
pub mod configs;
pub mod coverage_gap;
pub mod error_rate;
pub mod errors;
pub mod graph_report;
pub mod lopsided;
pub mod overlap_store;
pub mod overlaps;
pub mod path_seed;
pub mod spur_removal;
pub mod utils;

pub use best_edge::{BestEdgeOverlap, ReadEnd, ReadFlag, ReadNode};
pub use best_overlap_graph::{BestOverlapGraph, FilterCounts, ReadExclusion};
pub use configs::{GraphConfig, PathSeedConfig};
pub use errors::{ConfigError, GraphError, OverlapStoreError};
pub use overlap_store::{OverlapSource, OverlapStore, ReadInfo};
pub use overlaps::Overlap;
pub use path_seed::{PathSeedEntry, PathSeedOrder};

/// The finished graph and seed order of one assembly run.
/// Built once, then handed by reference to whatever lays out contigs.
pub struct AssemblyContext {
    pub graph: BestOverlapGraph,
    pub seeds: PathSeedOrder,
}

impl AssemblyContext {
    pub fn build<R, S>(
        reads: &R,
        overlaps: &S,
        graph_config: &GraphConfig,
        seed_config: &PathSeedConfig,
    ) -> Result<Self, GraphError>
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        let graph = BestOverlapGraph::new(reads, overlaps, graph_config, None)?;
        let seeds = PathSeedOrder::new(&graph, reads, seed_config)?;
        Ok(Self { graph, seeds })
    }

    /// A second context whose graph ignores the reads this one placed as orphans or bubbles.
    pub fn without_orphans_and_bubbles<R, S>(
        &self,
        reads: &R,
        overlaps: &S,
        graph_config: &GraphConfig,
        seed_config: &PathSeedConfig,
    ) -> Result<Self, GraphError>
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        let exclude = self.graph.orphan_or_bubble_exclusion();
        let graph = BestOverlapGraph::new(reads, overlaps, graph_config, Some(&exclude))?;
        let seeds = PathSeedOrder::new(&graph, reads, seed_config)?;
        Ok(Self { graph, seeds })
    }
}
