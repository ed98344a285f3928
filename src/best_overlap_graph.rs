use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info};
use rayon::prelude::*;

use crate::best_edge::{
    BestEdgeOverlap, ReadEnd, ReadFlag, ReadNode, EVALUE_BITS, MAX_EVALUE, MAX_READLEN, MAX_READ_ID, READID_BITS,
};
use crate::configs::GraphConfig;
use crate::error_rate::{ErrorRateStats, EvalueHistogram};
use crate::errors::GraphError;
use crate::graph_report;
use crate::overlap_store::{OverlapSource, ReadInfo};
use crate::overlaps::{encode_evalue, Overlap};
use crate::utils::atomic_max_u64;

/// Reads a previous graph wants kept out of this one.
pub type ReadExclusion<'a> = dyn Fn(u32) -> bool + Sync + 'a;

/// What each filter did, for the summary and the stats report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub ignored: u32,
    pub contained: u32,
    pub coverage_gap: u32,
    pub lopsided_ends: u32,
    pub spur_reads: u32,
    pub spur_edges_restored: u32,
    pub dovetails_removed: u32,
}

/// The best overlap graph: for every read end, the single best dovetail overlap off that end.
/// Built once by `new`, then read by layout code. Only placement flags change afterwards.
pub struct BestOverlapGraph {
    pub(crate) reads: Vec<ReadNode>,
    pub(crate) error_stats: ErrorRateStats,
    pub(crate) erate_graph: f64,
    pub(crate) deviation_graph: f64,
    pub(crate) error_limit: f64,
    pub(crate) min_olap_fraction: f64,
    pub(crate) counts: FilterCounts,
}

/// Score of an overlap as a best-edge candidate. Higher wins:
/// longer overlap, then lower error, then lower target id.
pub(crate) fn edge_score(olap: &Overlap, olap_len: u32) -> u64 {
    let len = olap_len.min(MAX_READLEN) as u64;
    let rate = (MAX_EVALUE - olap.evalue.min(MAX_EVALUE)) as u64;
    let id = (MAX_READ_ID - olap.b_iid.min(MAX_READ_ID)) as u64;

    (len << (EVALUE_BITS + READID_BITS)) | (rate << READID_BITS) | id
}

/// Overlap length of a stored best edge, seen from its source read.
pub(crate) fn edge_overlap_length<R: ReadInfo + ?Sized>(reads: &R, source: u32, edge: &BestEdgeOverlap) -> u32 {
    let olap = Overlap {
        a_iid: source,
        b_iid: edge.read_id(),
        flipped: false,
        a_hang: edge.ahang(),
        b_hang: edge.bhang(),
        evalue: edge.evalue(),
    };
    olap.overlap_length(reads.read_length(source), reads.read_length(edge.read_id()))
}

fn score_slot<'a>(best5: &'a [AtomicU64], best3: &'a [AtomicU64], olap: &Overlap) -> &'a AtomicU64 {
    if olap.a_end_is_3prime() {
        &best3[olap.a_iid as usize]
    } else {
        &best5[olap.a_iid as usize]
    }
}

impl BestOverlapGraph {
    /// Build the graph from an overlap source.
    ///
    /// Stages, in order: ignored reads from `exclude`, the error limit, containment,
    /// best edges, coverage gaps, lopsided ends, spurs, cleanup, invariant check and
    /// the optional reports under `config.prefix`.
    pub fn new<R, S>(
        reads: &R,
        overlaps: &S,
        config: &GraphConfig,
        exclude: Option<&ReadExclusion<'_>>,
    ) -> Result<Self, GraphError>
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        config.validate()?;

        let num_reads = reads.num_reads();
        info!("=== BEST OVERLAP GRAPH ({}) ===", config.label);
        info!("Reads: {}", num_reads);

        let mut graph = Self {
            reads: vec![ReadNode::default(); num_reads as usize + 1],
            error_stats: ErrorRateStats::default(),
            erate_graph: config.erate_graph,
            deviation_graph: config.deviation_graph,
            error_limit: config.erate_graph,
            min_olap_fraction: config.min_olap_fraction,
            counts: FilterCounts::default(),
        };

        if let Some(exclude) = exclude {
            graph.flag_ignored(exclude);
        }

        if config.filter_high_error {
            graph.find_error_rate_threshold(reads, overlaps);
        }

        graph.find_contains(reads, overlaps);
        graph.find_edges(reads, overlaps, true);

        if config.filter_coverage_gap {
            graph.remove_reads_with_coverage_gap(reads, overlaps, config.cov_gap_olap);
        }

        if config.filter_lopsided {
            graph.remove_lopsided_edges(reads, config.lopsided_diff);
        }

        if config.filter_spur {
            graph.remove_spanned_spurs(reads, overlaps, config.spur_depth);
        }

        graph.remove_contained_dovetails();
        graph.check_invariants();

        let c = graph.counts;
        info!("Ignored reads: {}", c.ignored);
        info!("Contained reads: {}", c.contained);
        info!("Coverage gap reads: {}", c.coverage_gap);
        info!("Lopsided read ends: {}", c.lopsided_ends);
        info!("Spur reads: {} ({} edges kept for lack of an alternative)", c.spur_reads, c.spur_edges_restored);
        info!("Best edges removed during cleanup: {}", c.dovetails_removed);
        info!("Read ends with a best edge: {}", graph.num_edges());

        if let Some(prefix) = &config.prefix {
            graph_report::write_reports(&graph, reads, overlaps, prefix, config)?;
        }

        info!("=== BEST OVERLAP GRAPH FINISHED ===");
        Ok(graph)
    }

    fn num_reads(&self) -> u32 {
        (self.reads.len() - 1) as u32
    }

    fn flag_ignored(&mut self, exclude: &ReadExclusion<'_>) {
        let ignored: Vec<u32> = (1..self.num_reads() + 1).into_par_iter().filter(|&id| exclude(id)).collect();
        for &id in &ignored {
            self.reads[id as usize].set_flag(ReadFlag::Ignored, true);
        }
        self.counts.ignored = ignored.len() as u32;
    }

    /// Derive the error limit from the dovetail error distribution, capped by erate_graph.
    fn find_error_rate_threshold<R, S>(&mut self, reads: &R, overlaps: &S)
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        let ceiling = encode_evalue(self.erate_graph);

        let histogram = (1..self.num_reads() + 1)
            .into_par_iter()
            .fold(EvalueHistogram::new, |mut h, id| {
                for olap in overlaps.overlaps(id) {
                    if olap.is_dovetail() && olap.a_iid != olap.b_iid && reads.is_valid(olap.b_iid) && olap.evalue <= ceiling {
                        h.add(olap.evalue);
                    }
                }
                h
            })
            .reduce(EvalueHistogram::new, EvalueHistogram::merge);

        self.error_stats = histogram.stats();
        self.error_limit = self.error_stats.error_limit(self.deviation_graph, self.erate_graph);

        let s = &self.error_stats;
        info!("Error rates of {} dovetail overlaps:", s.count);
        info!("  mean {:.4} stddev {:.4}", s.mean, s.stddev);
        info!("  median {:.4} mad {:.4}", s.median, s.mad);
        info!(
            "Error limit: {:.4} ({:.2}%), graph maximum {:.4}",
            self.error_limit,
            100.0 * self.error_limit,
            self.erate_graph
        );
    }

    /// Flag every read some good overlap shows to be contained.
    fn find_contains<R, S>(&mut self, reads: &R, overlaps: &S)
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        let this = &*self;
        let contained: Vec<u32> = (1..this.num_reads() + 1)
            .into_par_iter()
            .flat_map_iter(|id| {
                overlaps
                    .overlaps(id)
                    .iter()
                    .filter(|o| !this.is_overlap_bad_quality(reads, o))
                    .filter(|o| !this.is_ignored(o.a_iid) && !this.is_ignored(o.b_iid))
                    .filter_map(|o| o.contained_read())
                    .collect::<Vec<_>>()
            })
            .collect();

        for id in contained {
            self.reads[id as usize].set_flag(ReadFlag::Contained, true);
        }
        self.counts.contained = self.count(ReadFlag::Contained);
    }

    /// True if the overlap may not be used: an invalid read, a read against itself,
    /// too much error or too short.
    pub fn is_overlap_bad_quality<R: ReadInfo + ?Sized>(&self, reads: &R, olap: &Overlap) -> bool {
        if !reads.is_valid(olap.a_iid) || !reads.is_valid(olap.b_iid) || olap.a_iid == olap.b_iid {
            return true;
        }
        if olap.erate() > self.error_limit {
            return true;
        }

        let a_len = reads.read_length(olap.a_iid);
        let b_len = reads.read_length(olap.b_iid);
        let min_len = self.min_olap_fraction * a_len.min(b_len) as f64;
        (olap.overlap_length(a_len, b_len) as f64) < min_len
    }

    /// Score of `olap` as the best edge off its A end, or None if it is not eligible.
    fn candidate_score<R: ReadInfo + ?Sized>(&self, reads: &R, olap: &Overlap, avoid_spurs: bool) -> Option<u64> {
        if !olap.is_dovetail() || self.is_overlap_bad_quality(reads, olap) {
            return None;
        }

        let a = &self.reads[olap.a_iid as usize];
        let b = &self.reads[olap.b_iid as usize];

        if a.has(ReadFlag::Contained) || a.has(ReadFlag::Ignored) {
            return None;
        }
        if b.has(ReadFlag::Contained) || b.has(ReadFlag::Ignored) || b.has(ReadFlag::CoverageGap) {
            return None;
        }
        if avoid_spurs && b.has(ReadFlag::Spur) {
            return None;
        }

        let a3p = olap.a_end_is_3prime();
        let lopsided = if a3p { ReadFlag::Lopsided3 } else { ReadFlag::Lopsided5 };
        if a.has(lopsided) || a.best_edge(a3p).exists() {
            return None;
        }

        let len = olap.overlap_length(reads.read_length(olap.a_iid), reads.read_length(olap.b_iid));
        Some(edge_score(olap, len))
    }

    /// Select best edges. With `redo_all` every edge is recomputed, otherwise only empty ends are filled.
    pub(crate) fn find_edges<R, S>(&mut self, reads: &R, overlaps: &S, redo_all: bool)
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        self.select_edges(reads, overlaps, redo_all, false);
    }

    /// Two passes over all reads. The first raises the per-end score slots to the best
    /// candidate score, the second emits the candidates matching their slot. Winners are
    /// applied serially in read order, so the result does not depend on thread scheduling.
    ///
    /// Each listed overlap is offered from both of its reads, so a pair stored under only
    /// one read still gets an edge on each side.
    pub(crate) fn select_edges<R, S>(&mut self, reads: &R, overlaps: &S, redo_all: bool, avoid_spurs: bool)
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        if redo_all {
            for node in self.reads.iter_mut() {
                node.best_edge_mut(false).clear();
                node.best_edge_mut(true).clear();
            }
        }

        let slots = self.reads.len();
        let best5: Vec<AtomicU64> = (0..slots).map(|_| AtomicU64::new(0)).collect();
        let best3: Vec<AtomicU64> = (0..slots).map(|_| AtomicU64::new(0)).collect();

        let this = &*self;
        let num_reads = this.num_reads();

        (1..num_reads + 1).into_par_iter().for_each(|id| {
            for olap in overlaps.overlaps(id) {
                for o in [*olap, olap.swapped()] {
                    if let Some(score) = this.candidate_score(reads, &o, avoid_spurs) {
                        atomic_max_u64(score_slot(&best5, &best3, &o), score);
                    }
                }
            }
        });

        let winners: Vec<(ReadEnd, BestEdgeOverlap)> = (1..num_reads + 1)
            .into_par_iter()
            .flat_map_iter(|id| {
                overlaps
                    .overlaps(id)
                    .iter()
                    .flat_map(|olap| [*olap, olap.swapped()])
                    .filter(|o| {
                        this.candidate_score(reads, o, avoid_spurs)
                            .is_some_and(|s| score_slot(&best5, &best3, o).load(Ordering::Relaxed) == s)
                    })
                    .map(|o| (ReadEnd::new(o.a_iid, o.a_end_is_3prime()), BestEdgeOverlap::from_overlap(&o)))
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut assigned = 0;
        for (end, edge) in winners {
            let slot = self.reads[end.read_id() as usize].best_edge_mut(end.read3p());
            if !slot.exists() {
                *slot = edge;
                assigned += 1;
            }
        }
        debug!("Assigned {} best edges (redo_all={}, avoid_spurs={})", assigned, redo_all, avoid_spurs);
    }

    /// Drop best edges that touch contained or ignored reads, or point into coverage-gap reads.
    fn remove_contained_dovetails(&mut self) {
        let doomed: Vec<ReadEnd> = (1..self.reads.len() as u32)
            .flat_map(|id| [ReadEnd::new(id, false), ReadEnd::new(id, true)])
            .filter(|&end| {
                let node = &self.reads[end.read_id() as usize];
                let edge = node.best_edge(end.read3p());
                if !edge.exists() {
                    return false;
                }
                if node.has(ReadFlag::Contained) || node.has(ReadFlag::Ignored) {
                    return true;
                }
                let target = &self.reads[edge.read_id() as usize];
                target.has(ReadFlag::Contained) || target.has(ReadFlag::Ignored) || target.has(ReadFlag::CoverageGap)
            })
            .collect();

        for end in &doomed {
            self.reads[end.read_id() as usize].best_edge_mut(end.read3p()).clear();
        }
        self.counts.dovetails_removed = doomed.len() as u32;
    }

    /// Abort if a contained read has a best edge, or a best edge points into a coverage-gap read.
    pub fn check_invariants(&self) {
        for (id, node) in self.reads.iter().enumerate().skip(1) {
            for read3p in [false, true] {
                let edge = node.best_edge(read3p);
                if !edge.exists() {
                    continue;
                }
                let source = ReadEnd::new(id as u32, read3p);
                assert!(!node.has(ReadFlag::Contained), "contained read end {:?} has best edge {:?}", source, edge);
                assert!(
                    !self.reads[edge.read_id() as usize].has(ReadFlag::CoverageGap),
                    "best edge {:?} -> {:?} points into a coverage-gap read",
                    source,
                    edge
                );
            }
        }
    }

    // Accessors

    pub fn node(&self, read_id: u32) -> &ReadNode {
        &self.reads[read_id as usize]
    }

    pub fn best_edge(&self, read_id: u32, read3p: bool) -> &BestEdgeOverlap {
        self.reads[read_id as usize].best_edge(read3p)
    }

    pub fn best_edge_at(&self, end: ReadEnd) -> &BestEdgeOverlap {
        self.best_edge(end.read_id(), end.read3p())
    }

    pub fn best_edge_exists(&self, read_id: u32, read3p: bool) -> bool {
        self.best_edge(read_id, read3p).exists()
    }

    /// Target end of the best edge off `end`. Panics on an edge into a coverage-gap read.
    pub fn follow(&self, end: ReadEnd) -> Option<ReadEnd> {
        let edge = self.best_edge_at(end);
        if !edge.exists() {
            return None;
        }
        assert!(
            !self.is_coverage_gap(edge.read_id()),
            "best edge {:?} -> {:?} points into a coverage-gap read",
            end,
            edge.read_end()
        );
        Some(edge.read_end())
    }

    pub fn has_flag(&self, read_id: u32, flag: ReadFlag) -> bool {
        self.reads[read_id as usize].has(flag)
    }

    pub fn is_contained(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Contained)
    }

    pub fn is_ignored(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Ignored)
    }

    pub fn is_coverage_gap(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::CoverageGap)
    }

    /// Either end is lopsided.
    pub fn is_lopsided(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Lopsided5) || self.has_flag(read_id, ReadFlag::Lopsided3)
    }

    pub fn is_lopsided_both(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Lopsided5) && self.has_flag(read_id, ReadFlag::Lopsided3)
    }

    pub fn is_spur(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Spur)
    }

    pub fn is_backbone(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Backbone)
    }

    pub fn is_bubble(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Bubble)
    }

    pub fn is_orphan(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Orphan)
    }

    pub fn is_delinquent(&self, read_id: u32) -> bool {
        self.has_flag(read_id, ReadFlag::Delinquent)
    }

    // Placement flags, set by layout code after construction.

    pub fn set_backbone(&mut self, read_id: u32, value: bool) {
        self.reads[read_id as usize].set_flag(ReadFlag::Backbone, value);
    }

    pub fn set_bubble(&mut self, read_id: u32, value: bool) {
        self.reads[read_id as usize].set_flag(ReadFlag::Bubble, value);
    }

    pub fn set_orphan(&mut self, read_id: u32, value: bool) {
        self.reads[read_id as usize].set_flag(ReadFlag::Orphan, value);
    }

    pub fn set_delinquent(&mut self, read_id: u32, value: bool) {
        self.reads[read_id as usize].set_flag(ReadFlag::Delinquent, value);
    }

    /// Number of reads carrying `flag`.
    pub fn count(&self, flag: ReadFlag) -> u32 {
        self.reads.iter().skip(1).filter(|n| n.has(flag)).count() as u32
    }

    pub fn num_contained(&self) -> u32 {
        self.count(ReadFlag::Contained)
    }

    pub fn num_ignored(&self) -> u32 {
        self.count(ReadFlag::Ignored)
    }

    pub fn num_coverage_gap(&self) -> u32 {
        self.count(ReadFlag::CoverageGap)
    }

    pub fn num_lopsided(&self) -> u32 {
        (1..self.num_reads() + 1).filter(|&id| self.is_lopsided(id)).count() as u32
    }

    pub fn num_lopsided_both(&self) -> u32 {
        (1..self.num_reads() + 1).filter(|&id| self.is_lopsided_both(id)).count() as u32
    }

    pub fn num_spur(&self) -> u32 {
        self.count(ReadFlag::Spur)
    }

    pub fn num_backbone(&self) -> u32 {
        self.count(ReadFlag::Backbone)
    }

    pub fn num_bubble(&self) -> u32 {
        self.count(ReadFlag::Bubble)
    }

    pub fn num_orphan(&self) -> u32 {
        self.count(ReadFlag::Orphan)
    }

    pub fn num_delinquent(&self) -> u32 {
        self.count(ReadFlag::Delinquent)
    }

    /// Read ends with a best edge.
    pub fn num_edges(&self) -> u32 {
        self.reads
            .iter()
            .skip(1)
            .map(|n| n.best_edge(false).exists() as u32 + n.best_edge(true).exists() as u32)
            .sum()
    }

    pub fn counts(&self) -> &FilterCounts {
        &self.counts
    }

    pub fn error_limit(&self) -> f64 {
        self.error_limit
    }

    pub fn error_stats(&self) -> &ErrorRateStats {
        &self.error_stats
    }

    /// Exclusion for a second graph: reads this graph placed as orphans or bubbles.
    pub fn orphan_or_bubble_exclusion(&self) -> impl Fn(u32) -> bool + Sync + '_ {
        move |id| self.reads.get(id as usize).is_some_and(|n| n.has(ReadFlag::Orphan) || n.has(ReadFlag::Bubble))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::overlap_store::OverlapStore;

    pub(crate) fn store(lengths: &[u32]) -> OverlapStore {
        let mut s = OverlapStore::new();
        for (i, &len) in lengths.iter().enumerate() {
            s.add_read(&format!("r{}", i + 1), len).unwrap();
        }
        s
    }

    pub(crate) fn olap(a: u32, b: u32, a_hang: i32, b_hang: i32, evalue: u32) -> Overlap {
        Overlap { a_iid: a, b_iid: b, flipped: false, a_hang, b_hang, evalue }
    }

    /// Edge selection and containment only.
    pub(crate) fn plain_config() -> GraphConfig {
        GraphConfig {
            filter_coverage_gap: false,
            filter_high_error: false,
            filter_lopsided: false,
            filter_spur: false,
            ..GraphConfig::default()
        }
    }

    /// Reads 1..=n of length 1000, each overlapping the next by 500 bases.
    pub(crate) fn chain(n: u32) -> OverlapStore {
        let mut s = store(&vec![1000; n as usize]);
        for id in 1..n {
            s.add_overlap_both(olap(id, id + 1, 500, 500, 100));
        }
        s
    }

    #[test]
    fn contained_read_gets_no_edges() {
        let mut s = chain(10);
        // 7 and 3 are identical, the higher id is the contained one
        s.add_overlap_both(olap(7, 3, 0, 0, 10));

        let g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();

        assert!(g.is_contained(7));
        assert!(!g.is_contained(3));
        assert!(!g.best_edge_exists(7, false));
        assert!(!g.best_edge_exists(7, true));
        // neighbours of 7 no longer point at it
        assert!(!g.best_edge_exists(6, true));
        assert!(!g.best_edge_exists(8, false));
        assert_eq!(g.best_edge(3, true).read_end(), ReadEnd::new(4, false));
        assert_eq!(g.num_contained(), 1);
    }

    #[test]
    fn self_overlaps_are_ignored() {
        let mut s = store(&[1000, 1000]);
        s.add_overlap(olap(2, 2, 0, 0, 10));
        s.add_overlap(olap(1, 1, 300, 300, 10));
        s.add_overlap_both(olap(1, 2, 500, 500, 100));

        let g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();

        assert!(g.is_overlap_bad_quality(&s, &olap(1, 1, 300, 300, 10)));
        assert_eq!(g.num_contained(), 0);
        assert!(!g.best_edge_exists(1, false));
        assert_eq!(g.best_edge(1, true).read_end(), ReadEnd::new(2, false));
        assert_eq!(g.best_edge(2, false).read_end(), ReadEnd::new(1, true));
        assert_eq!(g.num_edges(), 2);
    }

    #[test]
    fn fill_mode_only_touches_empty_ends() {
        let s = chain(4);
        let mut g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();

        // an edge the overlaps would never choose, to see that filling leaves it alone
        let planted = BestEdgeOverlap::new(4, false, 500, 500, 100);
        *g.reads[1].best_edge_mut(true) = planted;
        g.reads[2].best_edge_mut(true).clear();
        let before = g.reads.clone();

        g.find_edges(&s, &s, false);

        let refilled = g.best_edge(2, true);
        assert_eq!(refilled.read_end(), ReadEnd::new(3, false));
        assert_eq!((refilled.ahang(), refilled.bhang()), (500, 500));
        assert_eq!(*g.best_edge(1, true), planted);
        for id in [1, 3, 4] {
            assert_eq!(g.reads[id], before[id], "read {}", id);
        }
        assert_eq!(g.reads[2].best_edge(false), before[2].best_edge(false));
        assert_eq!(g.num_edges(), 6);

        // recomputing everything replaces the planted edge
        g.find_edges(&s, &s, true);
        assert_eq!(g.best_edge(1, true).read_end(), ReadEnd::new(2, false));
    }

    #[test]
    fn pair_listed_once_gets_edges_on_both_reads() {
        let mut s = store(&[1000, 900]);
        s.add_overlap(olap(1, 2, 300, 200, 50));

        let g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();

        let forward = g.best_edge(1, true);
        assert_eq!(forward.read_end(), ReadEnd::new(2, false));
        assert_eq!((forward.ahang(), forward.bhang()), (300, 200));

        let back = g.best_edge(2, false);
        assert_eq!(back.read_end(), ReadEnd::new(1, true));
        assert_eq!((back.ahang(), back.bhang()), (-300, -200));
        assert_eq!(*back, forward.reversed(ReadEnd::new(1, true)));

        assert!(!g.best_edge_exists(1, false));
        assert!(!g.best_edge_exists(2, true));
    }

    #[test]
    fn ties_go_to_the_lower_target_id() {
        let mut s = store(&[1000, 1000, 1000]);
        s.add_overlap(olap(1, 3, 400, 400, 100));
        s.add_overlap(olap(1, 2, 400, 400, 100));

        let g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();
        assert_eq!(g.best_edge(1, true).read_id(), 2);
    }

    #[test]
    fn longer_then_lower_error_wins() {
        let mut s = store(&[1000, 1000, 1000, 1000]);
        s.add_overlap(olap(1, 2, 500, 500, 10));
        s.add_overlap(olap(1, 3, 400, 400, 300));
        s.add_overlap(olap(1, 4, 400, 400, 200));

        let g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();
        // 3 and 4 have the longest overlap, 4 has less error
        assert_eq!(g.best_edge(1, true).read_id(), 4);
    }

    #[test]
    fn high_error_overlaps_are_filtered_by_the_derived_limit() {
        let mut s = store(&[1000; 6]);
        for (a, e) in [(1, 100), (2, 110), (3, 90), (4, 100), (5, 700)] {
            s.add_overlap_both(olap(a, a + 1, 500, 500, e));
        }
        let config = GraphConfig { filter_high_error: true, ..plain_config() };

        let g = BestOverlapGraph::new(&s, &s, &config, None).unwrap();

        assert!(g.error_limit() > 0.0100 && g.error_limit() < 0.0200, "limit {}", g.error_limit());
        assert!(g.is_overlap_bad_quality(&s, &olap(5, 6, 500, 500, 700)));
        assert!(!g.best_edge_exists(5, true));
        assert_eq!(g.best_edge(4, true).read_id(), 5);
    }

    #[test]
    fn short_overlaps_fail_the_minimum_fraction() {
        let mut s = store(&[1000, 1000, 1000]);
        s.add_overlap(olap(1, 2, 900, 900, 10));
        s.add_overlap(olap(2, 3, 500, 500, 10));
        let config = GraphConfig { min_olap_fraction: 0.2, ..plain_config() };

        let g = BestOverlapGraph::new(&s, &s, &config, None).unwrap();
        assert!(!g.best_edge_exists(1, true));
        assert!(g.best_edge_exists(2, true));
    }

    #[test]
    fn excluded_reads_are_ignored() {
        let s = chain(4);
        let exclude = |id: u32| id == 2;

        let g = BestOverlapGraph::new(&s, &s, &plain_config(), Some(&exclude)).unwrap();
        assert!(g.is_ignored(2));
        assert_eq!(g.num_ignored(), 1);
        assert!(!g.best_edge_exists(2, false));
        assert!(!g.best_edge_exists(2, true));
        assert!(!g.best_edge_exists(1, true));
        assert!(g.best_edge_exists(3, true));
    }

    #[test]
    fn second_graph_excludes_orphans_and_bubbles_of_the_first() {
        let s = chain(5);
        let mut first = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();
        first.set_bubble(3, true);
        first.set_orphan(5, true);

        let exclude = first.orphan_or_bubble_exclusion();
        let second = BestOverlapGraph::new(&s, &s, &plain_config().for_label("second"), Some(&exclude)).unwrap();

        assert_eq!(second.num_ignored(), 2);
        assert!(second.is_ignored(3) && second.is_ignored(5));
        assert!(!second.best_edge_exists(2, true));
    }

    #[test]
    fn counters_and_placement_flags() {
        let s = chain(3);
        let mut g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();
        g.set_backbone(1, true);
        g.set_backbone(1, true);
        g.set_delinquent(2, true);
        assert_eq!(g.num_backbone(), 1);
        assert_eq!(g.num_backbone(), 1);
        assert_eq!(g.num_delinquent(), 1);
        assert_eq!(g.num_edges(), 4);
        g.set_backbone(1, false);
        assert_eq!(g.num_backbone(), 0);
    }

    #[test]
    fn follow_walks_best_edges() {
        let s = chain(3);
        let g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();
        assert_eq!(g.follow(ReadEnd::new(1, true)), Some(ReadEnd::new(2, false)));
        assert_eq!(g.follow(ReadEnd::new(2, true)), Some(ReadEnd::new(3, false)));
        assert_eq!(g.follow(ReadEnd::new(3, true)), None);
    }

    #[test]
    #[should_panic(expected = "coverage-gap")]
    fn invariant_check_catches_edges_into_coverage_gap_reads() {
        let s = chain(3);
        let mut g = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();
        g.reads[2].set_flag(ReadFlag::CoverageGap, true);
        g.check_invariants();
    }

    #[test]
    fn rejects_bad_config() {
        let s = chain(2);
        let config = GraphConfig { erate_graph: 2.0, ..plain_config() };
        assert!(matches!(BestOverlapGraph::new(&s, &s, &config, None), Err(GraphError::Config(_))));
    }

    #[test]
    fn score_orders_length_then_error_then_id() {
        let long = edge_score(&olap(1, 9, 1, 1, 900), 600);
        let short = edge_score(&olap(1, 2, 1, 1, 0), 500);
        assert!(long > short);
        let clean = edge_score(&olap(1, 9, 1, 1, 10), 500);
        let noisy = edge_score(&olap(1, 2, 1, 1, 20), 500);
        assert!(clean > noisy);
        assert!(edge_score(&olap(1, 2, 1, 1, 10), 500) > edge_score(&olap(1, 3, 1, 1, 10), 500));
    }
}
