/// Spur detection for the best overlap graph.
/// A spur is a short dead-end branch: from some read attached to a long path, the best edge
/// off its other end runs out within a few reads. The read where it runs out is the spur.
/// Reads pointing into a spur are given another best edge if one exists, so the spur is spanned.

use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::best_edge::{BestEdgeOverlap, ReadEnd, ReadFlag, ReadNode};
use crate::best_overlap_graph::BestOverlapGraph;
use crate::overlap_store::{OverlapSource, ReadInfo};

impl BestOverlapGraph {
    /// Length, in reads, of the walk that starts at the source of `edge` and follows best
    /// edges until it dead-ends. The source counts, so a missing `edge` gives 1.
    /// Entering a coverage-gap read is a dead end. Returns 0 if the walk survives: it gets
    /// longer than `limit` reads, or comes back to a read end it has already left through.
    pub fn spur_distance(&self, edge: &BestEdgeOverlap, limit: u32) -> u32 {
        self.walk_to_dead_end(0, edge, limit).map_or(0, |(distance, _)| distance)
    }

    /// Walk behind `spur_distance`: (length, last read entered) of a dead-ending walk.
    fn walk_to_dead_end(&self, source: u32, edge: &BestEdgeOverlap, limit: u32) -> Option<(u32, u32)> {
        if limit == 0 {
            return None;
        }

        let mut visited: FxHashSet<ReadEnd> = FxHashSet::default();
        let mut edge = *edge;
        let mut last = source;
        let mut distance = 1;

        loop {
            if !edge.exists() || self.is_coverage_gap(edge.read_id()) {
                return Some((distance, last));
            }
            if distance >= limit {
                return None;
            }

            // leave the target read through its other end
            let exit = edge.read_end().opposite();
            if !visited.insert(exit) {
                return None;
            }

            distance += 1;
            last = exit.read_id();
            edge = *self.best_edge_at(exit);
        }
    }

    /// Spurs found from `read_id`: the dead ends of short walks off one end, provided the walk
    /// off the other end survives.
    fn spurs_from(&self, read_id: u32, depth: u32) -> Vec<u32> {
        if self.is_contained(read_id) || self.is_ignored(read_id) {
            return Vec::new();
        }

        let mut spurs = Vec::new();
        for read3p in [false, true] {
            let edge = self.best_edge(read_id, read3p);
            if !edge.exists() {
                continue;
            }
            let Some((_, terminal)) = self.walk_to_dead_end(read_id, edge, depth) else {
                continue;
            };
            if self.spur_distance(self.best_edge(read_id, !read3p), depth) == 0 {
                spurs.push(terminal);
            }
        }
        spurs
    }

    /// Flag spurs and rescore every read end with spurs rejected as targets.
    /// An end left without an edge by the rescoring gets its old edge back.
    pub(crate) fn remove_spanned_spurs<R, S>(&mut self, reads: &R, overlaps: &S, depth: u32)
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        info!("=== SPUR REMOVAL (depth {}) ===", depth);

        let this = &*self;
        let mut spurs: Vec<u32> = (1..self.reads.len() as u32)
            .into_par_iter()
            .flat_map_iter(|id| this.spurs_from(id, depth))
            .collect();
        spurs.sort_unstable();
        spurs.dedup();

        for &id in &spurs {
            self.reads[id as usize].set_flag(ReadFlag::Spur, true);
        }
        self.counts.spur_reads = spurs.len() as u32;
        info!("Spur reads: {}", spurs.len());

        if spurs.is_empty() {
            return;
        }

        let before: Vec<ReadNode> = self.reads.clone();
        self.select_edges(reads, overlaps, true, true);

        let mut restored = 0;
        let mut spanned = 0;
        for (node, old) in self.reads.iter_mut().zip(&before).skip(1) {
            for read3p in [false, true] {
                let old_edge = old.best_edge(read3p);
                let new_edge = node.best_edge_mut(read3p);
                if old_edge.exists() && !new_edge.exists() {
                    *new_edge = *old_edge;
                    restored += 1;
                } else if !new_edge.same_target(old_edge) {
                    spanned += 1;
                }
            }
        }

        self.counts.spur_edges_restored = restored;
        info!("Edges moved off spurs: {}", spanned);
        debug!("Edges kept on spurs for lack of an alternative: {}", restored);
    }
}
