/// Lopsided filter.
/// A read end whose best overlap reaches a target that keeps a much longer overlap for itself
/// only sees short overlaps there, as when a bubble sits near the end of the read.

use log::info;
use rayon::prelude::*;

use crate::best_edge::{ReadEnd, ReadFlag};
use crate::best_overlap_graph::{edge_overlap_length, BestOverlapGraph};
use crate::overlap_store::ReadInfo;
use crate::utils::percent_difference;

impl BestOverlapGraph {
    /// True if the best edge off `end` is much shorter than the best edge the target keeps on
    /// the end it reaches, and that edge does not point back at `end`.
    fn is_lopsided_end<R: ReadInfo + ?Sized>(&self, reads: &R, end: ReadEnd, lopsided_diff: f64) -> bool {
        let edge = self.best_edge_at(end);
        if !edge.exists() {
            return false;
        }

        let target = edge.read_end();
        let back = self.best_edge_at(target);
        if !back.exists() || back.read_end() == end {
            return false;
        }

        let len = edge_overlap_length(reads, end.read_id(), edge);
        let target_len = edge_overlap_length(reads, target.read_id(), back);
        len < target_len && percent_difference(len, target_len) > lopsided_diff
    }

    /// Flag lopsided ends and drop their best edges. Both ends of a read may be flagged.
    /// Flagged ends stay empty in later rescoring.
    pub(crate) fn remove_lopsided_edges<R: ReadInfo + ?Sized>(&mut self, reads: &R, lopsided_diff: f64) {
        info!("=== LOPSIDED FILTER ({}% difference) ===", lopsided_diff);

        let this = &*self;
        let lopsided: Vec<ReadEnd> = (1..self.reads.len() as u32)
            .into_par_iter()
            .flat_map_iter(|id| [ReadEnd::new(id, false), ReadEnd::new(id, true)])
            .filter(|&end| this.is_lopsided_end(reads, end, lopsided_diff))
            .collect();

        for end in &lopsided {
            let node = &mut self.reads[end.read_id() as usize];
            let flag = if end.read3p() { ReadFlag::Lopsided3 } else { ReadFlag::Lopsided5 };
            node.set_flag(flag, true);
            node.best_edge_mut(end.read3p()).clear();
        }

        self.counts.lopsided_ends = lopsided.len() as u32;
        info!("Lopsided read ends: {} ({} reads at both ends)", lopsided.len(), self.num_lopsided_both());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::best_overlap_graph::tests::{olap, plain_config, store};
    use crate::configs::GraphConfig;

    fn lopsided_config() -> GraphConfig {
        GraphConfig { filter_lopsided: true, lopsided_diff: 25.0, ..plain_config() }
    }

    #[test]
    fn end_reaching_a_taken_target_loses_its_edge() {
        // read 1 reaches 100 bases into the 5' end of read 2, which keeps 800 bases with read 3
        let mut s = store(&[1000, 1000, 1000]);
        s.add_overlap_both(olap(1, 2, 900, 900, 50));
        s.add_overlap_both(olap(2, 3, -200, -200, 50));

        let plain = BestOverlapGraph::new(&s, &s, &plain_config(), None).unwrap();
        assert_eq!(plain.best_edge(1, true).read_end(), ReadEnd::new(2, false));

        let g = BestOverlapGraph::new(&s, &s, &lopsided_config(), None).unwrap();
        assert!(g.has_flag(1, ReadFlag::Lopsided3));
        assert!(!g.has_flag(1, ReadFlag::Lopsided5));
        assert!(!g.is_lopsided_both(1));
        assert!(!g.best_edge_exists(1, true));
        // the pair that points at each other is left alone
        assert_eq!(g.best_edge(2, false).read_end(), ReadEnd::new(3, true));
        assert_eq!(g.best_edge(3, true).read_end(), ReadEnd::new(2, false));
        assert_eq!(g.num_lopsided(), 1);
        assert_eq!(g.counts().lopsided_ends, 1);
    }

    #[test]
    fn both_ends_can_be_lopsided() {
        // read 1 only reaches the ends of reads 2 and 4, which keep long overlaps with 3 and 5
        let mut s = store(&[1000; 5]);
        s.add_overlap_both(olap(1, 2, -900, -900, 50));
        s.add_overlap_both(olap(2, 3, 200, 200, 50));
        s.add_overlap_both(olap(1, 4, 900, 900, 50));
        s.add_overlap_both(olap(5, 4, 200, 200, 50));

        let g = BestOverlapGraph::new(&s, &s, &lopsided_config(), None).unwrap();

        assert!(g.is_lopsided_both(1));
        assert!(!g.best_edge_exists(1, false) && !g.best_edge_exists(1, true));
        assert_eq!(g.num_lopsided(), 1);
        assert_eq!(g.num_lopsided_both(), 1);
        assert_eq!(g.counts().lopsided_ends, 2);
        assert_eq!(g.best_edge(2, true).read_end(), ReadEnd::new(3, false));
        assert_eq!(g.best_edge(4, false).read_end(), ReadEnd::new(5, true));
    }

    #[test]
    fn small_differences_are_tolerated() {
        // 700 against 800 bases is 13%
        let mut s = store(&[1000, 1000, 1000]);
        s.add_overlap_both(olap(1, 2, 300, 300, 50));
        s.add_overlap_both(olap(2, 3, -200, -200, 50));

        let g = BestOverlapGraph::new(&s, &s, &lopsided_config(), None).unwrap();
        assert!(!g.is_lopsided(1));
        assert_eq!(g.best_edge(1, true).read_end(), ReadEnd::new(2, false));
    }

    #[test]
    fn balanced_read_keeps_both_edges() {
        let mut s = store(&[1000, 1000, 1000]);
        s.add_overlap_both(olap(2, 1, -500, -500, 50));
        s.add_overlap_both(olap(2, 3, 450, 450, 50));

        let g = BestOverlapGraph::new(&s, &s, &lopsided_config(), None).unwrap();
        assert!(!g.is_lopsided(2));
        assert!(g.best_edge_exists(2, false) && g.best_edge_exists(2, true));
    }
}
