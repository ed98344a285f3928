/// Coverage gap filter.
/// Good overlaps of a read are laid out on the read. If they do not join up into one
/// block the read is probably chimeric: it keeps its own best edges but nobody may
/// pick it as a best edge target.

use log::info;
use rayon::prelude::*;

use crate::best_edge::ReadFlag;
use crate::best_overlap_graph::BestOverlapGraph;
use crate::overlap_store::{OverlapSource, ReadInfo};

/// Number of blocks the spans form when neighbours must share `min_shared` bases to join.
/// Each span loses `min_shared` bases off its end before the union is taken, so spans
/// shorter than that take no part.
fn count_blocks(spans: Vec<(u32, u32)>, min_shared: u32) -> usize {
    let mut trimmed: Vec<(u32, u32)> = spans
        .into_iter()
        .filter(|&(bgn, end)| end > bgn && end - bgn > min_shared)
        .map(|(bgn, end)| (bgn, end - min_shared))
        .collect();
    trimmed.sort_unstable();

    let mut blocks = 0;
    let mut block_end = 0;
    for (bgn, end) in trimmed {
        if blocks == 0 || bgn > block_end {
            blocks += 1;
            block_end = end;
        } else {
            block_end = block_end.max(end);
        }
    }
    blocks
}

impl BestOverlapGraph {
    /// Flag coverage-gap reads, then redo edge selection so nobody points at them.
    pub(crate) fn remove_reads_with_coverage_gap<R, S>(&mut self, reads: &R, overlaps: &S, cov_gap_olap: u32)
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        info!("=== COVERAGE GAP FILTER (min shared {} bases) ===", cov_gap_olap);

        let spans = self.overlap_spans(reads, overlaps);

        let this = &*self;
        let gapped: Vec<u32> = spans
            .into_par_iter()
            .enumerate()
            .skip(1)
            .filter(|(id, _)| !this.is_contained(*id as u32) && !this.is_ignored(*id as u32))
            .filter(|(_, spans)| !spans.is_empty())
            .filter_map(|(id, spans)| (count_blocks(spans, cov_gap_olap) > 1).then_some(id as u32))
            .collect();

        for &id in &gapped {
            self.reads[id as usize].set_flag(ReadFlag::CoverageGap, true);
        }
        self.counts.coverage_gap = gapped.len() as u32;
        info!("Reads with a coverage gap: {}", gapped.len());

        self.find_edges(reads, overlaps, true);
    }

    /// Spans of all good overlaps, on each read involved. Both sides of every listed overlap are used.
    fn overlap_spans<R, S>(&self, reads: &R, overlaps: &S) -> Vec<Vec<(u32, u32)>>
    where
        R: ReadInfo + ?Sized,
        S: OverlapSource + ?Sized,
    {
        let mut spans: Vec<Vec<(u32, u32)>> = vec![Vec::new(); self.reads.len()];

        let found: Vec<(u32, (u32, u32))> = (1..self.reads.len() as u32)
            .into_par_iter()
            .flat_map_iter(|id| {
                overlaps
                    .overlaps(id)
                    .iter()
                    .filter(|o| !self.is_overlap_bad_quality(reads, o))
                    .flat_map(|o| [*o, o.swapped()])
                    .map(|o| (o.a_iid, o.a_span(reads.read_length(o.a_iid))))
                    .filter(|(_, (bgn, end))| end > bgn)
                    .collect::<Vec<_>>()
            })
            .collect();

        for (id, span) in found {
            spans[id as usize].push(span);
        }
        spans
    }
}
