//! Read layouts on a simulated genome, turned into overlaps or PAF lines.

#![allow(dead_code)]

use best_edge_graph::{Overlap, OverlapStore, ReadEnd};

pub const EVALUE: u32 = 100;

#[derive(Clone, Copy, Debug)]
pub struct Placed {
    pub start: i64,
    pub len: i64,
    pub reversed: bool,
}

impl Placed {
    pub fn end(&self) -> i64 {
        self.start + self.len
    }

    /// Bases of the genome interval `[bgn, end)` in the read's own orientation.
    fn local(&self, bgn: i64, end: i64) -> (i64, i64) {
        if self.reversed {
            (self.end() - end, self.end() - bgn)
        } else {
            (bgn - self.start, end - self.start)
        }
    }
}

/// `n` reads of `len` bases every `step` bases, every third one reverse complemented.
pub fn tiled(n: usize, len: i64, step: i64) -> Vec<Placed> {
    (0..n)
        .map(|i| Placed { start: i as i64 * step, len, reversed: i % 3 == 2 })
        .collect()
}

pub fn name(index: usize) -> String {
    format!("read{}", index + 1)
}

/// The end of read `index` facing the end of the genome.
pub fn right_end(layout: &[Placed], index: usize) -> ReadEnd {
    ReadEnd::new(index as u32 + 1, !layout[index].reversed)
}

pub fn left_end(layout: &[Placed], index: usize) -> ReadEnd {
    right_end(layout, index).opposite()
}

fn shared(a: &Placed, b: &Placed) -> Option<(i64, i64)> {
    let bgn = a.start.max(b.start);
    let end = a.end().min(b.end());
    (end > bgn).then_some((bgn, end))
}

/// Overlap of A with B as the overlapper would report it, or None below `min_len` shared bases.
pub fn overlap_between(a_id: u32, a: &Placed, b_id: u32, b: &Placed, min_len: i64) -> Option<Overlap> {
    let (bgn, end) = shared(a, b)?;
    if end - bgn < min_len {
        return None;
    }
    let (a_hang, b_hang) = if a.reversed {
        (a.end() - b.end(), a.start - b.start)
    } else {
        (b.start - a.start, b.end() - a.end())
    };
    Some(Overlap {
        a_iid: a_id,
        b_iid: b_id,
        flipped: a.reversed != b.reversed,
        a_hang: a_hang as i32,
        b_hang: b_hang as i32,
        evalue: EVALUE,
    })
}

/// Store with read `i` of the layout as read id `i + 1`, every pair listed under both reads.
pub fn store_for(layout: &[Placed], min_len: i64) -> OverlapStore {
    let mut store = OverlapStore::new();
    for (i, read) in layout.iter().enumerate() {
        store.add_read(&name(i), read.len as u32).unwrap();
    }
    for i in 0..layout.len() {
        for j in i + 1..layout.len() {
            if let Some(o) = overlap_between(i as u32 + 1, &layout[i], j as u32 + 1, &layout[j], min_len) {
                store.add_overlap_both(o);
            }
        }
    }
    store
}

/// PAF lines for every pair sharing at least `min_len` bases, 99% identity.
pub fn paf_lines(layout: &[Placed], min_len: i64) -> Vec<String> {
    let mut lines = Vec::new();
    for i in 0..layout.len() {
        for j in i + 1..layout.len() {
            let (q, t) = (&layout[i], &layout[j]);
            let Some((bgn, end)) = shared(q, t) else { continue };
            let block = end - bgn;
            if block < min_len {
                continue;
            }
            let (qs, qe) = q.local(bgn, end);
            let (ts, te) = t.local(bgn, end);
            let strand = if q.reversed == t.reversed { '+' } else { '-' };
            lines.push(format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t60",
                name(i),
                q.len,
                qs,
                qe,
                strand,
                name(j),
                t.len,
                ts,
                te,
                block * 99 / 100,
                block
            ));
        }
    }
    lines
}
