/// Orders reads by the length of the best-edge path running through them, longest first.
/// Layout code takes its contig seeds from here with `next_read_by_chunk_length`.

use std::cmp::Reverse;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::best_edge::ReadEnd;
use crate::best_overlap_graph::BestOverlapGraph;
use crate::configs::PathSeedConfig;
use crate::overlap_store::ReadInfo;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathSeedEntry {
    pub read_id: u32,
    /// Hops reachable from both ends of the read. 0 only in the terminating sentinel.
    pub path_len: u32,
}

impl PathSeedEntry {
    const SENTINEL: PathSeedEntry = PathSeedEntry { read_id: 0, path_len: 0 };
}

pub struct PathSeedOrder {
    entries: Vec<PathSeedEntry>,
    cursor: usize,
}

/// Walks best edges from read-end exits.
/// Lengths of walks that stopped at a missing edge are remembered for every exit on the
/// walk: the successor of an exit is unique, so any walk reaching such an exit ends the same way.
struct PathWalker<'a> {
    graph: &'a BestOverlapGraph,
    /// walk length + 1 per read end, 0 when unknown
    memo: Vec<AtomicU32>,
    max_hops: u32,
}

impl<'a> PathWalker<'a> {
    fn new(graph: &'a BestOverlapGraph, num_reads: u32) -> Self {
        let slots = 2 * (num_reads as usize + 1);
        Self {
            graph,
            memo: (0..slots).map(|_| AtomicU32::new(0)).collect(),
            max_hops: 2 * num_reads + 1,
        }
    }

    /// Hops from exit `start`: follow its best edge into (t, end), leave t through the other
    /// end, repeat. Stops at a missing edge, or before an exit already used.
    fn walk(&self, start: ReadEnd) -> u32 {
        let mut visited: FxHashSet<ReadEnd> = FxHashSet::default();
        let mut trail = vec![start];
        visited.insert(start);

        let mut exit = start;
        let mut hops = 0;

        let dead_end = loop {
            let known = self.memo[exit.index()].load(Ordering::Relaxed);
            if known > 0 {
                hops += known - 1;
                break true;
            }

            let Some(target) = self.graph.follow(exit) else {
                break true;
            };

            let next = target.opposite();
            if !visited.insert(next) {
                break false;
            }

            hops += 1;
            assert!(
                hops <= self.max_hops,
                "walk from {:?} passed {} hops without ending",
                start,
                self.max_hops
            );

            trail.push(next);
            exit = next;
        };

        if dead_end {
            for (i, end) in trail.iter().enumerate() {
                self.memo[end.index()].store(hops - i as u32 + 1, Ordering::Relaxed);
            }
        }
        hops
    }
}

impl PathSeedOrder {
    /// Compute the path length of every read that may seed a path and sort them.
    pub fn new<R: ReadInfo + ?Sized>(graph: &BestOverlapGraph, reads: &R, config: &PathSeedConfig) -> io::Result<Self> {
        info!("=== PATH SEED ORDER ===");

        let num_reads = reads.num_reads();
        let walker = PathWalker::new(graph, num_reads);

        let mut entries: Vec<PathSeedEntry> = (1..num_reads + 1)
            .into_par_iter()
            .filter(|&id| !graph.is_contained(id) && !graph.is_ignored(id) && !graph.is_coverage_gap(id))
            .map(|id| PathSeedEntry {
                read_id: id,
                path_len: walker.walk(ReadEnd::new(id, false)) + walker.walk(ReadEnd::new(id, true)),
            })
            .filter(|e| e.path_len > 0)
            .collect();

        entries.sort_unstable_by_key(|e| (Reverse(e.path_len), e.read_id));
        entries.push(PathSeedEntry::SENTINEL);

        let order = Self { entries, cursor: 0 };

        info!("Seed reads: {}", order.num_seeds());
        if let Some(first) = order.entries.first().filter(|e| e.path_len > 0) {
            info!("Longest path: {} hops through read {}", first.path_len, first.read_id);
        }

        if let Some(prefix) = &config.prefix {
            order.write_report(&format!("{}.seeds", prefix))?;
        }

        Ok(order)
    }

    /// Next read to seed a contig from, 0 once every seed has been handed out.
    pub fn next_read_by_chunk_length(&mut self) -> u32 {
        let entry = self.entries[self.cursor];
        if entry.path_len == 0 {
            return 0;
        }
        self.cursor += 1;
        entry.read_id
    }

    /// All entries, longest path first, ending with the (0, 0) sentinel.
    pub fn entries(&self) -> &[PathSeedEntry] {
        &self.entries
    }

    pub fn num_seeds(&self) -> usize {
        self.entries.len() - 1
    }

    fn write_report(&self, path: &str) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "#read\tpath_len")?;
        for e in &self.entries[..self.num_seeds()] {
            writeln!(w, "{}\t{}", e.read_id, e.path_len)?;
        }
        w.flush()?;
        debug!("Seed order written to {}", path);
        Ok(())
    }
}
