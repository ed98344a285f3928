/// Overlap source and read metadata.
/// The graph only sees the two traits; OverlapStore is the in-memory implementation used by the binary.
/// Reads get 1-based ids in the order they are first seen, id 0 is never a read.

use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::best_edge::{MAX_READLEN, MAX_READ_ID};
use crate::errors::OverlapStoreError;
use crate::overlaps::{Overlap, PafRecord};

/// Read lengths, indexed by read id.
pub trait ReadInfo: Sync {
    fn num_reads(&self) -> u32;

    /// Length of a read, 0 for id 0.
    fn read_length(&self, read_id: u32) -> u32;

    fn is_valid(&self, read_id: u32) -> bool {
        read_id != 0 && read_id <= self.num_reads() && self.read_length(read_id) > 0
    }
}

/// Overlaps of a read, with that read as A.
/// A pair may be listed under only one of its two reads.
pub trait OverlapSource: Sync {
    fn overlaps(&self, read_id: u32) -> &[Overlap];
}

/// Counters from a PAF import, printed as the import summary.
#[derive(Default, Debug)]
pub struct ImportStats {
    pub alignments: usize,
    pub self_alignments_skipped: usize,
    pub short_alignments_skipped: usize,
    pub duplicate_pairs_replaced: usize,
    pub overlaps: usize,
}

#[derive(Serialize, Deserialize)]
pub struct OverlapStore {
    names: Vec<String>,
    lengths: Vec<u32>,
    overlaps: Vec<Vec<Overlap>>,
    #[serde(skip)]
    name2id: FxHashMap<String, u32>,
}

impl OverlapStore {
    pub fn new() -> Self {
        Self {
            names: vec![String::new()],
            lengths: vec![0],
            overlaps: vec![Vec::new()],
            name2id: FxHashMap::default(),
        }
    }

    /// Register a read, or return the id it already has.
    pub fn add_read(&mut self, name: &str, length: u32) -> Result<u32, OverlapStoreError> {
        if let Some(&id) = self.name2id.get(name) {
            let first = self.lengths[id as usize];
            if first != length {
                return Err(OverlapStoreError::InconsistentLength { name: name.to_string(), first, second: length });
            }
            return Ok(id);
        }
        if length > MAX_READLEN {
            return Err(OverlapStoreError::ReadTooLong { name: name.to_string(), length, max: MAX_READLEN });
        }
        let id = self.names.len() as u32;
        if id > MAX_READ_ID {
            return Err(OverlapStoreError::TooManyReads(MAX_READ_ID));
        }
        self.names.push(name.to_string());
        self.lengths.push(length);
        self.overlaps.push(Vec::new());
        self.name2id.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn read_id(&self, name: &str) -> Option<u32> {
        self.name2id.get(name).copied()
    }

    pub fn read_name(&self, read_id: u32) -> &str {
        &self.names[read_id as usize]
    }

    /// Store an overlap under its A read only.
    pub fn add_overlap(&mut self, olap: Overlap) {
        self.overlaps[olap.a_iid as usize].push(olap);
    }

    /// Store an overlap under both of its reads.
    pub fn add_overlap_both(&mut self, olap: Overlap) {
        let swapped = olap.swapped();
        self.add_overlap(olap);
        self.add_overlap(swapped);
    }

    pub fn num_overlaps(&self) -> usize {
        self.overlaps.iter().map(|o| o.len()).sum()
    }

    /// Import a PAF file. Only the longest alignment per read pair is kept, stored under both reads.
    pub fn from_paf<P: AsRef<Path>>(path: P, min_overlap_length: u32) -> Result<(Self, ImportStats), OverlapStoreError> {
        let mut store = Self::new();
        let mut stats = ImportStats::default();

        // (lower id, higher id) -> (alignment block length, overlap as seen from the query)
        let mut best: FxHashMap<(u32, u32), (u32, Overlap)> = FxHashMap::default();

        let reader = BufReader::new(File::open(path)?);
        for (line_nr, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() { continue; }

            let record = PafRecord::from_line(&line).ok_or(OverlapStoreError::MalformedPaf(line_nr + 1))?;
            stats.alignments += 1;

            if record.is_self_alignment() { stats.self_alignments_skipped += 1; continue; }

            let query_id = store.add_read(&record.query_name, record.query_length)?;
            let target_id = store.add_read(&record.target_name, record.target_length)?;

            if record.alignment_block_length < min_overlap_length {
                stats.short_alignments_skipped += 1;
                continue;
            }

            let olap = record.to_overlap(query_id, target_id);
            let key = (query_id.min(target_id), query_id.max(target_id));
            match best.entry(key) {
                Entry::Occupied(mut existing) => {
                    if record.alignment_block_length > existing.get().0 {
                        existing.insert((record.alignment_block_length, olap));
                        stats.duplicate_pairs_replaced += 1;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert((record.alignment_block_length, olap));
                }
            }
        }

        // deterministic storage order
        let mut kept: Vec<((u32, u32), Overlap)> = best.into_iter().map(|(k, (_, o))| (k, o)).collect();
        kept.sort_unstable_by_key(|(k, _)| *k);
        for (_, olap) in kept {
            store.add_overlap_both(olap);
        }
        for list in store.overlaps.iter_mut() {
            list.sort_unstable_by_key(|o| o.b_iid);
        }
        stats.overlaps = store.num_overlaps() / 2;

        info!("Total reads: {}", store.num_reads());
        info!("Total alignments read: {}", stats.alignments);
        info!("Total self-alignments skipped: {}", stats.self_alignments_skipped);
        info!("Total alignments skipped due to length filter: {}", stats.short_alignments_skipped);
        if stats.duplicate_pairs_replaced > 0 {
            warn!("{} read pairs had several alignments, the longest was kept", stats.duplicate_pairs_replaced);
        }
        info!("Total overlaps stored: {}", stats.overlaps);

        Ok((store, stats))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OverlapStoreError> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OverlapStoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut store: OverlapStore = bincode::deserialize_from(reader)?;
        store.name2id = store
            .names
            .iter()
            .enumerate()
            .skip(1)
            .map(|(id, name)| (name.clone(), id as u32))
            .collect();
        Ok(store)
    }
}

impl Default for OverlapStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadInfo for OverlapStore {
    fn num_reads(&self) -> u32 {
        self.lengths.len().saturating_sub(1) as u32
    }

    fn read_length(&self, read_id: u32) -> u32 {
        self.lengths.get(read_id as usize).copied().unwrap_or(0)
    }
}

impl OverlapSource for OverlapStore {
    fn overlaps(&self, read_id: u32) -> &[Overlap] {
        self.overlaps.get(read_id as usize).map(|o| o.as_slice()).unwrap_or(&[])
    }
}
