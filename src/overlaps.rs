/// Overlap records as supplied by the overlap source.
/// Hangs follow the usual convention, both relative to the A read:
/// - a_hang: where B starts, measured from the start of A
/// - b_hang: where B ends, measured from the end of A
/// The PAF parsing at the bottom turns minimap-style alignments into such records.

use serde::{Deserialize, Serialize};

use crate::best_edge::MAX_EVALUE;

/// Quantize an error rate (fraction, 0.01 = 1%) into an evalue. Saturates at MAX_EVALUE.
pub fn encode_evalue(erate: f64) -> u32 {
    if !(erate > 0.0) {
        return 0;
    }
    let e = (erate * 10000.0).round();
    if e >= MAX_EVALUE as f64 { MAX_EVALUE } else { e as u32 }
}

pub fn decode_evalue(evalue: u32) -> f64 {
    evalue as f64 / 10000.0
}

/// A pairwise overlap between read `a_iid` and read `b_iid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub a_iid: u32,
    pub b_iid: u32,
    /// B aligns reverse complemented.
    pub flipped: bool,
    pub a_hang: i32,
    pub b_hang: i32,
    pub evalue: u32,
}

impl Overlap {
    pub fn erate(&self) -> f64 {
        decode_evalue(self.evalue)
    }

    /// The same overlap with A and B exchanged.
    pub fn swapped(&self) -> Overlap {
        let (a_hang, b_hang) = if self.flipped {
            (self.b_hang, self.a_hang)
        } else {
            (-self.a_hang, -self.b_hang)
        };
        Overlap { a_iid: self.b_iid, b_iid: self.a_iid, flipped: self.flipped, a_hang, b_hang, evalue: self.evalue }
    }

    pub fn is_dovetail(&self) -> bool {
        (self.a_hang < 0 && self.b_hang < 0) || (self.a_hang > 0 && self.b_hang > 0)
    }

    /// A lies entirely within B.
    pub fn a_is_contained(&self) -> bool {
        self.a_hang <= 0 && self.b_hang >= 0
    }

    /// B lies entirely within A.
    pub fn a_is_container(&self) -> bool {
        self.a_hang >= 0 && self.b_hang <= 0
    }

    pub fn a_end_is_5prime(&self) -> bool {
        self.a_hang < 0 && self.b_hang < 0
    }

    pub fn a_end_is_3prime(&self) -> bool {
        self.a_hang > 0 && self.b_hang > 0
    }

    pub fn b_end_is_3prime(&self) -> bool {
        (self.a_end_is_5prime() && !self.flipped) || (self.a_end_is_3prime() && self.flipped)
    }

    pub fn b_end_is_5prime(&self) -> bool {
        (self.a_end_is_5prime() && self.flipped) || (self.a_end_is_3prime() && !self.flipped)
    }

    /// Which read, if any, this overlap shows to be contained.
    /// Identical reads (both hangs zero) contain the one with the higher id.
    pub fn contained_read(&self) -> Option<u32> {
        if self.a_hang == 0 && self.b_hang == 0 {
            return Some(self.a_iid.max(self.b_iid));
        }
        if self.a_is_contained() {
            Some(self.a_iid)
        } else if self.a_is_container() {
            Some(self.b_iid)
        } else {
            None
        }
    }

    /// Overlap length: the mean of the aligned span on A and on B.
    pub fn overlap_length(&self, a_len: u32, b_len: u32) -> u32 {
        let (alen, blen) = (a_len as i64, b_len as i64);
        let (ah, bh) = (self.a_hang as i64, self.b_hang as i64);

        let (aovl, bovl) = match (ah < 0, bh < 0) {
            (true, true) => (alen + bh, blen + ah),
            (true, false) => (alen, blen + ah - bh),
            (false, true) => (alen - ah + bh, blen),
            (false, false) => (alen - ah, blen - bh),
        };

        ((aovl + bovl) / 2).max(0) as u32
    }

    /// Position of the aligned span on A, clipped to the read.
    pub fn a_span(&self, a_len: u32) -> (u32, u32) {
        let bgn = self.a_hang.max(0) as i64;
        let end = a_len as i64 + self.b_hang.min(0) as i64;
        (bgn.min(a_len as i64) as u32, end.max(bgn) as u32)
    }
}

/// One alignment line of a PAF file.
#[derive(Clone, Debug)]
pub struct PafRecord {
    pub query_name: String,
    pub query_length: u32,
    pub query_start: i64,
    pub query_end: i64,
    pub strand: char,
    pub target_name: String,
    pub target_length: u32,
    pub target_start: i64,
    pub target_end: i64,
    pub num_matching: u32,
    pub alignment_block_length: u32,
}

impl PafRecord {
    pub fn from_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 { return None; }

        Some(Self {
            query_name: fields[0].to_string(),
            query_length: fields[1].parse().ok()?,
            query_start: fields[2].parse::<i64>().ok()?,
            query_end: fields[3].parse::<i64>().ok()?,
            strand: fields[4].chars().next()?,
            target_name: fields[5].to_string(),
            target_length: fields[6].parse::<u32>().ok()?,
            target_start: fields[7].parse::<i64>().ok()?,
            target_end: fields[8].parse::<i64>().ok()?,
            num_matching: fields[9].parse().ok()?,
            alignment_block_length: fields[10].parse().ok()?,
        })
    }

    pub fn is_self_alignment(&self) -> bool {
        self.query_name == self.target_name
    }

    pub fn error_rate(&self) -> f64 {
        if self.alignment_block_length == 0 {
            return 1.0;
        }
        1.0 - self.num_matching as f64 / self.alignment_block_length as f64
    }

    /// Convert to an overlap with the query as A and the target as B.
    pub fn to_overlap(&self, query_id: u32, target_id: u32) -> Overlap {
        let ql = self.query_length as i64;
        let tl = self.target_length as i64;

        // target coordinates in the orientation that aligns to the query
        let flipped = self.strand == '-';
        let (tb, te) = if flipped {
            (tl - self.target_end, tl - self.target_start)
        } else {
            (self.target_start, self.target_end)
        };

        // B starts tb bases before the aligned block on A, and ends (tl - te) after it
        let a_hang = self.query_start - tb;
        let b_hang = (self.query_end + (tl - te)) - ql;

        Overlap {
            a_iid: query_id,
            b_iid: target_id,
            flipped,
            a_hang: a_hang as i32,
            b_hang: b_hang as i32,
            evalue: encode_evalue(self.error_rate()),
        }
    }
}
