/// Fixed-width records shared by the best overlap graph and the path-seed ordering.
/// - ReadEnd: a (read id, end) vertex handle packed into 32 bits
/// - BestEdgeOverlap: a best edge, target id plus a 64 bit packed body
/// - ReadNode: the two best edges of a read and its classification flags

use std::fmt;

use crate::overlaps::{decode_evalue, Overlap};

/// Bits used for read lengths. Hangs carry one extra sign bit.
pub const READLEN_BITS: u32 = 21;
/// Bits used for the quantized error value.
pub const EVALUE_BITS: u32 = 12;
/// Bits used for read ids in a ReadEnd (the last bit holds the end).
pub const READID_BITS: u32 = 31;

pub const MAX_READLEN: u32 = (1 << READLEN_BITS) - 1;
pub const MAX_EVALUE: u32 = (1 << EVALUE_BITS) - 1;
pub const MAX_READ_ID: u32 = (1 << READID_BITS) - 1;

const HANG_BITS: u32 = READLEN_BITS + 1;

/// end:1, ahang, bhang, evalue
pub const PACKED_EDGE_BITS: u32 = 1 + HANG_BITS + HANG_BITS + EVALUE_BITS;
pub const PACKED_WORD_BITS: u32 = u64::BITS;

/// overlap length, inverted evalue, inverted target id
pub const SCORE_BITS: u32 = READLEN_BITS + EVALUE_BITS + READID_BITS;

const _: () = assert!(
    PACKED_EDGE_BITS <= PACKED_WORD_BITS,
    "not enough bits to store overlaps; decrease EVALUE_BITS or READLEN_BITS"
);
const _: () = assert!(
    SCORE_BITS <= PACKED_WORD_BITS,
    "not enough bits to score overlaps; decrease EVALUE_BITS, READLEN_BITS or READID_BITS"
);

const END_SHIFT: u32 = 0;
const AHANG_SHIFT: u32 = 1;
const BHANG_SHIFT: u32 = AHANG_SHIFT + HANG_BITS;
const EVALUE_SHIFT: u32 = BHANG_SHIFT + HANG_BITS;

const HANG_MASK: u64 = (1 << HANG_BITS) - 1;
const EVALUE_MASK: u64 = (1 << EVALUE_BITS) - 1;

/// One end of a read. Ordered by (read id, end) with the 5' end first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ReadEnd {
    packed: u32,
}

impl ReadEnd {
    pub fn new(read_id: u32, read3p: bool) -> Self {
        debug_assert!(read_id <= MAX_READ_ID, "read id {} does not fit a ReadEnd", read_id);
        Self { packed: (read_id << 1) | read3p as u32 }
    }

    pub fn read_id(&self) -> u32 {
        self.packed >> 1
    }

    pub fn read3p(&self) -> bool {
        self.packed & 1 == 1
    }

    pub fn read5p(&self) -> bool {
        self.packed & 1 == 0
    }

    /// The other end of the same read.
    pub fn opposite(&self) -> Self {
        Self { packed: self.packed ^ 1 }
    }

    /// Dense index usable for per-end arrays (2 * id + end).
    pub fn index(&self) -> usize {
        self.packed as usize
    }
}

impl fmt::Debug for ReadEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.read_id(), if self.read3p() { "3'" } else { "5'" })
    }
}

/// Sign-extend the low `bits` bits of `raw`.
fn sign_extend(raw: u64, bits: u32) -> i32 {
    (((raw << (64 - bits)) as i64) >> (64 - bits)) as i32
}

/// A best edge from an implied source read end (the slot it is stored in) to a target read end.
/// Hangs are relative to the source read, as in a normal overlap.
/// A target id of 0 means there is no edge.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct BestEdgeOverlap {
    id: u32,
    packed: u64,
}

impl BestEdgeOverlap {
    pub fn new(read_id: u32, read3p: bool, ahang: i32, bhang: i32, evalue: u32) -> Self {
        debug_assert!(ahang.unsigned_abs() <= MAX_READLEN, "ahang {} out of range", ahang);
        debug_assert!(bhang.unsigned_abs() <= MAX_READLEN, "bhang {} out of range", bhang);
        debug_assert!(evalue <= MAX_EVALUE, "evalue {} out of range", evalue);

        let packed = ((read3p as u64) << END_SHIFT)
            | (((ahang as i64 as u64) & HANG_MASK) << AHANG_SHIFT)
            | (((bhang as i64 as u64) & HANG_MASK) << BHANG_SHIFT)
            | (((evalue as u64) & EVALUE_MASK) << EVALUE_SHIFT);

        Self { id: read_id, packed }
    }

    /// Edge from the A read of `olap` to its B read.
    pub fn from_overlap(olap: &Overlap) -> Self {
        Self::new(olap.b_iid, olap.b_end_is_3prime(), olap.a_hang, olap.b_hang, olap.evalue)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn exists(&self) -> bool {
        self.id != 0
    }

    pub fn read_id(&self) -> u32 {
        self.id
    }

    pub fn read3p(&self) -> bool {
        (self.packed >> END_SHIFT) & 1 == 1
    }

    pub fn read5p(&self) -> bool {
        !self.read3p()
    }

    pub fn read_end(&self) -> ReadEnd {
        ReadEnd::new(self.id, self.read3p())
    }

    pub fn ahang(&self) -> i32 {
        sign_extend((self.packed >> AHANG_SHIFT) & HANG_MASK, HANG_BITS)
    }

    pub fn bhang(&self) -> i32 {
        sign_extend((self.packed >> BHANG_SHIFT) & HANG_MASK, HANG_BITS)
    }

    pub fn evalue(&self) -> u32 {
        ((self.packed >> EVALUE_SHIFT) & EVALUE_MASK) as u32
    }

    pub fn erate(&self) -> f64 {
        decode_evalue(self.evalue())
    }

    /// True if both edges point at the same read end.
    pub fn same_target(&self, that: &BestEdgeOverlap) -> bool {
        self.id == that.id && self.read3p() == that.read3p()
    }

    /// The edge seen from the target: stored on the target end, pointing back at `source`.
    pub fn reversed(&self, source: ReadEnd) -> Self {
        // Same-named ends meeting means B is reverse complemented.
        let flipped = source.read3p() == self.read3p();
        let (ahang, bhang) = if flipped {
            (self.bhang(), self.ahang())
        } else {
            (-self.ahang(), -self.bhang())
        };
        Self::new(source.read_id(), source.read3p(), ahang, bhang, self.evalue())
    }
}

impl fmt::Debug for BestEdgeOverlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.exists() {
            return write!(f, "none");
        }
        write!(f, "{:?} ({},{}) e={}", self.read_end(), self.ahang(), self.bhang(), self.evalue())
    }
}

/// Classification flags of a read. Independent of each other.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReadFlag {
    /// Some overlap shows the read is contained in another read.
    Contained,
    /// Excluded by a prior graph (orphan or bubble there).
    Ignored,
    /// Probably chimeric. Edges from it are kept, edges to it are not.
    CoverageGap,
    Lopsided5,
    Lopsided3,
    Backbone,
    Spur,
    Bubble,
    Orphan,
    Delinquent,
}

impl ReadFlag {
    pub const ALL: [ReadFlag; 10] = [
        ReadFlag::Contained,
        ReadFlag::Ignored,
        ReadFlag::CoverageGap,
        ReadFlag::Lopsided5,
        ReadFlag::Lopsided3,
        ReadFlag::Backbone,
        ReadFlag::Spur,
        ReadFlag::Bubble,
        ReadFlag::Orphan,
        ReadFlag::Delinquent,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadFlag::Contained => "contained",
            ReadFlag::Ignored => "ignored",
            ReadFlag::CoverageGap => "coverage-gap",
            ReadFlag::Lopsided5 => "lopsided-5",
            ReadFlag::Lopsided3 => "lopsided-3",
            ReadFlag::Backbone => "backbone",
            ReadFlag::Spur => "spur",
            ReadFlag::Bubble => "bubble",
            ReadFlag::Orphan => "orphan",
            ReadFlag::Delinquent => "delinquent",
        }
    }
}

/// A node of the best overlap graph: one read, its two best edges and its flags.
/// Only the graph mutates nodes.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ReadNode {
    best5: BestEdgeOverlap,
    best3: BestEdgeOverlap,
    flags: u16,
}

impl ReadNode {
    pub fn best_edge(&self, read3p: bool) -> &BestEdgeOverlap {
        if read3p { &self.best3 } else { &self.best5 }
    }

    pub fn has(&self, flag: ReadFlag) -> bool {
        self.flags & flag.bit() != 0
    }

    pub(crate) fn best_edge_mut(&mut self, read3p: bool) -> &mut BestEdgeOverlap {
        if read3p { &mut self.best3 } else { &mut self.best5 }
    }

    pub(crate) fn set_flag(&mut self, flag: ReadFlag, value: bool) {
        if value {
            self.flags |= flag.bit();
        } else {
            self.flags &= !flag.bit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_fields_survive_packing_at_the_bounds() {
        let max = MAX_READLEN as i32;
        let cases = [
            (1, false, 0, 0, 0),
            (7, true, -max, max, MAX_EVALUE),
            (MAX_READ_ID, false, max, -max, 1),
            (42, true, -1, -1, 2048),
        ];
        for (id, e3p, ahang, bhang, evalue) in cases {
            let e = BestEdgeOverlap::new(id, e3p, ahang, bhang, evalue);
            assert_eq!(e.read_id(), id);
            assert_eq!(e.read3p(), e3p);
            assert_eq!(e.ahang(), ahang);
            assert_eq!(e.bhang(), bhang);
            assert_eq!(e.evalue(), evalue);
        }
    }

    #[test]
    fn edge_exists_iff_target_nonzero() {
        let mut e = BestEdgeOverlap::new(3, true, 10, 20, 5);
        assert!(e.exists());
        e.clear();
        assert!(!e.exists());
        assert_eq!(e.read_id(), 0);
        assert!(!BestEdgeOverlap::default().exists());
    }

    #[test]
    fn read_ends_order_by_id_then_end() {
        let mut ends = vec![ReadEnd::new(2, true), ReadEnd::new(1, true), ReadEnd::new(2, false), ReadEnd::new(1, false)];
        ends.sort();
        assert_eq!(ends, vec![ReadEnd::new(1, false), ReadEnd::new(1, true), ReadEnd::new(2, false), ReadEnd::new(2, true)]);
        assert_eq!(ReadEnd::new(5, true).opposite(), ReadEnd::new(5, false));
        assert_eq!(ReadEnd::new(5, true).index(), 11);
    }

    #[test]
    fn reversed_edge_points_back_to_source() {
        // 1's 3' end onto 2's 5' end, not flipped.
        let e = BestEdgeOverlap::new(2, false, 300, 250, 12);
        let r = e.reversed(ReadEnd::new(1, true));
        assert_eq!(r.read_end(), ReadEnd::new(1, true));
        assert_eq!((r.ahang(), r.bhang()), (-300, -250));
        assert_eq!(r.evalue(), 12);

        // 1's 3' end onto 2's 3' end, flipped.
        let e = BestEdgeOverlap::new(2, true, 300, 250, 12);
        let r = e.reversed(ReadEnd::new(1, true));
        assert_eq!((r.ahang(), r.bhang()), (250, 300));
    }

    #[test]
    fn flags_are_independent() {
        let mut n = ReadNode::default();
        n.set_flag(ReadFlag::Backbone, true);
        n.set_flag(ReadFlag::Orphan, true);
        n.set_flag(ReadFlag::Lopsided3, true);
        for flag in ReadFlag::ALL {
            let expected = matches!(flag, ReadFlag::Backbone | ReadFlag::Orphan | ReadFlag::Lopsided3);
            assert_eq!(n.has(flag), expected, "{}", flag.label());
        }
        n.set_flag(ReadFlag::Orphan, false);
        assert!(!n.has(ReadFlag::Orphan));
        assert!(n.has(ReadFlag::Backbone));
    }
}
