/// Diagnostic reports of a finished best overlap graph.
/// All files are written as `<prefix>.<label>.<kind>`:
/// - stats: error rate statistics, filter counts and flag counts
/// - edges: the two best edges of every read
/// - good_overlaps: every overlap that passed the quality filter
/// - dot: the best edges as a graphviz digraph

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::best_edge::{BestEdgeOverlap, ReadFlag, ReadNode};
use crate::best_overlap_graph::{edge_overlap_length, BestOverlapGraph};
use crate::configs::GraphConfig;
use crate::overlap_store::{OverlapSource, ReadInfo};

pub fn report_path(prefix: &str, label: &str, kind: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}.{}", prefix, label, kind))
}

/// Write every report `config` asks for.
pub fn write_reports<R, S>(
    graph: &BestOverlapGraph,
    reads: &R,
    overlaps: &S,
    prefix: &str,
    config: &GraphConfig,
) -> io::Result<()>
where
    R: ReadInfo + ?Sized,
    S: OverlapSource + ?Sized,
{
    let label = &config.label;

    write_stats(graph, report_path(prefix, label, "stats"))?;
    write_edges(graph, reads, report_path(prefix, label, "edges"))?;
    if config.emit_good_overlaps {
        write_good_overlaps(graph, reads, overlaps, report_path(prefix, label, "good_overlaps"))?;
    }
    if config.emit_dot {
        write_dot(graph, reads, report_path(prefix, label, "dot"))?;
    }

    info!("Reports written to {}.{}.*", prefix, label);
    Ok(())
}

pub fn write_stats<P: AsRef<Path>>(graph: &BestOverlapGraph, path: P) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let s = graph.error_stats();
    let c = graph.counts();

    writeln!(w, "ERROR RATES")?;
    writeln!(w, "overlaps\t{}", s.count)?;
    writeln!(w, "mean\t{:.6}", s.mean)?;
    writeln!(w, "stddev\t{:.6}", s.stddev)?;
    writeln!(w, "median\t{:.6}", s.median)?;
    writeln!(w, "mad\t{:.6}", s.mad)?;
    writeln!(w, "erate_graph\t{:.6}", graph.erate_graph)?;
    writeln!(w, "deviation_graph\t{:.2}", graph.deviation_graph)?;
    writeln!(w, "error_limit\t{:.6}", graph.error_limit())?;
    writeln!(w)?;

    writeln!(w, "FILTERS")?;
    writeln!(w, "ignored\t{}", c.ignored)?;
    writeln!(w, "contained\t{}", c.contained)?;
    writeln!(w, "coverage_gap\t{}", c.coverage_gap)?;
    writeln!(w, "lopsided_ends\t{}", c.lopsided_ends)?;
    writeln!(w, "spur_reads\t{}", c.spur_reads)?;
    writeln!(w, "spur_edges_restored\t{}", c.spur_edges_restored)?;
    writeln!(w, "dovetails_removed\t{}", c.dovetails_removed)?;
    writeln!(w)?;

    writeln!(w, "READS")?;
    writeln!(w, "total\t{}", graph.reads.len() - 1)?;
    for flag in ReadFlag::ALL {
        writeln!(w, "{}\t{}", flag.label(), graph.count(flag))?;
    }
    writeln!(w, "lopsided\t{}", graph.num_lopsided())?;
    writeln!(w, "lopsided-both\t{}", graph.num_lopsided_both())?;
    writeln!(w, "best_edges\t{}", graph.num_edges())?;

    w.flush()
}

/// Short flag string for the edges report, one letter per flag set.
fn flag_string(node: &ReadNode) -> String {
    const LETTERS: [(ReadFlag, char); 10] = [
        (ReadFlag::Contained, 'C'),
        (ReadFlag::Ignored, 'I'),
        (ReadFlag::CoverageGap, 'G'),
        (ReadFlag::Lopsided5, 'L'),
        (ReadFlag::Lopsided3, 'l'),
        (ReadFlag::Backbone, 'B'),
        (ReadFlag::Spur, 'S'),
        (ReadFlag::Bubble, 'U'),
        (ReadFlag::Orphan, 'O'),
        (ReadFlag::Delinquent, 'D'),
    ];

    let s: String = LETTERS.iter().filter(|(flag, _)| node.has(*flag)).map(|(_, c)| *c).collect();
    if s.is_empty() { "-".to_string() } else { s }
}

fn edge_fields<R: ReadInfo + ?Sized>(reads: &R, source: u32, edge: &BestEdgeOverlap) -> String {
    if !edge.exists() {
        return "0\t-\t0\t0\t0\t0.0000".to_string();
    }
    format!(
        "{}\t{}\t{}\t{}\t{}\t{:.4}",
        edge.read_id(),
        if edge.read3p() { "3'" } else { "5'" },
        edge.ahang(),
        edge.bhang(),
        edge_overlap_length(reads, source, edge),
        edge.erate()
    )
}

/// One line per read: id, length, flags, then target, end, hangs, overlap length and error of each best edge.
pub fn write_edges<R, P>(graph: &BestOverlapGraph, reads: &R, path: P) -> io::Result<()>
where
    R: ReadInfo + ?Sized,
    P: AsRef<Path>,
{
    let mut w = BufWriter::new(File::create(path)?);

    writeln!(
        w,
        "#read\tlength\tflags\tbest5\tend5\tahang5\tbhang5\tolap5\terate5\tbest3\tend3\tahang3\tbhang3\tolap3\terate3"
    )?;
    for (id, node) in graph.reads.iter().enumerate().skip(1) {
        let id = id as u32;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            id,
            reads.read_length(id),
            flag_string(node),
            edge_fields(reads, id, node.best_edge(false)),
            edge_fields(reads, id, node.best_edge(true))
        )?;
    }

    w.flush()
}

/// Every listed overlap that passes the quality filter, as it is listed.
pub fn write_good_overlaps<R, S, P>(graph: &BestOverlapGraph, reads: &R, overlaps: &S, path: P) -> io::Result<()>
where
    R: ReadInfo + ?Sized,
    S: OverlapSource + ?Sized,
    P: AsRef<Path>,
{
    let mut w = BufWriter::new(File::create(path)?);

    writeln!(w, "#a\tb\torient\tahang\tbhang\tolap\terate\ttype")?;
    for id in 1..graph.reads.len() as u32 {
        for o in overlaps.overlaps(id) {
            if graph.is_overlap_bad_quality(reads, o) {
                continue;
            }
            let kind = if o.is_dovetail() { "dovetail" } else { "contain" };
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{}",
                o.a_iid,
                o.b_iid,
                if o.flipped { 'I' } else { 'N' },
                o.a_hang,
                o.b_hang,
                o.overlap_length(reads.read_length(o.a_iid), reads.read_length(o.b_iid)),
                o.erate(),
                kind
            )?;
        }
    }

    w.flush()
}

/// Write the best edges to a DOT file for visualization.
/// One node per read that has or receives a best edge, edges labelled with the read ends they join.
pub fn write_dot<R, P>(graph: &BestOverlapGraph, reads: &R, path: P) -> io::Result<()>
where
    R: ReadInfo + ?Sized,
    P: AsRef<Path>,
{
    fn flag_color(node: &ReadNode) -> &'static str {
        if node.has(ReadFlag::CoverageGap) {
            "red"
        } else if node.has(ReadFlag::Spur) {
            "orange"
        } else if node.has(ReadFlag::Lopsided5) || node.has(ReadFlag::Lopsided3) {
            "lightblue"
        } else if node.has(ReadFlag::Contained) || node.has(ReadFlag::Ignored) {
            "gray"
        } else {
            "white"
        }
    }

    let mut w = BufWriter::new(File::create(path)?);

    let mut in_graph = vec![false; graph.reads.len()];
    for (id, node) in graph.reads.iter().enumerate().skip(1) {
        for read3p in [false, true] {
            let edge = node.best_edge(read3p);
            if edge.exists() {
                in_graph[id] = true;
                in_graph[edge.read_id() as usize] = true;
            }
        }
    }

    writeln!(w, "digraph BestOverlapGraph {{")?;
    writeln!(w, "  rankdir=LR;")?;
    writeln!(w, "  node [shape=box fontname=\"Helvetica\"];")?;
    writeln!(w, "  edge [fontname=\"Helvetica\"];")?;
    writeln!(w)?;

    for (id, node) in graph.reads.iter().enumerate().skip(1) {
        if !in_graph[id] {
            continue;
        }
        writeln!(
            w,
            "  \"{}\" [label=\"{}\\n{}bp\" style=filled fillcolor={}];",
            id,
            id,
            reads.read_length(id as u32),
            flag_color(node)
        )?;
    }

    writeln!(w)?;

    for (id, node) in graph.reads.iter().enumerate().skip(1) {
        for read3p in [false, true] {
            let edge = node.best_edge(read3p);
            if !edge.exists() {
                continue;
            }
            writeln!(
                w,
                "  \"{}\" -> \"{}\" [label=\"{}:{}\"];",
                id,
                edge.read_id(),
                if read3p { "3'" } else { "5'" },
                if edge.read3p() { "3'" } else { "5'" }
            )?;
        }
    }

    writeln!(w, "}}")?;
    w.flush()
}
