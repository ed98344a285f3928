use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::configs::{GraphConfig, PathSeedConfig};

#[derive(Parser)]
#[command(name = "best_edge_graph", version = "1.0.0", about = "Best overlap graph and path seeds for long-read assembly")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log stage summaries
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log per-pass details
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log everything
    #[arg(long, global = true)]
    pub trace: bool,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.trace {
            "trace"
        } else if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a PAF file into a binary overlap store
    ImportPaf(ImportPafArgs),

    /// Build the best overlap graph and the path-seed order
    BestOverlapGraph(BestOverlapGraphArgs),
}

#[derive(Args)]
pub struct ImportPafArgs {
    /// Input PAF file
    #[arg(short, long)]
    pub input_paf: String,

    /// Output overlap store
    #[arg(short, long, default_value = "overlaps.bin")]
    pub output: String,

    /// Minimum alignment block length
    #[arg(short = 'l', long, default_value_t = 500)]
    pub min_overlap_length: u32,
}

#[derive(Args)]
#[command(group(ArgGroup::new("input").required(true).args(["overlap_binary", "input_paf"])))]
pub struct BestOverlapGraphArgs {
    /// Overlap store written by import-paf
    #[arg(short = 'b', long)]
    pub overlap_binary: Option<String>,

    /// PAF file, imported on the fly
    #[arg(short, long)]
    pub input_paf: Option<String>,

    /// Minimum alignment block length when importing PAF
    #[arg(short = 'l', long, default_value_t = 500)]
    pub min_overlap_length: u32,

    /// Report file prefix, no reports without it
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Label used in report file names
    #[arg(long, default_value = "best")]
    pub label: String,

    /// Maximum error rate of graph edges (fraction)
    #[arg(short, long, default_value_t = 0.075)]
    pub erate_graph: f64,

    /// Deviations above the median error rate still accepted
    #[arg(short, long, default_value_t = 6.0)]
    pub deviation_graph: f64,

    /// Minimum overlap length as a fraction of the shorter read
    #[arg(short, long, default_value_t = 0.0)]
    pub min_olap_fraction: f64,

    /// Bases overlaps must share to count as continuous coverage
    #[arg(long, default_value_t = 500)]
    pub cov_gap_olap: u32,

    /// Percent difference between the two best overlaps of a read
    #[arg(long, default_value_t = 25.0)]
    pub lopsided_diff: f64,

    /// Longest dead-end walk, in reads, treated as a spur
    #[arg(long, default_value_t = 3)]
    pub spur_depth: u32,

    #[arg(long)]
    pub no_coverage_gap: bool,

    #[arg(long)]
    pub no_high_error: bool,

    #[arg(long)]
    pub no_lopsided: bool,

    #[arg(long)]
    pub no_spur: bool,

    /// Write every overlap passing the quality filter
    #[arg(long)]
    pub emit_good_overlaps: bool,

    /// Write the best edges as a DOT graph
    #[arg(long)]
    pub emit_dot: bool,
}

impl From<&BestOverlapGraphArgs> for GraphConfig {
    fn from(args: &BestOverlapGraphArgs) -> Self {
        Self {
            erate_graph: args.erate_graph,
            deviation_graph: args.deviation_graph,
            min_olap_fraction: args.min_olap_fraction,
            filter_coverage_gap: !args.no_coverage_gap,
            cov_gap_olap: args.cov_gap_olap,
            filter_high_error: !args.no_high_error,
            filter_lopsided: !args.no_lopsided,
            lopsided_diff: args.lopsided_diff,
            filter_spur: !args.no_spur,
            spur_depth: args.spur_depth,
            prefix: args.prefix.clone(),
            label: args.label.clone(),
            emit_good_overlaps: args.emit_good_overlaps,
            emit_dot: args.emit_dot,
        }
    }
}

impl From<&BestOverlapGraphArgs> for PathSeedConfig {
    fn from(args: &BestOverlapGraphArgs) -> Self {
        Self { prefix: args.prefix.clone() }
    }
}
