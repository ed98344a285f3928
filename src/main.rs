use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use best_edge_graph::cli::{BestOverlapGraphArgs, Cli, Commands, ImportPafArgs};
use best_edge_graph::{AssemblyContext, GraphConfig, OverlapStore, PathSeedConfig, ReadInfo};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level())).init();

    match &cli.command {
        Commands::ImportPaf(args) => run_import_paf(args),
        Commands::BestOverlapGraph(args) => run_best_overlap_graph(args),
    }
}

fn run_import_paf(args: &ImportPafArgs) -> Result<()> {
    info!("=== PAF IMPORT ===");
    let (store, _stats) = OverlapStore::from_paf(&args.input_paf, args.min_overlap_length)
        .with_context(|| format!("failed to import {}", args.input_paf))?;

    store.save(&args.output).with_context(|| format!("failed to write {}", args.output))?;
    info!("Overlap store written to {}", args.output);
    info!("=== PAF IMPORT FINISHED ===");
    Ok(())
}

fn run_best_overlap_graph(args: &BestOverlapGraphArgs) -> Result<()> {
    let store = match (&args.overlap_binary, &args.input_paf) {
        (Some(path), _) => OverlapStore::load(path).with_context(|| format!("failed to load {}", path))?,
        (None, Some(path)) => {
            OverlapStore::from_paf(path, args.min_overlap_length)
                .with_context(|| format!("failed to import {}", path))?
                .0
        }
        (None, None) => anyhow::bail!("no overlap input given"),
    };
    info!("Loaded {} reads with {} overlaps", store.num_reads(), store.num_overlaps());

    let graph_config = GraphConfig::from(args);
    let seed_config = PathSeedConfig::from(args);

    let context = AssemblyContext::build(&store, &store, &graph_config, &seed_config)
        .context("failed to build the best overlap graph")?;

    let seeds = context.seeds.entries().iter().take_while(|e| e.path_len > 0);
    for (rank, seed) in seeds.take(10).enumerate() {
        debug!("Seed {}: {} ({} hops)", rank + 1, store.read_name(seed.read_id), seed.path_len);
    }

    info!("Best edges: {}", context.graph.num_edges());
    info!("Path seeds: {}", context.seeds.num_seeds());
    Ok(())
}
