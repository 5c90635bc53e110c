use anyhow::Result;
use clap::Parser;

use nise_cluster_analyzer::config::Config;
use nise_cluster_analyzer::data;
use nise_cluster_analyzer::nise::{LogProgress, Nise};
use nise_cluster_analyzer::storage;

#[derive(Parser, Debug)]
#[clap(
    name = "nise",
    about = "Overlapping community detection by neighborhood-inflated seed expansion"
)]
struct Cli {
    /// Path to the input edge list (first line: vertex count, then one "i j" pair per line)
    #[clap(long, short = 'f')]
    file: String,

    /// Number of seeds to expand
    #[clap(long, short = 's', default_value = "1")]
    seeds: usize,

    /// PageRank teleportation parameter, in [0, 1)
    #[clap(long, short = 'a', default_value = "0.99")]
    alpha: f64,

    /// PageRank push tolerance, in (0, 1]
    #[clap(long, short = 'e', default_value = "0.0001")]
    epsilon: f64,

    /// Output directory for results
    #[clap(long, default_value = ".")]
    output_dir: String,

    /// Also write the loaded graph as a binary cache to this path
    /// (inputs ending in ".bin" are read as such a cache)
    #[clap(long)]
    save_graph: Option<String>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Drop expanded clusters equal to one already found
    #[clap(long)]
    skip_duplicates: bool,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = Config::new(args.seeds, args.alpha, args.epsilon)
        .with_threads(args.threads)
        .with_skip_duplicates(args.skip_duplicates);
    config.validate()?;

    let num_threads = config.resolved_threads();
    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting NISE community detection");
    log::info!("Input: {}", args.file);
    log::info!("Output: {}", args.output_dir);

    // 1. Load data
    let graph = if args.file.ends_with(".bin") {
        storage::load_graph(&args.file)?
    } else {
        data::edge_list::load_edge_list(&args.file)?
    };
    if let Some(path) = &args.save_graph {
        storage::save_graph(&graph, path)?;
    }

    // 2. Detect clusters
    let mut nise = Nise::new(&graph, config.clone()).with_observer(LogProgress::default());
    nise.execute()?;
    let clustering = nise.clustering()?;

    // 3. Save results
    storage::save_results(&graph, clustering, nise.seeds(), &config, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
