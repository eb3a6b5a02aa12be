//! VF3 matcher CLI.
//!
//! Loads a pattern and a target graph, runs the configured engine, and
//! prints `<solution_count> <elapsed_seconds>`.

mod args;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use args::{Args, EngineArg};
use vf3_graph::{load_graph_path, sort_pattern_nodes, NodeClassifier};
use vf3_match::{
    MatchContext, MatchingEngine, ParallelConfig, ParallelMatchingEngine,
    ParallelMatchingEngineWls, Vf3SubState, WlsConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let pattern = load_graph_path(&args.pattern)?;
    let target = load_graph_path(&args.target)?;
    info!(
        "pattern: {} nodes / {} edges, target: {} nodes / {} edges",
        pattern.node_count(),
        pattern.edge_count(),
        target.node_count(),
        target.edge_count()
    );

    let start = Instant::now();

    let mut classifier = NodeClassifier::new(&target);
    let pattern_classes = classifier.classify_pattern(&pattern);
    let order = sort_pattern_nodes(&pattern, &pattern_classes, &classifier);
    let target_classes = classifier.target_classes().to_vec();
    let class_count = classifier.class_count();

    let ctx = Arc::new(MatchContext::new(
        pattern,
        target,
        pattern_classes,
        target_classes,
        class_count,
        order,
    ));
    let seed = Vf3SubState::new(ctx);

    let (count, solutions) = match args.num_threads {
        None => {
            let engine = MatchingEngine::new(args.store_solutions);
            engine.find_all(&seed);
            (engine.solution_count(), engine.solutions())
        }
        Some(num_threads) => match args.engine {
            EngineArg::Basic => {
                let config = ParallelConfig {
                    num_threads,
                    store_solutions: args.store_solutions,
                    base_cpu: args.base_cpu(),
                };
                let engine = ParallelMatchingEngine::new(config)?;
                engine.find_all(&seed);
                (engine.solution_count(), engine.solutions())
            }
            EngineArg::Wls => {
                let config = WlsConfig {
                    num_threads,
                    store_solutions: args.store_solutions,
                    base_cpu: args.base_cpu(),
                    ..Default::default()
                };
                let engine = ParallelMatchingEngineWls::new(config)?;
                engine.find_all(&seed);
                (engine.solution_count(), engine.solutions())
            }
        },
    };

    let elapsed = start.elapsed().as_secs_f64();

    if args.store_solutions {
        for solution in &solutions {
            println!("{solution}");
        }
    }
    println!("{count} {elapsed}");

    Ok(())
}
