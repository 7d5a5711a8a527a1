use neodb_aggregator::{Aggregator, Config, ExtractOptions, RunOptions};

use clap::Parser;

/// Builds a node/link graph from a NeoDB user's shelves.
#[derive(Debug, Parser)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "config/config.toml")]
    config: String,
    /// Output path, overriding the configured sink path
    #[arg(short, long)]
    output: Option<String>,
    /// Shelves to fetch, overriding the configured list
    #[arg(long)]
    shelf: Vec<String>,
    /// Categories to fetch, overriding the configured list
    #[arg(long)]
    category: Vec<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = Config::from_file(&args.config);

    let extract_options = ExtractOptions {
        shelves: if args.shelf.is_empty() {
            None
        } else {
            Some(args.shelf)
        },
        categories: if args.category.is_empty() {
            None
        } else {
            Some(args.category)
        },
    };
    let options = RunOptions {
        extract_options: Some(extract_options),
        output: args.output,
    };

    let mut aggregator = Aggregator::new(config);
    match aggregator.run(Some(options)).await {
        Ok(graph) => println!(
            "Built graph with {} nodes and {} links.",
            graph.nodes.len(),
            graph.links.len()
        ),
        Err(err) => {
            eprintln!("Could not build graph: {}", err);
            std::process::exit(1);
        }
    }
}
