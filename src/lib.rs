mod config;
mod error;
mod graph;
mod options;
mod sink;
mod sources;

pub use config::Config;
pub use error::CustomError;
pub use graph::{sanitize_id, Graph, GraphBuilder, Link, Node, NodeType};
pub use options::{ExtractOptions, RunOptions};
pub use sources::neodb_api::{Credit, MediaKind, MediaRecord};

use sink::Sink;
use sources::{Extract, NeoDBAPI, Sources};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct Aggregator {
    config: Config,
}

impl Aggregator {
    pub fn new(config: Config) -> Aggregator {
        Aggregator { config }
    }

    async fn extract(&self, options: Option<ExtractOptions>) -> Result<Vec<MediaRecord>> {
        let sources = Sources {
            neodb_api: NeoDBAPI::new(&self.config),
        };

        sources.neodb_api.extract(options).await
    }

    fn transform(&self, records: &[MediaRecord]) -> Result<Graph> {
        let builder = GraphBuilder::new();

        Ok(builder.build(records))
    }

    async fn load(&self, graph: &Graph, output: Option<&str>) -> Result<()> {
        let sink = Sink::new(&self.config.sink);

        sink.write(graph, output).await
    }

    pub async fn run(&mut self, options: Option<RunOptions>) -> Result<Graph> {
        let (extract_options, output) = match options {
            Some(options) => (options.extract_options, options.output),
            None => (None, None),
        };

        let records = self.extract(extract_options).await?;
        let graph = self.transform(&records)?;
        self.load(&graph, output.as_deref()).await?;

        Ok(graph)
    }
}
