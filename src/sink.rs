use crate::config::SinkConfig;
use crate::graph::Graph;
use crate::Result;

use std::path::Path;
use tokio::fs;

/// Writes the finished graph to a JSON file the renderer loads directly.
pub struct Sink<'a> {
    config: &'a SinkConfig,
}

impl Sink<'_> {
    pub fn new(config: &SinkConfig) -> Sink {
        Sink { config }
    }

    pub async fn write(&self, graph: &Graph, path: Option<&str>) -> Result<()> {
        let path = path.unwrap_or(&self.config.path);
        let json = serde_json::to_string_pretty(graph)?;

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(path, json).await?;

        println!("Wrote graph to {}.", path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ExtraData, Link, Metadata, Node, NodeType};

    fn graph() -> Graph {
        Graph {
            nodes: vec![Node {
                id: "music-vespertine".to_owned(),
                node_type: NodeType::Media,
                name: "Vespertine".to_owned(),
                category: Some("music".to_owned()),
                data: ExtraData::default(),
            }],
            links: vec![Link {
                source: "shelf-complete".to_owned(),
                target: "music-vespertine".to_owned(),
                link_type: "contains".to_owned(),
                value: 1,
            }],
            metadata: Metadata {
                media_types: vec!["music".to_owned()],
                creator_types: vec![],
                last_updated: "2024-05-01T12:00:00Z".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn test_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("graph.json");
        let path = path.to_str().unwrap().to_owned();

        let config = SinkConfig {
            path: "data/neodb-data.json".to_owned(),
        };
        let sink = Sink::new(&config);
        sink.write(&graph(), Some(&path)).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        // Two-space indentation, keys renamed for the renderer.
        assert!(written.starts_with("{\n  \"nodes\""));
        assert!(written.contains("\"mediaTypes\""));

        let parsed: Graph = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, graph());
    }

    #[tokio::test]
    async fn test_write_preserves_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let path = path.to_str().unwrap().to_owned();

        let mut graph = graph();
        graph.nodes[0].name = "僕だけがいない街".to_owned();

        let config = SinkConfig {
            path: "data/neodb-data.json".to_owned(),
        };
        let sink = Sink::new(&config);
        sink.write(&graph, Some(&path)).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("僕だけがいない街"));
    }
}
