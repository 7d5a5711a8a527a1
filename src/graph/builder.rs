use crate::graph::node::{ExtraData, Graph, Link, Metadata, Node, NodeType};
use crate::sources::neodb_api::{MediaKind, MediaRecord};

use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const CREATOR_LINK_VALUE: u64 = 3;
const GENRE_LINK_VALUE: u64 = 2;
const TAG_LINK_VALUE: u64 = 1;
const SHELF_LINK_VALUE: u64 = 1;

/// Derives a stable identifier fragment from display text: lowercase, runs
/// of characters outside `[a-z0-9]` collapse to a single `-`. Text with no
/// usable characters maps to "unknown".
pub fn sanitize_id(text: &str) -> String {
    let lowered = text.to_lowercase();
    let segments: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        "unknown".to_owned()
    } else {
        segments.join("-")
    }
}

/// Identifier-keyed node collection with insert-if-absent semantics. The
/// first insertion for an id wins; later ones are no-ops and never merge
/// attributes.
#[derive(Debug, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    seen: HashSet<String>,
}

impl NodeTable {
    pub fn add(&mut self, node: Node) {
        if self.seen.contains(&node.id) {
            return;
        }

        self.seen.insert(node.id.to_owned());
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Canonical ordering independent of insertion (and so of API
    /// pagination) order.
    fn into_sorted(mut self) -> Vec<Node> {
        self.nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.nodes
    }
}

#[derive(Debug, Default)]
struct MediaCounts {
    creators: HashMap<String, u64>,
    genres: HashMap<String, u64>,
    tags: HashMap<String, u64>,
    shelves: HashMap<String, u64>,
}

/// Turns one batch of media records into a node/link graph. All state lives
/// in the builder, which the caller constructs fresh for each run.
pub struct GraphBuilder {
    table: NodeTable,
    counts: MediaCounts,
    links: Vec<Link>,
    year_re: Regex,
}

impl GraphBuilder {
    pub fn new() -> GraphBuilder {
        GraphBuilder {
            table: NodeTable::default(),
            counts: MediaCounts::default(),
            links: Vec::new(),
            year_re: Regex::new(r"\d{4}").unwrap(),
        }
    }

    pub fn build(mut self, records: &[MediaRecord]) -> Graph {
        self.count(records);

        for record in records {
            self.add_record(record);
        }

        self.finish()
    }

    /// First pass: occurrence totals per entity id. Must run before any node
    /// is created, because a node's data is frozen on first insertion.
    fn count(&mut self, records: &[MediaRecord]) {
        for record in records {
            let (credits, _) = record.credits();
            for credit in credits {
                if let Some(name) = &credit.name {
                    let id = format!("creator-{}", sanitize_id(name));
                    *self.counts.creators.entry(id).or_insert(0) += 1;
                }
            }

            for genre in &record.genre {
                let id = format!("genre-{}", sanitize_id(genre));
                *self.counts.genres.entry(id).or_insert(0) += 1;
            }

            for tag in &record.keywords {
                let id = format!("tag-{}", sanitize_id(tag));
                *self.counts.tags.entry(id).or_insert(0) += 1;
            }

            if let Some(shelf) = &record.shelf {
                let id = format!("shelf-{}", sanitize_id(shelf));
                *self.counts.shelves.entry(id).or_insert(0) += 1;
            }
        }
    }

    /// Second pass: nodes and links for one record. Every referenced node is
    /// inserted before the link that points at it is appended.
    fn add_record(&mut self, record: &MediaRecord) {
        let slug = record.kind.slug();
        let item_id = format!(
            "{}-{}",
            slug,
            sanitize_id(record.name.as_deref().unwrap_or(""))
        );
        let name = match &record.name {
            Some(name) => name.to_owned(),
            None => format!("Unknown {}", record.kind.label()),
        };

        let year = record
            .date_published
            .as_deref()
            .and_then(|date| self.year_re.find(date))
            .map(|m| m.as_str().to_owned());

        let mut data = ExtraData {
            rating: record.rating,
            year,
            date_logged: record.date_logged.to_owned(),
            url: record.url.to_owned(),
            ..ExtraData::default()
        };
        match record.kind {
            MediaKind::Book => {
                data.isbn = record.isbn.to_owned();
                data.pages = record.pages;
            }
            MediaKind::Movie | MediaKind::TvSeries => {
                data.duration = record.duration.to_owned();
            }
            _ => {}
        }

        self.table.add(Node {
            id: item_id.to_owned(),
            node_type: NodeType::Media,
            name,
            category: Some(slug.to_owned()),
            data,
        });

        let (credits, role) = record.credits();
        for credit in credits {
            let creator_name = match &credit.name {
                Some(name) => name,
                None => continue,
            };
            let creator_id = format!("creator-{}", sanitize_id(creator_name));

            self.table.add(Node {
                id: creator_id.to_owned(),
                node_type: NodeType::Creator,
                name: creator_name.to_owned(),
                category: Some(role.to_owned()),
                data: ExtraData {
                    media_count: self.counts.creators.get(&creator_id).copied(),
                    ..ExtraData::default()
                },
            });

            self.links.push(Link {
                source: item_id.to_owned(),
                target: creator_id,
                link_type: format!("{}-{}", slug, role),
                value: CREATOR_LINK_VALUE,
            });
        }

        for genre in &record.genre {
            let genre_id = format!("genre-{}", sanitize_id(genre));

            self.table.add(Node {
                id: genre_id.to_owned(),
                node_type: NodeType::Genre,
                name: genre.to_owned(),
                category: None,
                data: ExtraData {
                    media_count: self.counts.genres.get(&genre_id).copied(),
                    ..ExtraData::default()
                },
            });

            self.links.push(Link {
                source: item_id.to_owned(),
                target: genre_id,
                link_type: format!("{}-genre", slug),
                value: GENRE_LINK_VALUE,
            });
        }

        for tag in &record.keywords {
            let tag_id = format!("tag-{}", sanitize_id(tag));

            self.table.add(Node {
                id: tag_id.to_owned(),
                node_type: NodeType::Tag,
                name: tag.to_owned(),
                category: None,
                data: ExtraData {
                    media_count: self.counts.tags.get(&tag_id).copied(),
                    ..ExtraData::default()
                },
            });

            self.links.push(Link {
                source: item_id.to_owned(),
                target: tag_id,
                link_type: format!("{}-tag", slug),
                value: TAG_LINK_VALUE,
            });
        }

        if let Some(shelf) = &record.shelf {
            let shelf_id = format!("shelf-{}", sanitize_id(shelf));

            self.table.add(Node {
                id: shelf_id.to_owned(),
                node_type: NodeType::Shelf,
                name: shelf.to_owned(),
                category: None,
                data: ExtraData {
                    media_count: self.counts.shelves.get(&shelf_id).copied(),
                    ..ExtraData::default()
                },
            });

            self.links.push(Link {
                source: shelf_id,
                target: item_id,
                link_type: "contains".to_owned(),
                value: SHELF_LINK_VALUE,
            });
        }
    }

    fn finish(self) -> Graph {
        let nodes = self.table.into_sorted();

        let media_types: BTreeSet<String> = nodes
            .iter()
            .filter(|node| node.node_type == NodeType::Media)
            .filter_map(|node| node.category.to_owned())
            .collect();
        let creator_types: BTreeSet<String> = nodes
            .iter()
            .filter(|node| node.node_type == NodeType::Creator)
            .filter_map(|node| node.category.to_owned())
            .collect();

        let last_updated = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        Graph {
            nodes,
            links: self.links,
            metadata: Metadata {
                media_types: media_types.into_iter().collect(),
                creator_types: creator_types.into_iter().collect(),
                last_updated,
            },
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> GraphBuilder {
        GraphBuilder::new()
    }
}
