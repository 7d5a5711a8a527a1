use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Media,
    Creator,
    Genre,
    Tag,
    Shelf,
}

impl NodeType {
    /// Sort rank: media first, then creators, then genres, everything else
    /// last.
    pub fn ordinal(&self) -> u8 {
        match self {
            NodeType::Media => 0,
            NodeType::Creator => 1,
            NodeType::Genre => 2,
            _ => 3,
        }
    }
}

/// Attributes attached to a node at creation time. Absent values stay out of
/// the serialized document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExtraData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_logged: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_count: Option<u64>,
}

impl ExtraData {
    pub fn is_empty(&self) -> bool {
        *self == ExtraData::default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "ExtraData::is_empty")]
    pub data: ExtraData,
}

impl Node {
    pub(crate) fn sort_key(&self) -> (u8, &str, &str) {
        (
            self.node_type.ordinal(),
            self.category.as_deref().unwrap_or(""),
            &self.name,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(rename = "mediaTypes")]
    pub media_types: Vec<String>,
    #[serde(rename = "creatorTypes")]
    pub creator_types: Vec<String>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_serialization() {
        let node = Node {
            id: "genre-noir".to_owned(),
            node_type: NodeType::Genre,
            name: "Noir".to_owned(),
            category: None,
            data: ExtraData {
                media_count: Some(2),
                ..ExtraData::default()
            },
        };

        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "id": "genre-noir",
                "type": "genre",
                "name": "Noir",
                "data": { "media_count": 2 }
            })
        );
    }

    #[test]
    fn test_empty_data_skipped() {
        let node = Node {
            id: "tag-space".to_owned(),
            node_type: NodeType::Tag,
            name: "space".to_owned(),
            category: None,
            data: ExtraData::default(),
        };

        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("data").is_none());
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_link_serialization() {
        let link = Link {
            source: "movie-blade-runner".to_owned(),
            target: "creator-ridley-scott".to_owned(),
            link_type: "movie-director".to_owned(),
            value: 3,
        };

        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            json!({
                "source": "movie-blade-runner",
                "target": "creator-ridley-scott",
                "type": "movie-director",
                "value": 3
            })
        );
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(NodeType::Media.ordinal(), 0);
        assert_eq!(NodeType::Creator.ordinal(), 1);
        assert_eq!(NodeType::Genre.ordinal(), 2);
        assert_eq!(NodeType::Tag.ordinal(), 3);
        assert_eq!(NodeType::Shelf.ordinal(), 3);
    }
}
