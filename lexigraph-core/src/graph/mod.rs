//! Typed node/link data model handed to the engine by the data layer.
//!
//! A [`Graph`] is replaced wholesale on every expansion. The engine never
//! mutates it; all derived layout state lives in side tables keyed by index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

mod types;
mod validate;

pub use types::{Link, LinkType, Node, NodeId, NodeType, Point};
pub use validate::GraphIssue;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    pub fn from_json(input: &str) -> Result<Self, GraphError> {
        serde_json::from_str(input).map_err(GraphError::Decode)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Map from id to node index. The first occurrence of a duplicated id wins.
    pub fn node_index(&self) -> HashMap<&NodeId, usize> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            index.entry(&node.id).or_insert(i);
        }
        index
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Copy with duplicate node ids dropped (first occurrence kept). Links are
    /// kept as given; dangling ones are skipped later during resolution.
    pub fn deduplicated(&self) -> Graph {
        let index = self.node_index();
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| index.get(&n.id) == Some(i))
            .map(|(_, n)| n.clone())
            .collect();
        Graph { nodes, links: self.links.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_field_names() {
        let graph = Graph::from_json(
            r#"{
                "nodes": [
                    {"id": "r1", "type": "root", "label": "k-t-b"},
                    {"id": "w1", "type": "word", "label": "kitab", "dataSize": 12,
                     "semanticFields": {"wordType": "noun"}},
                    {"id": "c1", "type": "corpusItem"}
                ],
                "links": [
                    {"source": "r1", "target": "w1", "type": "HAS_WORD"},
                    {"source": "w1", "target": "c1", "type": "APPEARS_IN"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[1].node_type, NodeType::Word);
        assert_eq!(graph.nodes[1].data_size(), 12.0);
        assert_eq!(graph.nodes[2].node_type, NodeType::CorpusItem);
        assert_eq!(graph.nodes[2].display_label(), "c1");
        assert_eq!(graph.links[0].link_type, LinkType::HasWord);
        assert_eq!(graph.links[1].link_type, LinkType::Other("APPEARS_IN".to_string()));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(Graph::from_json("{nodes: ["), Err(GraphError::Decode(_))));
    }

    #[test]
    fn test_link_type_round_trips_unknown_kind() {
        let json = serde_json::to_string(&LinkType::Other("SEE_ALSO".to_string())).unwrap();
        assert_eq!(json, "\"SEE_ALSO\"");
        let json = serde_json::to_string(&LinkType::UsedIn).unwrap();
        assert_eq!(json, "\"USED_IN\"");
    }

    #[test]
    fn test_deduplicated_keeps_first() {
        let mut first = Node::new("a", NodeType::Word, "first");
        first.data_size = 3.0;
        let graph = Graph::new(
            vec![first, Node::new("b", NodeType::Root, "b"), Node::new("a", NodeType::Word, "second")],
            vec![Link::new("b", "a", LinkType::HasWord)],
        );

        let deduped = graph.deduplicated();
        assert_eq!(deduped.nodes.len(), 2);
        assert_eq!(deduped.nodes[0].label, "first");
        assert_eq!(deduped.links.len(), 1);
    }

    #[test]
    fn test_negative_data_size_clamped() {
        let mut node = Node::new("a", NodeType::Word, "a");
        node.data_size = -4.0;
        assert_eq!(node.data_size(), 0.0);
        node.data_size = f64::NAN;
        assert_eq!(node.data_size(), 0.0);
    }
}
