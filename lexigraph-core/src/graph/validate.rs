// Input diagnostics.
//
// None of these are errors: the engine renders what it can and skips the rest.
// They are reported so the host can log them.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::{Graph, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GraphIssue {
    /// A link endpoint does not name any node. The link is not rendered.
    DanglingLink { link: usize, missing: NodeId },
    /// A link whose source and target are the same node. Ignored by the link force.
    SelfLink { link: usize, node: NodeId },
    /// A repeated node id. Only the first occurrence is rendered.
    DuplicateNode { index: usize, id: NodeId },
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIssue::DanglingLink { link, missing } => {
                write!(f, "link #{link} references missing node '{missing}'")
            }
            GraphIssue::SelfLink { link, node } => write!(f, "link #{link} is a self-link on '{node}'"),
            GraphIssue::DuplicateNode { index, id } => write!(f, "node #{index} repeats id '{id}'"),
        }
    }
}

impl Graph {
    /// Collect input anomalies in node order, then link order.
    pub fn validate(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();
        let mut seen: HashSet<&NodeId> = HashSet::new();

        for (index, node) in self.nodes.iter().enumerate() {
            if !seen.insert(&node.id) {
                issues.push(GraphIssue::DuplicateNode { index, id: node.id.clone() });
            }
        }

        for (link, l) in self.links.iter().enumerate() {
            let mut dangling = false;
            for end in [&l.source, &l.target] {
                if !seen.contains(end) {
                    issues.push(GraphIssue::DanglingLink { link, missing: end.clone() });
                    dangling = true;
                    break;
                }
            }
            if !dangling && l.source == l.target {
                issues.push(GraphIssue::SelfLink { link, node: l.source.clone() });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, LinkType, Node, NodeType};

    #[test]
    fn test_validate_reports_each_kind() {
        let graph = Graph::new(
            vec![
                Node::new("a", NodeType::Root, "a"),
                Node::new("b", NodeType::Word, "b"),
                Node::new("a", NodeType::Word, "dup"),
            ],
            vec![
                Link::new("a", "b", LinkType::HasWord),
                Link::new("a", "ghost", LinkType::HasWord),
                Link::new("b", "b", LinkType::Etym),
            ],
        );

        let issues = graph.validate();
        assert_eq!(
            issues,
            vec![
                GraphIssue::DuplicateNode { index: 2, id: NodeId::from("a") },
                GraphIssue::DanglingLink { link: 1, missing: NodeId::from("ghost") },
                GraphIssue::SelfLink { link: 2, node: NodeId::from("b") },
            ]
        );
        assert_eq!(issues[1].to_string(), "link #1 references missing node 'ghost'");
    }

    #[test]
    fn test_validate_clean_graph() {
        let graph = Graph::new(
            vec![Node::new("a", NodeType::Root, "a"), Node::new("b", NodeType::Word, "b")],
            vec![Link::new("a", "b", LinkType::HasWord)],
        );
        assert!(graph.validate().is_empty());
    }
}
