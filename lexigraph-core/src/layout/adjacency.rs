// Link resolution and connectivity for layout.
//
// Resolves link endpoints to node indices once per graph so the per-tick
// forces work on plain indices. Used to:
// 1. Skip links that reference missing nodes
// 2. Derive per-link spring strength and bias from endpoint degrees
// 3. Find anchor -> word parent/child pairs for the orbital layout

use std::collections::HashMap;

use crate::graph::Graph;

/// A link whose endpoints both exist in the graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Index into `graph.links`.
    pub link: usize,
    pub source: usize,
    pub target: usize,
}

impl ResolvedLink {
    pub fn is_self_link(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    /// Resolvable links in input order, self-links included. `springs()` and
    /// the frame output skip self-links.
    pub links: Vec<ResolvedLink>,

    /// For each node, list of (neighbor, link_count), sorted by neighbor index.
    /// Self-links are not counted.
    pub neighbors: Vec<Vec<(usize, usize)>>,

    /// Number of non-self links touching each node.
    pub degree: Vec<usize>,
}

impl Adjacency {
    /// Resolve the graph's links. Duplicate node ids resolve to their first occurrence.
    pub fn from_graph(graph: &Graph) -> Self {
        let index = graph.node_index();
        let n = graph.nodes.len();

        let links: Vec<ResolvedLink> = graph
            .links
            .iter()
            .enumerate()
            .filter_map(|(i, l)| {
                let source = *index.get(&l.source)?;
                let target = *index.get(&l.target)?;
                Some(ResolvedLink { link: i, source, target })
            })
            .collect();

        // Count links between pairs
        let mut pair_counts: HashMap<(usize, usize), usize> = HashMap::new();
        for l in links.iter().filter(|l| !l.is_self_link()) {
            let pair = if l.source <= l.target { (l.source, l.target) } else { (l.target, l.source) };
            *pair_counts.entry(pair).or_default() += 1;
        }

        let mut neighbors: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
        let mut degree = vec![0; n];
        for ((a, b), count) in pair_counts {
            neighbors[a].push((b, count));
            neighbors[b].push((a, count));
            degree[a] += count;
            degree[b] += count;
        }
        for list in neighbors.iter_mut() {
            list.sort_unstable();
        }

        Self { links, neighbors, degree }
    }

    /// Get the neighbors of a node, or empty slice if none.
    pub fn get_neighbors(&self, node: usize) -> &[(usize, usize)] {
        self.neighbors.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn get_degree(&self, node: usize) -> usize {
        self.degree.get(node).copied().unwrap_or(0)
    }

    /// Links that actually pull: resolvable and not self-links.
    pub fn springs(&self) -> impl Iterator<Item = &ResolvedLink> {
        self.links.iter().filter(|l| !l.is_self_link())
    }

    /// Anchor (root/form) -> word pairs in link order, regardless of link
    /// direction. A word reached from several anchors keeps the first one.
    pub fn anchor_children(&self, graph: &Graph) -> Vec<(usize, usize)> {
        let mut parent_of: HashMap<usize, usize> = HashMap::new();
        let mut pairs = Vec::new();

        for l in self.springs() {
            let (s, t) = (&graph.nodes[l.source], &graph.nodes[l.target]);
            let pair = if s.node_type.is_anchor() && t.node_type == crate::graph::NodeType::Word {
                (l.source, l.target)
            } else if t.node_type.is_anchor() && s.node_type == crate::graph::NodeType::Word {
                (l.target, l.source)
            } else {
                continue;
            };
            if parent_of.contains_key(&pair.1) {
                continue;
            }
            parent_of.insert(pair.1, pair.0);
            pairs.push(pair);
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, LinkType, Node, NodeType};

    fn make_test_graph() -> Graph {
        // root -> a, root -> b, a -> b (etym), plus a dangling link and a self link
        Graph::new(
            vec![
                Node::new("root", NodeType::Root, "root"),
                Node::new("a", NodeType::Word, "a"),
                Node::new("b", NodeType::Word, "b"),
            ],
            vec![
                Link::new("root", "a", LinkType::HasWord),
                Link::new("b", "root", LinkType::HasRoot),
                Link::new("a", "b", LinkType::Etym),
                Link::new("a", "missing", LinkType::Etym),
                Link::new("b", "b", LinkType::Etym),
            ],
        )
    }

    #[test]
    fn test_adjacency_from_graph() {
        let graph = make_test_graph();
        let adj = Adjacency::from_graph(&graph);

        assert_eq!(adj.links.len(), 4);
        assert_eq!(adj.springs().count(), 3);
        assert_eq!(adj.get_degree(0), 2);
        assert_eq!(adj.get_degree(1), 2);
        assert_eq!(adj.get_degree(2), 2);
        assert_eq!(adj.get_neighbors(1), &[(0, 1), (2, 1)]);
        assert_eq!(adj.get_degree(99), 0);
    }

    #[test]
    fn test_anchor_children_either_direction() {
        let graph = make_test_graph();
        let adj = Adjacency::from_graph(&graph);

        assert_eq!(adj.anchor_children(&graph), vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn test_word_keeps_first_anchor() {
        let graph = Graph::new(
            vec![
                Node::new("f1", NodeType::Form, "f1"),
                Node::new("f2", NodeType::Form, "f2"),
                Node::new("w", NodeType::Word, "w"),
            ],
            vec![Link::new("f2", "w", LinkType::HasWord), Link::new("f1", "w", LinkType::HasWord)],
        );
        let adj = Adjacency::from_graph(&graph);
        assert_eq!(adj.anchor_children(&graph), vec![(1, 2)]);
    }
}
