//! Size and degree statistics over a graph.
//!
//! Used to normalize the log radius scale and logged when a graph is accepted.
//! Independent of rendering.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::graph::{Graph, GraphIssue, NodeType};

/// Summary of a set of `dataSize` values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeDistribution {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
}

impl SizeDistribution {
    pub fn from_values(mut values: Vec<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 1 {
            values[count / 2]
        } else {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        };

        Self {
            count,
            min: values[0],
            max: values[count - 1],
            mean,
            median,
            p90: percentile(&values, 0.9),
        }
    }
}

/// Nearest-rank percentile over sorted values.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetrics {
    pub node_count: usize,
    pub link_count: usize,
    pub dangling_links: usize,
    pub self_links: usize,
    pub duplicate_nodes: usize,
    pub max_degree: usize,
    pub nodes_by_type: BTreeMap<NodeType, usize>,
    pub data_size: BTreeMap<NodeType, SizeDistribution>,
}

impl GraphMetrics {
    pub fn compute(graph: &Graph) -> Self {
        let mut metrics = GraphMetrics {
            node_count: graph.nodes.len(),
            link_count: graph.links.len(),
            ..Default::default()
        };

        for issue in graph.validate() {
            match issue {
                GraphIssue::DanglingLink { .. } => metrics.dangling_links += 1,
                GraphIssue::SelfLink { .. } => metrics.self_links += 1,
                GraphIssue::DuplicateNode { .. } => metrics.duplicate_nodes += 1,
            }
        }

        let mut sizes: BTreeMap<NodeType, Vec<f64>> = BTreeMap::new();
        for node in &graph.nodes {
            *metrics.nodes_by_type.entry(node.node_type).or_default() += 1;
            sizes.entry(node.node_type).or_default().push(node.data_size());
        }
        metrics.data_size = sizes
            .into_iter()
            .map(|(t, values)| (t, SizeDistribution::from_values(values)))
            .collect();

        let index = graph.node_index();
        let mut degree: HashMap<usize, usize> = HashMap::new();
        for link in &graph.links {
            if let (Some(&s), Some(&t)) = (index.get(&link.source), index.get(&link.target)) {
                *degree.entry(s).or_default() += 1;
                if s != t {
                    *degree.entry(t).or_default() += 1;
                }
            }
        }
        metrics.max_degree = degree.values().copied().max().unwrap_or(0);

        metrics
    }

    /// Largest `dataSize` among nodes of `node_type`, or 0.
    pub fn max_data_size(&self, node_type: NodeType) -> f64 {
        self.data_size.get(&node_type).map(|d| d.max).unwrap_or(0.0)
    }

    pub fn count(&self, node_type: NodeType) -> usize {
        self.nodes_by_type.get(&node_type).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} nodes ({} roots, {} forms, {} words, {} corpus items), {} links, max degree {}",
            self.node_count,
            self.count(NodeType::Root),
            self.count(NodeType::Form),
            self.count(NodeType::Word),
            self.count(NodeType::CorpusItem),
            self.link_count,
            self.max_degree,
        )
    }
}
