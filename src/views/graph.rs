//! Graph summary: connection counts and clusters derived from edges.
//!
//! The canvas itself is not drawn here; this is the data it needs. Edges are
//! taken as given: duplicates count twice, and edges whose endpoints are not
//! in the item set are reported as dangling and otherwise ignored.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Edge, WorkItem, WorkItemStatus, WorkItemType};

/// Disjoint-set forest over item indices, with path halving and union by
/// size.
#[derive(Debug, Clone)]
struct Clusters {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl Clusters {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut a, mut b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        if self.size[a] < self.size[b] {
            std::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
    }

    /// Groups of indices, each in ascending order, groups ordered by their
    /// smallest member.
    fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut order: Vec<usize> = Vec::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            let group = by_root.entry(root).or_default();
            if group.is_empty() {
                order.push(root);
            }
            group.push(i);
        }
        order
            .into_iter()
            .filter_map(|root| by_root.remove(&root))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    pub status: WorkItemStatus,
    /// Edges pointing at this node
    pub incoming: usize,
    /// Edges leaving this node
    pub outgoing: usize,
}

impl GraphNode {
    pub fn connections(&self) -> usize {
        self.incoming + self.outgoing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub nodes: Vec<GraphNode>,
    pub edge_count: usize,
    /// Edges with at least one endpoint outside the item set
    pub dangling_edges: usize,
    /// Keyed by edge type wire string
    pub edge_types: BTreeMap<String, usize>,
    /// Connected components with two or more members, largest first
    pub clusters: Vec<Vec<String>>,
    /// Items with no edges at all
    pub isolated: usize,
}

impl GraphSummary {
    /// Nodes sorted by total connections, most connected first.
    pub fn most_connected(&self, limit: usize) -> Vec<&GraphNode> {
        let mut nodes: Vec<&GraphNode> = self.nodes.iter().collect();
        nodes.sort_by_key(|n| std::cmp::Reverse(n.connections()));
        nodes.truncate(limit);
        nodes
    }
}

pub fn build(items: &[&WorkItem], edges: &[Edge]) -> GraphSummary {
    let index: HashMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id.as_str(), i))
        .collect();

    let mut nodes: Vec<GraphNode> = items
        .iter()
        .map(|item| GraphNode {
            id: item.id.clone(),
            title: item.title.clone(),
            item_type: item.item_type,
            status: item.status.display_status(),
            incoming: 0,
            outgoing: 0,
        })
        .collect();

    let mut clusters = Clusters::new(items.len());
    let mut edge_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut dangling_edges = 0;

    for edge in edges {
        *edge_types
            .entry(edge.edge_type.as_str().to_string())
            .or_insert(0) += 1;

        let source = index.get(edge.source.as_str()).copied();
        let target = index.get(edge.target.as_str()).copied();
        if let Some(s) = source {
            nodes[s].outgoing += 1;
        }
        if let Some(t) = target {
            nodes[t].incoming += 1;
        }
        match (source, target) {
            (Some(s), Some(t)) => clusters.union(s, t),
            _ => dangling_edges += 1,
        }
    }

    let mut groups: Vec<Vec<String>> = clusters
        .groups()
        .into_iter()
        .filter(|group| group.len() > 1)
        .map(|group| group.into_iter().map(|i| nodes[i].id.clone()).collect())
        .collect();
    groups.sort_by_key(|group: &Vec<String>| std::cmp::Reverse(group.len()));

    GraphSummary {
        isolated: nodes.iter().filter(|n| n.connections() == 0).count(),
        edge_count: edges.len(),
        dangling_edges,
        edge_types,
        clusters: groups,
        nodes,
    }
}
