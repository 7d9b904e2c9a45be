//! Internal link graph and click-depth analysis.

use crate::finding::Finding;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use tracing::debug;

/// Directed graph over known pages; edges come from internal links only.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

/// Serializable adjacency view of a [`LinkGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    pub outbound: BTreeMap<String, BTreeSet<String>>,
    pub inbound: BTreeMap<String, BTreeSet<String>>,
}

impl LinkGraph {
    /// Create a graph with one node per known page and no edges.
    pub fn new<'a>(pages: impl IntoIterator<Item = &'a str>) -> Self {
        let mut graph = Self::default();
        for url in pages {
            if !graph.index.contains_key(url) {
                let node = graph.graph.add_node(url.to_string());
                graph.index.insert(url.to_string(), node);
            }
        }
        graph
    }

    /// Record `source -> target`. Unknown endpoints are ignored; repeated
    /// edges collapse into one.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let (Some(&from), Some(&to)) = (self.index.get(source), self.index.get(target)) else {
            return false;
        };
        self.graph.update_edge(from, to, ());
        true
    }

    pub fn page_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn neighbors(&self, url: &str, direction: Direction) -> BTreeSet<&str> {
        self.index
            .get(url)
            .map(|&node| {
                self.graph
                    .neighbors_directed(node, direction)
                    .map(|n| self.graph[n].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn out_links(&self, url: &str) -> BTreeSet<&str> {
        self.neighbors(url, Direction::Outgoing)
    }

    pub fn in_links(&self, url: &str) -> BTreeSet<&str> {
        self.neighbors(url, Direction::Incoming)
    }

    /// Known pages in insertion order.
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(|n| self.graph[n].as_str())
    }

    /// In-link count of every page, most linked first; ties keep page order.
    pub fn in_link_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = self
            .graph
            .node_indices()
            .map(|node| {
                (
                    self.graph[node].as_str(),
                    self.graph.neighbors_directed(node, Direction::Incoming).count(),
                )
            })
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Every page except `root` without inbound edges, in page order.
    pub fn orphans(&self, root: &str) -> Vec<String> {
        self.graph
            .node_indices()
            .filter(|&node| self.graph[node] != root)
            .filter(|&node| {
                self.graph
                    .neighbors_directed(node, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|node| self.graph[node].clone())
            .collect()
    }

    /// Breadth-first click depth from `root`.
    pub fn depths(&self, root: &str) -> DepthMap {
        let mut depths: BTreeMap<String, Depth> = self
            .pages()
            .map(|url| (url.to_string(), Depth::Unreachable))
            .collect();

        let Some(&start) = self.index.get(root) else {
            debug!("Root {} is not a known page; every page is unreachable", root);
            return DepthMap(depths);
        };

        let mut visited = vec![false; self.graph.node_count()];
        let mut queue = VecDeque::new();
        visited[start.index()] = true;
        queue.push_back((start, 0usize));

        while let Some((node, depth)) = queue.pop_front() {
            depths.insert(self.graph[node].clone(), Depth::Reachable(depth));
            for neighbor in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if !visited[neighbor.index()] {
                    visited[neighbor.index()] = true;
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        DepthMap(depths)
    }

    pub fn adjacency(&self) -> Adjacency {
        let mut outbound = BTreeMap::new();
        let mut inbound = BTreeMap::new();
        for url in self.pages() {
            outbound.insert(
                url.to_string(),
                self.out_links(url).into_iter().map(String::from).collect(),
            );
            inbound.insert(
                url.to_string(),
                self.in_links(url).into_iter().map(String::from).collect(),
            );
        }
        Adjacency { outbound, inbound }
    }
}

impl PartialEq for LinkGraph {
    fn eq(&self, other: &Self) -> bool {
        self.adjacency() == other.adjacency()
    }
}

impl Serialize for LinkGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.adjacency().serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Depth {
    Reachable(usize),
    Unreachable,
}

impl Depth {
    pub fn value(&self) -> Option<usize> {
        match self {
            Depth::Reachable(depth) => Some(*depth),
            Depth::Unreachable => None,
        }
    }
}

/// Click depth of every known page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthMap(BTreeMap<String, Depth>);

impl DepthMap {
    pub fn get(&self, url: &str) -> Option<Depth> {
        self.0.get(url).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Depth)> {
        self.0.iter().map(|(url, depth)| (url.as_str(), *depth))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pages deeper than `threshold`, sorted by URL.
    pub fn deeper_than(&self, threshold: usize) -> Vec<(&str, usize)> {
        self.iter()
            .filter_map(|(url, depth)| depth.value().map(|d| (url, d)))
            .filter(|(_, depth)| *depth > threshold)
            .collect()
    }

    pub fn unreachable(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, depth)| *depth == Depth::Unreachable)
            .map(|(url, _)| url)
            .collect()
    }
}

/// Orphan, unreachable and deep-page findings, each group in page order.
pub fn graph_findings(
    graph: &LinkGraph,
    depths: &DepthMap,
    root: &str,
    depth_threshold: usize,
) -> Vec<Finding> {
    let mut findings: Vec<Finding> = graph
        .orphans(root)
        .into_iter()
        .map(|url| Finding::OrphanPage { url })
        .collect();

    findings.extend(
        graph
            .pages()
            .filter(|url| depths.get(url) == Some(Depth::Unreachable))
            .map(|url| Finding::UnreachablePage {
                url: url.to_string(),
            }),
    );

    findings.extend(graph.pages().filter_map(|url| {
        depths
            .get(url)
            .and_then(|depth| depth.value())
            .filter(|depth| *depth > depth_threshold)
            .map(|depth| Finding::DeepPage {
                url: url.to_string(),
                depth,
            })
    }));

    findings
}
