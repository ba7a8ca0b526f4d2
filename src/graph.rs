use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{info, warn};

use crate::model::{ActorEdge, ActorNode, EventTable};
use crate::schema::event_type;

/// Event types eligible for graph extraction. Matching is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    event_types: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, S>(event_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event_types: event_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.event_types.contains(event_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.event_types.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.event_types.is_empty()
    }
}

impl Default for AllowList {
    /// Battles and explosions: the categories that dominate fatalities.
    fn default() -> Self {
        Self::new([event_type::BATTLES, event_type::EXPLOSIONS])
    }
}

/// Edge payload: interaction count and summed fatalities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Interaction {
    weight: u64,
    fatalities: u64,
}

/// Directed actor-interaction graph.
///
/// Holds one edge per ordered actor pair and only the actors that appear on
/// some edge.
#[derive(Debug, Clone, Default)]
pub struct ActorGraph {
    graph: DiGraph<String, Interaction>,
    /// Map from actor name → NodeIndex for fast lookup.
    node_map: HashMap<String, NodeIndex>,
}

impl ActorGraph {
    /// Filter events by allow-list and non-empty trimmed actors, then
    /// aggregate them by ordered (actor1, actor2) pair.
    pub fn extract(table: &EventTable, allow: &AllowList) -> Self {
        if allow.is_empty() {
            warn!("event-type allow-list is empty; the actor graph will have no edges");
        }

        // Phase 1 + 2: filter, then accumulate per ordered pair.
        let mut pairs: BTreeMap<(&str, &str), Interaction> = BTreeMap::new();
        let mut kept = 0usize;
        for event in table {
            if !allow.contains(&event.event_type) {
                continue;
            }
            let (actor1, actor2) = (event.actor1.trim(), event.actor2.trim());
            if actor1.is_empty() || actor2.is_empty() {
                continue;
            }
            let acc = pairs.entry((actor1, actor2)).or_default();
            acc.weight += 1;
            acc.fatalities += event.fatalities;
            kept += 1;
        }

        // Phase 3: nodes come only from edge endpoints.
        let mut graph = DiGraph::with_capacity(pairs.len(), pairs.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        let get_or_insert = |map: &mut HashMap<String, NodeIndex>,
                             g: &mut DiGraph<String, Interaction>,
                             id: &str|
         -> NodeIndex {
            *map.entry(id.to_string())
                .or_insert_with(|| g.add_node(id.to_string()))
        };

        for ((source, target), interaction) in pairs {
            let src_idx = get_or_insert(&mut node_map, &mut graph, source);
            let dst_idx = get_or_insert(&mut node_map, &mut graph, target);
            graph.add_edge(src_idx, dst_idx, interaction);
        }

        info!(
            events = table.len(),
            kept,
            edges = graph.edge_count(),
            nodes = graph.node_count(),
            "extracted actor graph"
        );
        Self { graph, node_map }
    }

    /// Rebuild a graph from an edge table, e.g. one read back from disk.
    /// Duplicate ordered pairs are merged by summing.
    pub fn from_edges(edges: &[ActorEdge]) -> Self {
        let mut merged: BTreeMap<(&str, &str), Interaction> = BTreeMap::new();
        for edge in edges {
            let acc = merged
                .entry((edge.source.as_str(), edge.target.as_str()))
                .or_default();
            acc.weight += edge.weight;
            acc.fatalities += edge.total_fatalities;
        }

        let mut out = Self::default();
        for ((source, target), interaction) in merged {
            let src_idx = out.node_index(source);
            let dst_idx = out.node_index(target);
            out.graph.add_edge(src_idx, dst_idx, interaction);
        }
        out
    }

    fn node_index(&mut self, id: &str) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .node_map
            .entry(id.to_string())
            .or_insert_with(|| graph.add_node(id.to_string()))
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contains_actor(&self, actor: &str) -> bool {
        self.node_map.contains_key(actor)
    }

    /// Edges in ascending (source, target) order.
    pub fn edges(&self) -> Vec<ActorEdge> {
        self.graph
            .edge_references()
            .map(|e| ActorEdge {
                source: self.graph[e.source()].clone(),
                target: self.graph[e.target()].clone(),
                weight: e.weight().weight,
                total_fatalities: e.weight().fatalities,
            })
            .collect()
    }

    /// Nodes in order of first appearance over the sorted edges,
    /// source before target.
    pub fn nodes(&self) -> Vec<ActorNode> {
        self.graph
            .node_indices()
            .map(|idx| ActorNode::new(&self.graph[idx]))
            .collect()
    }

    /// Total interaction weight per actor (incoming + outgoing), heaviest
    /// first, ties by actor name. A self-pair counts on both sides.
    pub fn weighted_degrees(&self) -> Vec<(String, u64)> {
        let mut degrees: Vec<(String, u64)> = self
            .graph
            .node_indices()
            .map(|idx| {
                let degree: u64 = [Direction::Outgoing, Direction::Incoming]
                    .into_iter()
                    .flat_map(|dir| self.graph.edges_directed(idx, dir))
                    .map(|e| e.weight().weight)
                    .sum();
                (self.graph[idx].clone(), degree)
            })
            .collect();
        degrees.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        degrees
    }
}

/// Derive the node table from an edge table: every endpoint once, in order
/// of first appearance (source before target).
pub fn derive_nodes(edges: &[ActorEdge]) -> Vec<ActorNode> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut nodes = Vec::new();
    for edge in edges {
        for actor in [edge.source.as_str(), edge.target.as_str()] {
            if seen.insert(actor) {
                nodes.push(ActorNode::new(actor));
            }
        }
    }
    nodes
}
