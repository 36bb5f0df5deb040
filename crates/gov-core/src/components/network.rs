//! Decision Network
//!
//! Nodes are decision-makers, edges are the relationships that put them in
//! the same coalition. A [`Network`] can only be built through validating
//! constructors, so every instance has exactly `N` nodes, no self-loops and
//! no duplicate edges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use gov_records::{Assignment, NodeId, Opinion};

use crate::error::{GovernanceError, Result};

/// A decision-maker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub opinion: Opinion,
    /// Community or hierarchy label assigned by the generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
}

/// Unordered pair of distinct nodes, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge {
    a: NodeId,
    b: NodeId,
}

impl Edge {
    /// Normalizes the pair; returns `None` for a self-loop.
    pub fn new(x: NodeId, y: NodeId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }
}

/// An undirected decision network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<NodeId>>,
}

impl Network {
    /// Builds a network of `node_count` nodes from index pairs.
    ///
    /// Duplicate pairs (in either orientation) collapse into one edge.
    /// Self-loops and out-of-range endpoints are rejected.
    pub fn from_edges(
        node_count: usize,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self> {
        if node_count == 0 {
            return Err(GovernanceError::invalid("nodes", "network needs at least one node"));
        }

        let mut unique = BTreeSet::new();
        for (x, y) in pairs {
            if x >= node_count || y >= node_count {
                return Err(GovernanceError::invalid(
                    "edges",
                    format!("edge ({}, {}) references a node outside 0..{}", x, y, node_count),
                ));
            }
            let edge = Edge::new(NodeId(x), NodeId(y)).ok_or_else(|| {
                GovernanceError::invalid("edges", format!("self-loop on node {}", x))
            })?;
            unique.insert(edge);
        }

        let mut adjacency = vec![Vec::new(); node_count];
        for edge in &unique {
            adjacency[edge.a.index()].push(edge.b);
            adjacency[edge.b.index()].push(edge.a);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        let nodes = (0..node_count)
            .map(|i| Node {
                id: NodeId(i),
                opinion: Opinion::Binary(false),
                group: None,
            })
            .collect();

        Ok(Self {
            nodes,
            edges: unique.into_iter().collect(),
            adjacency,
        })
    }

    /// Attaches a group label to every node.
    pub fn with_groups(mut self, groups: Vec<u32>) -> Result<Self> {
        if groups.len() != self.nodes.len() {
            return Err(GovernanceError::invalid(
                "groups",
                format!("{} labels for {} nodes", groups.len(), self.nodes.len()),
            ));
        }
        for (node, group) in self.nodes.iter_mut().zip(groups) {
            node.group = Some(group);
        }
        Ok(self)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Neighbours of a node in ascending id order.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn has_edge(&self, x: NodeId, y: NodeId) -> bool {
        self.neighbors(x).binary_search(&y).is_ok()
    }

    /// The node together with its neighbours, in ascending id order.
    pub fn closed_neighborhood(&self, id: NodeId) -> Vec<NodeId> {
        let neighbors = self.neighbors(id);
        let mut members = Vec::with_capacity(neighbors.len() + 1);
        members.extend_from_slice(neighbors);
        let pos = members.binary_search(&id).unwrap_or_else(|p| p);
        members.insert(pos, id);
        members
    }

    pub fn group(&self, id: NodeId) -> Option<u32> {
        self.node(id).and_then(|n| n.group)
    }

    /// Edge density in `[0, 1]`.
    pub fn density(&self) -> f64 {
        let n = self.nodes.len();
        if n < 2 {
            return 0.0;
        }
        self.edges.len() as f64 / (n * (n - 1) / 2) as f64
    }

    /// The current opinions of every node.
    pub fn assignment(&self) -> Assignment {
        Assignment::new(self.nodes.iter().map(|n| n.opinion).collect())
    }

    pub fn opinion(&self, id: NodeId) -> Option<Opinion> {
        self.node(id).map(|n| n.opinion)
    }

    pub fn set_opinion(&mut self, id: NodeId, opinion: Opinion) -> Result<()> {
        let node = self.nodes.get_mut(id.index()).ok_or_else(|| {
            GovernanceError::invalid("node", format!("{} is not in the network", id))
        })?;
        node.opinion = opinion;
        Ok(())
    }

    /// Overwrites every node's opinion from an assignment of matching length.
    pub fn apply_assignment(&mut self, assignment: &Assignment) -> Result<()> {
        if assignment.len() != self.nodes.len() {
            return Err(GovernanceError::invalid(
                "assignment",
                format!(
                    "{} opinions for {} nodes",
                    assignment.len(),
                    self.nodes.len()
                ),
            ));
        }
        for (node, opinion) in self.nodes.iter_mut().zip(assignment.opinions()) {
            node.opinion = *opinion;
        }
        Ok(())
    }

    /// Returns an isomorphic copy in which node `i` becomes `permutation[i]`.
    ///
    /// Opinions and group labels travel with their nodes.
    pub fn relabeled(&self, permutation: &[usize]) -> Result<Self> {
        let n = self.nodes.len();
        if permutation.len() != n {
            return Err(GovernanceError::invalid(
                "permutation",
                format!("length {} for {} nodes", permutation.len(), n),
            ));
        }
        let mut seen = vec![false; n];
        for &target in permutation {
            if target >= n || std::mem::replace(&mut seen[target], true) {
                return Err(GovernanceError::invalid(
                    "permutation",
                    "not a permutation of the node ids",
                ));
            }
        }

        let pairs = self.edges.iter().map(|e| {
            let (a, b) = e.endpoints();
            (permutation[a.index()], permutation[b.index()])
        });
        let mut relabeled = Network::from_edges(n, pairs)?;
        for node in &self.nodes {
            let target = &mut relabeled.nodes[permutation[node.id.index()]];
            target.opinion = node.opinion;
            target.group = node.group;
        }
        Ok(relabeled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_tail() -> Network {
        // 0-1-2 triangle, 3 hangs off 2
        Network::from_edges(4, vec![(0, 1), (1, 2), (2, 0), (2, 3)]).unwrap()
    }

    #[test]
    fn test_edge_normalization() {
        let edge = Edge::new(NodeId(5), NodeId(2)).unwrap();
        assert_eq!(edge.endpoints(), (NodeId(2), NodeId(5)));
        assert!(Edge::new(NodeId(3), NodeId(3)).is_none());
    }

    #[test]
    fn test_from_edges_dedupes() {
        let network = Network::from_edges(3, vec![(0, 1), (1, 0), (0, 1)]).unwrap();
        assert_eq!(network.edge_count(), 1);
        assert_eq!(network.degree(NodeId(0)), 1);
    }

    #[test]
    fn test_from_edges_rejects_self_loop() {
        let err = Network::from_edges(3, vec![(1, 1)]).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_from_edges_rejects_out_of_range() {
        assert!(Network::from_edges(3, vec![(0, 3)]).is_err());
        assert!(Network::from_edges(0, Vec::new()).is_err());
    }

    #[test]
    fn test_adjacency_queries() {
        let network = triangle_with_tail();

        assert_eq!(network.neighbors(NodeId(2)), &[NodeId(0), NodeId(1), NodeId(3)]);
        assert_eq!(network.max_degree(), 3);
        assert!(network.has_edge(NodeId(3), NodeId(2)));
        assert!(!network.has_edge(NodeId(0), NodeId(3)));
        assert_eq!(
            network.closed_neighborhood(NodeId(1)),
            vec![NodeId(0), NodeId(1), NodeId(2)]
        );
        assert!((network.density() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_assignment_roundtrip() {
        let mut network = triangle_with_tail();
        network.set_opinion(NodeId(3), Opinion::Binary(true)).unwrap();

        let assignment = network.assignment();
        assert_eq!(assignment.support_count(), 1);

        let flipped = Assignment::new(vec![Opinion::Binary(true); 4]);
        network.apply_assignment(&flipped).unwrap();
        assert_eq!(network.assignment(), flipped);

        let short = Assignment::new(vec![Opinion::Binary(true)]);
        assert!(network.apply_assignment(&short).is_err());
    }

    #[test]
    fn test_with_groups() {
        let network = triangle_with_tail().with_groups(vec![0, 0, 1, 1]).unwrap();
        assert_eq!(network.group(NodeId(2)), Some(1));
        assert!(triangle_with_tail().with_groups(vec![0]).is_err());
    }

    #[test]
    fn test_relabeled_preserves_structure() {
        let mut network = triangle_with_tail();
        network.set_opinion(NodeId(3), Opinion::Binary(true)).unwrap();

        let relabeled = network.relabeled(&[3, 2, 1, 0]).unwrap();
        assert_eq!(relabeled.edge_count(), network.edge_count());
        assert_eq!(relabeled.degree(NodeId(1)), 3);
        assert_eq!(relabeled.opinion(NodeId(0)), Some(Opinion::Binary(true)));
    }

    #[test]
    fn test_relabeled_rejects_bad_permutation() {
        let network = triangle_with_tail();
        assert!(network.relabeled(&[0, 0, 1, 2]).is_err());
        assert!(network.relabeled(&[0, 1]).is_err());
    }
}
