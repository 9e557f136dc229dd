// Weighted undirected graph built from directed edge pairs
use crate::edge::{Edge, Weight};
use crate::{Error, Result};
use ahash::{AHashMap, AHashSet};
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// A weighted, undirected graph over caller-owned node values.
///
/// Each connection is stored as two directed edges (A→B and B→A) that share a
/// name and a weight. Every public mutation creates, re-weights or drops both
/// halves together, and a failing call leaves the graph untouched.
///
/// The graph is not synchronized. Callers that share one across threads must
/// serialize access themselves.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    /// Outgoing edge set per node.
    nodes: AHashMap<N, AHashSet<Edge<N>>>,
    /// Every directed edge, used for bulk removal when a node goes away.
    edges: Vec<Edge<N>>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            nodes: AHashMap::new(),
            edges: Vec::new(),
        }
    }
}

impl<N> Graph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges (twice the number of connections).
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.edges.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes currently in the graph, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.keys()
    }

    /// Add a node. Adding a node that is already present is a no-op.
    ///
    /// Returns `true` if the node was new.
    pub fn add(&mut self, node: N) -> bool {
        if self.nodes.contains_key(&node) {
            return false;
        }
        debug!("Adding node {:?}", node);
        self.nodes.insert(node, AHashSet::new());
        true
    }

    /// Remove a node together with every edge that starts or ends at it.
    pub fn remove(&mut self, node: &N) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(Error::node_not_found(node));
        }

        let before = self.edges.len();
        self.edges
            .retain(|e| e.source() != node && e.destination() != node);

        for outgoing in self.nodes.values_mut() {
            outgoing.retain(|e| e.destination() != node);
        }
        self.nodes.remove(node);

        debug!(
            "Removed node {:?} and {} incident edges",
            node,
            before - self.edges.len()
        );
        Ok(())
    }

    /// Connect `a` and `b` with a named, weighted connection.
    ///
    /// Fails with `NotFound` if either node is missing, `InvalidArgument` for a
    /// negative weight or a self-connection, and `AlreadyExists` if the pair is
    /// already connected in either direction.
    pub fn connect(&mut self, a: &N, b: &N, name: impl Into<String>, weight: Weight) -> Result<()> {
        let source = self.stored(a)?.clone();
        let destination = self.stored(b)?.clone();
        if a == b {
            return Err(Error::InvalidArgument(format!(
                "cannot connect {:?} to itself",
                a
            )));
        }
        let forward = Edge::new(name, source, destination, weight)?;
        if let Some(existing) = self.edge_between(a, b)? {
            return Err(Error::AlreadyExists(format!(
                "connection {:?} <-> {:?} ({})",
                a,
                b,
                existing.name()
            )));
        }
        let backward = forward.reversed();

        debug!(
            "Connecting {:?} <-> {:?} by {} ({})",
            a,
            b,
            forward.name(),
            weight
        );
        self.edges.push(forward.clone());
        self.edges.push(backward.clone());
        self.outgoing_mut(a).insert(forward);
        self.outgoing_mut(b).insert(backward);
        Ok(())
    }

    /// Re-weight the connection between `a` and `b`, both directions at once.
    pub fn set_connection_weight(&mut self, a: &N, b: &N, weight: Weight) -> Result<()> {
        let (forward, backward) = self.pair(a, b)?;
        if weight < 0 {
            return Err(Error::negative_weight(weight));
        }

        debug!("Re-weighting {:?} <-> {:?} to {}", a, b, weight);
        for key in [&forward, &backward] {
            let set = self.outgoing_mut(key.source());
            if let Some(mut edge) = set.take(key) {
                edge.set_weight(weight)?;
                set.insert(edge);
            }
        }
        for edge in self
            .edges
            .iter_mut()
            .filter(|e| **e == forward || **e == backward)
        {
            edge.set_weight(weight)?;
        }
        Ok(())
    }

    /// Every edge whose source is `node`.
    pub fn edges_from(&self, node: &N) -> Result<Vec<&Edge<N>>> {
        let outgoing = self
            .nodes
            .get(node)
            .ok_or_else(|| Error::node_not_found(node))?;
        Ok(outgoing.iter().collect())
    }

    /// Find an edge joining `a` and `b`, looking at `a`'s outgoing set first and
    /// then `b`'s. `Ok(None)` means the nodes exist but are not connected.
    pub fn edge_between(&self, a: &N, b: &N) -> Result<Option<&Edge<N>>> {
        let from_a = self.nodes.get(a).ok_or_else(|| Error::node_not_found(a))?;
        let from_b = self.nodes.get(b).ok_or_else(|| Error::node_not_found(b))?;

        Ok(from_a
            .iter()
            .find(|e| e.connects(a, b))
            .or_else(|| from_b.iter().find(|e| e.connects(a, b))))
    }

    /// Remove the connection between `a` and `b`, both directions.
    pub fn disconnect(&mut self, a: &N, b: &N) -> Result<()> {
        let (forward, backward) = self.pair(a, b)?;

        debug!("Disconnecting {:?} <-> {:?}", a, b);
        self.edges.retain(|e| *e != forward && *e != backward);
        self.outgoing_mut(a).remove(&forward);
        self.outgoing_mut(b).remove(&backward);
        Ok(())
    }

    /// One edge per connection, in no particular order.
    pub fn connections(&self) -> Vec<&Edge<N>> {
        let mut seen: AHashSet<(&N, &N)> = AHashSet::with_capacity(self.edges.len() / 2);
        self.edges
            .iter()
            .filter(|e| {
                if seen.contains(&(e.destination(), e.source())) {
                    false
                } else {
                    seen.insert((e.source(), e.destination()))
                }
            })
            .collect()
    }

    /// Drop every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    #[inline]
    fn require(&self, node: &N) -> Result<()> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(Error::node_not_found(node))
        }
    }

    /// The stored copy of `node`, which may carry more than its identity.
    #[inline]
    fn stored(&self, node: &N) -> Result<&N> {
        self.nodes
            .get_key_value(node)
            .map(|(stored, _)| stored)
            .ok_or_else(|| Error::node_not_found(node))
    }

    pub(crate) fn outgoing(&self, node: &N) -> Option<&AHashSet<Edge<N>>> {
        self.nodes.get(node)
    }

    // Only called for nodes already known to be present.
    fn outgoing_mut(&mut self, node: &N) -> &mut AHashSet<Edge<N>> {
        self.nodes.entry(node.clone()).or_default()
    }

    /// Identity keys of both halves of the `a`/`b` connection.
    fn pair(&self, a: &N, b: &N) -> Result<(Edge<N>, Edge<N>)> {
        self.require(a)?;
        self.require(b)?;
        let forward = self
            .outgoing(a)
            .and_then(|set| set.iter().find(|e| e.destination() == b))
            .cloned();
        let backward = self
            .outgoing(b)
            .and_then(|set| set.iter().find(|e| e.destination() == a))
            .cloned();

        match (forward, backward) {
            (Some(f), Some(r)) => Ok((f, r)),
            (Some(f), None) => {
                let r = f.reversed();
                Ok((f, r))
            }
            (None, Some(r)) => {
                let f = r.reversed();
                Ok((f, r))
            }
            (None, None) => Err(Error::NotFound(format!(
                "connection {:?} <-> {:?}",
                a, b
            ))),
        }
    }
}

impl<N> fmt::Display for Graph<N>
where
    N: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (node, outgoing)) in self.nodes.iter().enumerate() {
            let edges: Vec<String> = outgoing.iter().map(ToString::to_string).collect();
            writeln!(f, "Node {}: {} Edges: [{}]", i, node, edges.join(", "))?;
        }
        Ok(())
    }
}
