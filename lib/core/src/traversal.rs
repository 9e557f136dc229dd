// Depth-first path discovery
//
// The search answers "is there a path" and returns the first one the
// depth-first walk happens to find. It does not minimize weight.
use crate::edge::{Edge, Weight};
use crate::graph::Graph;
use ahash::AHashMap;
use std::fmt;
use std::hash::Hash;

impl<N> Graph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    /// True if `to` can be reached from `from`. Unknown nodes give `false`.
    pub fn path_exists(&self, from: &N, to: &N) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        self.depth_first(from).contains_key(to)
    }

    /// The edges of a path from `from` to `to`, in travel order, or `None` when
    /// no path exists. A node reaches itself by the empty path.
    pub fn path(&self, from: &N, to: &N) -> Option<Vec<Edge<N>>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        let via = self.depth_first(from);
        if !via.contains_key(to) {
            return None;
        }
        self.gather_path(from, to, &via)
    }

    /// Walk the graph depth-first from `start` and return the predecessor of
    /// every node reached. `start` is its own predecessor.
    ///
    /// Uses an explicit stack, so large graphs cannot overflow the call stack.
    fn depth_first<'a>(&'a self, start: &'a N) -> AHashMap<&'a N, &'a N> {
        let mut via: AHashMap<&N, &N> = AHashMap::new();
        let mut stack: Vec<(&N, &N)> = vec![(start, start)];

        while let Some((node, predecessor)) = stack.pop() {
            if via.contains_key(node) {
                continue;
            }
            via.insert(node, predecessor);

            if let Some(outgoing) = self.outgoing(node) {
                for edge in outgoing {
                    let next = edge.destination();
                    if !via.contains_key(next) {
                        stack.push((next, node));
                    }
                }
            }
        }
        via
    }

    /// Follow the predecessor chain back from `to` and resolve each hop to its
    /// edge.
    fn gather_path<'a>(
        &self,
        from: &N,
        to: &'a N,
        via: &AHashMap<&'a N, &'a N>,
    ) -> Option<Vec<Edge<N>>> {
        let mut path = Vec::new();
        let mut here = to;
        while here != from {
            let previous: &N = *via.get(here)?;
            let edge = self.edge_between(previous, here).ok().flatten()?;
            path.push(edge.clone());
            here = previous;
        }
        path.reverse();
        Some(path)
    }
}

/// Total weight of a path.
pub fn path_weight<N>(path: &[Edge<N>]) -> Weight {
    path.iter().map(Edge::weight).sum()
}
