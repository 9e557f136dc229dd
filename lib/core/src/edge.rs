// Directed, named, weighted edge between two nodes
use crate::{Error, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Connection cost. Always non-negative once stored in an [`Edge`].
pub type Weight = i64;

/// A directed edge from `source` to `destination`.
///
/// Identity is `(name, source, destination)`. The weight is deliberately left
/// out of `PartialEq`/`Hash`, so re-weighting an edge never changes which set
/// slot it lives in.
#[derive(Debug, Clone, Serialize)]
pub struct Edge<N> {
    name: String,
    source: N,
    destination: N,
    weight: Weight,
}

impl<N> Edge<N> {
    pub fn new(name: impl Into<String>, source: N, destination: N, weight: Weight) -> Result<Self> {
        if weight < 0 {
            return Err(Error::negative_weight(weight));
        }
        Ok(Self {
            name: name.into(),
            source,
            destination,
            weight,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn source(&self) -> &N {
        &self.source
    }

    #[inline]
    pub fn destination(&self) -> &N {
        &self.destination
    }

    #[inline]
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Change the weight in place. A negative value is rejected and the
    /// current weight is kept.
    pub fn set_weight(&mut self, weight: Weight) -> Result<()> {
        if weight < 0 {
            return Err(Error::negative_weight(weight));
        }
        self.weight = weight;
        Ok(())
    }

    /// Compare two edges by weight alone, for `sort_by`/`min_by`.
    #[inline]
    pub fn cmp_weight(&self, other: &Self) -> Ordering {
        self.weight.cmp(&other.weight)
    }
}

impl<N: PartialEq> Edge<N> {
    /// True if this edge joins `a` and `b`, in either direction.
    #[inline]
    pub fn connects(&self, a: &N, b: &N) -> bool {
        (self.source == *a && self.destination == *b)
            || (self.source == *b && self.destination == *a)
    }
}

impl<N: Clone> Edge<N> {
    /// The opposite-direction twin: same name and weight, endpoints swapped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            name: self.name.clone(),
            source: self.destination.clone(),
            destination: self.source.clone(),
            weight: self.weight,
        }
    }
}

impl<N: PartialEq> PartialEq for Edge<N> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.source == other.source
            && self.destination == other.destination
    }
}

impl<N: Eq> Eq for Edge<N> {}

impl<N: Hash> Hash for Edge<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.source.hash(state);
        self.destination.hash(state);
    }
}

impl<N: fmt::Display> fmt::Display for Edge<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "to {} by {} takes {}", self.destination, self.name, self.weight)
    }
}
