use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A named location on a map.
///
/// The coordinates are display metadata only: two places with the same name
/// are the same node, wherever they are drawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Place {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }

    /// A place used purely as a lookup key.
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, 0.0, 0.0)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Place {}

impl Hash for Place {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Long form with coordinates, e.g. `Location: Oslo (12.0 40.5)`.
pub struct Location<'a>(pub &'a Place);

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location: {} ({:.1} {:.1})", self.0.name, self.0.x, self.0.y)
    }
}
