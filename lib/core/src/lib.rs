//! # pathgraph Core
//!
//! Core library for the pathgraph map engine.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`Edge`] - A directed, named, weighted edge
//! - [`Graph`] - Undirected connections stored as directed edge pairs
//! - [`Place`] - A named map location, the node type of map files
//! - Depth-first path discovery via [`Graph::path_exists`] and [`Graph::path`]
//!
//! ## Example
//!
//! ```rust
//! use pathgraph_core::{Graph, path_weight};
//!
//! let mut graph = Graph::new();
//! for city in ["P", "Q", "R"] {
//!     graph.add(city);
//! }
//! graph.connect(&"P", &"Q", "road", 3).unwrap();
//! graph.connect(&"Q", &"R", "rail", 4).unwrap();
//!
//! let path = graph.path(&"P", &"R").unwrap();
//! assert_eq!(path.len(), 2);
//! assert_eq!(path_weight(&path), 7);
//! ```
//!
//! The path returned is the first one a depth-first walk finds, not the
//! cheapest one.

pub mod edge;
pub mod error;
pub mod graph;
pub mod place;
pub mod traversal;

pub use edge::{Edge, Weight};
pub use error::{Error, Result};
pub use graph::Graph;
pub use place::{Location, Place};
pub use traversal::path_weight;
