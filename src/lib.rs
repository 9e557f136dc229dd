//! # pathgraph
//!
//! An undirected graph of named, weighted connections with depth-first path
//! finding.
//!
//! Every connection between two nodes is stored as a pair of opposite
//! directed edges that always share a name and a weight. Path queries walk
//! the graph depth-first and return *a* path, not the shortest one.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cargo install pathgraph
//! pathgraph --map europa.graph serve --http-port 6340
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use pathgraph::prelude::*;
//!
//! let mut graph: Graph<&str> = Graph::new();
//! for city in ["Paris", "Lyon", "Milan"] {
//!     graph.add(city);
//! }
//! graph.connect(&"Paris", &"Lyon", "A6", 465).unwrap();
//! graph.connect(&"Lyon", &"Milan", "E70", 440).unwrap();
//!
//! let route = graph.path(&"Milan", &"Paris").unwrap();
//! assert_eq!(route.len(), 2);
//! assert_eq!(path_weight(&route), 905);
//! ```
//!
//! ## Crate Structure
//!
//! - [`pathgraph-core`](https://docs.rs/pathgraph-core) - Edge, Graph, traversal, Place
//! - [`pathgraph-storage`](https://docs.rs/pathgraph-storage) - `.graph` map files and the shared `MapStore`
//! - [`pathgraph-api`](https://docs.rs/pathgraph-api) - REST API

// Re-export core types
pub use pathgraph_core::{path_weight, Edge, Error, Graph, Location, Place, Result, Weight};

// Re-export storage
pub use pathgraph_storage::{Connection, MapDocument, MapStore, Route};

// Re-export API
pub use pathgraph_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        path_weight, Connection, Edge, Error, Graph, Location, MapDocument, MapStore, Place,
        RestApi, Result, Route, Weight,
    };
}
