use crate::map_file::{validate_name, Connection, MapDocument};
use parking_lot::RwLock;
use pathgraph_core::{path_weight, Edge, Error, Graph, Place, Result, Weight};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// A path found between two places, with its total weight.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub hops: Vec<Connection>,
    pub total_weight: Weight,
}

impl Route {
    fn from_edges(edges: &[Edge<Place>]) -> Self {
        Self {
            hops: edges.iter().map(Connection::from).collect(),
            total_weight: path_weight(edges),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.hops {
            writeln!(f, "to {} by {} takes {}", hop.to, hop.name, hop.weight)?;
        }
        write!(f, "Total {}", self.total_weight)
    }
}

/// Owns one map: the place graph, its background image and the file it is
/// saved to.
///
/// The graph sits behind a read/write lock, so a store can be shared across
/// threads; every mutation holds the write lock for the whole call.
pub struct MapStore {
    graph: Arc<RwLock<Graph<Place>>>,
    image: RwLock<String>,
    path: PathBuf,
    dirty: AtomicBool,
}

impl MapStore {
    /// Open the map file at `path`, or start an empty map if it does not exist
    /// yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let (image, graph) = if path.exists() {
            let doc = MapDocument::read(&path)?;
            let image = doc.image.clone();
            let graph = doc.into_graph()?;
            info!(
                "Loaded map {:?}: {} places, {} connections",
                path,
                graph.node_count(),
                graph.connection_count()
            );
            (image, graph)
        } else {
            info!("Map {:?} not found, starting empty", path);
            (String::new(), Graph::new())
        };

        Ok(Self {
            graph: Arc::new(RwLock::new(graph)),
            image: RwLock::new(image),
            path,
            dirty: AtomicBool::new(false),
        })
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn image(&self) -> String {
        self.image.read().clone()
    }

    pub fn set_image(&self, image: impl Into<String>) {
        *self.image.write() = image.into();
        self.mark_dirty();
    }

    /// True when the map changed since it was loaded or last saved.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Write the map back to its file.
    ///
    /// Changes made while the file is being written keep the store dirty.
    pub fn save(&self) -> Result<()> {
        let doc = self.snapshot()?;
        if let Err(e) = doc.write(&self.path) {
            self.dirty.store(true, Ordering::Release);
            return Err(e);
        }
        info!(
            "Saved map {:?}: {} places, {} edge records",
            self.path,
            doc.places.len(),
            doc.connections.len()
        );
        Ok(())
    }

    /// Capture the map for writing and mark it clean. The flag is cleared
    /// while both locks are held, so any later mutation sets it again.
    fn snapshot(&self) -> Result<MapDocument> {
        let graph = self.graph.read();
        let image = self.image.read();
        let doc = MapDocument::from_graph(image.as_str(), &graph)?;
        self.dirty.store(false, Ordering::Release);
        Ok(doc)
    }

    /// Discard everything and start a new, empty map.
    pub fn clear(&self, image: impl Into<String>) {
        self.graph.write().clear();
        *self.image.write() = image.into();
        self.mark_dirty();
    }

    /// Run `f` with shared access to the graph.
    pub fn with_graph<R>(&self, f: impl FnOnce(&Graph<Place>) -> R) -> R {
        f(&self.graph.read())
    }

    #[must_use]
    pub fn places(&self) -> Vec<Place> {
        let mut places: Vec<Place> = self.graph.read().nodes().cloned().collect();
        places.sort_by(|a, b| a.name.cmp(&b.name));
        places
    }

    #[must_use]
    pub fn place(&self, name: &str) -> Option<Place> {
        let key = Place::named(name);
        self.graph.read().nodes().find(|p| **p == key).cloned()
    }

    /// Returns `false` if a place with that name already exists.
    pub fn add_place(&self, place: Place) -> Result<bool> {
        validate_name(&place.name)?;
        let added = self.graph.write().add(place);
        if added {
            self.mark_dirty();
        }
        Ok(added)
    }

    pub fn remove_place(&self, name: &str) -> Result<()> {
        self.graph.write().remove(&Place::named(name))?;
        self.mark_dirty();
        Ok(())
    }

    pub fn connect(&self, from: &str, to: &str, name: &str, weight: Weight) -> Result<()> {
        validate_name(name)?;
        self.graph
            .write()
            .connect(&Place::named(from), &Place::named(to), name, weight)?;
        self.mark_dirty();
        Ok(())
    }

    pub fn disconnect(&self, from: &str, to: &str) -> Result<()> {
        self.graph
            .write()
            .disconnect(&Place::named(from), &Place::named(to))?;
        self.mark_dirty();
        Ok(())
    }

    pub fn set_connection_weight(&self, from: &str, to: &str, weight: Weight) -> Result<()> {
        self.graph
            .write()
            .set_connection_weight(&Place::named(from), &Place::named(to), weight)?;
        self.mark_dirty();
        Ok(())
    }

    /// The connection between two places, if any. Unknown places are an error.
    pub fn connection(&self, from: &str, to: &str) -> Result<Option<Connection>> {
        let graph = self.graph.read();
        let edge = graph.edge_between(&Place::named(from), &Place::named(to))?;
        Ok(edge.map(Connection::from))
    }

    /// Every directed edge leaving `name`.
    pub fn edges_from(&self, name: &str) -> Result<Vec<Connection>> {
        let graph = self.graph.read();
        let mut edges: Vec<Connection> = graph
            .edges_from(&Place::named(name))?
            .into_iter()
            .map(Connection::from)
            .collect();
        edges.sort_by(|a, b| a.to.cmp(&b.to));
        Ok(edges)
    }

    /// One record per connection, ordered by endpoints.
    #[must_use]
    pub fn connections(&self) -> Vec<Connection> {
        let graph = self.graph.read();
        let mut connections: Vec<Connection> = graph
            .connections()
            .into_iter()
            .map(Connection::from)
            .collect();
        connections.sort_by_cached_key(Connection::to_line);
        connections
    }

    #[must_use]
    pub fn path_exists(&self, from: &str, to: &str) -> bool {
        self.graph
            .read()
            .path_exists(&Place::named(from), &Place::named(to))
    }

    /// Find a route between two places. `Ok(None)` means both exist but are
    /// not connected by any path.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Option<Route>> {
        let graph = self.graph.read();
        let (from, to) = (Place::named(from), Place::named(to));
        for place in [&from, &to] {
            if !graph.contains(place) {
                return Err(Error::NotFound(format!("place {:?}", place.name)));
            }
        }
        Ok(graph.path(&from, &to).map(|edges| Route::from_edges(&edges)))
    }

    fn mark_dirty(&self) {
        if !self.dirty.swap(true, Ordering::AcqRel) {
            info!("Map {:?} has unsaved changes", self.path);
        }
    }
}
