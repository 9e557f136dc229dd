pub mod manager;
pub mod map_file;

pub use manager::{MapStore, Route};
pub use map_file::{Connection, MapDocument};
