// Flat text map file (`*.graph`)
//
// Layout:
//   line 1     background image reference
//   line 2     name;x;y;name;x;y;...
//   line 3..   from;to;connection name;weight   (one per directed edge)
use atomicwrites::{AtomicFile, OverwriteBehavior};
use pathgraph_core::{Edge, Error, Graph, Place, Result, Weight};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tracing::debug;

const FIELD_SEPARATOR: char = ';';

/// One directed edge as it appears in a map file or an API response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub name: String,
    pub weight: Weight,
}

impl Connection {
    pub fn to_line(&self) -> String {
        format!("{};{};{};{}", self.from, self.to, self.name, self.weight)
    }

    fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != 4 {
            return Err(Error::Parse {
                line: line_no,
                message: format!("expected 4 fields, found {}", fields.len()),
            });
        }
        let weight = fields[3].trim().parse::<Weight>().map_err(|e| Error::Parse {
            line: line_no,
            message: format!("invalid weight {:?}: {}", fields[3], e),
        })?;
        Ok(Self {
            from: fields[0].to_string(),
            to: fields[1].to_string(),
            name: fields[2].to_string(),
            weight,
        })
    }
}

impl From<&Edge<Place>> for Connection {
    fn from(edge: &Edge<Place>) -> Self {
        Self {
            from: edge.source().name.clone(),
            to: edge.destination().name.clone(),
            name: edge.name().to_string(),
            weight: edge.weight(),
        }
    }
}

/// Parsed contents of a map file.
#[derive(Debug, Clone, Default)]
pub struct MapDocument {
    pub image: String,
    pub places: Vec<Place>,
    pub connections: Vec<Connection>,
    /// Source line of each connection record, when parsed from text.
    connection_lines: Vec<usize>,
}

// Source line numbers are not part of the content.
impl PartialEq for MapDocument {
    fn eq(&self, other: &Self) -> bool {
        self.image == other.image
            && self.places == other.places
            && self.connections == other.connections
    }
}

impl MapDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

        let image = match lines.next() {
            Some((_, line)) => line.trim().to_string(),
            None => {
                return Err(Error::Parse {
                    line: 1,
                    message: "missing image reference".to_string(),
                })
            }
        };

        let mut places = Vec::new();
        if let Some((line_no, line)) = lines.next() {
            let mut fields: Vec<&str> = line.trim().split(FIELD_SEPARATOR).collect();
            if fields.last() == Some(&"") {
                fields.pop();
            }
            if let Some(i) = fields.iter().position(|f| f.trim().is_empty()) {
                return Err(Error::Parse {
                    line: line_no,
                    message: format!("empty place field at position {}", i + 1),
                });
            }
            if fields.len() % 3 != 0 {
                return Err(Error::Parse {
                    line: line_no,
                    message: format!(
                        "place fields must come in name;x;y triples, found {} fields",
                        fields.len()
                    ),
                });
            }
            for triple in fields.chunks(3) {
                let coord = |s: &str| {
                    s.trim().parse::<f64>().map_err(|e| Error::Parse {
                        line: line_no,
                        message: format!("invalid coordinate {:?} for {}: {}", s, triple[0], e),
                    })
                };
                places.push(Place::new(triple[0], coord(triple[1])?, coord(triple[2])?));
            }
        }

        let mut connections = Vec::new();
        let mut connection_lines = Vec::new();
        for (line_no, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            connections.push(Connection::parse_line(line, line_no)?);
            connection_lines.push(line_no);
        }

        Ok(Self {
            image,
            places,
            connections,
            connection_lines,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.image);
        out.push('\n');
        for place in &self.places {
            // `{:?}` keeps the ".0" on whole numbers
            let _ = write!(out, "{};{:?};{:?};", place.name, place.x, place.y);
        }
        out.push('\n');
        for connection in &self.connections {
            out.push_str(&connection.to_line());
            out.push('\n');
        }
        out
    }

    /// Capture a graph. Places are ordered by name and every directed edge
    /// gets its own line, sorted.
    pub fn from_graph(image: impl Into<String>, graph: &Graph<Place>) -> Result<Self> {
        let mut places: Vec<Place> = graph.nodes().cloned().collect();
        places.sort_by(|a, b| a.name.cmp(&b.name));
        for place in &places {
            validate_name(&place.name)?;
        }

        let mut connections = Vec::with_capacity(graph.edge_count());
        for place in &places {
            for edge in graph.edges_from(place)? {
                validate_name(edge.name())?;
                connections.push(Connection::from(edge));
            }
        }
        connections.sort_by_cached_key(Connection::to_line);
        connections.dedup();

        Ok(Self {
            image: image.into(),
            places,
            connections,
            connection_lines: Vec::new(),
        })
    }

    /// Replay the document into a graph: `add` every place, then `connect`
    /// every record.
    ///
    /// A record whose reverse was already applied with the same name and
    /// weight is the second half of that connection and is skipped.
    pub fn into_graph(mut self) -> Result<Graph<Place>> {
        let mut graph = Graph::new();
        for place in std::mem::take(&mut self.places) {
            if !graph.add(place) {
                debug!("Ignoring repeated place in map file");
            }
        }

        for (i, record) in self.connections.iter().enumerate() {
            let from = Place::named(record.from.as_str());
            let to = Place::named(record.to.as_str());
            for place in [&from, &to] {
                if !graph.contains(place) {
                    return Err(Error::Parse {
                        line: self.line_of(i),
                        message: format!("unknown place {:?}", place.name),
                    });
                }
            }

            match graph.edge_between(&from, &to)? {
                Some(existing)
                    if existing.name() == record.name && existing.weight() == record.weight => {}
                Some(existing) => {
                    return Err(Error::AlreadyExists(format!(
                        "{} conflicts with {}",
                        record.to_line(),
                        Connection::from(existing).to_line()
                    )))
                }
                None => graph.connect(&from, &to, record.name.as_str(), record.weight)?,
            }
        }
        Ok(graph)
    }

    /// Rendered documents put record `i` on line `i + 3`.
    fn line_of(&self, index: usize) -> usize {
        self.connection_lines
            .get(index)
            .copied()
            .unwrap_or(index + 3)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Write atomically: readers see either the old file or the new one.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = self.render();
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(data.as_bytes()))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
            })
    }
}

/// Names end up between separators, so they may not contain one.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(FIELD_SEPARATOR) || name.contains(['\n', '\r']) {
        return Err(Error::InvalidArgument(format!(
            "name {:?} must be non-empty and free of ';' and line breaks",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EUROPA: &str = "file:europa.gif
Oslo;100.0;50.0;Stockholm;200.0;60.0;Helsinki;300.5;40.0;
Helsinki;Stockholm;Ferry;12
Oslo;Stockholm;Train;6
Stockholm;Helsinki;Ferry;12
Stockholm;Oslo;Train;6
";

    #[test]
    fn test_parse() {
        let doc = MapDocument::parse(EUROPA).unwrap();
        assert_eq!(doc.image, "file:europa.gif");
        assert_eq!(doc.places.len(), 3);
        assert_eq!(doc.places[2].x, 300.5);
        assert_eq!(doc.connections.len(), 4);
        assert_eq!(doc.connections[1].name, "Train");
        assert_eq!(doc.connections[1].weight, 6);
    }

    #[test]
    fn test_into_graph_skips_mirror_lines() {
        let graph = MapDocument::parse(EUROPA).unwrap().into_graph().unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.connection_count(), 2);
        assert!(graph.path_exists(&Place::named("Oslo"), &Place::named("Helsinki")));
    }

    #[test]
    fn test_single_direction_lines_also_load() {
        let text = "img\nA;1.0;1.0;B;2.0;2.0;\nA;B;road;3\n";
        let graph = MapDocument::parse(text).unwrap().into_graph().unwrap();
        let edge = graph
            .edge_between(&Place::named("B"), &Place::named("A"))
            .unwrap()
            .unwrap();
        assert_eq!(edge.weight(), 3);
    }

    #[test]
    fn test_render_matches_input() {
        let graph = MapDocument::parse(EUROPA).unwrap().into_graph().unwrap();
        let doc = MapDocument::from_graph("file:europa.gif", &graph).unwrap();
        let rendered = doc.render();

        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("file:europa.gif"));
        assert_eq!(
            lines.next(),
            Some("Helsinki;300.5;40.0;Oslo;100.0;50.0;Stockholm;200.0;60.0;")
        );
        let edges: Vec<&str> = lines.collect();
        let expected: Vec<&str> = EUROPA.lines().skip(2).collect();
        assert_eq!(edges, expected);
    }

    #[test]
    fn test_empty_map() {
        let doc = MapDocument::parse("background.png\n\n").unwrap();
        assert!(doc.places.is_empty());
        assert!(doc.connections.is_empty());
        assert!(doc.into_graph().unwrap().is_empty());

        let doc = MapDocument::parse("background.png").unwrap();
        assert!(doc.places.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(MapDocument::parse(""), Err(Error::Parse { line: 1, .. })));
        assert!(matches!(
            MapDocument::parse("img\nA;1.0;\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            MapDocument::parse("img\nA;x;1.0;\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            MapDocument::parse("img\nA;;1.0;2.0;\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            MapDocument::parse("img\nA;1.0;2.0;;B;3.0;4.0;\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            MapDocument::parse("img\nA;1;1;B;2;2;\nA;B;road\n"),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(
            MapDocument::parse("img\nA;1;1;B;2;2;\n\nA;B;road;fast\n"),
            Err(Error::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_semantic_errors() {
        let unknown = MapDocument::parse("img\nA;1;1;\nA;B;road;1\n").unwrap();
        assert!(matches!(unknown.into_graph(), Err(Error::Parse { line: 3, .. })));

        let after_blank = MapDocument::parse("img\nA;1;1;B;2;2;\nA;B;road;1\n\nB;C;rail;2\n").unwrap();
        assert!(matches!(after_blank.into_graph(), Err(Error::Parse { line: 5, .. })));

        let conflict = MapDocument::parse("img\nA;1;1;B;2;2;\nA;B;road;1\nB;A;road;2\n").unwrap();
        assert!(matches!(conflict.into_graph(), Err(Error::AlreadyExists(_))));

        let negative = MapDocument::parse("img\nA;1;1;B;2;2;\nA;B;road;-1\n").unwrap();
        assert!(matches!(negative.into_graph(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_names_with_separator_rejected() {
        let mut graph = Graph::new();
        graph.add(Place::new("Bad;Name", 0.0, 0.0));
        assert!(matches!(
            MapDocument::from_graph("img", &graph),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("europa.graph");
        let doc = MapDocument::parse(EUROPA).unwrap();
        doc.write(&path).unwrap();

        let back = MapDocument::read(&path).unwrap();
        assert_eq!(back, doc);
    }
}
