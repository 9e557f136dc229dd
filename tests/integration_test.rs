// Integration tests for pathgraph
use pathgraph::prelude::*;
use std::fs;

const EUROPA: &str = "file:europa.gif
Paris;120.0;340.0;Lyon;180.0;420.0;Milan;300.0;430.0;Oslo;260.0;40.0;Bergen;210.0;50.0
Bergen;Oslo;E16;7
Lyon;Milan;E70;5
Lyon;Paris;A6;4
Milan;Lyon;E70;5
Oslo;Bergen;E16;7
Paris;Lyon;A6;4
";

#[test]
fn test_pqr_scenario() {
    let mut graph: Graph<String> = Graph::new();
    for name in ["P", "Q", "R"] {
        assert!(graph.add(name.to_string()));
    }
    let (p, q, r) = ("P".to_string(), "Q".to_string(), "R".to_string());

    graph.connect(&p, &q, "road", 3).unwrap();
    graph.connect(&q, &r, "rail", 4).unwrap();

    assert!(graph.path_exists(&p, &r));
    let path = graph.path(&p, &r).unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(path[0].source(), &p);
    assert_eq!(path[0].destination(), &q);
    assert_eq!(path[1].destination(), &r);
    assert_eq!(path_weight(&path), 7);

    graph.remove(&q).unwrap();
    assert!(!graph.path_exists(&p, &r));
    assert!(graph.path(&p, &r).is_none());
    assert!(graph.edges_from(&p).unwrap().is_empty());
}

#[test]
fn test_connection_invariants() {
    let mut graph: Graph<u32> = Graph::new();
    for n in 0..4 {
        graph.add(n);
    }

    assert!(matches!(graph.connect(&0, &1, "x", -1), Err(Error::InvalidArgument(_))));
    assert!(matches!(graph.connect(&0, &9, "x", 1), Err(Error::NotFound(_))));
    assert_eq!(graph.edge_count(), 0);

    graph.connect(&0, &1, "x", 2).unwrap();
    assert!(matches!(graph.connect(&1, &0, "y", 2), Err(Error::AlreadyExists(_))));

    graph.set_connection_weight(&1, &0, 6).unwrap();
    let forward = graph.edge_between(&0, &1).unwrap().unwrap();
    let backward = graph.edge_between(&1, &0).unwrap().unwrap();
    assert_eq!(forward.name(), backward.name());
    assert_eq!(forward.weight(), 6);
    assert_eq!(backward.weight(), 6);

    graph.disconnect(&0, &1).unwrap();
    assert!(graph.edge_between(&0, &1).unwrap().is_none());
    assert!(matches!(graph.disconnect(&0, &1), Err(Error::NotFound(_))));
    graph.connect(&0, &1, "x", 2).unwrap();
    assert_eq!(graph.connection_count(), 1);
}

#[test]
fn test_load_europa_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("europa.graph");
    fs::write(&path, EUROPA).unwrap();

    let store = MapStore::new(&path).unwrap();
    assert_eq!(store.image(), "file:europa.gif");
    assert_eq!(store.places().len(), 5);
    assert_eq!(store.connections().len(), 3);

    let route = store.find_path("Paris", "Milan").unwrap().unwrap();
    assert_eq!(route.total_weight, 9);
    assert_eq!(route.hops.first().unwrap().from, "Paris");
    assert_eq!(route.hops.last().unwrap().to, "Milan");

    assert!(store.find_path("Paris", "Oslo").unwrap().is_none());
    assert!(store.find_path("Paris", "Rome").is_err());

    let milan = store.place("Milan").unwrap();
    assert_eq!(Location(&milan).to_string(), "Location: Milan (300.0 430.0)");
}

#[test]
fn test_edit_save_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("europa.graph");
    fs::write(&path, EUROPA).unwrap();

    let store = MapStore::new(&path).unwrap();
    store.connect("Milan", "Oslo", "ferry", 20).unwrap();
    store.set_connection_weight("Lyon", "Paris", 6).unwrap();
    store.remove_place("Bergen").unwrap();
    store.save().unwrap();

    let reloaded = MapStore::new(&path).unwrap();
    assert_eq!(reloaded.places().len(), 4);
    assert_eq!(reloaded.connection("Paris", "Lyon").unwrap().unwrap().weight, 6);
    assert!(reloaded.place("Bergen").is_none());

    let route = reloaded.find_path("Paris", "Oslo").unwrap().unwrap();
    assert_eq!(route.total_weight, 6 + 5 + 20);

    // Every connection is written once per direction.
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("Milan;Oslo;ferry;20"));
    assert!(text.contains("Oslo;Milan;ferry;20"));
}

#[test]
fn test_malformed_map_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.graph");
    fs::write(&path, "file:x.gif\nA;1.0;2.0;\nA;B;road\n").unwrap();

    match MapStore::new(&path) {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {:?}", other.err()),
    }
}
