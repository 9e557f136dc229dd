use clap::{Parser, Subcommand};
use pathgraph_api::RestApi;
use pathgraph_core::{Location, Place, Weight};
use pathgraph_storage::MapStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Places, named connections and depth-first routes between them
#[derive(Parser, Debug)]
#[command(name = "pathgraph")]
#[command(about = "Find routes through a map of connected places", long_about = None)]
struct Args {
    /// Path to the .graph map file
    #[arg(short, long, default_value = "europa.graph")]
    map: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the map over HTTP
    Serve {
        /// HTTP API port
        #[arg(long, default_value_t = 6340)]
        http_port: u16,
    },
    /// Print a route between two places
    Path { from: String, to: String },
    /// Print every place and its connections
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add a place at the given coordinates
    AddPlace { name: String, x: f64, y: f64 },
    /// Remove a place and all its connections
    RemovePlace { name: String },
    /// Connect two places
    Connect {
        from: String,
        to: String,
        /// Name of the connection, e.g. a road or ferry line
        #[arg(long)]
        name: String,
        #[arg(long)]
        weight: Weight,
    },
    /// Remove the connection between two places
    Disconnect { from: String, to: String },
    /// Change the weight of an existing connection
    Reweight {
        from: String,
        to: String,
        weight: Weight,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = Arc::new(MapStore::new(&args.map)?);

    match args.command {
        Command::Serve { http_port } => serve(store, http_port).await?,
        Command::Path { from, to } => match store.find_path(&from, &to)? {
            Some(route) => println!("{}", route),
            None => println!("No path from {} to {}", from, to),
        },
        Command::Show { json } => show(&store, json)?,
        Command::AddPlace { name, x, y } => {
            if !store.add_place(Place::new(name.clone(), x, y))? {
                anyhow::bail!("place {:?} already exists", name);
            }
            store.save()?;
        }
        Command::RemovePlace { name } => {
            store.remove_place(&name)?;
            store.save()?;
        }
        Command::Connect {
            from,
            to,
            name,
            weight,
        } => {
            store.connect(&from, &to, &name, weight)?;
            store.save()?;
        }
        Command::Disconnect { from, to } => {
            store.disconnect(&from, &to)?;
            store.save()?;
        }
        Command::Reweight { from, to, weight } => {
            store.set_connection_weight(&from, &to, weight)?;
            store.save()?;
        }
    }

    Ok(())
}

async fn serve(store: Arc<MapStore>, http_port: u16) -> anyhow::Result<()> {
    info!("Starting pathgraph v{}", env!("CARGO_PKG_VERSION"));
    info!("Map file: {:?}", store.path());
    info!("HTTP API port: {}", http_port);

    let store_http = store.clone();
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(store_http, http_port).await {
                eprintln!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    if store.is_dirty() {
        warn!("Saving unsaved changes to {:?}", store.path());
        store.save()?;
    }

    info!("Shutting down...");
    Ok(())
}

fn show(store: &MapStore, json: bool) -> anyhow::Result<()> {
    if json {
        let doc = serde_json::json!({
            "image": store.image(),
            "places": store.places(),
            "connections": store.connections(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Image: {}", store.image());
    for place in store.places() {
        println!("{}", Location(&place));
        for hop in store.edges_from(&place.name)? {
            println!("  to {} by {} takes {}", hop.to, hop.name, hop.weight);
        }
    }
    Ok(())
}
