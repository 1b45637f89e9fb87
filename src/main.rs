use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use wayplan;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct ModelLoadError(PathBuf, #[source] wayplan::osm::Error);

#[derive(Parser)]
struct Cli {
    /// The path to the OSM XML file (optionally gzip or bzip2 compressed)
    osm_file: PathBuf,

    /// X coordinate of the start point, between 0 and 1
    start_x: f64,

    /// Y coordinate of the start point, between 0 and 1
    start_y: f64,

    /// X coordinate of the end point, between 0 and 1
    end_x: f64,

    /// Y coordinate of the end point, between 0 and 1
    end_y: f64,

    /// Treat the query points as already being in the coordinate system of the map
    #[arg(long)]
    no_aspect_correction: bool,

    /// Maximum number of nodes expanded by the search
    #[arg(long, default_value_t = wayplan::DEFAULT_STEP_LIMIT)]
    step_limit: usize,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let model = load_model(&cli.osm_file)?;
    let planner = wayplan::RoutePlanner::new(&model);

    let options = wayplan::RouteOptions {
        correct_aspect_ratio: !cli.no_aspect_correction,
        step_limit: cli.step_limit,
    };
    let route = planner
        .find_route(
            wayplan::Point::new(cli.start_x, cli.start_y),
            wayplan::Point::new(cli.end_x, cli.end_y),
            &options,
        )?
        .ok_or("no route between the given points")?;

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{");
    println!(
        "        \"length_m\": {:.1}",
        route.length_meters(model.projection())
    );
    println!("      }},");

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut positions = route
        .nodes
        .iter()
        .filter_map(|&idx| model.get_node(idx))
        .map(|node| model.projection().unproject(node.position()))
        .peekable();
    while let Some((lon, lat)) = positions.next() {
        let suffix = if positions.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", lon, lat, suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");

    Ok(())
}

fn load_model<P: AsRef<Path>>(path: P) -> Result<wayplan::Model, ModelLoadError> {
    let options = wayplan::osm::Options {
        file_format: wayplan::osm::FileFormat::Unknown,
    };
    match wayplan::osm::load_from_file(&options, path.as_ref()) {
        Ok(m) => Ok(m),
        Err(e) => Err(ModelLoadError(PathBuf::from(path.as_ref()), e)),
    }
}
