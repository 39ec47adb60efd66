// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use wayfinder::navigator::{Navigator, Options};
use wayfinder::reader::{write_json_to_file, write_json_to_io, FileFormat};
use wayfinder::RouteError;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    sources: Sources,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Sources {
    /// GeoJSON file with building footprints
    #[arg(long, global = true)]
    campus: Option<PathBuf>,

    /// Previously built campus graph, used instead of --campus
    #[arg(long, global = true)]
    campus_graph: Option<PathBuf>,

    /// Directory with floor graph documents
    #[arg(long, global = true)]
    floors: Option<PathBuf>,

    /// Maximum distance between linked buildings, in meters
    #[arg(long, global = true, default_value_t = wayfinder::campus::DEFAULT_MAX_DISTANCE)]
    max_distance: f64,

    /// Maximum distance between linked floor nodes, in pixels
    #[arg(long, global = true, default_value_t = wayfinder::floor::DEFAULT_FLOOR_MAX_DISTANCE)]
    floor_max_distance: f64,

    /// Pair of buildings to link regardless of their distance, e.g. "A,Lab 2"
    #[arg(long = "link", global = true, value_parser = parse_link)]
    links: Vec<(String, String)>,

    /// Maximum number of nodes expanded by a single route search
    #[arg(long, global = true, default_value_t = wayfinder::DEFAULT_STEP_LIMIT)]
    step_limit: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Find a route between two buildings and print it as GeoJSON
    Route { origin: String, destination: String },

    /// Find a route between two nodes or rooms of a floor
    FloorRoute {
        floor: String,
        origin: String,
        destination: String,
    },

    /// Build the campus graph and save it to a file
    BuildCampus { output: PathBuf },

    /// Print the connectivity report of a floor, optionally saving the floor graph
    ValidateFloor {
        floor: String,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List all loaded buildings
    Buildings,
}

fn parse_link(s: &str) -> Result<(String, String), String> {
    match s.split_once(',') {
        Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            Ok((a.trim().to_string(), b.trim().to_string()))
        }
        _ => Err(format!("expected two buildings separated by a comma, got {s:?}")),
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let options = Options {
        campus_geojson: cli.sources.campus,
        campus_graph: cli.sources.campus_graph,
        floors_dir: cli.sources.floors,
        max_distance_meters: cli.sources.max_distance,
        floor_max_distance: cli.sources.floor_max_distance,
        manual_connections: cli.sources.links,
        file_format: FileFormat::Unknown,
        step_limit: cli.sources.step_limit,
    };
    let navigator = Navigator::load(&options);

    match cli.command {
        Command::Route {
            origin,
            destination,
        } => {
            let route = navigator.route(&origin, &destination)?;
            for line in route.instructions() {
                log::info!("{line}");
            }
            log::info!(
                "{:.0} m, about {} min on foot",
                route.total_distance_meters,
                route.estimated_walking_time().as_secs().div_ceil(60)
            );

            let coordinates: Vec<[f64; 2]> = route.path.iter().map(|b| b.centroid.into()).collect();
            let geojson = json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {
                        "buildings": route.path.iter().map(|b| &b.id).collect::<Vec<_>>(),
                        "totalDistanceMeters": route.total_distance_meters,
                    },
                    "geometry": {"type": "LineString", "coordinates": coordinates},
                }],
            });
            print_json(&geojson)?;
        }

        Command::FloorRoute {
            floor,
            origin,
            destination,
        } => {
            let route = navigator.route_in_building(&origin, &destination, &floor)?;
            print_json(&route)?;
        }

        Command::BuildCampus { output } => {
            let doc = navigator.campus().to_document();
            write_json_to_file(&output, FileFormat::Unknown, &doc)?;
            log::info!(
                "saved {} buildings and {} links to {}",
                doc.summary.buildings,
                doc.summary.edges,
                output.display()
            );
        }

        Command::ValidateFloor { floor, output } => {
            let g = navigator
                .floor(&floor)
                .ok_or_else(|| RouteError::UnknownFloor(floor.clone()))?;
            let validation = g.validate();
            if validation.isolated_nodes > 0 {
                log::warn!("isolated nodes: {}", validation.isolated.join(", "));
            }
            print_json(&validation)?;

            if let Some(output) = output {
                write_json_to_file(&output, FileFormat::Unknown, &g.to_document())?;
            }
        }

        Command::Buildings => {
            for b in navigator.campus().buildings() {
                println!("{}\t{}\t{}", b.id, b.kind.reference, b.kind.name);
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    write_json_to_io(std::io::stdout().lock(), FileFormat::Json, value)?;
    println!();
    Ok(())
}
