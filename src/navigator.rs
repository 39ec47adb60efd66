// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Service owning the campus graph and all floor graphs.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::campus::{CampusDocument, CampusGraph, CampusRoute, FeatureCollection};
use crate::floor::{
    FloorDocument, FloorGraph, FloorRoute, DEFAULT_FLOOR_MAX_DISTANCE, WALKING_PROFILE,
};
use crate::reader::{read_json_from_file, FileFormat};
use crate::{campus, RouteError, DEFAULT_STEP_LIMIT};

/// Describes where the [Navigator] loads its graphs from, and how they are linked.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// GeoJSON FeatureCollection with building footprints.
    /// Used only if [Options::campus_graph] is not set or can't be read.
    pub campus_geojson: Option<PathBuf>,

    /// Previously built campus graph ([CampusDocument]).
    pub campus_graph: Option<PathBuf>,

    /// Directory with one [FloorDocument] per floor.
    pub floors_dir: Option<PathBuf>,

    /// Maximum distance between linked buildings loaded from [Options::campus_geojson].
    pub max_distance_meters: f64,

    /// Maximum distance between linked floor nodes, used only for
    /// floor documents without any edges.
    pub floor_max_distance: f64,

    /// Pairs of buildings to link regardless of their distance.
    pub manual_connections: Vec<(String, String)>,

    /// Format of all input files, [FileFormat::Unknown] to detect it from file contents.
    pub file_format: FileFormat,

    /// Maximum number of nodes expanded by a single route search.
    pub step_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            campus_geojson: None,
            campus_graph: None,
            floors_dir: None,
            max_distance_meters: campus::DEFAULT_MAX_DISTANCE,
            floor_max_distance: DEFAULT_FLOOR_MAX_DISTANCE,
            manual_connections: Vec::default(),
            file_format: FileFormat::Unknown,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// Answers route queries over a campus graph and a set of floor graphs.
///
/// All graphs are built once by [Navigator::load] and never modified afterwards,
/// so a Navigator can be freely shared between threads.
#[derive(Debug, Clone)]
pub struct Navigator {
    campus: CampusGraph,
    floors: BTreeMap<String, FloorGraph>,
}

impl Navigator {
    /// Creates a Navigator from already built graphs.
    ///
    /// Floor names are compared case-insensitively; if several floors
    /// share a name, the first one wins and the rest are logged and skipped.
    pub fn new<I: IntoIterator<Item = FloorGraph>>(campus: CampusGraph, floors: I) -> Self {
        let mut by_name: BTreeMap<String, FloorGraph> = BTreeMap::default();
        for f in floors {
            match by_name.entry(f.floor().to_lowercase()) {
                Entry::Vacant(e) => {
                    e.insert(f);
                }
                Entry::Occupied(_) => log::warn!("skipping floor {}: duplicate name", f.floor()),
            }
        }

        Self {
            campus,
            floors: by_name,
        }
    }

    /// Loads all graphs described by the [Options].
    ///
    /// Never fails - files which are missing or can't be read are logged
    /// and replaced by empty graphs.
    pub fn load(options: &Options) -> Self {
        let campus = load_campus(options).with_step_limit(options.step_limit);

        let floors = match &options.floors_dir {
            Some(dir) => load_floors(dir, options),
            None => Vec::default(),
        };

        let navigator = Self::new(campus, floors);
        log::info!(
            "navigator ready: {} buildings, {} floors",
            navigator.campus.len(),
            navigator.floors.len()
        );
        navigator
    }

    pub fn campus(&self) -> &CampusGraph {
        &self.campus
    }

    /// Retrieves a floor graph by its name, compared case-insensitively.
    pub fn floor(&self, name: &str) -> Option<&FloorGraph> {
        self.floors.get(&name.trim().to_lowercase())
    }

    /// Returns an iterator over all floor graphs, ordered by their names.
    pub fn floors(&self) -> impl Iterator<Item = &FloorGraph> {
        self.floors.values()
    }

    /// Finds the shortest route between two buildings, see [CampusGraph::route].
    pub fn route(&self, origin: &str, destination: &str) -> Result<CampusRoute, RouteError> {
        self.campus.route(origin, destination)
    }

    /// Finds the shortest route between two nodes or rooms of a floor, see [FloorGraph::route].
    pub fn route_in_building(
        &self,
        origin: &str,
        destination: &str,
        floor: &str,
    ) -> Result<FloorRoute, RouteError> {
        self.floor(floor)
            .ok_or_else(|| RouteError::UnknownFloor(floor.to_string()))?
            .route(origin, destination)
    }
}

fn load_campus(options: &Options) -> CampusGraph {
    let mut g = options
        .campus_graph
        .as_deref()
        .and_then(|path| read_or_warn::<CampusDocument>(path, options.file_format))
        .map(|doc| CampusGraph::from_document(&doc))
        .or_else(|| {
            let path = options.campus_geojson.as_deref()?;
            let collection = read_or_warn::<FeatureCollection>(path, options.file_format)?;
            let mut g = CampusGraph::new();
            g.load_geojson(&collection);
            g.connect_nearby(options.max_distance_meters);
            Some(g)
        })
        .unwrap_or_default();

    for (a, b) in &options.manual_connections {
        if let Err(e) = g.connect_manual(a, b) {
            log::warn!("can't link {a} with {b}: {e}");
        }
    }

    g
}

fn load_floors(dir: &Path, options: &Options) -> Vec<FloorGraph> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("can't list floors in {}: {e}", dir.display());
            return Vec::default();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_document_path(path))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let mut doc = read_or_warn::<FloorDocument>(&path, options.file_format)?;
            if doc.floor.is_empty() {
                doc.floor = document_stem(&path);
            }

            let mut g = FloorGraph::from_document(&doc).with_step_limit(options.step_limit);
            if doc.edges.is_empty() {
                g.connect_nearby(options.floor_max_distance, &WALKING_PROFILE);
            }
            Some(g)
        })
        .collect()
}

fn read_or_warn<T: serde::de::DeserializeOwned>(path: &Path, format: FileFormat) -> Option<T> {
    match read_json_from_file(path, format) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("can't read {}: {e}", path.display());
            None
        }
    }
}

fn is_document_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "geojson" | "gz" | "bz2")
    )
}

/// File name without the document and compression extensions,
/// e.g. "floors/A1.json.gz" → "A1".
fn document_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut stem = name.as_str();
    for ext in [".gz", ".bz2", ".json"] {
        stem = stem.strip_suffix(ext).unwrap_or(stem);
    }
    stem.to_string()
}
