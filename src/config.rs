//! Startup configuration: a JSON file describing every map, deserialized
//! into typed structs and validated into the engine's [`Game`]. A config
//! failure here is fatal to the process.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::game::Game;
use crate::geom::{Coord, Dimension, Offset, Point, Rectangle, Size};
use crate::map::{Building, Map, MapId, Office, OfficeId, Road};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("road in map {map} has neither x1 nor y1")]
    RoadShape { map: String },

    #[error(transparent)]
    Game(#[from] crate::error::Error),
}

#[derive(Debug, Deserialize)]
struct GameConfig {
    #[serde(rename = "defaultDogSpeed")]
    default_dog_speed: Option<f64>,
    maps: Vec<MapConfig>,
}

#[derive(Debug, Deserialize)]
struct MapConfig {
    id: String,
    name: String,
    #[serde(rename = "dogSpeed")]
    dog_speed: Option<f64>,
    roads: Vec<RoadConfig>,
    buildings: Vec<BuildingConfig>,
    offices: Vec<OfficeConfig>,
}

/// A road carries `x1` when horizontal and `y1` when vertical. When both
/// are present `x1` wins.
#[derive(Debug, Deserialize)]
struct RoadConfig {
    x0: Coord,
    y0: Coord,
    x1: Option<Coord>,
    y1: Option<Coord>,
}

#[derive(Debug, Deserialize)]
struct BuildingConfig {
    x: Coord,
    y: Coord,
    w: Dimension,
    h: Dimension,
}

#[derive(Debug, Deserialize)]
struct OfficeConfig {
    id: String,
    x: Coord,
    y: Coord,
    #[serde(rename = "offsetX")]
    offset_x: Dimension,
    #[serde(rename = "offsetY")]
    offset_y: Dimension,
}

/// Reads and validates the config file into a ready-to-serve [`Game`].
pub fn load_game(path: &Path) -> Result<Game, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_game(&content)
}

fn parse_game(content: &str) -> Result<Game, LoadError> {
    let config: GameConfig = serde_json::from_str(content)?;

    let mut game = Game::new();
    if let Some(speed) = config.default_dog_speed {
        game.set_default_dog_speed(speed);
    }
    for map_config in config.maps {
        game.add_map(build_map(map_config)?)?;
    }
    Ok(game)
}

fn build_map(config: MapConfig) -> Result<Map, LoadError> {
    let mut map = Map::new(MapId::new(config.id), config.name);
    if let Some(speed) = config.dog_speed {
        map.set_dog_speed(speed);
    }

    for road in config.roads {
        let start = Point {
            x: road.x0,
            y: road.y0,
        };
        let road = match (road.x1, road.y1) {
            (Some(x1), _) => Road::horizontal(start, x1),
            (None, Some(y1)) => Road::vertical(start, y1),
            (None, None) => {
                return Err(LoadError::RoadShape {
                    map: map.id().to_string(),
                })
            }
        };
        map.add_road(road);
    }

    for building in config.buildings {
        map.add_building(Building::new(Rectangle {
            position: Point {
                x: building.x,
                y: building.y,
            },
            size: Size {
                width: building.w,
                height: building.h,
            },
        }));
    }

    for office in config.offices {
        map.add_office(Office::new(
            OfficeId::new(office.id),
            Point {
                x: office.x,
                y: office.y,
            },
            Offset {
                dx: office.offset_x,
                dy: office.offset_y,
            },
        ))?;
    }

    Ok(map)
}
