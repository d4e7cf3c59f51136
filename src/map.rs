//! Immutable map model: axis-aligned roads with their walkable bands,
//! decorative buildings, and uniquely identified offices.

use std::collections::HashMap;
use std::fmt;

use crate::error::Error;
use crate::geom::{Coord, Offset, Point, PointD, Rectangle};

/// Every road extends this far beyond its segment on all four sides,
/// producing the rectangular band a dog may walk on.
pub const ROAD_HALF_WIDTH: f64 = 0.4;

/// Identifier of a map, unique across the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapId(String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an office, unique within its map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OfficeId(String);

impl OfficeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfficeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An axis-aligned road segment. Horizontal roads share a y coordinate
/// between both ends, vertical roads share an x coordinate; the
/// constructors make any other shape unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Road {
    start: Point,
    end: Point,
}

impl Road {
    pub fn horizontal(start: Point, end_x: Coord) -> Self {
        Self {
            start,
            end: Point {
                x: end_x,
                y: start.y,
            },
        }
    }

    pub fn vertical(start: Point, end_y: Coord) -> Self {
        Self {
            start,
            end: Point {
                x: start.x,
                y: end_y,
            },
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Corners of the walkable band: the segment's bounding box grown by
    /// [`ROAD_HALF_WIDTH`] on every side.
    pub fn band(&self) -> (PointD, PointD) {
        let x_min = self.start.x.min(self.end.x) as f64 - ROAD_HALF_WIDTH;
        let x_max = self.start.x.max(self.end.x) as f64 + ROAD_HALF_WIDTH;
        let y_min = self.start.y.min(self.end.y) as f64 - ROAD_HALF_WIDTH;
        let y_max = self.start.y.max(self.end.y) as f64 + ROAD_HALF_WIDTH;
        (PointD::new(x_min, y_min), PointD::new(x_max, y_max))
    }

    /// Whether the point lies within the band, bounds inclusive.
    pub fn contains(&self, pos: PointD) -> bool {
        let (lo, hi) = self.band();
        pos.x >= lo.x && pos.x <= hi.x && pos.y >= lo.y && pos.y <= hi.y
    }

    /// The point inside the band closest to `pos`, component-wise.
    pub fn clamp(&self, pos: PointD) -> PointD {
        let (lo, hi) = self.band();
        PointD::new(pos.x.clamp(lo.x, hi.x), pos.y.clamp(lo.y, hi.y))
    }
}

/// A building footprint. Decorative: it participates in map JSON but does
/// not constrain movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Building {
    bounds: Rectangle,
}

impl Building {
    pub fn new(bounds: Rectangle) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }
}

/// A loot office marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Office {
    id: OfficeId,
    position: Point,
    offset: Offset,
}

impl Office {
    pub fn new(id: OfficeId, position: Point, offset: Offset) -> Self {
        Self {
            id,
            position,
            offset,
        }
    }

    pub fn id(&self) -> &OfficeId {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }
}

/// One game map: the road network dogs walk on, plus scenery. Read-only
/// once registered with the catalog.
#[derive(Debug, Clone)]
pub struct Map {
    id: MapId,
    name: String,
    roads: Vec<Road>,
    buildings: Vec<Building>,
    offices: Vec<Office>,
    office_index: HashMap<OfficeId, usize>,
    dog_speed: Option<f64>,
}

impl Map {
    pub fn new(id: MapId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roads: Vec::new(),
            buildings: Vec::new(),
            offices: Vec::new(),
            office_index: HashMap::new(),
            dog_speed: None,
        }
    }

    pub fn id(&self) -> &MapId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn offices(&self) -> &[Office] {
        &self.offices
    }

    /// Per-map movement speed override; the catalog default applies when
    /// absent.
    pub fn dog_speed(&self) -> Option<f64> {
        self.dog_speed
    }

    pub fn set_dog_speed(&mut self, speed: f64) {
        self.dog_speed = Some(speed);
    }

    pub fn add_road(&mut self, road: Road) {
        self.roads.push(road);
    }

    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
    }

    /// Registers an office, failing when its id collides with an existing
    /// one. The office list is unchanged on failure.
    pub fn add_office(&mut self, office: Office) -> Result<(), Error> {
        if self.office_index.contains_key(office.id()) {
            return Err(Error::DuplicateOffice(office.id().to_string()));
        }
        self.office_index
            .insert(office.id().clone(), self.offices.len());
        self.offices.push(office);
        Ok(())
    }

    pub fn find_office(&self, id: &OfficeId) -> Option<&Office> {
        self.office_index.get(id).map(|&i| &self.offices[i])
    }
}
