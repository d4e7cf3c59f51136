//! The dog avatar: identity, display name, and kinematic state. Dogs carry
//! no behavior of their own; the session integrator and the application's
//! move handling are their only mutators.

use std::fmt;
use std::str::FromStr;

use crate::geom::{PointD, Vec2D};

/// Identifier of a dog, assigned sequentially by the player registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DogId(u64);

impl DogId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Position of this dog inside the registry's arena.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Facing direction: the last non-empty movement intent. Stopping a dog
/// never resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Up => "U",
            Direction::Down => "D",
        }
    }

    /// Velocity of a dog moving this way at the given speed. The map's
    /// y axis grows downward, so `U` is negative v.
    pub fn velocity(&self, speed: f64) -> Vec2D {
        match self {
            Direction::Left => Vec2D::new(-speed, 0.0),
            Direction::Right => Vec2D::new(speed, 0.0),
            Direction::Up => Vec2D::new(0.0, -speed),
            Direction::Down => Vec2D::new(0.0, speed),
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Direction::Left),
            "R" => Ok(Direction::Right),
            "U" => Ok(Direction::Up),
            "D" => Ok(Direction::Down),
            _ => Err(()),
        }
    }
}

/// A player avatar living on one map.
#[derive(Debug, Clone)]
pub struct Dog {
    id: DogId,
    name: String,
    position: PointD,
    speed: Vec2D,
    direction: Direction,
}

impl Dog {
    pub fn new(id: DogId, name: String) -> Self {
        Self {
            id,
            name,
            position: PointD::default(),
            speed: Vec2D::ZERO,
            direction: Direction::Up,
        }
    }

    pub fn id(&self) -> DogId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> PointD {
        self.position
    }

    pub fn speed(&self) -> Vec2D {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_position(&mut self, position: PointD) {
        self.position = position;
    }

    pub fn set_speed(&mut self, speed: Vec2D) {
        self.speed = speed;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }
}
