//! Per-map game session: the population of dogs on one map, the spawn
//! policy for newcomers, and the road-constrained movement integrator.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dog::{Direction, Dog, DogId};
use crate::error::Error;
use crate::geom::{PointD, Vec2D};
use crate::map::{Map, Road};

/// Two destinations closer than this per component count as the same spot;
/// a dog that falls short of its naive destination by more is considered
/// stopped by the road edge.
const POSITION_EPSILON: f64 = 1e-9;

/// The dogs living on one map. The session does not own its dogs; it keeps
/// their ids and mutates them through the registry's arena during a tick.
#[derive(Debug)]
pub struct GameSession {
    map: Arc<Map>,
    dog_ids: Vec<DogId>,
    randomize_spawn: bool,
    rng: SmallRng,
}

impl GameSession {
    pub fn new(map: Arc<Map>, randomize_spawn: bool) -> Self {
        Self {
            map,
            dog_ids: Vec::new(),
            randomize_spawn,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn dog_ids(&self) -> &[DogId] {
        &self.dog_ids
    }

    /// Places a newly created dog on the road network and adds it to the
    /// session. Spawns stand still facing up: on the first road's start
    /// vertex, at a uniformly random point of a uniformly random road when
    /// the session randomizes spawns, or at the origin on a roadless map.
    pub fn add_dog(&mut self, dog: &mut Dog) {
        dog.set_position(self.spawn_position());
        dog.set_speed(Vec2D::ZERO);
        dog.set_direction(Direction::Up);
        self.dog_ids.push(dog.id());
    }

    fn spawn_position(&mut self) -> PointD {
        let roads = self.map.roads();
        if roads.is_empty() {
            return PointD::new(0.0, 0.0);
        }
        if self.randomize_spawn {
            let road = roads[self.rng.gen_range(0..roads.len())];
            let t: f64 = self.rng.gen_range(0.0..=1.0);
            let start = road.start();
            let end = road.end();
            PointD::new(
                start.x as f64 + t * (end.x - start.x) as f64,
                start.y as f64 + t * (end.y - start.y) as f64,
            )
        } else {
            let start = roads[0].start();
            PointD::new(start.x as f64, start.y as f64)
        }
    }

    /// Advances every moving dog by `delta`, keeping it on the road
    /// network.
    ///
    /// Each dog's naive destination is clamped into the band of every road
    /// under its current position; at junctions the candidate farthest
    /// from the current position wins, earlier roads winning ties. A dog
    /// that could not reach its naive destination stops.
    pub fn tick(&mut self, delta: Duration, dogs: &mut [Dog]) -> Result<(), Error> {
        let delta_s = delta.as_secs_f64();

        for id in &self.dog_ids {
            let dog = dogs
                .get_mut(id.index())
                .ok_or_else(|| Error::TickFailed(format!("dog {id} is not registered")))?;
            if dog.speed().is_zero() {
                continue;
            }

            let start = dog.position();
            let speed = dog.speed();
            let naive = PointD::new(start.x + speed.u * delta_s, start.y + speed.v * delta_s);

            let current_roads: Vec<&Road> = self
                .map
                .roads()
                .iter()
                .filter(|road| road.contains(start))
                .collect();

            if current_roads.is_empty() {
                dog.set_speed(Vec2D::ZERO);
                continue;
            }

            let destination = if current_roads.len() == 1 {
                current_roads[0].clamp(naive)
            } else {
                let mut best = start;
                let mut best_dist_sq = -1.0;
                for road in &current_roads {
                    let candidate = road.clamp(naive);
                    let dist_sq = start.distance_sq(candidate);
                    if dist_sq > best_dist_sq {
                        best_dist_sq = dist_sq;
                        best = candidate;
                    }
                }
                best
            };

            dog.set_position(destination);
            if !destination.is_close(naive, POSITION_EPSILON) {
                dog.set_speed(Vec2D::ZERO);
            }
        }

        Ok(())
    }
}
