//! The game catalog: every map the server knows about, the lazily created
//! session per map, and the default movement speed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::dog::Dog;
use crate::error::Error;
use crate::map::{Map, MapId};
use crate::session::GameSession;

pub const DEFAULT_DOG_SPEED: f64 = 1.0;

#[derive(Debug)]
pub struct Game {
    maps: Vec<Arc<Map>>,
    map_index: HashMap<MapId, usize>,
    sessions: Vec<GameSession>,
    session_index: HashMap<MapId, usize>,
    default_dog_speed: f64,
    randomize_spawn: bool,
}

impl Game {
    pub fn new() -> Self {
        Self {
            maps: Vec::new(),
            map_index: HashMap::new(),
            sessions: Vec::new(),
            session_index: HashMap::new(),
            default_dog_speed: DEFAULT_DOG_SPEED,
            randomize_spawn: false,
        }
    }

    /// Registers a map, rejecting a second map with the same id. The map
    /// list is unchanged on failure.
    pub fn add_map(&mut self, map: Map) -> Result<(), Error> {
        if self.map_index.contains_key(map.id()) {
            return Err(Error::DuplicateMap(map.id().to_string()));
        }
        self.map_index.insert(map.id().clone(), self.maps.len());
        self.maps.push(Arc::new(map));
        Ok(())
    }

    pub fn find_map(&self, id: &MapId) -> Option<&Arc<Map>> {
        self.map_index.get(id).map(|&i| &self.maps[i])
    }

    /// Maps in registration order.
    pub fn maps(&self) -> &[Arc<Map>] {
        &self.maps
    }

    pub fn default_dog_speed(&self) -> f64 {
        self.default_dog_speed
    }

    pub fn set_default_dog_speed(&mut self, speed: f64) {
        self.default_dog_speed = speed;
    }

    pub fn set_randomize_spawn(&mut self, randomize: bool) {
        self.randomize_spawn = randomize;
    }

    pub fn session(&self, id: &MapId) -> Option<&GameSession> {
        self.session_index.get(id).map(|&i| &self.sessions[i])
    }

    /// The session for the given map, created on first use. `None` when
    /// the map id is unknown.
    pub fn ensure_session(&mut self, id: &MapId) -> Option<&mut GameSession> {
        let map_slot = *self.map_index.get(id)?;
        let slot = match self.session_index.get(id) {
            Some(&i) => i,
            None => {
                let index = self.sessions.len();
                self.sessions.push(GameSession::new(
                    Arc::clone(&self.maps[map_slot]),
                    self.randomize_spawn,
                ));
                self.session_index.insert(id.clone(), index);
                index
            }
        };
        self.sessions.get_mut(slot)
    }

    /// Advances every session by `delta`.
    pub fn tick(&mut self, delta: Duration, dogs: &mut [Dog]) -> Result<(), Error> {
        for session in &mut self.sessions {
            session.tick(delta, dogs)?;
        }
        Ok(())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
