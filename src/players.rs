//! Player registry: the sole owner of dogs and players, and the source of
//! bearer tokens. Sessions and the HTTP layer only ever see ids and
//! snapshots.

use std::collections::HashMap;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::dog::{Dog, DogId};
use crate::map::MapId;
use crate::session::GameSession;

/// Opaque bearer credential: 128 random bits as 32 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Binds one dog to one session for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Player {
    token: Token,
    dog_id: DogId,
    map_id: MapId,
}

impl Player {
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn dog_id(&self) -> DogId {
        self.dog_id
    }

    /// Id of the map whose session this player belongs to.
    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }
}

/// Owns every dog and player. Dog ids double as indices into the arena, so
/// a registered id always resolves.
pub struct Players {
    dogs: Vec<Dog>,
    players: Vec<Player>,
    token_index: HashMap<String, usize>,
    generator_a: SmallRng,
    generator_b: SmallRng,
}

impl Players {
    pub fn new() -> Self {
        Self {
            dogs: Vec::new(),
            players: Vec::new(),
            token_index: HashMap::new(),
            generator_a: SmallRng::from_entropy(),
            generator_b: SmallRng::from_entropy(),
        }
    }

    /// Creates a dog named `name`, spawns it into `session`, and registers
    /// a player holding a fresh token for it.
    pub fn add(&mut self, name: String, session: &mut GameSession) -> &Player {
        let id = DogId::new(self.dogs.len() as u64);
        let mut dog = Dog::new(id, name);
        session.add_dog(&mut dog);
        self.dogs.push(dog);

        let token = self.generate_token();
        let player = Player {
            token: token.clone(),
            dog_id: id,
            map_id: session.map().id().clone(),
        };
        let slot = self.players.len();
        self.players.push(player);
        self.token_index.insert(token.0, slot);
        &self.players[slot]
    }

    pub fn find_by_token(&self, token: &str) -> Option<&Player> {
        self.token_index.get(token).map(|&i| &self.players[i])
    }

    pub fn dogs(&self) -> &[Dog] {
        &self.dogs
    }

    pub fn dogs_mut(&mut self) -> &mut [Dog] {
        &mut self.dogs
    }

    pub fn dog(&self, id: DogId) -> &Dog {
        &self.dogs[id.index()]
    }

    pub fn dog_mut(&mut self, id: DogId) -> &mut Dog {
        &mut self.dogs[id.index()]
    }

    /// Concatenation of one draw from each generator. Both generators are
    /// seeded independently from OS entropy; a collision with a live token
    /// re-rolls.
    fn generate_token(&mut self) -> Token {
        loop {
            let token = format!(
                "{:016x}{:016x}",
                self.generator_a.gen::<u64>(),
                self.generator_b.gen::<u64>()
            );
            if !self.token_index.contains_key(&token) {
                return Token(token);
            }
        }
    }
}

impl Default for Players {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Map;
    use std::sync::Arc;

    fn session() -> GameSession {
        GameSession::new(Arc::new(Map::new(MapId::new("m1"), "Town")), false)
    }

    fn is_token(s: &str) -> bool {
        s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }

    #[test]
    fn dogs_get_sequential_ids() {
        let mut players = Players::new();
        let mut session = session();

        let first = players.add("Rex".to_string(), &mut session).dog_id();
        let second = players.add("Fido".to_string(), &mut session).dog_id();

        assert_eq!(first.value(), 0);
        assert_eq!(second.value(), 1);
        assert_eq!(players.dogs().len(), 2);
        assert_eq!(players.dog(first).name(), "Rex");
    }

    #[test]
    fn tokens_are_32_lowercase_hex_chars() {
        let mut players = Players::new();
        let mut session = session();

        let token = players
            .add("Rex".to_string(), &mut session)
            .token()
            .to_string();
        assert!(is_token(&token), "bad token: {token}");
    }

    #[test]
    fn find_by_token_returns_the_matching_player() {
        let mut players = Players::new();
        let mut session = session();

        let token = players
            .add("Rex".to_string(), &mut session)
            .token()
            .to_string();

        let player = players.find_by_token(&token).unwrap();
        assert_eq!(player.dog_id().value(), 0);
        assert_eq!(player.map_id().as_str(), "m1");
        assert!(players.find_by_token("0000000000000000ffffffffffffffff").is_none());
    }

    #[test]
    fn many_joins_produce_distinct_tokens() {
        let mut players = Players::new();
        let mut session = session();

        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            let token = players
                .add(format!("dog-{i}"), &mut session)
                .token()
                .to_string();
            assert!(is_token(&token));
            assert!(seen.insert(token), "token collision at join {i}");
        }
    }
}
