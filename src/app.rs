//! The application façade and its serializing executor.
//!
//! [`Application`] owns the whole mutable world — the catalog and the
//! player registry — and exposes synchronous operations over it. Nothing
//! touches that state directly: [`Strand::spawn`] moves the application
//! into a dedicated task that drains a bounded mailbox of commands one at
//! a time, so joins, moves, reads, and ticks are serialized in FIFO order
//! while the HTTP layer fans out across the runtime's worker threads. A
//! move can land before or after a tick, never inside one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::dog::{Direction, DogId};
use crate::error::Error;
use crate::game::Game;
use crate::geom::{PointD, Vec2D};
use crate::map::{Map, MapId};
use crate::players::Players;

/// How many commands may queue while the strand task is busy.
const MAILBOX_CAPACITY: usize = 100;

/// What a successful join hands back to the client.
#[derive(Debug, Clone)]
pub struct JoinResult {
    pub token: String,
    pub player_id: u64,
}

/// The strand's mailbox is gone: the application task has stopped and the
/// command never ran. Only requests still in flight during shutdown see
/// this; it is not an engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the strand is closed")]
pub struct StrandClosed;

/// Read-only view of one dog, taken atomically with respect to ticks.
#[derive(Debug, Clone)]
pub struct DogSnapshot {
    pub id: u64,
    pub name: String,
    pub position: PointD,
    pub speed: Vec2D,
    pub direction: Direction,
}

pub struct Application {
    game: Game,
    players: Players,
}

impl Application {
    pub fn new(game: Game, players: Players) -> Self {
        Self { game, players }
    }

    pub fn list_maps(&self) -> Vec<Arc<Map>> {
        self.game.maps().to_vec()
    }

    pub fn find_map(&self, id: &MapId) -> Option<Arc<Map>> {
        self.game.find_map(id).cloned()
    }

    /// Admits a new player: validates the name and map, spawns a dog into
    /// the map's session (created on first join), and registers a player
    /// with a fresh token.
    pub fn join_game(&mut self, map_id: &MapId, user_name: &str) -> Result<JoinResult, Error> {
        if user_name.is_empty() {
            return Err(Error::InvalidArgument("Invalid name".to_string()));
        }
        let session = self
            .game
            .ensure_session(map_id)
            .ok_or(Error::MapNotFound)?;
        let player = self.players.add(user_name.to_string(), session);
        Ok(JoinResult {
            token: player.token().to_string(),
            player_id: player.dog_id().value(),
        })
    }

    pub fn find_by_token(&self, token: &str) -> Option<DogId> {
        self.players.find_by_token(token).map(|p| p.dog_id())
    }

    /// All dogs in the session of the player holding `token`.
    pub fn session_dogs(&self, token: &str) -> Result<Vec<DogSnapshot>, Error> {
        let player = self
            .players
            .find_by_token(token)
            .ok_or(Error::UnknownToken)?;
        let session = self
            .game
            .session(player.map_id())
            .ok_or(Error::UnknownToken)?;
        Ok(session
            .dog_ids()
            .iter()
            .map(|&id| {
                let dog = self.players.dog(id);
                DogSnapshot {
                    id: dog.id().value(),
                    name: dog.name().to_string(),
                    position: dog.position(),
                    speed: dog.speed(),
                    direction: dog.direction(),
                }
            })
            .collect())
    }

    /// Applies a movement intent. `None` stops the dog and leaves its
    /// facing direction untouched; a direction sets the velocity to the
    /// map's dog speed (or the catalog default) along that axis.
    pub fn move_player(&mut self, token: &str, command: Option<Direction>) -> Result<(), Error> {
        let player = self
            .players
            .find_by_token(token)
            .ok_or(Error::UnknownToken)?;
        let dog_id = player.dog_id();
        let map = self
            .game
            .find_map(player.map_id())
            .ok_or(Error::MapNotFound)?;
        let speed = map.dog_speed().unwrap_or(self.game.default_dog_speed());

        let dog = self.players.dog_mut(dog_id);
        match command {
            Some(direction) => {
                dog.set_speed(direction.velocity(speed));
                dog.set_direction(direction);
            }
            None => dog.set_speed(Vec2D::ZERO),
        }
        Ok(())
    }

    /// Advances every session by `delta`.
    pub fn tick(&mut self, delta: Duration) -> Result<(), Error> {
        self.game.tick(delta, self.players.dogs_mut())
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::ListMaps { reply } => {
                let _ = reply.send(self.list_maps());
            }
            Command::FindMap { id, reply } => {
                let _ = reply.send(self.find_map(&id));
            }
            Command::Join {
                map_id,
                user_name,
                reply,
            } => {
                let _ = reply.send(self.join_game(&map_id, &user_name));
            }
            Command::SessionDogs { token, reply } => {
                let _ = reply.send(self.session_dogs(&token));
            }
            Command::Move {
                token,
                command,
                reply,
            } => {
                let _ = reply.send(self.move_player(&token, command));
            }
            Command::Tick { delta, reply } => {
                let _ = reply.send(self.tick(delta));
            }
        }
    }
}

enum Command {
    ListMaps {
        reply: oneshot::Sender<Vec<Arc<Map>>>,
    },
    FindMap {
        id: MapId,
        reply: oneshot::Sender<Option<Arc<Map>>>,
    },
    Join {
        map_id: MapId,
        user_name: String,
        reply: oneshot::Sender<Result<JoinResult, Error>>,
    },
    SessionDogs {
        token: String,
        reply: oneshot::Sender<Result<Vec<DogSnapshot>, Error>>,
    },
    Move {
        token: String,
        command: Option<Direction>,
        reply: oneshot::Sender<Result<(), Error>>,
    },
    Tick {
        delta: Duration,
        reply: oneshot::Sender<Result<(), Error>>,
    },
}

/// Handle to the application's single-writer task. Cloning is cheap; all
/// clones feed the same FIFO mailbox.
#[derive(Clone)]
pub struct Strand {
    tx: mpsc::Sender<Command>,
}

impl Strand {
    /// Moves `app` into its own task and returns the handle through which
    /// every operation must go.
    pub fn spawn(mut app: Application) -> Self {
        let (tx, mut rx) = mpsc::channel(MAILBOX_CAPACITY);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                app.handle(command);
            }
        });
        Self { tx }
    }

    async fn call<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> Result<R, StrandClosed> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| StrandClosed)?;
        rx.await.map_err(|_| StrandClosed)
    }

    pub async fn list_maps(&self) -> Result<Vec<Arc<Map>>, StrandClosed> {
        self.call(|reply| Command::ListMaps { reply }).await
    }

    pub async fn find_map(&self, id: MapId) -> Result<Option<Arc<Map>>, StrandClosed> {
        self.call(|reply| Command::FindMap { id, reply }).await
    }

    pub async fn join_game(
        &self,
        map_id: MapId,
        user_name: String,
    ) -> Result<Result<JoinResult, Error>, StrandClosed> {
        self.call(|reply| Command::Join {
            map_id,
            user_name,
            reply,
        })
        .await
    }

    pub async fn session_dogs(
        &self,
        token: String,
    ) -> Result<Result<Vec<DogSnapshot>, Error>, StrandClosed> {
        self.call(|reply| Command::SessionDogs { token, reply })
            .await
    }

    pub async fn move_player(
        &self,
        token: String,
        command: Option<Direction>,
    ) -> Result<Result<(), Error>, StrandClosed> {
        self.call(|reply| Command::Move {
            token,
            command,
            reply,
        })
        .await
    }

    pub async fn tick(&self, delta: Duration) -> Result<Result<(), Error>, StrandClosed> {
        self.call(|reply| Command::Tick { delta, reply }).await
    }
}
