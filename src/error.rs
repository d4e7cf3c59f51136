//! Error kinds raised by the game engine. The HTTP adapter maps each kind
//! to a status code and a wire-level `code` string; everything else stays
//! inside the process.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("map not found")]
    MapNotFound,

    #[error("map {0} already exists")]
    DuplicateMap(String),

    #[error("office {0} already exists")]
    DuplicateOffice(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("authorization header is missing or malformed")]
    InvalidToken,

    #[error("player token has not been found")]
    UnknownToken,

    #[error("tick failed: {0}")]
    TickFailed(String),
}
