//! # Dogwalk Server Library
//!
//! Authoritative server for a small multiplayer world in which every
//! player steers a dog along a map's road network. Clients join a map,
//! receive an opaque bearer token, issue movement intents, and poll the
//! world state; the server advances all dogs in discrete time steps.
//!
//! ## Architecture
//!
//! The mutable world — the map catalog, the sessions, and the player
//! registry — is owned by a single [`app::Application`] which runs inside
//! a serializing executor (the strand, [`app::Strand`]): a dedicated task
//! draining a FIFO mailbox one command at a time. HTTP handling fans out
//! across the tokio worker threads, but every join, move, read, and tick
//! is executed to completion on the strand before the next one begins, so
//! the engine has single-threaded semantics without being pinned to a
//! thread.
//!
//! ## Module Organization
//!
//! - [`geom`] — integer map geometry and real-valued kinematics types
//! - [`map`] — roads with walkable bands, buildings, offices, maps
//! - [`dog`] — the avatar: identity, position, velocity, facing
//! - [`session`] — per-map population, spawn policy, movement integrator
//! - [`game`] — the catalog: maps, lazy sessions, default speed
//! - [`players`] — dog/player ownership and bearer-token generation
//! - [`app`] — the application façade and the strand
//! - [`ticker`] — periodic tick driver with wall-clock deltas
//! - [`config`] — JSON startup configuration
//! - [`api`] — axum HTTP adapter and static-file serving
//!
//! ## Movement Model
//!
//! Roads are axis-aligned segments widened by 0.4 map units on every side
//! into rectangular walkable bands. Each tick a moving dog's naive
//! destination is clamped into the bands of the roads under its current
//! position; at junctions the clamp that carries the dog farthest wins.
//! A dog stopped short by a band edge has its velocity zeroed.

pub mod api;
pub mod app;
pub mod config;
pub mod dog;
pub mod error;
pub mod game;
pub mod geom;
pub mod map;
pub mod players;
pub mod session;
pub mod ticker;
