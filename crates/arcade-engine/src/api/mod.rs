// api/mod.rs
//
// Public contracts between the engine and a game: the game loop, config,
// event bus, ids and errors.

pub mod error;
pub mod events;
pub mod game;
pub mod types;
