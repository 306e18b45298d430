//! six-degrees: actor/film connection search over a memory-mapped index.
//!
//! The store reads two pre-built binary files (`actordata`, `moviedata`)
//! in place and answers "which films was this actor in" and "who was in
//! this film". The search runs a bidirectional BFS over those two queries
//! to connect two actors through shared films.

pub mod error;
pub mod film;
pub mod path;
pub mod search;
pub mod store;

pub use error::{Result, StoreError};
pub use film::Film;
pub use path::{Connection, Path, PathError};
pub use search::{
    shortest_path, Search, SearchConfig, SearchOutcome, SearchStats, DEFAULT_MAX_ROUNDS,
};
pub use store::{CreditIndex, ImdbStore, ACTOR_FILE_NAME, FILM_FILE_NAME};
