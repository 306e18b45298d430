//! Actor-to-actor paths through shared films.
//!
//! A `Path` is a starting actor plus a list of hops. Each hop names the film
//! that links the current endpoint to the next actor:
//!
//! ```text
//! start --film_1--> player_1 --film_2--> player_2 ... --film_k--> player_k
//! ```
//!
//! The endpoint is `start` for an empty path, otherwise the last hop's player.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::film::Film;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot append path starting at '{next_start}' to path ending at '{endpoint}'")]
    Discontinuous { endpoint: String, next_start: String },
}

/// One hop: the film shared with `player`, who becomes the new endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Connection {
    pub film: Film,
    pub player: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    start: String,
    connections: Vec<Connection>,
}

impl Path {
    /// Zero-hop path rooted at `start`.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            connections: Vec::new(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// Current endpoint of the walk.
    pub fn endpoint(&self) -> &str {
        self.connections
            .last()
            .map(|c| c.player.as_str())
            .unwrap_or(&self.start)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Extend the walk by one hop through `film` to `player`.
    pub fn add_connection(&mut self, film: Film, player: impl Into<String>) {
        self.connections.push(Connection {
            film,
            player: player.into(),
        });
    }

    /// Drop the last hop. Returns it, or `None` for an empty path.
    pub fn undo_connection(&mut self) -> Option<Connection> {
        self.connections.pop()
    }

    /// Copy of this path extended by one hop. Used by frontier expansion.
    pub fn extended(&self, film: Film, player: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.add_connection(film, player);
        next
    }

    /// Append `other` onto the end of this path.
    ///
    /// `other` must start where this path currently ends; on mismatch the
    /// path is left unchanged.
    pub fn append(&mut self, other: Path) -> Result<(), PathError> {
        if other.start != self.endpoint() {
            return Err(PathError::Discontinuous {
                endpoint: self.endpoint().to_string(),
                next_start: other.start,
            });
        }
        self.connections.extend(other.connections);
        Ok(())
    }

    /// Reverse the walk in place so it runs from the endpoint back to the start.
    ///
    /// Hop `i` links node `i - 1` to node `i`; reversed, the same film links
    /// node `i` back to node `i - 1`, so every hop's player is re-derived from
    /// its predecessor rather than just reordering the list.
    pub fn reverse(&mut self) {
        if self.connections.is_empty() {
            return;
        }

        let mut previous = std::mem::take(&mut self.start);
        let mut reversed = Vec::with_capacity(self.connections.len());
        for conn in self.connections.drain(..) {
            let reached = conn.player;
            reversed.push(Connection {
                film: conn.film,
                player: previous,
            });
            previous = reached;
        }
        reversed.reverse();

        self.start = previous;
        self.connections = reversed;
    }

    /// Consuming form of [`Path::reverse`].
    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }
}

impl fmt::Display for Path {
    /// One line per hop:
    /// `\t<actor> was in "<title>" (<year>) with <costar>.`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current = self.start.as_str();
        for conn in &self.connections {
            writeln!(
                f,
                "\t{} was in \"{}\" ({}) with {}.",
                current, conn.film.title, conn.film.year, conn.player
            )?;
            current = &conn.player;
        }
        Ok(())
    }
}
