//! Bidirectional breadth-first search between two actors.
//!
//! Two frontiers grow in lockstep, one from each endpoint. A round expands
//! the source side and then the target side; after every expansion the new
//! frontier is checked against the other side's latest one. The first actor
//! present in both joins the two half-paths.
//!
//! Actors and films that have been fully expanded are recorded in sets shared
//! by both sides, so no node is processed twice within a search.
//!
//! The round bound caps the search at `2 * max_rounds` hops. Running out of
//! rounds yields [`SearchOutcome::Exhausted`], which is not proof that the two
//! actors are disconnected.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Result, StoreError};
use crate::film::Film;
use crate::path::Path;
use crate::store::CreditIndex;

/// Rounds per search when not configured otherwise.
pub const DEFAULT_MAX_ROUNDS: usize = 3;

/// Actor name -> shortest known path to that actor from one side's origin.
/// Ordered so that overlap resolution does not depend on hashing.
type Frontier = BTreeMap<String, Path>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Rounds before giving up. Each round expands both sides once.
    pub max_rounds: usize,
}

impl SearchConfig {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A connecting path from source to target.
    Found(Path),
    /// No overlap within the round bound.
    Exhausted,
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::Exhausted => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            SearchOutcome::Exhausted => None,
        }
    }
}

/// Work counters for one search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub rounds: usize,
    pub actors_expanded: usize,
    pub films_expanded: usize,
}

/// State of one search. Holds its own exhausted sets, so any number of
/// searches may share one index.
pub struct Search<'a, I: CreditIndex + ?Sized> {
    index: &'a I,
    config: SearchConfig,
    exhausted_actors: HashSet<String>,
    exhausted_films: HashSet<Film>,
    stats: SearchStats,
}

impl<'a, I: CreditIndex + ?Sized> Search<'a, I> {
    pub fn new(index: &'a I, config: SearchConfig) -> Self {
        Self {
            index,
            config,
            exhausted_actors: HashSet::new(),
            exhausted_films: HashSet::new(),
            stats: SearchStats::default(),
        }
    }

    /// Counters from the most recent [`Search::run`].
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Find a shortest path from `source` to `target`.
    ///
    /// Both names are expected to exist in the index; unknown names just
    /// produce empty frontiers. `source == target` is rejected.
    pub fn run(&mut self, source: &str, target: &str) -> Result<SearchOutcome> {
        if source == target {
            return Err(StoreError::SameEndpoints(source.to_string()));
        }

        self.exhausted_actors.clear();
        self.exhausted_films.clear();
        self.stats = SearchStats::default();

        let mut frontiers: [Frontier; 2] = [
            Frontier::from([(source.to_string(), Path::new(source))]),
            Frontier::from([(target.to_string(), Path::new(target))]),
        ];

        for round in 0..self.config.max_rounds {
            self.stats.rounds = round + 1;

            for side in 0..2 {
                let next = self.expand(&frontiers[side])?;
                tracing::debug!(round, side, frontier = next.len(), "expanded frontier");
                frontiers[side] = next;

                if let Some(path) = Self::join(&frontiers, side)? {
                    tracing::debug!(
                        source,
                        target,
                        hops = path.len(),
                        stats = ?self.stats,
                        "path found"
                    );
                    return Ok(SearchOutcome::Found(path));
                }
            }
        }

        tracing::debug!(source, target, stats = ?self.stats, "search exhausted");
        Ok(SearchOutcome::Exhausted)
    }

    /// Build the frontier one hop beyond `frontier`.
    fn expand(&mut self, frontier: &Frontier) -> Result<Frontier> {
        let mut next = Frontier::new();

        for (actor, path) in frontier {
            let films = self.index.credits(actor)?.unwrap_or_default();
            self.stats.actors_expanded += 1;

            for film in films {
                if !self.exhausted_films.insert(film.clone()) {
                    continue;
                }
                self.stats.films_expanded += 1;

                let cast = self.index.cast(&film)?.unwrap_or_default();
                for costar in cast {
                    // Actors already in this frontier are one hop closer than
                    // `next`; the first path to reach a costar is kept.
                    if self.exhausted_actors.contains(&costar)
                        || frontier.contains_key(&costar)
                        || next.contains_key(&costar)
                    {
                        continue;
                    }
                    let extended = path.extended(film.clone(), costar.clone());
                    next.insert(costar, extended);
                }
            }

            // Only after every film, so a partially exhausted filmography is
            // still walked in full.
            self.exhausted_actors.insert(actor.clone());
        }

        Ok(next)
    }

    /// Join the two half-paths if the freshly expanded `side` meets the other.
    fn join(frontiers: &[Frontier; 2], side: usize) -> Result<Option<Path>> {
        let fresh = &frontiers[side];
        let shared = frontiers[1 - side]
            .keys()
            .find(|name| fresh.contains_key(name.as_str()));

        let Some(shared) = shared else {
            return Ok(None);
        };

        let mut path = frontiers[0][shared].clone();
        path.append(frontiers[1][shared].clone().reversed())?;
        Ok(Some(path))
    }
}

/// Find a shortest path from `source` to `target` with a fresh [`Search`].
pub fn shortest_path<I: CreditIndex + ?Sized>(
    index: &I,
    source: &str,
    target: &str,
    config: &SearchConfig,
) -> Result<SearchOutcome> {
    Search::new(index, *config).run(source, target)
}
