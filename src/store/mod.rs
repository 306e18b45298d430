//! Read-only actor/film store over two memory-mapped files.
//!
//! `actordata` maps every actor name to the films they appeared in;
//! `moviedata` maps every film to its cast. Both are sorted offset tables
//! over variable-length records (see [`record`]) and are queried in place:
//! a lookup is a binary search over the mapped bytes followed by decoding
//! the one matching record.

pub mod record;

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{Result, StoreError};
use crate::film::Film;
use record::{read_actor, read_actor_name, read_film, read_film_key, OffsetTable};

/// File holding the actor index.
pub const ACTOR_FILE_NAME: &str = "actordata";

/// File holding the film index.
pub const FILM_FILE_NAME: &str = "moviedata";

/// Adjacency queries over the actor/film bipartite graph.
///
/// `Ok(None)` means the key is absent; it is not an error.
pub trait CreditIndex {
    /// Films the actor appeared in.
    fn credits(&self, name: &str) -> Result<Option<Vec<Film>>>;

    /// Actors who appeared in the film.
    fn cast(&self, film: &Film) -> Result<Option<Vec<String>>>;

    /// Whether the actor has any record at all.
    fn contains_actor(&self, name: &str) -> Result<bool> {
        Ok(self.credits(name)?.is_some())
    }
}

/// Backing bytes for one file: a read-only mapping or an owned buffer.
#[derive(Debug)]
enum Region {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Region {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Region::Mapped(mmap) => &mmap[..],
            Region::Owned(bytes) => bytes.as_slice(),
        }
    }
}

fn map_file(path: &Path) -> Result<Region> {
    let init_err = |source| StoreError::Init {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(init_err)?;
    if file.metadata().map_err(init_err)?.len() == 0 {
        // Nothing to map; header validation reports the empty file.
        return Ok(Region::Owned(Vec::new()));
    }
    let mmap = unsafe { Mmap::map(&file) }.map_err(init_err)?;
    Ok(Region::Mapped(mmap))
}

/// Prefix a format error with the file it came from.
fn in_file(file: &str, err: StoreError) -> StoreError {
    match err {
        StoreError::InvalidFormat(msg) => StoreError::InvalidFormat(format!("{}: {}", file, msg)),
        other => other,
    }
}

/// Immutable actor/film index.
///
/// A value of this type is always healthy: construction validates both
/// headers, and the mappings are released when it is dropped.
#[derive(Debug)]
pub struct ImdbStore {
    actors: Region,
    films: Region,
    actor_count: usize,
    film_count: usize,
}

impl ImdbStore {
    /// Open the store from `dir`, mapping `actordata` and `moviedata`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let actors = map_file(&dir.join(ACTOR_FILE_NAME))?;
        let films = map_file(&dir.join(FILM_FILE_NAME))?;
        let store = Self::from_regions(actors, films)?;

        tracing::info!(
            dir = %dir.display(),
            actors = store.actor_count,
            films = store.film_count,
            actor_bytes = store.actors.len(),
            film_bytes = store.films.len(),
            "opened imdb store"
        );
        Ok(store)
    }

    /// Build a store over in-memory file images (for testing / embedding).
    pub fn from_bytes(actors: Vec<u8>, films: Vec<u8>) -> Result<Self> {
        Self::from_regions(Region::Owned(actors), Region::Owned(films))
    }

    fn from_regions(actors: Region, films: Region) -> Result<Self> {
        let actor_count = OffsetTable::parse(&actors)
            .map_err(|e| in_file(ACTOR_FILE_NAME, e))?
            .len();
        let film_count = OffsetTable::parse(&films)
            .map_err(|e| in_file(FILM_FILE_NAME, e))?
            .len();
        Ok(Self {
            actors,
            films,
            actor_count,
            film_count,
        })
    }

    /// Number of distinct actors.
    pub fn actor_count(&self) -> usize {
        self.actor_count
    }

    /// Number of distinct films.
    pub fn film_count(&self) -> usize {
        self.film_count
    }

    fn actor_table(&self) -> Result<OffsetTable<'_>> {
        OffsetTable::parse(&self.actors)
    }

    fn film_table(&self) -> Result<OffsetTable<'_>> {
        OffsetTable::parse(&self.films)
    }

    fn find_actor(&self, name: &str) -> Result<Option<usize>> {
        let data: &[u8] = &self.actors;
        self.actor_table()
            .and_then(|table| {
                table.find_by(|offset| {
                    let (probe, _) = read_actor_name(data, offset)?;
                    Ok(probe.cmp(name.as_bytes()))
                })
            })
            .map_err(|e| in_file(ACTOR_FILE_NAME, e))
    }

    fn find_film(&self, film: &Film) -> Result<Option<usize>> {
        let data: &[u8] = &self.films;
        self.film_table()
            .and_then(|table| {
                table.find_by(|offset| {
                    let (title, year, _) = read_film_key(data, offset)?;
                    Ok(title
                        .cmp(film.title.as_bytes())
                        .then_with(|| year.cmp(&film.year)))
                })
            })
            .map_err(|e| in_file(FILM_FILE_NAME, e))
    }

    fn film_at(&self, offset: usize) -> Result<Film> {
        let (title, year, _) =
            read_film_key(&self.films, offset).map_err(|e| in_file(FILM_FILE_NAME, e))?;
        Ok(Film::new(String::from_utf8_lossy(title), year))
    }

    fn actor_at(&self, offset: usize) -> Result<String> {
        let (name, _) =
            read_actor_name(&self.actors, offset).map_err(|e| in_file(ACTOR_FILE_NAME, e))?;
        Ok(String::from_utf8_lossy(name).into_owned())
    }

    /// Films `name` appeared in, in on-disk order. `None` if the actor is
    /// not in the store.
    pub fn credits(&self, name: &str) -> Result<Option<Vec<Film>>> {
        let Some(offset) = self.find_actor(name)? else {
            tracing::trace!(name, "actor not found");
            return Ok(None);
        };
        let record = read_actor(&self.actors, offset).map_err(|e| in_file(ACTOR_FILE_NAME, e))?;
        let films = record
            .films
            .iter()
            .map(|film_offset| self.film_at(film_offset))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(films))
    }

    /// Cast of `film`, in on-disk order. `None` if the film is not in the
    /// store.
    pub fn cast(&self, film: &Film) -> Result<Option<Vec<String>>> {
        let Some(offset) = self.find_film(film)? else {
            tracing::trace!(film = %film, "film not found");
            return Ok(None);
        };
        let record = read_film(&self.films, offset).map_err(|e| in_file(FILM_FILE_NAME, e))?;
        let cast = record
            .actors
            .iter()
            .map(|actor_offset| self.actor_at(actor_offset))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(cast))
    }

    /// Whether `name` has a record in the actor file.
    pub fn contains_actor(&self, name: &str) -> Result<bool> {
        Ok(self.find_actor(name)?.is_some())
    }

    /// Every actor name, in sorted order.
    pub fn actors(&self) -> impl Iterator<Item = Result<String>> + '_ {
        let table = OffsetTable::parse(&self.actors);
        let offsets: Box<dyn Iterator<Item = Result<usize>> + '_> = match table {
            Ok(table) => Box::new(table.offsets()),
            Err(e) => Box::new(std::iter::once(Err(e))),
        };
        offsets.map(move |offset| self.actor_at(offset?))
    }

    /// Every film, in sorted order.
    pub fn films(&self) -> impl Iterator<Item = Result<Film>> + '_ {
        let table = OffsetTable::parse(&self.films);
        let offsets: Box<dyn Iterator<Item = Result<usize>> + '_> = match table {
            Ok(table) => Box::new(table.offsets()),
            Err(e) => Box::new(std::iter::once(Err(e))),
        };
        offsets.map(move |offset| self.film_at(offset?))
    }
}

impl CreditIndex for ImdbStore {
    fn credits(&self, name: &str) -> Result<Option<Vec<Film>>> {
        ImdbStore::credits(self, name)
    }

    fn cast(&self, film: &Film) -> Result<Option<Vec<String>>> {
        ImdbStore::cast(self, film)
    }

    fn contains_actor(&self, name: &str) -> Result<bool> {
        ImdbStore::contains_actor(self, name)
    }
}
