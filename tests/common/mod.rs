//! Fixture writer for integration tests.
//!
//! Produces `actordata` / `moviedata` images in the on-disk layout the store
//! reads. Every record starts on a 4-byte boundary, like the production
//! data files.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

use six_degrees::film::BASE_YEAR;
use six_degrees::{Film, ImdbStore, ACTOR_FILE_NAME, FILM_FILE_NAME};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn pad_to(buf: &mut Vec<u8>, base: usize, alignment: usize) {
    while (buf.len() - base) % alignment != 0 {
        buf.push(0);
    }
}

fn encode_offsets(buf: &mut Vec<u8>, offsets: &[u32]) {
    buf.extend_from_slice(&(offsets.len() as u16).to_le_bytes());
    pad_to(buf, 0, 4);
    for offset in offsets {
        buf.extend_from_slice(&offset.to_le_bytes());
    }
    pad_to(buf, 0, 4);
}

fn encode_actor(buf: &mut Vec<u8>, name: &str, films: &[u32]) {
    let start = buf.len();
    buf.extend_from_slice(name.as_bytes());
    buf.push(0);
    pad_to(buf, start, 2);
    encode_offsets(buf, films);
}

/// Year as stored on disk: one byte counting from 1900.
pub fn year_delta(year: u16) -> u8 {
    year.saturating_sub(BASE_YEAR).min(u8::MAX as u16) as u8
}

fn encode_film(buf: &mut Vec<u8>, film: &Film, actors: &[u32]) {
    let start = buf.len();
    buf.extend_from_slice(film.title.as_bytes());
    buf.push(0);
    buf.push(year_delta(film.year));
    pad_to(buf, start, 2);
    encode_offsets(buf, actors);
}

/// Lay out one file: count, offset table, then records in key order.
/// Returns the image and each record's offset.
fn encode_file<F>(count: usize, mut encode_record: F) -> (Vec<u8>, Vec<u32>)
where
    F: FnMut(&mut Vec<u8>, usize),
{
    let header_len = 4 + 4 * count;
    let mut buf = vec![0u8; header_len];
    buf[0..4].copy_from_slice(&(count as u32).to_le_bytes());

    let mut offsets = Vec::with_capacity(count);
    for i in 0..count {
        offsets.push(buf.len() as u32);
        encode_record(&mut buf, i);
    }
    for (i, offset) in offsets.iter().enumerate() {
        buf[4 + 4 * i..8 + 4 * i].copy_from_slice(&offset.to_le_bytes());
    }
    (buf, offsets)
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A set of films with their casts.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    casts: BTreeMap<Film, Vec<String>>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn film(mut self, title: &str, year: u16, cast: &[&str]) -> Self {
        self.casts.insert(
            Film::new(title, year),
            cast.iter().map(|a| a.to_string()).collect(),
        );
        self
    }

    /// Actor name -> films, both sorted (names byte-wise).
    pub fn credits(&self) -> BTreeMap<String, Vec<Film>> {
        let mut credits: BTreeMap<String, Vec<Film>> = BTreeMap::new();
        for (film, cast) in &self.casts {
            for actor in cast {
                credits.entry(actor.clone()).or_default().push(film.clone());
            }
        }
        credits
    }

    pub fn casts(&self) -> &BTreeMap<Film, Vec<String>> {
        &self.casts
    }

    /// `(actordata, moviedata)` images.
    pub fn to_bytes(&self) -> (Vec<u8>, Vec<u8>) {
        let credits = self.credits();
        let actors: Vec<(&String, &Vec<Film>)> = credits.iter().collect();
        let films: Vec<(&Film, &Vec<String>)> = self.casts.iter().collect();

        // Record sizes do not depend on offset values, so a dry run with
        // zeroed cross references yields the final offsets.
        let (_, actor_offsets) = encode_file(actors.len(), |buf, i| {
            encode_actor(buf, actors[i].0, &vec![0; actors[i].1.len()])
        });
        let (_, film_offsets) = encode_file(films.len(), |buf, i| {
            encode_film(buf, films[i].0, &vec![0; films[i].1.len()])
        });

        let actor_at: HashMap<&str, u32> = actors
            .iter()
            .zip(&actor_offsets)
            .map(|((name, _), &o)| (name.as_str(), o))
            .collect();
        let film_at: HashMap<&Film, u32> = films
            .iter()
            .zip(&film_offsets)
            .map(|((film, _), &o)| (*film, o))
            .collect();

        let (actor_bytes, _) = encode_file(actors.len(), |buf, i| {
            let refs: Vec<u32> = actors[i].1.iter().map(|f| film_at[f]).collect();
            encode_actor(buf, actors[i].0, &refs)
        });
        let (film_bytes, _) = encode_file(films.len(), |buf, i| {
            let refs: Vec<u32> = films[i].1.iter().map(|a| actor_at[a.as_str()]).collect();
            encode_film(buf, films[i].0, &refs)
        });

        (actor_bytes, film_bytes)
    }

    pub fn write_to(&self, dir: &Path) {
        let (actors, films) = self.to_bytes();
        std::fs::write(dir.join(ACTOR_FILE_NAME), actors).unwrap();
        std::fs::write(dir.join(FILM_FILE_NAME), films).unwrap();
    }

    /// Write to a fresh temp dir and open it through the mmap path.
    pub fn open(&self) -> (TempDir, ImdbStore) {
        let dir = TempDir::new().unwrap();
        self.write_to(dir.path());
        let store = ImdbStore::open(dir.path()).unwrap();
        (dir, store)
    }

    /// Hop distance between two actors by plain BFS, unbounded.
    pub fn distance(&self, from: &str, to: &str) -> Option<usize> {
        let credits = self.credits();
        let mut dist: HashMap<&str, usize> = HashMap::from([(from, 0)]);
        let mut queue = VecDeque::from([from]);

        while let Some(actor) = queue.pop_front() {
            let d = dist[actor];
            if actor == to {
                return Some(d);
            }
            for film in credits.get(actor).into_iter().flatten() {
                for costar in &self.casts[film] {
                    if !dist.contains_key(costar.as_str()) {
                        dist.insert(costar.as_str(), d + 1);
                        queue.push_back(costar.as_str());
                    }
                }
            }
        }
        None
    }
}

/// Alice -(Film1, 1995)- Bob -(Film2, 1999)- Carol
pub fn alice_bob_carol() -> Fixture {
    Fixture::new()
        .film("Film1", 1995, &["Alice", "Bob"])
        .film("Film2", 1999, &["Bob", "Carol"])
}

/// A small cast list with names of every length from 1 to 8 bytes and
/// titles of both parities, plus a remake sharing a title.
pub fn mixed_lengths() -> Fixture {
    Fixture::new()
        .film("A", 1931, &["Q", "Ro", "Sam", "Tina"])
        .film("Be", 1950, &["Tina", "Ulric", "Vivian"])
        .film("Cat", 1977, &["Vivian", "Wilhelm", "Xenophon"])
        .film("Dune", 1984, &["Xenophon", "Q"])
        .film("Dune", 2021, &["Ro", "Wilhelm"])
        .film("Encore", 1999, &["Sam"])
}

/// Two clusters with no film in common.
pub fn disconnected() -> Fixture {
    Fixture::new()
        .film("North", 1990, &["Ann", "Ben"])
        .film("North II", 1992, &["Ben", "Cid"])
        .film("South", 1991, &["Dee", "Eve"])
        .film("South II", 1993, &["Eve", "Fay"])
}

/// Linear chain a0 - f1 - a1 - ... - a{len}.
pub fn chain(len: usize) -> Fixture {
    let mut fixture = Fixture::new();
    for i in 0..len {
        let a = format!("a{}", i);
        let b = format!("a{}", i + 1);
        fixture = fixture.film(&format!("f{:02}", i + 1), 2000, &[a.as_str(), b.as_str()]);
    }
    fixture
}
