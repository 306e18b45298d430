//! Byte-level decoding for actor and film files.
//!
//! Both files share one layout:
//!
//! ```text
//! [record_count: u32 LE]                  // 4 bytes
//! [record offsets: u32 LE x record_count] // sorted by record key
//! [records: variable length]
//! ```
//!
//! Actor record:
//!
//! ```text
//! [name bytes][0x00][pad to even, record-relative]
//! [film_count: u16 LE][pad to 4, file-relative]
//! [film offsets: u32 LE x film_count]     // into the film file
//! ```
//!
//! Film record:
//!
//! ```text
//! [title bytes][0x00][year - 1900: u8][pad to even, record-relative]
//! [actor_count: u16 LE][pad to 4, file-relative]
//! [actor offsets: u32 LE x actor_count]   // into the actor file
//! ```
//!
//! Every accessor is bounds-checked and returns `InvalidFormat` instead of
//! reading past the end of the region.

use std::cmp::Ordering;

use crate::error::{Result, StoreError};
use crate::film::BASE_YEAR;

/// Size of the record count that opens each file.
pub const COUNT_SIZE: usize = 4;

/// Size of one offset table entry.
pub const OFFSET_SIZE: usize = 4;

// ── Helper Functions ───────────────────────────────────────────────

/// Bytes needed to bring `offset` up to a multiple of `alignment`.
pub fn compute_padding(offset: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return 0;
    }
    let rem = offset % alignment;
    if rem == 0 {
        0
    } else {
        alignment - rem
    }
}

fn truncated(what: &str, offset: usize, len: usize) -> StoreError {
    StoreError::InvalidFormat(format!(
        "{} at offset {} runs past end of region ({} bytes)",
        what, offset, len
    ))
}

/// Read u32 from byte slice at offset (little-endian).
#[inline]
fn read_u32_at(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = offset
        .checked_add(4)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| truncated("u32", offset, data.len()))?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read u16 from byte slice at offset (little-endian).
#[inline]
fn read_u16_at(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = offset
        .checked_add(2)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| truncated("u16", offset, data.len()))?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

#[inline]
fn read_u8_at(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset)
        .copied()
        .ok_or_else(|| truncated("u8", offset, data.len()))
}

/// Read a NUL-terminated string starting at `offset`.
///
/// Returns the string bytes (without the terminator) and the offset of the
/// byte right after the terminator.
fn read_cstr_at(data: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let tail = data
        .get(offset..)
        .ok_or_else(|| truncated("string", offset, data.len()))?;
    let len = tail.iter().position(|&b| b == 0).ok_or_else(|| {
        StoreError::InvalidFormat(format!("unterminated string at offset {}", offset))
    })?;
    Ok((&tail[..len], offset + len + 1))
}

// ── Offset Table ───────────────────────────────────────────────────

/// The sorted offset table at the head of a file.
#[derive(Debug, Clone, Copy)]
pub struct OffsetTable<'a> {
    data: &'a [u8],
    len: usize,
}

impl<'a> OffsetTable<'a> {
    /// Read the record count and check that the whole table fits.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < COUNT_SIZE {
            return Err(StoreError::InvalidFormat(format!(
                "file too small for record count ({} bytes)",
                data.len()
            )));
        }
        let len = read_u32_at(data, 0)? as usize;
        let table_end = len
            .checked_mul(OFFSET_SIZE)
            .and_then(|n| n.checked_add(COUNT_SIZE))
            .ok_or_else(|| StoreError::InvalidFormat(format!("record count {} overflows", len)))?;
        if table_end > data.len() {
            return Err(StoreError::InvalidFormat(format!(
                "offset table for {} records truncated ({} of {} bytes)",
                len,
                data.len(),
                table_end
            )));
        }
        Ok(Self { data, len })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record offset stored at table position `index`.
    pub fn get(&self, index: usize) -> Result<usize> {
        debug_assert!(index < self.len, "index out of bounds");
        read_u32_at(self.data, COUNT_SIZE + index * OFFSET_SIZE).map(|o| o as usize)
    }

    /// Binary search over the table.
    ///
    /// `probe` decodes the record at a given offset and reports how it orders
    /// against the key being searched for. Returns the matching record offset.
    pub fn find_by<F>(&self, mut probe: F) -> Result<Option<usize>>
    where
        F: FnMut(usize) -> Result<Ordering>,
    {
        let mut lo = 0;
        let mut hi = self.len;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let offset = self.get(mid)?;
            match probe(offset)? {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(Some(offset)),
            }
        }
        Ok(None)
    }

    /// All record offsets in key order.
    pub fn offsets(&self) -> impl Iterator<Item = Result<usize>> + 'a {
        let table = *self;
        (0..table.len).map(move |i| table.get(i))
    }
}

// ── Offset Lists ───────────────────────────────────────────────────

/// The `u16` count and `u32` offset array that close every record.
#[derive(Debug, Clone, Copy)]
pub struct OffsetList<'a> {
    data: &'a [u8],
    start: usize,
    len: usize,
}

impl<'a> OffsetList<'a> {
    /// Decode the list whose count field sits at `count_offset`.
    fn read(data: &'a [u8], count_offset: usize) -> Result<Self> {
        let len = read_u16_at(data, count_offset)? as usize;
        let after_count = count_offset + 2;
        let start = after_count + compute_padding(after_count, 4);
        let end = start + len * OFFSET_SIZE;
        if end > data.len() {
            return Err(truncated("offset list", start, data.len()));
        }
        Ok(Self { data, start, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offsets into the other file.
    pub fn iter(&self) -> impl Iterator<Item = usize> + 'a {
        let data = self.data;
        let start = self.start;
        // Bounds were checked in `read`.
        (0..self.len).map(move |i| {
            let at = start + i * OFFSET_SIZE;
            u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]) as usize
        })
    }
}

// ── Actor Records ──────────────────────────────────────────────────

/// Decoded actor record, borrowing from the actor file.
#[derive(Debug, Clone, Copy)]
pub struct ActorRecord<'a> {
    pub name: &'a [u8],
    pub films: OffsetList<'a>,
}

/// Decode just the name of the actor at `offset`.
///
/// Returns the name and the offset of the film count field.
pub fn read_actor_name(data: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let (name, after_nul) = read_cstr_at(data, offset)?;
    let count_offset = after_nul + compute_padding(after_nul - offset, 2);
    Ok((name, count_offset))
}

/// Decode the full actor record at `offset`.
pub fn read_actor(data: &[u8], offset: usize) -> Result<ActorRecord<'_>> {
    let (name, count_offset) = read_actor_name(data, offset)?;
    let films = OffsetList::read(data, count_offset)?;
    Ok(ActorRecord { name, films })
}

// ── Film Records ───────────────────────────────────────────────────

/// Decoded film record, borrowing from the film file.
#[derive(Debug, Clone, Copy)]
pub struct FilmRecord<'a> {
    pub title: &'a [u8],
    pub year: u16,
    pub actors: OffsetList<'a>,
}

/// Decode the title and year of the film at `offset`.
///
/// Returns `(title, year, count_offset)`.
pub fn read_film_key(data: &[u8], offset: usize) -> Result<(&[u8], u16, usize)> {
    let (title, year_offset) = read_cstr_at(data, offset)?;
    let year = BASE_YEAR + read_u8_at(data, year_offset)? as u16;
    let after_year = year_offset + 1;
    let count_offset = after_year + compute_padding(after_year - offset, 2);
    Ok((title, year, count_offset))
}

/// Decode the full film record at `offset`.
pub fn read_film(data: &[u8], offset: usize) -> Result<FilmRecord<'_>> {
    let (title, year, count_offset) = read_film_key(data, offset)?;
    let actors = OffsetList::read(data, count_offset)?;
    Ok(FilmRecord {
        title,
        year,
        actors,
    })
}
