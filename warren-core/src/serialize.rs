//! `.maze` file format.
//!
//! All integers little-endian:
//!
//! ```text
//! magic        : 4 bytes = "MAZE"
//! version      : u16
//! width        : u32
//! height       : u32
//! flags        : u32   (bit 0: zlib-compressed payload)
//! start_x, start_y : u32, u32
//! exit_x,  exit_y  : u32, u32
//! metadata_len : u32
//! metadata     : UTF-8 "key=value;…" of metadata_len bytes
//! payload_len  : u64   (stored length — compressed when flagged)
//! payload      : width·height cell bytes, row-major
//! ```
//!
//! The writer compresses once `width · height ≥ 2²⁰`; readers accept
//! either. Metadata is advisory (algorithm, seed, timings) — the grid
//! bytes are the source of truth.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{EngineError, Result};
use crate::grid::Grid;

/// File magic for mazes.
pub const MAZE_MAGIC: [u8; 4] = *b"MAZE";
/// Current `.maze` format version.
pub const MAZE_VERSION: u16 = 1;
/// Flags bit 0: the payload is zlib-compressed.
pub const FLAG_COMPRESSED: u32 = 1;

/// Compression kicks in at this cell count (2²⁰).
const COMPRESS_THRESHOLD: u64 = 1 << 20;
/// Upper bound on the advisory metadata block.
const MAX_METADATA_LEN: u32 = 1 << 24;

/// Advisory `key=value;` metadata. Keys iterate sorted, so serialized
/// output is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Creates an empty metadata block.
    pub fn new() -> Metadata {
        Metadata::default()
    }

    /// Inserts a key/value pair. `=` and `;` are reserved by the encoding
    /// and rejected.
    pub fn insert(&mut self, key: &str, value: impl fmt::Display) -> Result<()> {
        let value = value.to_string();
        if key.contains(['=', ';']) || value.contains(['=', ';']) {
            return Err(EngineError::InvalidOption(format!(
                "metadata entry `{key}` contains a reserved character"
            )));
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    /// Looks up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push(';');
        }
        out.into_bytes()
    }

    fn decode(bytes: &[u8]) -> Result<Metadata> {
        let text =
            std::str::from_utf8(bytes).map_err(|_| EngineError::Corrupt("metadata is not UTF-8"))?;
        let mut meta = Metadata::new();
        for segment in text.split(';') {
            if segment.is_empty() {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                return Err(EngineError::Corrupt("metadata segment without `=`"));
            };
            meta.entries.insert(key.to_string(), value.to_string());
        }
        Ok(meta)
    }
}

/// A parsed `.maze` file.
#[derive(Clone, Debug)]
pub struct MazeFile {
    /// The cell grid.
    pub grid: Grid,
    /// Advisory metadata.
    pub meta: Metadata,
    /// Declared start coordinate.
    pub start: (u32, u32),
    /// Declared exit coordinate.
    pub exit: (u32, u32),
}

/// Whether the writer compresses a grid of `cells` cells by default.
pub fn default_compress(cells: u64) -> bool {
    cells >= COMPRESS_THRESHOLD
}

/// Writes a maze with the default compression policy.
pub fn save_maze(path: &Path, grid: &Grid, meta: &Metadata) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_maze(&mut out, grid, meta, default_compress(grid.len()))?;
    out.flush()?;
    Ok(())
}

/// Writes the `.maze` layout to any sink.
pub fn write_maze<W: Write>(out: &mut W, grid: &Grid, meta: &Metadata, compress: bool) -> Result<()> {
    let flags = if compress { FLAG_COMPRESSED } else { 0 };
    let meta_bytes = meta.encode();
    let (start, exit) = (grid.start(), grid.exit());

    out.write_all(&MAZE_MAGIC)?;
    out.write_all(&MAZE_VERSION.to_le_bytes())?;
    out.write_all(&grid.width().to_le_bytes())?;
    out.write_all(&grid.height().to_le_bytes())?;
    out.write_all(&flags.to_le_bytes())?;
    out.write_all(&start.0.to_le_bytes())?;
    out.write_all(&start.1.to_le_bytes())?;
    out.write_all(&exit.0.to_le_bytes())?;
    out.write_all(&exit.1.to_le_bytes())?;
    out.write_all(&(meta_bytes.len() as u32).to_le_bytes())?;
    out.write_all(&meta_bytes)?;

    if compress {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(grid.as_bytes())?;
        let payload = encoder.finish()?;
        out.write_all(&(payload.len() as u64).to_le_bytes())?;
        out.write_all(&payload)?;
    } else {
        out.write_all(&(grid.as_bytes().len() as u64).to_le_bytes())?;
        out.write_all(grid.as_bytes())?;
    }
    Ok(())
}

/// Reads a maze from a file.
pub fn load_maze(path: &Path) -> Result<MazeFile> {
    read_maze(&mut BufReader::new(File::open(path)?))
}

/// Reads the `.maze` layout from any source.
pub fn read_maze<R: Read>(input: &mut R) -> Result<MazeFile> {
    let mut magic = [0u8; 4];
    input
        .read_exact(&mut magic)
        .map_err(|_| EngineError::BadMagic { expected: "MAZE" })?;
    if magic != MAZE_MAGIC {
        return Err(EngineError::BadMagic { expected: "MAZE" });
    }

    let version = read_u16(input)?;
    if version > MAZE_VERSION {
        return Err(EngineError::UnsupportedVersion(version));
    }

    let width = read_u32(input)?;
    let height = read_u32(input)?;
    let flags = read_u32(input)?;
    let start = (read_u32(input)?, read_u32(input)?);
    let exit = (read_u32(input)?, read_u32(input)?);

    let meta_len = read_u32(input)?;
    if meta_len > MAX_METADATA_LEN {
        return Err(EngineError::Corrupt("metadata block implausibly large"));
    }
    let mut meta_bytes = vec![0u8; meta_len as usize];
    input
        .read_exact(&mut meta_bytes)
        .map_err(|_| EngineError::Corrupt("truncated metadata"))?;
    let meta = Metadata::decode(&meta_bytes)?;

    let expected = width as u64 * height as u64;
    let payload_len = read_u64(input)?;
    let stored_cap = if flags & FLAG_COMPRESSED != 0 {
        // A zlib stream never inflates its input beyond a small factor;
        // anything larger than the raw grid is already suspect.
        expected + 1024
    } else {
        expected
    };
    if payload_len > stored_cap {
        return Err(EngineError::Corrupt("payload longer than the grid it encodes"));
    }
    let mut payload = vec![0u8; payload_len as usize];
    input
        .read_exact(&mut payload)
        .map_err(|_| EngineError::Corrupt("truncated payload"))?;

    let cells = if flags & FLAG_COMPRESSED != 0 {
        let mut inflated = Vec::with_capacity(expected as usize);
        ZlibDecoder::new(&payload[..])
            .read_to_end(&mut inflated)
            .map_err(|_| EngineError::Corrupt("zlib payload did not inflate"))?;
        inflated
    } else {
        payload
    };

    let grid = Grid::from_bytes(width, height, cells)?;
    Ok(MazeFile {
        grid,
        meta,
        start,
        exit,
    })
}

fn read_u16<R: Read>(input: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    input
        .read_exact(&mut buf)
        .map_err(|_| EngineError::Corrupt("truncated header"))?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(input: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    input
        .read_exact(&mut buf)
        .map_err(|_| EngineError::Corrupt("truncated header"))?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(input: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    input
        .read_exact(&mut buf)
        .map_err(|_| EngineError::Corrupt("truncated header"))?;
    Ok(u64::from_le_bytes(buf))
}
