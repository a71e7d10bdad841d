//! Generation/solve event stream and the `.events` binary log.
//!
//! Generators and solvers emit a flat, append-only sequence of
//! [`Event`] records into an [`EventSink`]. The sequence is finite and
//! restartable: replaying it against a fresh all-walls grid (or a loaded
//! base maze) reproduces the recording's observable final state. Producers
//! push one record at a time; consumers pull — a sink must never re-enter
//! the producer.
//!
//! # Wire format
//!
//! ```text
//! magic   : 4 bytes = "MEVT"
//! version : u16 little-endian
//! records : (u8 kind, u32 x, u32 y, u32 aux) little-endian, repeated
//! end     : single byte 0xFF
//! ```
//!
//! The whole stream may optionally pass through zlib; the reader detects
//! compression by inspecting the first byte (`'M'` for a plain stream).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{EngineError, Result};
use crate::grid::{Cell, Dir, Grid};

/// File magic for event logs.
pub const EVENTS_MAGIC: [u8; 4] = *b"MEVT";
/// Current event-log format version.
pub const EVENTS_VERSION: u16 = 1;
/// Record tag marking the end of the stream.
const END_MARKER: u8 = 0xff;

/// What a single event records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum EventKind {
    /// A generator carved from `(x, y)` toward the direction in `aux`,
    /// claiming the destination cell. Replay re-carves and marks both
    /// cells `VISITED_GEN`.
    CarveCell = 0x01,
    /// A passage opened between two already-carved cells (stitching,
    /// braiding). Replay re-carves without touching visit flags.
    ConnectCells = 0x02,
    /// A solver touched `(x, y)`. `aux = 0` marks `VISITED_SOLVE`,
    /// `aux = 1` marks `MARK_AUX` (e.g. the backward front of a
    /// bidirectional search).
    Visit = 0x03,
    /// `(x, y)` is part of the reported solution path.
    Path = 0x04,
    /// Solver flags cleared: one cell when `aux = 0`, the whole grid when
    /// `aux = 1` (coordinates ignored).
    ClearVisit = 0x05,
}

impl EventKind {
    fn from_u8(tag: u8) -> Option<EventKind> {
        match tag {
            0x01 => Some(EventKind::CarveCell),
            0x02 => Some(EventKind::ConnectCells),
            0x03 => Some(EventKind::Visit),
            0x04 => Some(EventKind::Path),
            0x05 => Some(EventKind::ClearVisit),
            _ => None,
        }
    }
}

/// One fixed-layout event record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Cell x coordinate.
    pub x: u32,
    /// Cell y coordinate.
    pub y: u32,
    /// Kind-specific payload (direction wall bit, flag selector, …).
    pub aux: u32,
}

impl Event {
    /// Generator carve from `(x, y)` toward `dir`.
    pub fn carve(x: u32, y: u32, dir: Dir) -> Event {
        Event {
            kind: EventKind::CarveCell,
            x,
            y,
            aux: dir.wall_bit() as u32,
        }
    }

    /// Connection between two already-carved cells.
    pub fn connect(x: u32, y: u32, dir: Dir) -> Event {
        Event {
            kind: EventKind::ConnectCells,
            x,
            y,
            aux: dir.wall_bit() as u32,
        }
    }

    /// Solver visit marking `VISITED_SOLVE`.
    pub fn visit(x: u32, y: u32) -> Event {
        Event {
            kind: EventKind::Visit,
            x,
            y,
            aux: 0,
        }
    }

    /// Solver visit marking `MARK_AUX`.
    pub fn visit_aux(x: u32, y: u32) -> Event {
        Event {
            kind: EventKind::Visit,
            x,
            y,
            aux: 1,
        }
    }

    /// Path membership of `(x, y)`.
    pub fn path(x: u32, y: u32) -> Event {
        Event {
            kind: EventKind::Path,
            x,
            y,
            aux: 0,
        }
    }

    /// Whole-grid solver-flag reset.
    pub fn clear_all() -> Event {
        Event {
            kind: EventKind::ClearVisit,
            x: 0,
            y: 0,
            aux: 1,
        }
    }

    /// Single-cell solver-flag reset.
    pub fn clear_cell(x: u32, y: u32) -> Event {
        Event {
            kind: EventKind::ClearVisit,
            x,
            y,
            aux: 0,
        }
    }
}

/// Receiver side of the event stream — the interface renderers and the
/// replay machinery implement.
///
/// Sinks must accept events in emission order and must not block the
/// producer for long; a slow consumer buffers.
pub trait EventSink {
    /// Receives one event.
    fn on_event(&mut self, event: Event);

    /// Whether this sink actually records anything. Parallel generators
    /// skip their per-worker event buffering when the sink is inert.
    fn enabled(&self) -> bool {
        true
    }
}

/// A sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: Event) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// In-memory event buffer.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> EventLog {
        EventLog::default()
    }

    /// Recorded events in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Appends another log's events, consuming it. Used by the parallel
    /// generators to drain per-worker buffers in deterministic order.
    pub fn absorb(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }
}

impl EventSink for EventLog {
    fn on_event(&mut self, event: Event) {
        self.events.push(event);
    }
}

enum WriterBackend<W: Write> {
    Plain(W),
    Zlib(ZlibEncoder<W>),
}

impl<W: Write> Write for WriterBackend<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            WriterBackend::Plain(w) => w.write(buf),
            WriterBackend::Zlib(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            WriterBackend::Plain(w) => w.flush(),
            WriterBackend::Zlib(w) => w.flush(),
        }
    }
}

/// Streaming `.events` writer.
///
/// Buffers in memory only as deep as the underlying `BufWriter`; may block
/// on the sink. Call [`finish`](EventWriter::finish) to emit the end
/// marker — dropping the writer without finishing produces a log that
/// readers will reject as truncated.
pub struct EventWriter<W: Write> {
    out: WriterBackend<W>,
}

impl EventWriter<BufWriter<File>> {
    /// Creates a log file at `path`, compressed when `compress` is set.
    pub fn create(path: &Path, compress: bool) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        EventWriter::new(file, compress)
    }
}

impl<W: Write> EventWriter<W> {
    /// Wraps a sink and writes the stream header.
    pub fn new(out: W, compress: bool) -> Result<Self> {
        let mut backend = if compress {
            WriterBackend::Zlib(ZlibEncoder::new(out, Compression::default()))
        } else {
            WriterBackend::Plain(out)
        };
        backend.write_all(&EVENTS_MAGIC)?;
        backend.write_all(&EVENTS_VERSION.to_le_bytes())?;
        Ok(EventWriter { out: backend })
    }

    fn write_record(&mut self, event: Event) -> std::io::Result<()> {
        let mut record = [0u8; 13];
        record[0] = event.kind as u8;
        record[1..5].copy_from_slice(&event.x.to_le_bytes());
        record[5..9].copy_from_slice(&event.y.to_le_bytes());
        record[9..13].copy_from_slice(&event.aux.to_le_bytes());
        self.out.write_all(&record)
    }

    /// Writes the end marker and flushes, returning the underlying sink.
    pub fn finish(mut self) -> Result<W> {
        self.out.write_all(&[END_MARKER])?;
        match self.out {
            WriterBackend::Plain(mut w) => {
                w.flush()?;
                Ok(w)
            }
            WriterBackend::Zlib(encoder) => Ok(encoder.finish()?),
        }
    }
}

impl<W: Write> EventSink for EventWriter<W> {
    fn on_event(&mut self, event: Event) {
        // The streaming writer has no channel to report sink errors from
        // inside a generator's hot loop; an I/O failure here surfaces at
        // finish() time via the flush.
        let _ = self.write_record(event);
    }
}

enum ReaderBackend<R: Read> {
    Plain(R),
    Zlib(ZlibDecoder<PrefixedReader<R>>),
}

impl<R: Read> Read for ReaderBackend<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            ReaderBackend::Plain(r) => r.read(buf),
            ReaderBackend::Zlib(r) => r.read(buf),
        }
    }
}

/// Pull-based `.events` reader.
pub struct EventReader<R: Read> {
    input: ReaderBackend<R>,
    done: bool,
}

impl EventReader<BufReader<File>> {
    /// Opens a log file, sniffing for zlib compression.
    pub fn open(path: &Path) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        EventReader::new(file)
    }
}

impl<R: Read> EventReader<R> {
    /// Wraps a source and validates the header. A plain stream starts with
    /// the magic; anything else is assumed to be zlib-wrapped.
    pub fn new(mut input: R) -> Result<Self> {
        let mut first = [0u8; 1];
        input.read_exact(&mut first).map_err(|_| EngineError::BadMagic { expected: "MEVT" })?;

        let mut backend = if first[0] == EVENTS_MAGIC[0] {
            ReaderBackend::Plain(input)
        } else {
            ReaderBackend::Zlib(ZlibDecoder::new(PrefixedReader {
                prefix: Some(first[0]),
                inner: input,
            }))
        };
        // In the zlib branch the magic byte is still inside the compressed
        // stream, so the full magic is checked uniformly here.
        let mut rest = [0u8; 4];
        let already = match &backend {
            ReaderBackend::Plain(_) => 1,
            ReaderBackend::Zlib(_) => 0,
        };
        backend
            .read_exact(&mut rest[already..4])
            .map_err(|_| EngineError::BadMagic { expected: "MEVT" })?;
        rest[..already].copy_from_slice(&EVENTS_MAGIC[..already]);
        if rest != EVENTS_MAGIC {
            return Err(EngineError::BadMagic { expected: "MEVT" });
        }

        let mut version = [0u8; 2];
        backend
            .read_exact(&mut version)
            .map_err(|_| EngineError::Corrupt("event log shorter than its header"))?;
        let version = u16::from_le_bytes(version);
        if version > EVENTS_VERSION {
            return Err(EngineError::UnsupportedVersion(version));
        }

        Ok(EventReader {
            input: backend,
            done: false,
        })
    }

    /// Reads the next event, or `None` at the end marker.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if self.done {
            return Ok(None);
        }
        let mut tag = [0u8; 1];
        self.input
            .read_exact(&mut tag)
            .map_err(|_| EngineError::Corrupt("event log missing end marker"))?;
        if tag[0] == END_MARKER {
            self.done = true;
            return Ok(None);
        }
        let Some(kind) = EventKind::from_u8(tag[0]) else {
            return Err(EngineError::Corrupt("unknown event kind"));
        };
        let mut body = [0u8; 12];
        self.input
            .read_exact(&mut body)
            .map_err(|_| EngineError::Corrupt("truncated event record"))?;
        Ok(Some(Event {
            kind,
            x: u32::from_le_bytes(body[0..4].try_into().unwrap()),
            y: u32::from_le_bytes(body[4..8].try_into().unwrap()),
            aux: u32::from_le_bytes(body[8..12].try_into().unwrap()),
        }))
    }

    /// Drains the remaining events into a vector.
    pub fn read_to_end(&mut self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }
}

/// A reader that replays one already-consumed byte before its source.
struct PrefixedReader<R: Read> {
    prefix: Option<u8>,
    inner: R,
}

impl<R: Read> Read for PrefixedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if let Some(byte) = self.prefix.take() {
            if buf.is_empty() {
                self.prefix = Some(byte);
                return Ok(0);
            }
            buf[0] = byte;
            return Ok(1);
        }
        self.inner.read(buf)
    }
}

/// Applies one event to a grid.
///
/// Out-of-range coordinates or malformed direction bits mean the log does
/// not belong to this grid and surface as `Corrupt`.
pub fn apply_event(grid: &mut Grid, event: Event) -> Result<()> {
    let check_bounds = |grid: &Grid| -> Result<()> {
        if grid.in_bounds(event.x, event.y) {
            Ok(())
        } else {
            Err(EngineError::Corrupt("event coordinates outside the grid"))
        }
    };
    match event.kind {
        EventKind::CarveCell | EventKind::ConnectCells => {
            check_bounds(grid)?;
            let Some(dir) = Dir::from_wall_bit(event.aux as u8) else {
                return Err(EngineError::Corrupt("event direction is not a wall bit"));
            };
            let (nx, ny) = grid
                .neighbor(event.x, event.y, dir)
                .ok_or(EngineError::Corrupt("event carves off the grid edge"))?;
            grid.carve(event.x, event.y, dir)?;
            if event.kind == EventKind::CarveCell {
                grid.set_flag(event.x, event.y, Cell::VISITED_GEN, true);
                grid.set_flag(nx, ny, Cell::VISITED_GEN, true);
            }
        }
        EventKind::Visit => {
            check_bounds(grid)?;
            let flag = if event.aux == 1 {
                Cell::MARK_AUX
            } else {
                Cell::VISITED_SOLVE
            };
            grid.set_flag(event.x, event.y, flag, true);
        }
        EventKind::Path => {
            check_bounds(grid)?;
            grid.set_flag(event.x, event.y, Cell::ON_PATH, true);
        }
        EventKind::ClearVisit => {
            if event.aux == 1 {
                grid.reset_solver_flags();
            } else {
                check_bounds(grid)?;
                grid.set_flag(event.x, event.y, Cell::SOLVER_FLAGS, false);
            }
        }
    }
    Ok(())
}

/// Replays a full event sequence onto a grid.
pub fn replay<I>(grid: &mut Grid, events: I) -> Result<()>
where
    I: IntoIterator<Item = Event>,
{
    for event in events {
        apply_event(grid, event)?;
    }
    Ok(())
}
