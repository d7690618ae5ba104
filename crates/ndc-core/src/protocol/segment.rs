//! Record segmenters for the repeated records of customization loads.
//!
//! Two strategies decode a trailing payload into an ordered sequence of
//! records:
//!
//! - **Fixed-width chunking** ([`split_fixed`]) for state tables and FIT
//!   tables.  A [`RecordShape`] width counts the record data plus the one-byte
//!   FS slot that follows it on the wire; the last record's slot may be
//!   omitted.
//! - **Variable-width chunking** ([`segment_screens`]) for screen loads.  Each
//!   screen record is a 3-character index followed by data of unbounded
//!   length, and the end of a record is found by a pluggable
//!   [`ScreenBoundary`] strategy.
//!
//! # Escape sequences
//!
//! Screen data may embed escape sequences.  `ESC P` opens a string that runs
//! to the `ESC \` terminator (picture file names live here), `ESC [` opens a
//! control sequence that ends at its final byte (`0x40..=0x7E`), and any other
//! `ESC x` pair is a two-byte sequence.  Bytes inside an escape sequence are
//! never treated as a record boundary or as part of a record index.

use std::iter::Peekable;

use tracing::trace;

use crate::error::DecodeError;
use crate::protocol::fields::{ESC, FS, STRING_TERMINATOR};

/// Number of characters in a screen record index.
pub const SCREEN_INDEX_WIDTH: usize = 3;

// ── Fixed-width records ───────────────────────────────────────────────────────

/// Shape of a fixed-width record: a name for diagnostics and its framed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    /// Human-readable record name, used in [`DecodeError::TruncatedRecord`].
    pub name: &'static str,
    /// Record data width plus its trailing separator slot.
    pub width: usize,
}

impl RecordShape {
    /// State table record: 3-digit state number, state type, 8 × 3-digit entries.
    pub const STATE_TABLE: RecordShape = RecordShape {
        name: "state table",
        width: 29,
    };

    /// FIT record: 33 × 3-digit entries.
    ///
    /// Captured FIT loads carry 99 data characters per entry, so the framed
    /// width is 100 rather than the 103 some host documentation quotes.
    /// Deployments that send wider entries set `records.fit_width`.
    pub const FIT: RecordShape = RecordShape {
        name: "FIT",
        width: 100,
    };

    /// Returns a shape of the same kind with a different framed width.
    pub fn with_width(self, width: usize) -> Self {
        Self { width, ..self }
    }

    /// Number of data bytes in one record.
    pub fn data_width(&self) -> usize {
        self.width.saturating_sub(1)
    }
}

/// Partitions `tail` into consecutive records of `shape`, in source order.
///
/// An empty tail yields no records.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedRecord`] when the tail length does not
/// frame into whole records, or when a separator slot holds anything but FS.
pub fn split_fixed(tail: &[u8], shape: RecordShape) -> Result<Vec<&[u8]>, DecodeError> {
    if tail.is_empty() {
        return Ok(Vec::new());
    }

    let truncated = DecodeError::TruncatedRecord {
        shape: shape.name,
        width: shape.width,
        length: tail.len(),
    };

    let data_width = shape.data_width();
    if data_width == 0 {
        return Err(truncated);
    }

    // The final record may omit its separator slot.
    let framed_len = if tail.last() == Some(&FS) {
        tail.len()
    } else {
        tail.len() + 1
    };
    if framed_len % shape.width != 0 {
        return Err(truncated);
    }

    let mut records = Vec::with_capacity(framed_len / shape.width);
    for chunk in tail.chunks(shape.width) {
        let (record, separator) = chunk.split_at(data_width);
        if separator.first().is_some_and(|&b| b != FS) {
            return Err(truncated);
        }
        records.push(record);
    }
    Ok(records)
}

// ── Variable-width screen records ─────────────────────────────────────────────

/// Where a screen record ends and where the next one begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSpan {
    /// Exclusive end offset of the current record.
    pub end: usize,
    /// Offset at which the next record starts; the payload length when the
    /// current record is the last.
    pub next: usize,
}

impl RecordSpan {
    fn rest_of(payload: &[u8]) -> Self {
        Self {
            end: payload.len(),
            next: payload.len(),
        }
    }
}

/// Strategy that finds the end of a screen record.
///
/// Screen records carry no length, so the boundary rule is isolated here and
/// can be swapped without touching the rest of the decoder.
#[cfg_attr(test, mockall::automock)]
pub trait ScreenBoundary: Send + Sync {
    /// Picks the strategy used for every record of `payload`, or `None` to
    /// keep this one.  Called once per payload, before any record is located.
    fn select(&self, payload: &[u8]) -> Option<&'static dyn ScreenBoundary>;

    /// Returns the span of the record that starts at `start` in `payload`.
    ///
    /// `start` is always less than `payload.len()`.
    fn next_record(&self, payload: &[u8], start: usize) -> RecordSpan;
}

/// Ends a record at the next FS that is not inside an escape sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparatorBoundary;

impl ScreenBoundary for SeparatorBoundary {
    fn select(&self, _payload: &[u8]) -> Option<&'static dyn ScreenBoundary> {
        None
    }

    fn next_record(&self, payload: &[u8], start: usize) -> RecordSpan {
        match Unescaped::new(payload, start).find(|&i| payload[i] == FS) {
            Some(i) => RecordSpan { end: i, next: i + 1 },
            None => RecordSpan::rest_of(payload),
        }
    }
}

/// Finds the next record of an unseparated payload by its index.
///
/// After the current record's index, the first run of unescaped digits that
/// contains a 3-digit window numerically greater than the current index marks
/// the next record; within that run the smallest such window wins.  Given
/// `"002SCREENDATA2003SCREENDATA3"` the run `"2003"` offers `200` and `003`,
/// and `003` is chosen.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexScanBoundary;

impl ScreenBoundary for IndexScanBoundary {
    fn select(&self, _payload: &[u8]) -> Option<&'static dyn ScreenBoundary> {
        None
    }

    fn next_record(&self, payload: &[u8], start: usize) -> RecordSpan {
        let Some(current) = payload.get(start..).and_then(parse_index) else {
            return RecordSpan::rest_of(payload);
        };

        for (run_start, run_end) in DigitRuns::new(payload, start + SCREEN_INDEX_WIDTH) {
            let best = (run_start..=run_end.saturating_sub(SCREEN_INDEX_WIDTH))
                .filter(|&i| i + SCREEN_INDEX_WIDTH <= run_end)
                .filter_map(|i| parse_index(&payload[i..]).map(|index| (index, i)))
                .filter(|&(index, _)| index > current)
                .min();
            if let Some((_, offset)) = best {
                return RecordSpan {
                    end: offset,
                    next: offset,
                };
            }
        }
        RecordSpan::rest_of(payload)
    }
}

/// Uses [`SeparatorBoundary`] when the payload carries an unescaped FS, and
/// [`IndexScanBoundary`] otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoBoundary;

impl AutoBoundary {
    fn resolve(payload: &[u8]) -> &'static dyn ScreenBoundary {
        if Unescaped::new(payload, 0).any(|i| payload[i] == FS) {
            &SeparatorBoundary
        } else {
            &IndexScanBoundary
        }
    }
}

impl ScreenBoundary for AutoBoundary {
    fn select(&self, payload: &[u8]) -> Option<&'static dyn ScreenBoundary> {
        Some(Self::resolve(payload))
    }

    fn next_record(&self, payload: &[u8], start: usize) -> RecordSpan {
        Self::resolve(payload).next_record(payload, start)
    }
}

/// Splits a screen load payload into records using `boundary`.
///
/// An empty payload yields no records.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedRecord`] for a record shorter than its
/// 3-character index.
pub fn segment_screens<'a>(
    payload: &'a [u8],
    boundary: &dyn ScreenBoundary,
) -> Result<Vec<&'a [u8]>, DecodeError> {
    let boundary: &dyn ScreenBoundary = match boundary.select(payload) {
        Some(selected) => selected,
        None => boundary,
    };
    let mut records = Vec::new();
    let mut start = 0;

    while start < payload.len() {
        let span = boundary.next_record(payload, start);
        let end = span.end.clamp(start, payload.len());
        // A strategy that fails to advance would never terminate.
        let next = if span.next > start {
            span.next.min(payload.len())
        } else {
            payload.len()
        };

        let record = &payload[start..end];
        if record.len() < SCREEN_INDEX_WIDTH {
            return Err(DecodeError::TruncatedRecord {
                shape: "screen",
                width: SCREEN_INDEX_WIDTH,
                length: record.len(),
            });
        }
        trace!("screen record at {start}..{end}");
        records.push(record);
        start = next;
    }
    Ok(records)
}

// ── Scanning helpers ──────────────────────────────────────────────────────────

/// Reads a 3-digit record index from the front of `bytes`.
fn parse_index(bytes: &[u8]) -> Option<u16> {
    let digits = bytes.get(..SCREEN_INDEX_WIDTH)?;
    digits.iter().try_fold(0u16, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u16::from(b - b'0'))
    })
}

/// Maximal runs `(start, end)` of adjacent unescaped ASCII digits at or after
/// `from`, yielded lazily in payload order.
struct DigitRuns<'a> {
    payload: &'a [u8],
    offsets: Peekable<Unescaped<'a>>,
}

impl<'a> DigitRuns<'a> {
    fn new(payload: &'a [u8], from: usize) -> Self {
        Self {
            payload,
            offsets: Unescaped::new(payload, from).peekable(),
        }
    }
}

impl Iterator for DigitRuns<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        let payload = self.payload;
        let start = self.offsets.find(|&i| payload[i].is_ascii_digit())?;
        let mut end = start + 1;
        // Bytes separated by an escape sequence are not adjacent.
        while let Some(&i) = self.offsets.peek() {
            if i != end || !payload[i].is_ascii_digit() {
                break;
            }
            end += 1;
            self.offsets.next();
        }
        Some((start, end))
    }
}

/// Iterator over the offsets of bytes that lie outside escape sequences.
struct Unescaped<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Unescaped<'a> {
    fn new(bytes: &'a [u8], from: usize) -> Self {
        Self { bytes, pos: from }
    }

    /// Offset just past the escape sequence introduced at `esc`.
    fn skip_escape(&self, esc: usize) -> usize {
        let len = self.bytes.len();
        match self.bytes.get(esc + 1) {
            Some(b'P') => self.bytes[esc + 2..]
                .windows(2)
                .position(|w| w == [ESC, STRING_TERMINATOR])
                .map_or(len, |p| esc + 2 + p + 2),
            Some(b'[') => self.bytes[esc + 2..]
                .iter()
                .position(|b| (0x40..=0x7E).contains(b))
                .map_or(len, |p| esc + 2 + p + 1),
            Some(_) => esc + 2,
            None => len,
        }
    }
}

impl Iterator for Unescaped<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.pos < self.bytes.len() {
            let i = self.pos;
            if self.bytes[i] == ESC {
                self.pos = self.skip_escape(i);
                continue;
            }
            self.pos += 1;
            return Some(i);
        }
        None
    }
}
