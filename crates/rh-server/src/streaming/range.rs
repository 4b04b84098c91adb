//! `Range` header parsing and validation against a file size.
//!
//! Only the single-span `bytes=<start>-[<end>]` form is honoured. Anything
//! that does not parse is served as a full body rather than rejected.

/// Inclusive, zero-based span of bytes within a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered (`end - start + 1`).
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` header of a 206 response.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// What to send for a request, given its `Range` header and the file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDecision {
    /// No usable range: send the whole file with 200.
    Full,
    /// Send exactly this span with 206.
    Partial(ByteRange),
    /// The range falls outside the file: 416, nothing opened.
    Unsatisfiable,
}

/// Parse a `Range: bytes=START-END` header value.
///
/// Returns `(start, Option<end>)` where `end` is `None` for open-ended ranges
/// like `bytes=500-` (or a bare `bytes=500`). Returns `None` for anything
/// malformed: a missing `bytes=` unit, a non-numeric bound, suffix ranges
/// (`bytes=-500`) and multi-range lists.
pub fn parse_range_header(value: &str) -> Option<(u64, Option<u64>)> {
    let set = value.trim().strip_prefix("bytes=")?;
    let mut parts = set.splitn(2, '-');
    let start_str = parts.next()?.trim();
    let end_str = parts.next().unwrap_or("").trim();

    let start: u64 = start_str.parse().ok()?;
    let end: Option<u64> = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse().ok()?)
    };

    Some((start, end))
}

/// Decide how to answer a request for a resource of `size` bytes.
///
/// Out-of-bounds ends are not clamped: `start > end`, `start >= size` and
/// `end >= size` are all unsatisfiable. Every range against an empty file
/// is unsatisfiable.
pub fn decide_range(header: Option<&str>, size: u64) -> RangeDecision {
    let Some((start, end)) = header.and_then(parse_range_header) else {
        return RangeDecision::Full;
    };

    let Some(last) = size.checked_sub(1) else {
        return RangeDecision::Unsatisfiable;
    };
    let end = end.unwrap_or(last);

    if start > end || start > last || end > last {
        return RangeDecision::Unsatisfiable;
    }

    RangeDecision::Partial(ByteRange { start, end })
}
