//! `Range` header parsing.

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

/// An inclusive byte range already validated against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Parses a `Range` header value against a file size.
///
/// `Ok(None)` means no byte range applies and the whole file should be
/// served (that includes units other than `bytes`, which are legal to
/// ignore). A malformed or unsatisfiable range is a 416. Only single
/// ranges are supported; multipart ranges fail parsing.
pub fn parse_range(header: &str, size: u64) -> AppResult<Option<ByteRange>> {
    let Some(spec) = header.strip_prefix("bytes=") else {
        return Ok(None);
    };
    let Some((start_str, end_str)) = spec.trim().split_once('-') else {
        return Err(invalid());
    };

    let range = match (start_str.is_empty(), end_str.is_empty()) {
        // "-N": the last N bytes
        (true, false) => {
            let n: u64 = end_str.parse().map_err(|_| invalid())?;
            if n == 0 || size == 0 {
                return Err(invalid());
            }
            let n = n.min(size);
            ByteRange {
                start: size - n,
                end: size - 1,
            }
        }
        // "N-": from N to the end
        (false, true) => {
            let start: u64 = start_str.parse().map_err(|_| invalid())?;
            if start >= size {
                return Err(invalid());
            }
            ByteRange {
                start,
                end: size - 1,
            }
        }
        // "N-M", with M clamped to the file
        (false, false) => {
            let start: u64 = start_str.parse().map_err(|_| invalid())?;
            let end: u64 = end_str.parse().map_err(|_| invalid())?;
            if start > end || start >= size {
                return Err(invalid());
            }
            ByteRange {
                start,
                end: end.min(size - 1),
            }
        }
        (true, true) => return Err(invalid()),
    };

    Ok(Some(range))
}

fn invalid() -> AppError {
    AppError::range_not_satisfiable("Invalid or unsatisfiable Range header")
}
