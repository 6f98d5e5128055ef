//! Decoding of "start length" run-length encoded masks.
//!
//! Pixels are numbered top-to-bottom, then left-to-right, starting at 1:
//! 1 is pixel (row 0, col 0), 2 is pixel (row 1, col 0), and so on. A 0-based
//! flat index `p` therefore lands at `(row, col) = (p % h, p / h)`.

use log::{debug, trace};

use crate::error::{DecodeError, Result};
use crate::types::{Mask, Runs};

/// Decode an encoded string into an `h x w` mask.
///
/// `encoded` holds whitespace-separated `start length` pairs with 1-based
/// starts. Runs may come in any order and may overlap. An empty string
/// decodes to an all-zero mask.
///
/// Fails without producing a mask if the shape has a zero side, the string is
/// not an even number of non-negative integers, or a run leaves the mask.
pub fn decode(encoded: &str, h: u32, w: u32) -> Result<Mask> {
    // Shape errors win over encoding errors, so check before parsing.
    pixel_count(h, w)?;
    let runs: Runs = encoded.parse()?;
    decode_runs(&runs, h, w)
}

/// Paint already-parsed runs onto a fresh `h x w` mask.
///
/// Zero-length runs cover no pixel and are skipped whatever their start.
pub fn decode_runs(runs: &Runs, h: u32, w: u32) -> Result<Mask> {
    let n = pixel_count(h, w)?;
    let mut mask = Mask::zeros(h, w).ok_or(DecodeError::InvalidShape { h, w })?;
    let (h, w) = (h as usize, w as usize);

    for run in runs {
        if run.length == 0 {
            continue;
        }
        let range = run
            .interval()
            .filter(|r| r.end <= n as u64)
            .ok_or(DecodeError::IndexOutOfRange {
                start: run.start,
                length: run.length,
                size: n,
            })?;
        trace!("run {:?} -> flat [{}, {})", run, range.start, range.end);

        // Bounded by n, so the casts are lossless.
        for p in range.start as usize..range.end as usize {
            let (row, col) = (p % h, p / h);
            mask.data[row * w + col] = 1;
        }
    }

    debug!(
        "decoded {} runs into {}x{} mask, area {}",
        runs.len(),
        h,
        w,
        area(&mask)
    );
    Ok(mask)
}

/// Total pixel count of an `h x w` mask, rejecting empty or unaddressable shapes.
///
/// A `Vec` holds at most `isize::MAX` bytes, so larger counts are rejected too.
fn pixel_count(h: u32, w: u32) -> Result<usize> {
    let n = h as u64 * w as u64;
    if n == 0 || n > isize::MAX as u64 {
        return Err(DecodeError::InvalidShape { h, w });
    }
    usize::try_from(n).map_err(|_| DecodeError::InvalidShape { h, w })
}

/// Number of foreground pixels.
pub fn area(mask: &Mask) -> u64 {
    mask.data.iter().filter(|&&v| v != 0).count() as u64
}

/// Tight bounding box `[x, y, width, height]` of the foreground.
///
/// `x` is the leftmost foreground column and `y` the topmost row. Returns
/// `None` when the mask has no foreground.
pub fn to_bbox(mask: &Mask) -> Option<[u32; 4]> {
    let mut xs = u32::MAX;
    let mut xe = 0u32;
    let mut ys = u32::MAX;
    let mut ye = 0u32;

    for (y, row) in (0u32..).zip(mask.rows()) {
        for (x, &v) in (0u32..).zip(row) {
            if v == 0 {
                continue;
            }
            xs = xs.min(x);
            xe = xe.max(x + 1);
            ys = ys.min(y);
            ye = ye.max(y + 1);
        }
    }

    if xs == u32::MAX {
        return None;
    }
    Some([xs, ys, xe - xs, ye - ys])
}

/// The mask flattened in column-major order: pixel `(row, col)` is at
/// `col * h + row`, matching the numbering used by the encoding.
pub fn to_col_major(mask: &Mask) -> Vec<u8> {
    let (h, w) = (mask.h as usize, mask.w as usize);
    let mut out = vec![0u8; h * w];
    for (row, cells) in mask.rows().enumerate() {
        for (col, &v) in cells.iter().enumerate() {
            out[col * h + row] = v;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Malformed;
    use crate::types::Run;

    /// Reference encoder: column-major scan emitting 1-based `start length` pairs.
    fn reference_encode(mask: &Mask) -> String {
        let flat = to_col_major(mask);
        let mut pairs = Vec::new();
        let mut start = None;
        for (p, &v) in flat.iter().enumerate() {
            match (v, start) {
                (1, None) => start = Some(p),
                (0, Some(s)) => {
                    pairs.push(format!("{} {}", s + 1, p - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            pairs.push(format!("{} {}", s + 1, flat.len() - s));
        }
        pairs.join(" ")
    }

    #[test]
    fn test_decode_column_major_scenario() {
        let mask = decode("2 2", 3, 3).unwrap();
        assert_eq!(mask.to_rows(), vec![vec![0, 0, 0], vec![1, 0, 0], vec![1, 0, 0]]);
    }

    #[test]
    fn test_decode_empty() {
        let mask = decode("", 2, 2).unwrap();
        assert_eq!(mask.to_rows(), vec![vec![0, 0], vec![0, 0]]);
        assert_eq!(area(&mask), 0);
    }

    #[test]
    fn test_decode_zero_length_runs() {
        let mask = decode("1 0 3 0 5 0", 2, 2).unwrap();
        assert_eq!(area(&mask), 0);
        // Empty runs are not bounds-checked.
        assert!(decode("0 0 100 0", 2, 2).is_ok());
    }

    #[test]
    fn test_decode_out_of_range() {
        let err = decode("5 3", 2, 2).unwrap_err();
        assert_eq!(
            err,
            DecodeError::IndexOutOfRange {
                start: 5,
                length: 3,
                size: 4
            }
        );

        // Start 0 would address pixel -1.
        assert!(matches!(
            decode("0 1", 2, 2),
            Err(DecodeError::IndexOutOfRange { start: 0, .. })
        ));
        // A run ending exactly at the last pixel is fine; one past is not.
        assert!(decode("3 2", 2, 2).is_ok());
        assert!(decode("3 3", 2, 2).is_err());
        assert!(decode("1 18446744073709551615", 2, 2).is_err());
    }

    #[test]
    fn test_decode_no_partial_result() {
        // The first run is valid, the second is not.
        assert!(decode("1 2 4 9", 2, 2).is_err());
    }

    #[test]
    fn test_decode_invalid_shape() {
        assert_eq!(
            decode("1 1", 0, 3).unwrap_err(),
            DecodeError::InvalidShape { h: 0, w: 3 }
        );
        assert_eq!(
            decode("1 1", 3, 0).unwrap_err(),
            DecodeError::InvalidShape { h: 3, w: 0 }
        );
        // Shape is checked before the encoding.
        assert!(matches!(
            decode("1", 0, 0),
            Err(DecodeError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_decode_unallocatable_shape() {
        assert_eq!(
            decode("", u32::MAX, u32::MAX).unwrap_err(),
            DecodeError::InvalidShape {
                h: u32::MAX,
                w: u32::MAX
            }
        );
        assert!(matches!(
            Runs::default().decode(u32::MAX, u32::MAX),
            Err(DecodeError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(
            decode("1 2 3", 2, 2).unwrap_err(),
            DecodeError::MalformedEncoding(Malformed::OddTokenCount(3))
        );
        assert!(matches!(
            decode("1 x", 2, 2),
            Err(DecodeError::MalformedEncoding(Malformed::InvalidToken { index: 1, .. }))
        ));
    }

    #[test]
    fn test_decode_run_wraps_columns() {
        // 3 rows x 4 cols, run covers flat 2..7: end of col 0, all of col 1, top of col 2.
        let mask = decode("3 5", 3, 4).unwrap();
        assert_eq!(
            mask.to_rows(),
            vec![vec![0, 1, 1, 0], vec![0, 1, 0, 0], vec![1, 1, 0, 0]]
        );
    }

    #[test]
    fn test_decode_coverage_matches_closed_form() {
        let (h, w) = (4u32, 5u32);
        let runs = Runs(vec![Run::new(1, 2), Run::new(7, 4), Run::new(18, 3)]);
        let mask = runs.decode(h, w).unwrap();
        assert_eq!(mask.height(), h);
        assert_eq!(mask.width(), w);
        assert_eq!(mask.as_slice().len(), (h * w) as usize);

        for r in 0..h {
            for c in 0..w {
                let p = (c * h + r) as u64;
                let covered = runs
                    .iter()
                    .any(|run| run.interval().unwrap().contains(&p));
                assert_eq!(mask.get(r, c), Some(covered as u8), "pixel ({}, {})", r, c);
            }
        }
    }

    #[test]
    fn test_decode_overlap_is_idempotent() {
        let overlapping = decode("2 4 4 3 2 1", 3, 3).unwrap();
        let disjoint = decode("2 5", 3, 3).unwrap();
        assert_eq!(overlapping, disjoint);

        // Input order does not matter.
        let reordered = decode("4 3 2 1 2 4", 3, 3).unwrap();
        assert_eq!(reordered, disjoint);
    }

    #[test]
    fn test_reference_roundtrip() {
        let original = Mask::from_rows(&[
            vec![0, 1, 1, 0, 1],
            vec![1, 1, 0, 0, 1],
            vec![0, 0, 0, 1, 1],
            vec![1, 0, 1, 1, 1],
        ])
        .unwrap();
        let encoded = reference_encode(&original);
        let decoded = decode(&encoded, 4, 5).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_area_and_bbox() {
        let mask = decode("6 2 9 2", 4, 4).unwrap();
        // flat 5,6 -> col 1 rows 1,2; flat 8,9 -> col 2 rows 0,1
        assert_eq!(
            mask.to_rows(),
            vec![
                vec![0, 0, 1, 0],
                vec![0, 1, 1, 0],
                vec![0, 1, 0, 0],
                vec![0, 0, 0, 0],
            ]
        );
        assert_eq!(area(&mask), 4);
        assert_eq!(to_bbox(&mask), Some([1, 0, 2, 3]));
        assert_eq!(to_bbox(&decode("", 4, 4).unwrap()), None);
    }

    #[test]
    fn test_to_col_major() {
        let mask = Mask::from_rows(&[vec![1, 0, 0], vec![1, 1, 0]]).unwrap();
        assert_eq!(to_col_major(&mask), vec![1, 1, 0, 1, 0, 0]);
    }
}
