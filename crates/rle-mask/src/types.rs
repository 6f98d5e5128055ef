use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Malformed};
use crate::mask;

/// A single foreground run: `length` pixels starting at the 1-based flat
/// index `start` (column-major numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub start: u64,
    pub length: u64,
}

impl Run {
    pub fn new(start: u64, length: u64) -> Self {
        Run { start, length }
    }

    /// The 0-based half-open interval `[start - 1, start - 1 + length)`.
    ///
    /// Returns `None` when `start` is 0 (there is no pixel before the first
    /// one) or when the end does not fit in a `u64`.
    pub fn interval(&self) -> Option<Range<u64>> {
        let begin = self.start.checked_sub(1)?;
        let end = begin.checked_add(self.length)?;
        Some(begin..end)
    }
}

/// The ordered list of runs parsed from an encoded string.
///
/// Runs keep their input order. They are not required to be sorted or
/// disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Runs(pub Vec<Run>);

impl Runs {
    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Paint these runs onto a fresh `h x w` mask.
    pub fn decode(&self, h: u32, w: u32) -> Result<Mask, DecodeError> {
        mask::decode_runs(self, h, w)
    }
}

impl<'a> IntoIterator for &'a Runs {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for Runs {
    type Err = DecodeError;

    /// Parse whitespace-separated `start length` pairs.
    ///
    /// Tokens are de-interleaved: even positions are starts, odd positions
    /// are lengths. An empty or blank string parses to zero runs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .enumerate()
            .map(|(index, token)| {
                token.parse::<u64>().map_err(|_| Malformed::InvalidToken {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<u64>, Malformed>>()?;

        if values.len() % 2 != 0 {
            return Err(Malformed::OddTokenCount(values.len()).into());
        }

        let runs = values
            .chunks_exact(2)
            .map(|pair| Run::new(pair[0], pair[1]))
            .collect();
        Ok(Runs(runs))
    }
}

/// A dense binary mask of `h` rows by `w` columns.
///
/// Pixels are stored row-major: pixel `(row, col)` lives at
/// `row * w + col`. Every value is 0 (background) or 1 (foreground).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MaskRepr", into = "MaskRepr")]
pub struct Mask {
    pub(crate) h: u32,
    pub(crate) w: u32,
    pub(crate) data: Vec<u8>,
}

impl Mask {
    /// All-background mask, or `None` if the buffer cannot be allocated.
    /// The caller guarantees `h * w` fits in `usize`.
    pub(crate) fn zeros(h: u32, w: u32) -> Option<Self> {
        let n = (h as usize) * (w as usize);
        let mut data = Vec::new();
        data.try_reserve_exact(n).ok()?;
        data.resize(n, 0u8);
        Some(Mask { h, w, data })
    }

    /// Build a mask from rows of 0/1 values.
    ///
    /// Returns `None` if there are no rows, a row is empty, the rows differ
    /// in length, or any value is not 0 or 1.
    pub fn from_rows(rows: &[Vec<u8>]) -> Option<Self> {
        let h = u32::try_from(rows.len()).ok()?;
        let w = u32::try_from(rows.first()?.len()).ok()?;
        if h == 0 || w == 0 {
            return None;
        }
        let mut data = Vec::with_capacity(rows.len() * w as usize);
        for row in rows {
            if row.len() != w as usize || row.iter().any(|&v| v > 1) {
                return None;
            }
            data.extend_from_slice(row);
        }
        Some(Mask { h, w, data })
    }

    pub fn height(&self) -> u32 {
        self.h
    }

    pub fn width(&self) -> u32 {
        self.w
    }

    /// The row-major pixel buffer, `h * w` bytes long.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn get(&self, row: u32, col: u32) -> Option<u8> {
        if row >= self.h || col >= self.w {
            return None;
        }
        self.data
            .get(row as usize * self.w as usize + col as usize)
            .copied()
    }

    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.w as usize)
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows().map(<[u8]>::to_vec).collect()
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let mut first = true;
            for &v in row {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}", v)?;
                first = false;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serialized form of a [`Mask`]: `{"size": [h, w], "rows": [[...], ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MaskRepr {
    size: [u32; 2],
    rows: Vec<Vec<u8>>,
}

impl From<Mask> for MaskRepr {
    fn from(mask: Mask) -> Self {
        MaskRepr {
            size: [mask.h, mask.w],
            rows: mask.to_rows(),
        }
    }
}

impl TryFrom<MaskRepr> for Mask {
    type Error = String;

    fn try_from(repr: MaskRepr) -> Result<Self, Self::Error> {
        let mask = Mask::from_rows(&repr.rows)
            .ok_or_else(|| "rows must be a non-empty rectangular grid of 0/1 values".to_string())?;
        if [mask.h, mask.w] != repr.size {
            return Err(format!(
                "size {:?} does not match rows ({}x{})",
                repr.size, mask.h, mask.w
            ));
        }
        Ok(mask)
    }
}
