//! Decoding of run-length encoded binary segmentation masks.
//!
//! ```
//! let mask = rle_mask::decode("2 2", 3, 3).unwrap();
//! assert_eq!(mask.to_rows(), vec![vec![0, 0, 0], vec![1, 0, 0], vec![1, 0, 0]]);
//! ```

pub mod error;
pub mod mask;
pub mod types;

pub use error::{DecodeError, Malformed, Result};
pub use mask::decode;
pub use types::{Mask, Run, Runs};
