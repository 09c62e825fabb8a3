//! Progress presentation for streaming operations.
//!
//! - Digest labels for layer progress bars
//! - Transfer tracker state machine for pull and push
//! - Waiting spinner for generation

pub mod digest;
pub mod spinner;
pub mod tracker;

pub use digest::{DEFAULT_LABEL_LENGTH, DigestLabel};
pub use spinner::Spinner;
pub use tracker::{BarDisplay, TransferDisplay, TransferTracker, Transition};
