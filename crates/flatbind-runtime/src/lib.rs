//! Runtime side of a flat native boundary.
//!
//! The generator emits C++; this crate holds the same contracts in Rust so
//! they can be exercised in-process: bounded text copy-out, no unwinding
//! across `extern "C"`, traps for unrecoverable caller errors, enum values
//! at their declared width, and a text-sequence adapter exported under the
//! generated symbol names.

pub mod buffer;
pub mod enums;
pub mod guard;
pub mod sequence;

pub use buffer::{copy_into, copy_text_out, text_in};
pub use enums::{EnumError, EnumValue};
pub use guard::{guard, require, require_mut, trap};
pub use sequence::TextSequence;
