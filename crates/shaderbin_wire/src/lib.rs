//! Length-delimited binary reader and writer for shader cache blobs.
//!
//! [`ByteCursor`] reads from a borrowed buffer with strict bounds checking and
//! a sticky fault: the first failed read poisons the cursor and every later
//! read returns that same fault. [`ByteSink`] appends to an owned buffer and
//! supports patching length fields after the section they describe has been
//! written. Strings and name/value tables are encoded on top of both.

#![warn(missing_docs)]

pub mod cursor;
pub mod error;
pub mod fixed;
pub mod map;
pub mod sink;

pub use cursor::ByteCursor;
pub use error::WireError;
pub use fixed::Fixed;
pub use map::{read_map_into, write_map, NameValueMap};
pub use sink::ByteSink;
