//! Binary codec for linked shader programs.
//!
//! A cache blob is a [`ValidationHeader`] followed by the program's plain
//! data, its binding tables, its uniform records and one record per linked
//! stage. Serialization walks a [`ShaderProgram`](shaderbin_program::ShaderProgram);
//! deserialization rebuilds one in place, calling out to the [`Driver`],
//! [`IrCodec`] and [`Linker`] collaborators bundled in a [`CodecContext`].
//!
//! Failures come in two classes. A version-class failure means the blob was
//! produced by a different build, driver or GPU and is expected after
//! upgrades. A read-class failure means the blob is truncated or corrupt.
//! Both are non-fatal: the caller compiles and links from source instead.

#![warn(missing_docs)]

pub mod collab;
pub mod context;
pub mod error;
pub mod flat_ir;
pub mod header;
pub mod headless;
pub mod initializers;
pub mod program;
pub mod shader;
pub mod uniform;

pub use collab::{Api, Driver, IrCodec, IrError, Linker};
pub use context::{CodecContext, CACHE_MAGIC};
pub use error::{CodecError, DeserializeError, SerializeError, VersionMismatch};
pub use flat_ir::FlatIrCodec;
pub use header::ValidationHeader;
pub use headless::HeadlessDriver;
pub use initializers::ConstantInitializers;
pub use program::ProgramCodec;
pub use shader::ShaderRecordCodec;
pub use uniform::UniformRecordCodec;
