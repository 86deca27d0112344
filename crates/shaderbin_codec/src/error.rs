//! Error types for program serialization and deserialization.

use shaderbin_program::{Stage, UnknownStage, UnsupportedFeature};
use shaderbin_wire::WireError;

use crate::collab::IrError;

/// A read-class failure: the blob is truncated or its contents are
/// inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A primitive read failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A stage index or shader type tag is not recognized.
    #[error(transparent)]
    Stage(#[from] UnknownStage),

    /// A shader record's type tag disagrees with its metadata block.
    #[error("record declares a {declared} shader but its metadata says {found}")]
    StageMismatch {
        /// Stage named by the record's type tag.
        declared: Stage,
        /// Stage named by the metadata block.
        found: Stage,
    },

    /// Two shader records claim the same stage slot.
    #[error("{0} stage appears more than once")]
    DuplicateStage(Stage),

    /// A required string was encoded as absent.
    #[error("{what} is missing")]
    MissingString {
        /// Which string was expected.
        what: &'static str,
    },

    /// A stored enum tag has no matching variant.
    #[error("invalid {what} tag {value}")]
    InvalidTag {
        /// Which enum was being decoded.
        what: &'static str,
        /// The tag that was found.
        value: u32,
    },

    /// The driver refused to create an object needed to hold the result.
    #[error("driver could not allocate a {object} for the {stage} stage")]
    DriverAllocation {
        /// Stage the object was for.
        stage: Stage,
        /// Kind of object requested.
        object: &'static str,
    },

    /// A uniform declares more storage than any real program uses.
    #[error("uniform `{name}` declares {elements} storage elements, above the limit of {limit}")]
    StorageTooLarge {
        /// Uniform name.
        name: String,
        /// Declared element count.
        elements: u32,
        /// Largest accepted count.
        limit: u32,
    },

    /// The uniforms together declare more storage than any real program uses.
    #[error("uniform `{name}` needs {elements} storage elements but only {remaining} remain for the program")]
    StorageBudgetExceeded {
        /// Uniform name.
        name: String,
        /// Declared element count.
        elements: u32,
        /// Elements left in the program-wide budget.
        remaining: u32,
    },

    /// The remap table is larger than the uniforms could ever fill.
    #[error("remap table of {declared} slots exceeds the {available} slots the uniforms occupy")]
    RemapTableTooLarge {
        /// Declared table length.
        declared: u32,
        /// Slots occupied by the stored uniforms.
        available: u64,
    },

    /// A uniform's remap range falls outside the remap table.
    #[error("uniform `{name}` occupies remap slots {start}..{end} outside a table of {table_len}")]
    RemapOutOfRange {
        /// Uniform name.
        name: String,
        /// First slot.
        start: u64,
        /// One past the last slot.
        end: u64,
        /// Table length.
        table_len: u32,
    },

    /// The instruction tree could not be decoded.
    #[error("instruction tree: {0}")]
    InstructionTree(#[from] IrError),
}

/// A version-class failure: the blob was written by a different build,
/// driver or GPU, or for a profile the running context cannot load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionMismatch {
    /// The layout fingerprint differs.
    #[error("layout fingerprint differs: cached {found:?}, running {expected:?}")]
    Fingerprint {
        /// Fingerprint of the running build.
        expected: Vec<u32>,
        /// Fingerprint stored in the blob.
        found: Vec<u32>,
    },

    /// The build magic differs.
    #[error("build magic differs: cached {found:?}, running {expected:?}")]
    Magic {
        /// Magic of the running build.
        expected: String,
        /// Magic stored in the blob.
        found: String,
    },

    /// The vendor string differs.
    #[error("vendor differs: cached {found:?}, running {expected:?}")]
    Vendor {
        /// Vendor of the active device.
        expected: String,
        /// Vendor stored in the blob.
        found: String,
    },

    /// The renderer string differs.
    #[error("renderer differs: cached {found:?}, running {expected:?}")]
    Renderer {
        /// Renderer of the active device.
        expected: String,
        /// Renderer stored in the blob.
        found: String,
    },

    /// The header bytes differ but no individual field could be singled out.
    #[error("validation header does not match this build")]
    MalformedHeader,

    /// The blob targets an ES profile and the running context is desktop.
    #[error("cached program targets an ES profile but the context is desktop")]
    EsProfile,
}

/// Why a blob could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeserializeError {
    /// The blob belongs to another build, driver, GPU or profile.
    #[error("incompatible cache entry: {0}")]
    Version(#[from] VersionMismatch),

    /// The blob is truncated or corrupt.
    #[error("corrupt cache entry: {0}")]
    Read(#[from] CodecError),
}

impl DeserializeError {
    /// Result code reported for a version-class failure.
    pub const VERSION_CODE: i32 = -2;
    /// Result code reported for a read-class failure.
    pub const READ_CODE: i32 = -1;

    /// Whether this is a version-class failure.
    pub fn is_version(&self) -> bool {
        matches!(self, DeserializeError::Version(_))
    }

    /// The numeric result code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            DeserializeError::Version(_) => Self::VERSION_CODE,
            DeserializeError::Read(_) => Self::READ_CODE,
        }
    }
}

impl From<WireError> for DeserializeError {
    fn from(err: WireError) -> Self {
        DeserializeError::Read(err.into())
    }
}

/// Why a program could not be serialized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    /// The program uses a feature the format cannot represent.
    #[error("program is not cacheable: {0}")]
    Unsupported(#[from] UnsupportedFeature),

    /// The program's counts disagree with its tables.
    #[error("program state is inconsistent: {0}")]
    Inconsistent(String),

    /// A write failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The instruction tree could not be encoded.
    #[error("instruction tree: {0}")]
    InstructionTree(#[from] IrError),
}
