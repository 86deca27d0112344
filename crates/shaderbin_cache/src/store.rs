//! The program cache directory.
//!
//! Each entry is one file, `<root>/<key>.bin` for programs and
//! `<root>/<key>.shader` for standalone shaders, holding exactly the codec's
//! blob. Presence of the file is the only index. New entries are written to
//! a temporary file in the root and linked into place without replacing an
//! existing file, so concurrent writers of the same key leave exactly one
//! complete entry, written by whoever got there first.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use shaderbin_codec::{CodecContext, ProgramCodec, ShaderRecordCodec};
use shaderbin_common::KeyScheme;
use shaderbin_program::{Shader, ShaderProgram, UnsupportedFeature};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::CacheError;
use crate::key::CacheKey;
use crate::outcome::{LookupOutcome, SkipReason, StoreOutcome};

/// File extension of program entries.
pub const PROGRAM_EXT: &str = "bin";

/// File extension of standalone shader entries.
pub const SHADER_EXT: &str = "shader";

/// What a cache file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A linked program.
    Program,
    /// A single compiled shader.
    Shader,
}

impl EntryKind {
    fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            PROGRAM_EXT => Some(EntryKind::Program),
            SHADER_EXT => Some(EntryKind::Shader),
            _ => None,
        }
    }

    fn ext(self) -> &'static str {
        match self {
            EntryKind::Program => PROGRAM_EXT,
            EntryKind::Shader => SHADER_EXT,
        }
    }
}

/// One file in the cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// Key the entry was stored under.
    pub key: String,
    /// Program or shader.
    pub kind: EntryKind,
    /// Full path of the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

/// A directory of cached programs and shaders.
///
/// The cache holds no state beyond its settings; every call goes to the
/// filesystem. Callers must not store and look up the same program object
/// concurrently.
#[derive(Debug, Clone)]
pub struct ProgramCache {
    root: PathBuf,
    scheme: KeyScheme,
    enabled: bool,
}

impl ProgramCache {
    /// Creates the cache directory if needed and opens it.
    pub fn open(root: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(root).map_err(CacheError::io(root))?;
        Ok(Self::new(root))
    }

    /// A cache rooted at `root` without touching the filesystem.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            scheme: KeyScheme::default(),
            enabled: true,
        }
    }

    /// Selects the key derivation scheme.
    pub fn with_key_scheme(mut self, scheme: KeyScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Turns every store and lookup into a skip when `enabled` is false.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The key derivation scheme in use.
    pub fn key_scheme(&self) -> KeyScheme {
        self.scheme
    }

    /// Whether stores and lookups are performed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Path of the program entry for `key`.
    pub fn program_path(&self, key: &CacheKey) -> PathBuf {
        self.entry_path(key, EntryKind::Program)
    }

    /// Path of the standalone shader entry for `key`.
    pub fn shader_path(&self, key: &CacheKey) -> PathBuf {
        self.entry_path(key, EntryKind::Shader)
    }

    fn entry_path(&self, key: &CacheKey, kind: EntryKind) -> PathBuf {
        self.root.join(format!("{key}.{}", kind.ext()))
    }

    /// Stores a linked program under the key of its attached sources.
    ///
    /// Programs that failed to link, unsupported programs and programs
    /// without a usable key are skipped.
    /// If an entry already exists it is kept, even if it was produced from
    /// different sources that happen to share the key.
    pub fn store(
        &self,
        ctx: &CodecContext<'_>,
        program: &ShaderProgram,
    ) -> Result<StoreOutcome, CacheError> {
        if !self.enabled {
            return Ok(StoreOutcome::Skipped(SkipReason::Disabled));
        }
        if !program.link_status || !program.linked {
            debug!(program = program.name, "not caching unlinked program");
            return Ok(StoreOutcome::Skipped(SkipReason::NotLinked));
        }
        if let Some(feature) = program.unsupported_feature() {
            debug!(program = program.name, %feature, "not caching program");
            return Ok(StoreOutcome::Skipped(SkipReason::Unsupported(feature)));
        }
        let Some(key) = CacheKey::for_program(program, self.scheme) else {
            debug!(program = program.name, "no cache key for program");
            return Ok(StoreOutcome::Skipped(SkipReason::NoKey));
        };

        let path = self.program_path(&key);
        if path.exists() {
            debug!(%key, "program already cached");
            return Ok(StoreOutcome::AlreadyCached);
        }

        let blob = ProgramCodec::serialize(ctx, program)?;
        self.persist(&path, &blob)
    }

    /// Restores a program's link state from the cache.
    ///
    /// Already-linked programs are skipped. A missing entry is a miss; an
    /// entry that fails to load is reported as [`LookupOutcome::LoadFailed`]
    /// and left in place.
    pub fn lookup(&self, ctx: &CodecContext<'_>, program: &mut ShaderProgram) -> LookupOutcome {
        if !self.enabled {
            return LookupOutcome::Skipped(SkipReason::Disabled);
        }
        if program.linked {
            return LookupOutcome::Skipped(SkipReason::AlreadyLinked);
        }
        let Some(key) = CacheKey::for_program(program, self.scheme) else {
            return LookupOutcome::Skipped(SkipReason::NoKey);
        };

        let path = self.program_path(&key);
        let Some(blob) = read_entry(&path) else {
            return LookupOutcome::Miss;
        };

        match ProgramCodec::deserialize(ctx, program, &blob) {
            Ok(()) => {
                debug!(%key, stages = program.linked_stage_count(), "program loaded from cache");
                LookupOutcome::Hit
            }
            Err(err) => {
                log_load_failure(&path, &err);
                LookupOutcome::LoadFailed(err)
            }
        }
    }

    /// Stores one compiled shader under the key of its own source.
    pub fn store_shader(
        &self,
        ctx: &CodecContext<'_>,
        shader: &Shader,
    ) -> Result<StoreOutcome, CacheError> {
        if !self.enabled {
            return Ok(StoreOutcome::Skipped(SkipReason::Disabled));
        }
        if !ShaderRecordCodec::supported_by_shader_cache(shader.stage()) {
            return Ok(StoreOutcome::Skipped(SkipReason::Unsupported(
                UnsupportedFeature::GeometryStage,
            )));
        }
        let Some(key) = CacheKey::for_shader(shader, self.scheme) else {
            return Ok(StoreOutcome::Skipped(SkipReason::NoKey));
        };

        let path = self.shader_path(&key);
        if path.exists() {
            debug!(%key, "shader already cached");
            return Ok(StoreOutcome::AlreadyCached);
        }

        let blob = ShaderRecordCodec::serialize_standalone(ctx, shader)?;
        self.persist(&path, &blob)
    }

    /// Restores a compiled shader from the cache.
    ///
    /// On a hit the shader's metadata, driver program and instruction tree
    /// are replaced by the cached ones; its name, source and label are kept.
    pub fn lookup_shader(&self, ctx: &CodecContext<'_>, shader: &mut Shader) -> LookupOutcome {
        if !self.enabled {
            return LookupOutcome::Skipped(SkipReason::Disabled);
        }
        if !ShaderRecordCodec::supported_by_shader_cache(shader.stage()) {
            return LookupOutcome::Skipped(SkipReason::Unsupported(
                UnsupportedFeature::GeometryStage,
            ));
        }
        let Some(key) = CacheKey::for_shader(shader, self.scheme) else {
            return LookupOutcome::Skipped(SkipReason::NoKey);
        };

        let path = self.shader_path(&key);
        let Some(blob) = read_entry(&path) else {
            return LookupOutcome::Miss;
        };

        match ShaderRecordCodec::deserialize_standalone(ctx, &blob) {
            Ok(mut cached) => {
                shader.metadata = cached.metadata.clone();
                shader.program = cached.program.take();
                shader.ir = cached.ir.take();
                ctx.driver.delete_shader(cached);
                debug!(%key, stage = %shader.stage(), "shader loaded from cache");
                LookupOutcome::Hit
            }
            Err(err) => {
                log_load_failure(&path, &err);
                LookupOutcome::LoadFailed(err)
            }
        }
    }

    /// Lists the entries in the cache directory, sorted by key.
    ///
    /// Files that are not cache entries are ignored. A missing root yields
    /// an empty list.
    pub fn entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let dir = std::fs::read_dir(&self.root).map_err(CacheError::io(&self.root))?;
        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry.map_err(CacheError::io(&self.root))?;
            let path = entry.path();
            let Some(kind) = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(EntryKind::from_ext)
            else {
                continue;
            };
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let metadata = entry.metadata().map_err(CacheError::io(&path))?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(CacheEntry {
                key: key.to_string(),
                kind,
                size: metadata.len(),
                path,
            });
        }

        entries.sort_by(|a, b| (&a.key, a.kind.ext()).cmp(&(&b.key, b.kind.ext())));
        Ok(entries)
    }

    /// Deletes every entry. Returns the number of files removed.
    pub fn purge(&self) -> Result<usize, CacheError> {
        let entries = self.entries()?;
        for entry in &entries {
            std::fs::remove_file(&entry.path).map_err(CacheError::io(&entry.path))?;
        }
        info!(removed = entries.len(), root = %self.root.display(), "purged cache");
        Ok(entries.len())
    }

    fn persist(&self, path: &Path, blob: &[u8]) -> Result<StoreOutcome, CacheError> {
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(CacheError::io(&self.root))?;
        tmp.write_all(blob).map_err(CacheError::io(tmp.path()))?;

        match tmp.persist_noclobber(path) {
            Ok(_) => {
                info!(path = %path.display(), bytes = blob.len(), "stored cache entry");
                Ok(StoreOutcome::Stored)
            }
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "lost race to store cache entry");
                Ok(StoreOutcome::AlreadyCached)
            }
            Err(err) => Err(CacheError::Io {
                path: path.to_path_buf(),
                source: err.error,
            }),
        }
    }
}

fn read_entry(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(blob) => Some(blob),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "cache miss");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unreadable cache entry treated as miss");
            None
        }
    }
}

fn log_load_failure(path: &Path, err: &shaderbin_codec::DeserializeError) {
    if err.is_version() {
        debug!(path = %path.display(), error = %err, "cache entry from another build or device");
    } else {
        warn!(path = %path.display(), error = %err, "corrupt cache entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderbin_codec::{ConstantInitializers, FlatIrCodec, HeadlessDriver};
    use shaderbin_program::{InstructionTree, Stage};

    const VS: &str = "attribute vec4 p; void main() { gl_Position = p; }";
    const FS: &str = "void main() { gl_FragColor = vec4(1.0); }";

    fn make_cache() -> (tempfile::TempDir, ProgramCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ProgramCache::open(&dir.path().join("cache")).unwrap();
        (dir, cache)
    }

    fn linked_program() -> ShaderProgram {
        let mut prog = ShaderProgram::new(1);
        prog.attach(Shader::with_source(2, Stage::Vertex, VS));
        prog.attach(Shader::with_source(3, Stage::Fragment, FS));
        for (slot, stage) in [(0, Stage::Vertex), (2, Stage::Fragment)] {
            let mut shader = Shader::new(10 + slot as u32, stage);
            shader.ir = Some(InstructionTree::default());
            prog.linked_shaders[slot] = Some(shader);
        }
        prog.link_status = true;
        prog.linked = true;
        prog
    }

    fn unlinked_copy(prog: &ShaderProgram) -> ShaderProgram {
        let mut fresh = ShaderProgram::new(prog.name);
        for shader in &prog.shaders {
            fresh.attach(shader.clone());
        }
        fresh
    }

    #[test]
    fn open_creates_root() {
        let (dir, cache) = make_cache();
        assert!(cache.root().is_dir());
        assert!(cache.root().starts_with(dir.path()));
    }

    #[test]
    fn store_then_lookup_hits() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let prog = linked_program();

        assert_eq!(cache.store(&ctx, &prog).unwrap(), StoreOutcome::Stored);
        let mut fresh = unlinked_copy(&prog);
        assert_eq!(cache.lookup(&ctx, &mut fresh), LookupOutcome::Hit);
        assert_eq!(fresh.linked_stage_count(), 2);
    }

    #[test]
    fn second_store_keeps_first_entry() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let prog = linked_program();
        cache.store(&ctx, &prog).unwrap();

        let key = CacheKey::for_program(&prog, KeyScheme::Checksum).unwrap();
        let path = cache.program_path(&key);
        std::fs::write(&path, b"first").unwrap();

        assert_eq!(cache.store(&ctx, &prog).unwrap(), StoreOutcome::AlreadyCached);
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn persist_does_not_clobber() {
        let (_dir, cache) = make_cache();
        let path = cache.root().join("1234567.bin");
        std::fs::write(&path, b"winner").unwrap();

        assert_eq!(cache.persist(&path, b"loser").unwrap(), StoreOutcome::AlreadyCached);
        assert_eq!(std::fs::read(&path).unwrap(), b"winner");
        assert_eq!(cache.entries().unwrap().len(), 1);
    }

    #[test]
    fn missing_entry_is_miss() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let mut prog = unlinked_copy(&linked_program());
        assert_eq!(cache.lookup(&ctx, &mut prog), LookupOutcome::Miss);
    }

    #[test]
    fn linked_program_skips_lookup() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let mut prog = linked_program();
        assert_eq!(
            cache.lookup(&ctx, &mut prog),
            LookupOutcome::Skipped(SkipReason::AlreadyLinked)
        );
    }

    #[test]
    fn program_without_source_is_not_stored() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let mut prog = linked_program();
        prog.shaders[1].source = Some(String::new());

        assert_eq!(
            cache.store(&ctx, &prog).unwrap(),
            StoreOutcome::Skipped(SkipReason::NoKey)
        );
        assert!(cache.entries().unwrap().is_empty());
    }

    #[test]
    fn failed_link_is_not_stored() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let mut prog = linked_program();
        prog.link_status = false;
        prog.linked_shaders = Default::default();

        assert_eq!(
            cache.store(&ctx, &prog).unwrap(),
            StoreOutcome::Skipped(SkipReason::NotLinked)
        );
        assert!(cache.entries().unwrap().is_empty());

        let mut fresh = unlinked_copy(&prog);
        assert_eq!(cache.lookup(&ctx, &mut fresh), LookupOutcome::Miss);
        assert!(!fresh.link_status);
    }

    #[test]
    fn never_linked_program_is_not_stored() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let prog = unlinked_copy(&linked_program());

        assert_eq!(
            cache.store(&ctx, &prog).unwrap(),
            StoreOutcome::Skipped(SkipReason::NotLinked)
        );
    }

    #[test]
    fn unsupported_program_is_not_stored() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let mut prog = linked_program();
        prog.transform_feedback_varyings.push("v".to_string());

        assert_eq!(
            cache.store(&ctx, &prog).unwrap(),
            StoreOutcome::Skipped(SkipReason::Unsupported(UnsupportedFeature::TransformFeedback(1)))
        );
    }

    #[test]
    fn disabled_cache_skips_everything() {
        let (_dir, cache) = make_cache();
        let cache = cache.with_enabled(false);
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let prog = linked_program();

        assert_eq!(
            cache.store(&ctx, &prog).unwrap(),
            StoreOutcome::Skipped(SkipReason::Disabled)
        );
        let mut fresh = unlinked_copy(&prog);
        assert_eq!(
            cache.lookup(&ctx, &mut fresh),
            LookupOutcome::Skipped(SkipReason::Disabled)
        );
    }

    #[test]
    fn corrupt_entry_is_read_failure_and_kept() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let mut prog = unlinked_copy(&linked_program());
        let key = CacheKey::for_program(&prog, KeyScheme::Checksum).unwrap();
        std::fs::write(cache.program_path(&key), b"garbage").unwrap();

        let outcome = cache.lookup(&ctx, &mut prog);
        assert_eq!(outcome.code(), crate::ResultCode::ReadError);
        assert!(cache.program_path(&key).exists());
    }

    #[test]
    fn shader_roundtrip_keeps_identity() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);

        let mut compiled = Shader::with_source(7, Stage::Fragment, FS);
        compiled.metadata.compile_status = true;
        compiled.metadata.num_samplers = 2;
        compiled.ir = Some(InstructionTree::default());
        assert_eq!(cache.store_shader(&ctx, &compiled).unwrap(), StoreOutcome::Stored);

        let mut fresh = Shader::with_source(8, Stage::Fragment, FS);
        assert_eq!(cache.lookup_shader(&ctx, &mut fresh), LookupOutcome::Hit);
        assert_eq!(fresh.name, 8);
        assert_eq!(fresh.source.as_deref(), Some(FS));
        assert_eq!(fresh.metadata, compiled.metadata);
        assert!(fresh.program.is_some());

        let kinds: Vec<_> = cache.entries().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntryKind::Shader]);
    }

    #[test]
    fn geometry_shader_is_not_stored() {
        let (_dir, cache) = make_cache();
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        let shader = Shader::with_source(1, Stage::Geometry, "void main(){ EmitVertex(); }");
        assert_eq!(
            cache.store_shader(&ctx, &shader).unwrap(),
            StoreOutcome::Skipped(SkipReason::Unsupported(UnsupportedFeature::GeometryStage))
        );
    }

    #[test]
    fn entries_and_purge() {
        let (_dir, cache) = make_cache();
        std::fs::write(cache.root().join("2222222.bin"), b"bb").unwrap();
        std::fs::write(cache.root().join("1111111.bin"), b"a").unwrap();
        std::fs::write(cache.root().join("3333333.shader"), b"ccc").unwrap();
        std::fs::write(cache.root().join("notes.txt"), b"ignored").unwrap();

        let entries = cache.entries().unwrap();
        let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["1111111", "2222222", "3333333"]);
        assert_eq!(entries[1].size, 2);
        assert_eq!(entries[2].kind, EntryKind::Shader);

        assert_eq!(cache.purge().unwrap(), 3);
        assert!(cache.entries().unwrap().is_empty());
        assert!(cache.root().join("notes.txt").exists());
    }

    #[test]
    fn entries_of_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ProgramCache::new(&dir.path().join("absent"));
        assert!(cache.entries().unwrap().is_empty());
    }

    #[test]
    fn digest_scheme_uses_hex_file_names() {
        let (_dir, cache) = make_cache();
        let cache = cache.with_key_scheme(KeyScheme::Digest);
        let driver = HeadlessDriver::new("Mesa", "llvmpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        cache.store(&ctx, &linked_program()).unwrap();

        let entries = cache.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key.len(), 64);
    }

    #[test]
    fn entry_serializes_for_reports() {
        let entry = CacheEntry {
            key: "1234567".to_string(),
            kind: EntryKind::Program,
            path: PathBuf::from("/cache/1234567.bin"),
            size: 42,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "program");
        assert_eq!(json["size"], 42);
        assert_eq!(json["key"], "1234567");
    }
}
