use shaderbin_cache::{
    CacheKey, KeyScheme, LookupOutcome, ProgramCache, ResultCode, SkipReason, StoreOutcome,
};
use shaderbin_codec::{CodecContext, ConstantInitializers, FlatIrCodec, HeadlessDriver};
use shaderbin_program::{InstructionTree, Shader, ShaderProgram, Stage};

const SOURCE: &str = "void main(){}";

/// A program as the linker leaves it: two attached shaders with the same
/// trivial source, two linked stages, no uniforms and no bindings.
fn linked_program() -> ShaderProgram {
    let mut prog = ShaderProgram::new(1);
    prog.attach(Shader::with_source(2, Stage::Vertex, SOURCE));
    prog.attach(Shader::with_source(3, Stage::Fragment, SOURCE));
    for (name, stage) in [(4, Stage::Vertex), (5, Stage::Fragment)] {
        let mut shader = Shader::new(name, stage);
        shader.metadata.compile_status = true;
        shader.ir = Some(InstructionTree::default());
        prog.linked_shaders[stage.index()] = Some(shader);
    }
    prog.link_status = true;
    prog.linked = true;
    prog
}

/// The same program as a fresh process sees it before linking.
fn fresh_program() -> ShaderProgram {
    let mut prog = ShaderProgram::new(1);
    prog.attach(Shader::with_source(2, Stage::Vertex, SOURCE));
    prog.attach(Shader::with_source(3, Stage::Fragment, SOURCE));
    prog
}

#[test]
fn stored_program_is_restored_by_a_fresh_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProgramCache::open(dir.path()).unwrap();

    let writer = HeadlessDriver::new("Mesa", "llvmpipe");
    let ctx = CodecContext::new(&writer, &FlatIrCodec, &ConstantInitializers);
    assert_eq!(cache.store(&ctx, &linked_program()).unwrap(), StoreOutcome::Stored);

    let key = CacheKey::for_program(&fresh_program(), KeyScheme::Checksum).unwrap();
    assert!(dir.path().join(format!("{key}.bin")).is_file());

    let reader = HeadlessDriver::new("Mesa", "llvmpipe");
    let ctx = CodecContext::new(&reader, &FlatIrCodec, &ConstantInitializers);
    let mut prog = fresh_program();
    let outcome = cache.lookup(&ctx, &mut prog);

    assert_eq!(outcome, LookupOutcome::Hit);
    assert_eq!(outcome.code(), ResultCode::Success);
    assert_eq!(prog.linked_stage_count(), 2);
    assert_eq!(prog.metadata.num_user_uniform_storage, 0);
    assert!(prog.link_status);
    assert!(prog.linked);
}

#[test]
fn vendor_change_falls_back_to_compile() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProgramCache::open(dir.path()).unwrap();

    let writer = HeadlessDriver::new("Mesa", "llvmpipe");
    let ctx = CodecContext::new(&writer, &FlatIrCodec, &ConstantInitializers);
    cache.store(&ctx, &linked_program()).unwrap();

    let reader = HeadlessDriver::new("Acme Graphics", "llvmpipe");
    let ctx = CodecContext::new(&reader, &FlatIrCodec, &ConstantInitializers);
    let mut prog = fresh_program();
    let outcome = cache.lookup(&ctx, &mut prog);

    assert!(matches!(&outcome, LookupOutcome::LoadFailed(err) if err.is_version()));
    assert_eq!(outcome.code(), ResultCode::VersionMismatch);
    assert!(!outcome.is_hit());
    assert!(!prog.linked);
    assert_eq!(prog.linked_stage_count(), 0);
    assert_eq!(prog.shaders.len(), 2);

    // The foreign entry is neither repaired nor replaced.
    assert_eq!(cache.entries().unwrap().len(), 1);
    assert_eq!(
        cache.store(&ctx, &linked_program()).unwrap(),
        StoreOutcome::AlreadyCached
    );
}

#[test]
fn new_build_magic_is_version_class() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProgramCache::open(dir.path()).unwrap();
    let driver = HeadlessDriver::new("Mesa", "llvmpipe");

    let old = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers)
        .with_magic("shaderbin-0.0.0-old");
    cache.store(&old, &linked_program()).unwrap();

    let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
    let mut prog = fresh_program();
    assert_eq!(cache.lookup(&ctx, &mut prog).code(), ResultCode::VersionMismatch);
}

#[test]
fn shaders_without_source_never_touch_disk() {
    let dir = tempfile::tempdir().unwrap();
    let cache = ProgramCache::open(dir.path()).unwrap();
    let driver = HeadlessDriver::new("Mesa", "llvmpipe");
    let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);

    let mut prog = linked_program();
    prog.shaders[0].source = None;
    assert_eq!(
        cache.store(&ctx, &prog).unwrap(),
        StoreOutcome::Skipped(SkipReason::NoKey)
    );

    let mut fresh = fresh_program();
    fresh.shaders[0].source = None;
    assert_eq!(
        cache.lookup(&ctx, &mut fresh),
        LookupOutcome::Skipped(SkipReason::NoKey)
    );
    assert!(cache.entries().unwrap().is_empty());
}
