//! `shaderbin inspect` and `shaderbin verify`: single blob examination.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use shaderbin_cache::store::SHADER_EXT;
use shaderbin_codec::{
    Api, CodecContext, ConstantInitializers, DeserializeError, FlatIrCodec, HeadlessDriver,
    ProgramCodec, ShaderRecordCodec, ValidationHeader,
};
use shaderbin_program::{ShaderProgram, Stage};
use shaderbin_wire::ByteCursor;

use crate::{GlobalArgs, InspectArgs, ReportFormat, VerifyArgs};

/// Exit code of `verify` when the blob belongs to another build or device.
pub const EXIT_VERSION: i32 = 2;

/// Exit code of `verify` when the blob is truncated or corrupt.
pub const EXIT_READ: i32 = 3;

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    path: &'a Path,
    size: usize,
    header: ValidationHeader,
}

/// Runs the `shaderbin inspect` command.
pub fn inspect(args: &InspectArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let blob = std::fs::read(&args.blob)?;
    let header = ValidationHeader::read(&mut ByteCursor::new(&blob))?;
    let report = InspectReport {
        path: &args.blob,
        size: blob.len(),
        header,
    };

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&report)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(0)
}

fn render_text(report: &InspectReport<'_>) -> String {
    let fingerprint: Vec<String> = report
        .header
        .fingerprint
        .iter()
        .map(u32::to_string)
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "path:        {}", report.path.display());
    let _ = writeln!(out, "size:        {} bytes", report.size);
    let _ = writeln!(out, "fingerprint: {}", fingerprint.join(" "));
    let _ = writeln!(out, "magic:       {}", report.header.magic);
    let _ = writeln!(out, "vendor:      {}", report.header.vendor);
    let _ = writeln!(out, "renderer:    {}", report.header.renderer);
    out
}

/// What a blob loaded into.
#[derive(Debug, PartialEq, Eq)]
enum Loaded {
    Program { stages: usize, uniforms: usize },
    Shader { stage: Stage },
}

/// Runs the `shaderbin verify` command.
///
/// Returns 0 when the blob loads, [`EXIT_VERSION`] on a version-class
/// failure and [`EXIT_READ`] on a read-class failure.
pub fn verify(args: &VerifyArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let blob = std::fs::read(&args.blob)?;
    let api = if args.es { Api::Es } else { Api::Desktop };
    let driver = HeadlessDriver::new(args.vendor.as_str(), args.renderer.as_str()).with_api(api);
    let mut ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
    if let Some(magic) = &args.magic {
        ctx = ctx.with_magic(magic);
    }

    let standalone = args.blob.extension().and_then(|e| e.to_str()) == Some(SHADER_EXT);
    let result = load(&ctx, &blob, standalone);

    if !global.quiet {
        match &result {
            Ok(Loaded::Program { stages, uniforms }) => {
                println!("ok: program with {stages} stage(s), {uniforms} uniform(s)")
            }
            Ok(Loaded::Shader { stage }) => println!("ok: {} shader", stage.name()),
            Err(err) if err.is_version() => println!("version mismatch: {err}"),
            Err(err) => println!("read error: {err}"),
        }
    }
    Ok(exit_code(&result))
}

fn load(ctx: &CodecContext<'_>, blob: &[u8], standalone: bool) -> Result<Loaded, DeserializeError> {
    if standalone {
        let shader = ShaderRecordCodec::deserialize_standalone(ctx, blob)?;
        return Ok(Loaded::Shader {
            stage: shader.stage(),
        });
    }

    let mut program = ShaderProgram::new(1);
    ProgramCodec::deserialize(ctx, &mut program, blob)?;
    Ok(Loaded::Program {
        stages: program.linked_stage_count(),
        uniforms: program.uniform_storage.len(),
    })
}

fn exit_code(result: &Result<Loaded, DeserializeError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) if err.is_version() => EXIT_VERSION,
        Err(_) => EXIT_READ,
    }
}
