//! A flat encoding of [`InstructionTree`]s.
//!
//! Layout: a presence flag, then the declaration count, each declaration
//! (name, type, mode, optional initializer) and the opaque body as a
//! length-prefixed byte string.

use shaderbin_program::{BaseType, GlslType, InstructionTree, Shader, VariableDecl, VariableMode};
use shaderbin_wire::{ByteCursor, ByteSink, WireError};

use crate::collab::{IrCodec, IrError};

/// Encoding version reported in the blob fingerprint.
pub const FLAT_IR_VERSION: u32 = 1;

/// [`IrCodec`] that writes declarations field by field and the body verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatIrCodec;

impl IrCodec for FlatIrCodec {
    fn format_version(&self) -> u32 {
        FLAT_IR_VERSION
    }

    fn write_tree(&self, shader: &Shader, sink: &mut ByteSink) -> Result<(), IrError> {
        let Some(tree) = &shader.ir else {
            sink.write_bool(false);
            return Ok(());
        };
        sink.write_bool(true);

        sink.write_u32(len_u32(tree.variables.len())?);
        for var in &tree.variables {
            sink.write_string(Some(var.name.as_str()))?;
            write_type(&var.ty, sink);
            sink.write_u32(var.mode.tag());
            match &var.initializer {
                Some(values) => {
                    sink.write_bool(true);
                    sink.write_u32(len_u32(values.len())?);
                    for &value in values {
                        sink.write_u32(value);
                    }
                }
                None => sink.write_bool(false),
            }
        }

        sink.write_u32(len_u32(tree.body.len())?);
        sink.write_bytes(&tree.body);
        Ok(())
    }

    fn read_tree(&self, shader: &mut Shader, cursor: &mut ByteCursor<'_>) -> Result<(), IrError> {
        if !cursor.read_bool()? {
            shader.ir = None;
            return Ok(());
        }

        let count = cursor.read_u32()?;
        let mut variables = Vec::new();
        for _ in 0..count {
            let name = cursor
                .read_string()?
                .ok_or_else(|| IrError::Malformed("declaration without a name".to_string()))?;
            let ty = read_type(cursor)?;
            let mode_tag = cursor.read_u32()?;
            let mode = VariableMode::from_tag(mode_tag)
                .ok_or_else(|| IrError::Malformed(format!("unknown variable mode {mode_tag}")))?;

            let initializer = if cursor.read_bool()? {
                let len = cursor.read_u32()?;
                let mut values = Vec::new();
                for _ in 0..len {
                    values.push(cursor.read_u32()?);
                }
                Some(values)
            } else {
                None
            };

            variables.push(VariableDecl {
                name,
                ty,
                mode,
                initializer,
            });
        }

        let body_len = cursor.read_u32()? as usize;
        let body = cursor.read_bytes(body_len)?.to_vec();

        shader.ir = Some(InstructionTree { variables, body });
        Ok(())
    }
}

fn len_u32(len: usize) -> Result<u32, WireError> {
    u32::try_from(len).map_err(|_| WireError::TooLong { len })
}

fn write_type(ty: &GlslType, sink: &mut ByteSink) {
    sink.write_u32(ty.base.tag());
    sink.write_u8(ty.vector_elements);
    sink.write_u8(ty.matrix_columns);
    match ty.array_len {
        Some(len) => {
            sink.write_bool(true);
            sink.write_u32(len);
        }
        None => sink.write_bool(false),
    }
}

fn read_type(cursor: &mut ByteCursor<'_>) -> Result<GlslType, IrError> {
    let base_tag = cursor.read_u32()?;
    let base = BaseType::from_tag(base_tag)
        .ok_or_else(|| IrError::Malformed(format!("unknown base type {base_tag}")))?;
    let vector_elements = cursor.read_u8()?;
    let matrix_columns = cursor.read_u8()?;
    let array_len = if cursor.read_bool()? {
        Some(cursor.read_u32()?)
    } else {
        None
    };
    Ok(GlslType {
        base,
        vector_elements,
        matrix_columns,
        array_len,
    })
}
