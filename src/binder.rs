//! Typed attribute and uniform binding.
//!
//! Both entry points always rebind everything they are given; there is no
//! dirty tracking and nothing is kept between calls. Each entry is handled on
//! its own: an entry that cannot be bound is logged, reported and skipped, and
//! the remaining entries are still bound.

use crate::{
    context::{BufferId, GpuContext},
    data_structures::values::{UniformValue, VertexArray},
    error::BindingWarning,
    program::{Location, ShaderProgram, UniformType},
};

/// What a call to [`bind_attributes`] left behind.
#[derive(Debug, Default, PartialEq)]
pub struct AttributeBindings {
    /// Buffers created for this call. The caller owns them and releases them
    /// once the draw that uses them has been issued.
    pub buffers: Vec<BufferId>,
    /// Attribute locations enabled by this call.
    pub locations: Vec<u32>,
    /// Vertex count of the shortest array that was actually bound.
    pub vertex_count: Option<u32>,
    pub warnings: Vec<BindingWarning>,
}

/// Uploads every array to a fresh vertex buffer and points its attribute at it.
///
/// The component count comes from the array's own arity and must agree with
/// the type the program declared for that name.
pub fn bind_attributes<'a, C, I>(ctx: &mut C, program: &ShaderProgram, attributes: I) -> AttributeBindings
where
    C: GpuContext + ?Sized,
    I: IntoIterator<Item = (&'a str, &'a VertexArray)>,
{
    let mut bindings = AttributeBindings::default();
    for (name, values) in attributes {
        let Some(slot) = program.attribute(name) else {
            warn(&mut bindings.warnings, BindingWarning::UnknownAttribute(name.to_string()));
            continue;
        };
        let location = match slot.location {
            Location::Resolved(location) => location,
            Location::Unresolved { in_source } => {
                unresolved(&mut bindings.warnings, name, in_source);
                continue;
            }
        };
        let components = values.components();
        if components != slot.ty.components() {
            warn(
                &mut bindings.warnings,
                BindingWarning::AttributeShape {
                    name: name.to_string(),
                    declared: slot.ty,
                    components,
                },
            );
            continue;
        }

        let buffer = match ctx.upload_vertex_buffer(values.as_flat()) {
            Ok(buffer) => buffer,
            Err(reason) => {
                warn(
                    &mut bindings.warnings,
                    BindingWarning::Upload {
                        name: name.to_string(),
                        reason,
                    },
                );
                continue;
            }
        };
        ctx.vertex_attrib_pointer(location, components as i32);
        ctx.enable_vertex_attrib_array(location);
        bindings.buffers.push(buffer);
        bindings.locations.push(location);

        let len = values.len() as u32;
        bindings.vertex_count = Some(bindings.vertex_count.map_or(len, |count| count.min(len)));
    }
    bindings
}

/// Uploads every uniform through the path selected by its declared type.
///
/// Booleans go up as the integers 0 and 1. Matrices are column-major.
pub fn bind_uniforms<'a, C, I>(ctx: &mut C, program: &ShaderProgram, uniforms: I) -> Vec<BindingWarning>
where
    C: GpuContext + ?Sized,
    I: IntoIterator<Item = (&'a str, &'a UniformValue)>,
{
    let mut warnings = Vec::new();
    for (name, value) in uniforms {
        let Some(slot) = program.uniform(name) else {
            warn(&mut warnings, BindingWarning::UnknownUniform(name.to_string()));
            continue;
        };
        let location = match slot.location {
            Location::Resolved(location) => location,
            Location::Unresolved { in_source } => {
                unresolved(&mut warnings, name, in_source);
                continue;
            }
        };
        match (slot.ty, value) {
            (UniformType::Int, UniformValue::Int(v)) => ctx.uniform_1_i32(location, *v),
            (UniformType::Float, UniformValue::Float(v)) => ctx.uniform_1_f32(location, *v),
            (UniformType::Bool, UniformValue::Bool(v)) => ctx.uniform_1_i32(location, i32::from(*v)),
            (UniformType::Vec2, UniformValue::Vec2(v)) => ctx.uniform_2_f32(location, *v),
            (UniformType::Vec3, UniformValue::Vec3(v)) => ctx.uniform_3_f32(location, *v),
            (UniformType::Vec4, UniformValue::Vec4(v)) => ctx.uniform_4_f32(location, *v),
            (UniformType::Mat3, UniformValue::Mat3(m)) => ctx.uniform_matrix_3_f32(location, *m),
            (UniformType::Mat4, UniformValue::Mat4(m)) => ctx.uniform_matrix_4_f32(location, *m),
            (declared, value) => warn(
                &mut warnings,
                BindingWarning::UniformShape {
                    name: name.to_string(),
                    declared,
                    found: value.kind(),
                },
            ),
        }
    }
    warnings
}

fn warn(warnings: &mut Vec<BindingWarning>, warning: BindingWarning) {
    log::warn!("{warning}");
    warnings.push(warning);
}

fn unresolved(warnings: &mut Vec<BindingWarning>, name: &str, in_source: bool) {
    if in_source {
        warn(warnings, BindingWarning::UnresolvedLocation(name.to_string()));
    } else {
        log::trace!("'{name}' is not active in the program, nothing to bind");
    }
}
