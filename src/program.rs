//! Shader program building.
//!
//! A [`ShaderProgram`] is a linked vertex + fragment pair together with the
//! declared type and resolved location of every attribute and uniform the
//! caller told the builder about. Types are fixed here, once, so that binding
//! later is a plain dispatch over [`UniformType`] / [`AttributeType`] and never
//! a guess based on the shape of a runtime value.
//!
//! ```ignore
//! let program = ProgramBuilder::new(VERTEX, FRAGMENT)
//!     .attribute("positions", AttributeType::Vec2)
//!     .uniform("color", UniformType::Vec4)
//!     .build(&mut ctx)?;
//! ```

use std::collections::HashMap;

use crate::{
    context::{GpuContext, ProgramId, ShaderId, ShaderStage, UniformLocation},
    error::ProgramError,
};

/// Declared type of a vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl AttributeType {
    pub fn components(&self) -> usize {
        match self {
            AttributeType::Float => 1,
            AttributeType::Vec2 => 2,
            AttributeType::Vec3 => 3,
            AttributeType::Vec4 => 4,
        }
    }
}

/// Declared type of a uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformType {
    Int,
    Float,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
}

/// Where a declared name ended up after linking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location<L> {
    Resolved(L),
    /// The GPU reported no location. `in_source` records whether the name is
    /// written in either stage's source: if it is, binding it is an error,
    /// otherwise it was optimised out (or never used) and binding is a no-op.
    Unresolved { in_source: bool },
}

impl<L: Copy> Location<L> {
    pub fn resolved(&self) -> Option<L> {
        match self {
            Location::Resolved(location) => Some(*location),
            Location::Unresolved { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeSlot {
    pub ty: AttributeType,
    pub location: Location<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSlot {
    pub ty: UniformType,
    pub location: Location<UniformLocation>,
}

/// A linked program and its attribute/uniform tables.
///
/// Immutable once built. Nodes share it through an `Arc`; delete it with
/// [`ShaderProgram::delete`] when the context is torn down.
#[derive(Debug, PartialEq)]
pub struct ShaderProgram {
    id: ProgramId,
    attributes: HashMap<String, AttributeSlot>,
    uniforms: HashMap<String, UniformSlot>,
}

impl ShaderProgram {
    /// Compiles both stages, links them and resolves every declared name.
    ///
    /// On any failure the intermediate objects are released and no program is
    /// returned; the diagnostic is logged and carried by the error.
    pub fn build<'a, C, U, A>(
        ctx: &mut C,
        vertex_source: &str,
        fragment_source: &str,
        uniforms: U,
        attributes: A,
    ) -> Result<Self, ProgramError>
    where
        C: GpuContext + ?Sized,
        U: IntoIterator<Item = (&'a str, UniformType)>,
        A: IntoIterator<Item = (&'a str, AttributeType)>,
    {
        let vertex = compile_stage(ctx, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_stage(ctx, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(e) => {
                ctx.delete_shader(vertex);
                return Err(e);
            }
        };
        let id = link(ctx, vertex, fragment)?;

        let in_source =
            |name: &str| mentions(vertex_source, name) || mentions(fragment_source, name);

        let attributes = attributes
            .into_iter()
            .map(|(name, ty)| {
                let location = match ctx.attrib_location(id, name) {
                    Some(location) => Location::Resolved(location),
                    None => {
                        log::debug!("attribute '{name}' has no location in program {id:?}");
                        Location::Unresolved {
                            in_source: in_source(name),
                        }
                    }
                };
                (name.to_string(), AttributeSlot { ty, location })
            })
            .collect();
        let uniforms = uniforms
            .into_iter()
            .map(|(name, ty)| {
                let location = match ctx.uniform_location(id, name) {
                    Some(location) => Location::Resolved(location),
                    None => {
                        log::debug!("uniform '{name}' has no location in program {id:?}");
                        Location::Unresolved {
                            in_source: in_source(name),
                        }
                    }
                };
                (name.to_string(), UniformSlot { ty, location })
            })
            .collect();

        Ok(Self {
            id,
            attributes,
            uniforms,
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSlot> {
        self.attributes.get(name)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformSlot> {
        self.uniforms.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeSlot)> {
        self.attributes.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &UniformSlot)> {
        self.uniforms.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// Releases the GPU program object. Takes `&self` so programs shared by
    /// nodes can be released without unwrapping their `Arc`; drawing with the
    /// program afterwards is an error.
    pub fn delete<C: GpuContext + ?Sized>(&self, ctx: &mut C) {
        ctx.delete_program(self.id);
    }
}

/// Collects declarations and sources, then builds a [`ShaderProgram`].
#[derive(Clone, Debug)]
pub struct ProgramBuilder {
    vertex: String,
    fragment: String,
    attributes: Vec<(String, AttributeType)>,
    uniforms: Vec<(String, UniformType)>,
}

impl ProgramBuilder {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            attributes: Vec::new(),
            uniforms: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.attributes.push((name.into(), ty));
        self
    }

    pub fn uniform(mut self, name: impl Into<String>, ty: UniformType) -> Self {
        self.uniforms.push((name.into(), ty));
        self
    }

    pub fn build<C: GpuContext + ?Sized>(&self, ctx: &mut C) -> Result<ShaderProgram, ProgramError> {
        ShaderProgram::build(
            ctx,
            &self.vertex,
            &self.fragment,
            self.uniforms.iter().map(|(name, ty)| (name.as_str(), *ty)),
            self.attributes.iter().map(|(name, ty)| (name.as_str(), *ty)),
        )
    }
}

fn compile_stage<C: GpuContext + ?Sized>(
    ctx: &mut C,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderId, ProgramError> {
    let shader = ctx.create_shader(stage).map_err(ProgramError::Unavailable)?;
    if ctx.compile_shader(shader, source) {
        return Ok(shader);
    }
    let log = ctx.shader_info_log(shader);
    ctx.delete_shader(shader);
    log::error!("Error compiling {stage} shader: {log}\n{source}");
    Err(ProgramError::Compile {
        stage,
        log,
        shader_source: source.to_string(),
    })
}

fn link<C: GpuContext + ?Sized>(
    ctx: &mut C,
    vertex: ShaderId,
    fragment: ShaderId,
) -> Result<ProgramId, ProgramError> {
    let release_stages = |ctx: &mut C, program: Option<ProgramId>| {
        for shader in [vertex, fragment] {
            if let Some(program) = program {
                ctx.detach_shader(program, shader);
            }
            ctx.delete_shader(shader);
        }
    };

    let program = match ctx.create_program() {
        Ok(program) => program,
        Err(e) => {
            release_stages(ctx, None);
            return Err(ProgramError::Unavailable(e));
        }
    };
    ctx.attach_shader(program, vertex);
    ctx.attach_shader(program, fragment);
    let linked = ctx.link_program(program);
    // Stage objects are not needed once linking has been attempted.
    release_stages(ctx, Some(program));

    if linked {
        return Ok(program);
    }
    let log = ctx.program_info_log(program);
    ctx.delete_program(program);
    log::error!("Error initializing shader program: {log}");
    Err(ProgramError::Link { log })
}

/// Whether `name` occurs in `source` as a whole identifier.
fn mentions(source: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    source.match_indices(name).any(|(start, _)| {
        let before = source[..start].chars().next_back();
        let after = source[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

#[cfg(test)]
mod tests {
    use super::mentions;

    #[test]
    fn identifier_mentions_respect_word_boundaries() {
        let src = "uniform vec4 color;\nvoid main() { fragColor = color_b; }";
        assert!(mentions(src, "color"));
        assert!(mentions(src, "fragColor"));
        assert!(!mentions(src, "Color"));
        assert!(!mentions(src, "color_"));
        assert!(!mentions(src, "frag"));
    }
}
