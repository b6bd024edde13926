//! Error and diagnostic types.
//!
//! Build-time failures are [`ProgramError`]s and abort exactly one program
//! build. Everything that can go wrong while rendering a frame is a warning:
//! it is logged, skipped and collected into the frame report, and traversal
//! carries on.

use std::fmt;

use thiserror::Error;

use crate::{
    context::ShaderStage,
    program::{AttributeType, UniformType},
};

/// Failure to produce a [`ShaderProgram`](crate::program::ShaderProgram).
#[derive(Debug, Clone, Error)]
pub enum ProgramError {
    /// A stage did not compile. Carries the compiler output and the source.
    #[error("error compiling {stage} shader: {log}")]
    Compile {
        stage: ShaderStage,
        log: String,
        shader_source: String,
    },
    /// Both stages compiled but the program did not link.
    #[error("error linking shader program: {log}")]
    Link { log: String },
    /// The context could not allocate a shader or program object.
    #[error("no program: {0}")]
    Unavailable(String),
}

/// A dynamically shaped value that does not fit any supported arity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("vertex tuples must have 1 to 4 components, got {0}")]
    UnsupportedArity(usize),
    #[error("vertex {index} has {found} components but the array has {expected}")]
    InconsistentArity {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("uniform values must have 1, 2, 3, 4, 9 or 16 components, got {0}")]
    UnsupportedUniformLength(usize),
}

/// Non-fatal problem with one attribute or uniform entry at bind time.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingWarning {
    /// The program was not built with a declaration for this attribute.
    UnknownAttribute(String),
    /// The program was not built with a declaration for this uniform.
    UnknownUniform(String),
    /// The name is written in the shader source but the GPU reported no location.
    UnresolvedLocation(String),
    AttributeShape {
        name: String,
        declared: AttributeType,
        components: usize,
    },
    UniformShape {
        name: String,
        declared: UniformType,
        found: &'static str,
    },
    /// The context refused to allocate a vertex buffer.
    Upload { name: String, reason: String },
}

impl fmt::Display for BindingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingWarning::UnknownAttribute(name) => {
                write!(f, "attribute '{name}' is not declared by the program")
            }
            BindingWarning::UnknownUniform(name) => {
                write!(f, "uniform '{name}' is not declared by the program")
            }
            BindingWarning::UnresolvedLocation(name) => {
                write!(f, "'{name}' appears in the shader source but has no location")
            }
            BindingWarning::AttributeShape {
                name,
                declared,
                components,
            } => write!(
                f,
                "attribute '{name}' is declared {declared:?} but has {components}-component vertices"
            ),
            BindingWarning::UniformShape {
                name,
                declared,
                found,
            } => write!(f, "uniform '{name}' is declared {declared:?} but got a {found}"),
            BindingWarning::Upload { name, reason } => {
                write!(f, "could not upload attribute '{name}': {reason}")
            }
        }
    }
}

/// Position of a node in the tree: child indices from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("root")?;
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// A diagnostic raised while rendering one node.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderWarning {
    /// The node has neither an own nor an inherited program and was not drawn.
    MissingProgram { path: NodePath },
    Binding {
        path: NodePath,
        warning: BindingWarning,
    },
    /// A vertex or instance count is too large for a draw call; the node was not drawn.
    DrawRange {
        path: NodePath,
        parameter: &'static str,
        value: u32,
    },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderWarning::MissingProgram { path } => {
                write!(f, "{path}: no shader program to draw with, skipping draw")
            }
            RenderWarning::Binding { path, warning } => write!(f, "{path}: {warning}"),
            RenderWarning::DrawRange {
                path,
                parameter,
                value,
            } => write!(f, "{path}: draw {parameter} {value} exceeds {}, skipping draw", i32::MAX),
        }
    }
}
