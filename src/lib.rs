//! flow-gl
//!
//! A small declarative renderer: describe a frame as a tree of nodes, each
//! carrying a shader program, per-vertex attributes, uniforms, draw
//! parameters and children, and hand the tree to a [`Renderer`] once per
//! frame. Children inherit their ancestors' program, attributes and uniforms
//! unless they override them by name.
//!
//! High-level modules
//! - `context`: the GPU context contract the renderer talks to
//! - `backend`: `glow`-based OpenGL / WebGL2 implementation of that contract
//! - `program`: compiling and linking shader programs with typed location tables
//! - `binder`: typed upload of attributes and uniforms for a program
//! - `data_structures`: the scene graph and the values nodes carry
//! - `render`: tree traversal, inheritance and draw-call issuance
//! - `flow`: per-frame driving with state threaded between frames
//! - `error`: build errors and render-time warnings
//! - `logging`: logger setup for native and web targets
//!

pub mod backend;
pub mod binder;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod logging;
pub mod program;
pub mod render;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use context::{GpuContext, Primitive};
pub use data_structures::scene_graph::{NodeBuilder, SceneNode, node};
pub use data_structures::values::{UniformValue, VertexArray};
pub use error::{BindingWarning, ProgramError, RenderWarning};
pub use program::{AttributeType, ProgramBuilder, ShaderProgram, UniformType};
pub use render::{FrameReport, Renderer, RendererConfig, create_renderer};
