//! [`GpuContext`](crate::context::GpuContext) implementations.
//!
//! - `gl` drives desktop OpenGL (3.3 core / ES 3.0) and WebGL2 through `glow`

#[cfg(feature = "glow")]
pub mod gl;

#[cfg(feature = "glow")]
pub use gl::GlowContext;
