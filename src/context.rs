//! GPU context contract.
//!
//! The renderer never talks to a graphics API directly. Everything it needs
//! (shader compile/link, location lookup, buffer upload, typed uniform upload
//! and draw-call issuance) goes through [`GpuContext`]. Object handles are
//! plain ids so that scene nodes can hold programs without being generic over
//! the backend.
//!
//! Creating a context (canvas, window, GL loader) and reacting to context loss
//! is the caller's job. A backend that cannot satisfy a request reports it via
//! `Err`/`None`, never by panicking.

use std::fmt;

/// Handle to a shader stage object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Handle to a linked (or linking) program object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Handle to a vertex buffer object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Handle to a resolved uniform location of one program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Programmable pipeline stage of a shader object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Primitive assembly mode of a draw call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Primitive {
    /// Smallest vertex count that rasterizes anything with this mode.
    pub fn min_vertices(&self) -> u32 {
        match self {
            Primitive::Points => 1,
            Primitive::Lines | Primitive::LineStrip | Primitive::LineLoop => 2,
            Primitive::Triangles | Primitive::TriangleStrip | Primitive::TriangleFan => 3,
        }
    }
}

/// The operations the renderer needs from a graphics API.
///
/// Methods mirror the GL family closely: a stage is created, given source,
/// compiled and queried; a program gets stages attached and is linked.
/// Upload methods act on the currently used program, like `glUniform*`.
pub trait GpuContext {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, String>;

    /// Sets the source of `shader` and compiles it. Returns the compile status.
    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> bool;

    fn shader_info_log(&mut self, shader: ShaderId) -> String;

    fn delete_shader(&mut self, shader: ShaderId);

    fn create_program(&mut self) -> Result<ProgramId, String>;

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId);

    /// Links `program`. Returns the link status.
    fn link_program(&mut self, program: ProgramId) -> bool;

    fn program_info_log(&mut self, program: ProgramId) -> String;

    fn delete_program(&mut self, program: ProgramId);

    /// `None` when the linked program has no active attribute called `name`.
    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32>;

    /// `None` when the linked program has no active uniform called `name`.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn use_program(&mut self, program: Option<ProgramId>);

    /// Creates an array buffer, binds it and fills it with `data`.
    fn upload_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferId, String>;

    fn delete_buffer(&mut self, buffer: BufferId);

    /// Points `location` at the currently bound array buffer, tightly packed
    /// floats with `components` per vertex.
    fn vertex_attrib_pointer(&mut self, location: u32, components: i32);

    fn enable_vertex_attrib_array(&mut self, location: u32);

    fn disable_vertex_attrib_array(&mut self, location: u32);

    fn uniform_1_i32(&mut self, location: UniformLocation, value: i32);

    fn uniform_1_f32(&mut self, location: UniformLocation, value: f32);

    fn uniform_2_f32(&mut self, location: UniformLocation, value: [f32; 2]);

    fn uniform_3_f32(&mut self, location: UniformLocation, value: [f32; 3]);

    fn uniform_4_f32(&mut self, location: UniformLocation, value: [f32; 4]);

    /// Column-major 3×3 matrix upload.
    fn uniform_matrix_3_f32(&mut self, location: UniformLocation, value: [f32; 9]);

    /// Column-major 4×4 matrix upload.
    fn uniform_matrix_4_f32(&mut self, location: UniformLocation, value: [f32; 16]);

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32);

    fn draw_arrays_instanced(&mut self, primitive: Primitive, first: i32, count: i32, instances: i32);

    fn clear(&mut self, colour: [f32; 4]);
}

/// A borrowed context is a context, so a renderer can run on one it does not own.
impl<T: GpuContext + ?Sized> GpuContext for &mut T {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, String> {
        (**self).create_shader(stage)
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> bool {
        (**self).compile_shader(shader, source)
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> String {
        (**self).shader_info_log(shader)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        (**self).delete_shader(shader)
    }

    fn create_program(&mut self) -> Result<ProgramId, String> {
        (**self).create_program()
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        (**self).attach_shader(program, shader)
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        (**self).detach_shader(program, shader)
    }

    fn link_program(&mut self, program: ProgramId) -> bool {
        (**self).link_program(program)
    }

    fn program_info_log(&mut self, program: ProgramId) -> String {
        (**self).program_info_log(program)
    }

    fn delete_program(&mut self, program: ProgramId) {
        (**self).delete_program(program)
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        (**self).attrib_location(program, name)
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        (**self).uniform_location(program, name)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        (**self).use_program(program)
    }

    fn upload_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferId, String> {
        (**self).upload_vertex_buffer(data)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        (**self).delete_buffer(buffer)
    }

    fn vertex_attrib_pointer(&mut self, location: u32, components: i32) {
        (**self).vertex_attrib_pointer(location, components)
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        (**self).enable_vertex_attrib_array(location)
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        (**self).disable_vertex_attrib_array(location)
    }

    fn uniform_1_i32(&mut self, location: UniformLocation, value: i32) {
        (**self).uniform_1_i32(location, value)
    }

    fn uniform_1_f32(&mut self, location: UniformLocation, value: f32) {
        (**self).uniform_1_f32(location, value)
    }

    fn uniform_2_f32(&mut self, location: UniformLocation, value: [f32; 2]) {
        (**self).uniform_2_f32(location, value)
    }

    fn uniform_3_f32(&mut self, location: UniformLocation, value: [f32; 3]) {
        (**self).uniform_3_f32(location, value)
    }

    fn uniform_4_f32(&mut self, location: UniformLocation, value: [f32; 4]) {
        (**self).uniform_4_f32(location, value)
    }

    fn uniform_matrix_3_f32(&mut self, location: UniformLocation, value: [f32; 9]) {
        (**self).uniform_matrix_3_f32(location, value)
    }

    fn uniform_matrix_4_f32(&mut self, location: UniformLocation, value: [f32; 16]) {
        (**self).uniform_matrix_4_f32(location, value)
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        (**self).draw_arrays(primitive, first, count)
    }

    fn draw_arrays_instanced(&mut self, primitive: Primitive, first: i32, count: i32, instances: i32) {
        (**self).draw_arrays_instanced(primitive, first, count, instances)
    }

    fn clear(&mut self, colour: [f32; 4]) {
        (**self).clear(colour)
    }
}
