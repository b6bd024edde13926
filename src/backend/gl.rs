//! OpenGL / WebGL2 backend on top of `glow`.
//!
//! `glow` object handles differ between native and web builds, so this
//! context keeps its own id tables and hands out the plain ids of
//! [`crate::context`].

use std::collections::HashMap;

use glow::HasContext;

use crate::context::{
    BufferId, GpuContext, Primitive, ProgramId, ShaderId, ShaderStage, UniformLocation,
};

/// A [`GpuContext`] backed by a `glow::Context`.
///
/// Creating the `glow::Context` (from a GL loader or from a
/// `WebGl2RenderingContext`) is left to the caller.
pub struct GlowContext {
    gl: glow::Context,
    vertex_array: Option<glow::VertexArray>,
    shaders: HashMap<u32, glow::Shader>,
    programs: HashMap<u32, glow::Program>,
    buffers: HashMap<u32, glow::Buffer>,
    uniforms: HashMap<u32, (ProgramId, glow::UniformLocation)>,
    next_id: u32,
}

impl GlowContext {
    /// Wraps `gl` and binds a vertex array object, which core profiles
    /// require before any attribute can be configured.
    pub fn new(gl: glow::Context) -> Self {
        // SAFETY: plain object creation and binding on a live context.
        let vertex_array = unsafe {
            match gl.create_vertex_array() {
                Ok(vao) => {
                    gl.bind_vertex_array(Some(vao));
                    Some(vao)
                }
                Err(e) => {
                    log::warn!("could not create a vertex array object: {e}");
                    None
                }
            }
        };
        Self {
            gl,
            vertex_array,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            uniforms: HashMap::new(),
            next_id: 1,
        }
    }

    /// The wrapped context, for state this crate does not manage (viewport,
    /// depth and blend state).
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn shader(&self, shader: ShaderId) -> Option<glow::Shader> {
        let found = self.shaders.get(&shader.0).copied();
        if found.is_none() {
            log::warn!("unknown shader {shader:?}");
        }
        found
    }

    fn program(&self, program: ProgramId) -> Option<glow::Program> {
        let found = self.programs.get(&program.0).copied();
        if found.is_none() {
            log::warn!("unknown program {program:?}");
        }
        found
    }

    fn uniform(&self, location: UniformLocation) -> Option<&glow::UniformLocation> {
        self.uniforms.get(&location.0).map(|(_, location)| location)
    }
}

impl Drop for GlowContext {
    fn drop(&mut self) {
        // SAFETY: every handle below was created on `self.gl` and is dropped once.
        unsafe {
            for (_, buffer) in self.buffers.drain() {
                self.gl.delete_buffer(buffer);
            }
            for (_, program) in self.programs.drain() {
                self.gl.delete_program(program);
            }
            for (_, shader) in self.shaders.drain() {
                self.gl.delete_shader(shader);
            }
            if let Some(vao) = self.vertex_array.take() {
                self.gl.delete_vertex_array(vao);
            }
        }
    }
}

fn stage_to_gl(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn primitive_to_gl(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Points => glow::POINTS,
        Primitive::Lines => glow::LINES,
        Primitive::LineStrip => glow::LINE_STRIP,
        Primitive::LineLoop => glow::LINE_LOOP,
        Primitive::Triangles => glow::TRIANGLES,
        Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
        Primitive::TriangleFan => glow::TRIANGLE_FAN,
    }
}

// SAFETY (all `unsafe` blocks below): every call goes to the live context
// owned by `self`, with handles looked up from the tables above, so no handle
// from another context or a deleted object reaches GL.
impl GpuContext for GlowContext {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, String> {
        let shader = unsafe { self.gl.create_shader(stage_to_gl(stage)) }?;
        let id = self.next();
        self.shaders.insert(id, shader);
        Ok(ShaderId(id))
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> bool {
        let Some(shader) = self.shader(shader) else {
            return false;
        };
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            self.gl.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> String {
        self.shader(shader)
            .map(|shader| unsafe { self.gl.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if let Some(shader) = self.shaders.remove(&shader.0) {
            unsafe { self.gl.delete_shader(shader) };
        }
    }

    fn create_program(&mut self) -> Result<ProgramId, String> {
        let program = unsafe { self.gl.create_program() }?;
        let id = self.next();
        self.programs.insert(id, program);
        Ok(ProgramId(id))
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let (Some(program), Some(shader)) = (self.program(program), self.shader(shader)) {
            unsafe { self.gl.attach_shader(program, shader) };
        }
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        if let (Some(program), Some(shader)) = (self.program(program), self.shader(shader)) {
            unsafe { self.gl.detach_shader(program, shader) };
        }
    }

    fn link_program(&mut self, program: ProgramId) -> bool {
        let Some(program) = self.program(program) else {
            return false;
        };
        unsafe {
            self.gl.link_program(program);
            self.gl.get_program_link_status(program)
        }
    }

    fn program_info_log(&mut self, program: ProgramId) -> String {
        self.program(program)
            .map(|program| unsafe { self.gl.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.uniforms.retain(|_, (owner, _)| *owner != program);
        if let Some(program) = self.programs.remove(&program.0) {
            unsafe { self.gl.delete_program(program) };
        }
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        let program = self.program(program)?;
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let owner = program;
        let program = self.program(program)?;
        let location = unsafe { self.gl.get_uniform_location(program, name) }?;
        let id = self.next();
        self.uniforms.insert(id, (owner, location));
        Some(UniformLocation(id))
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        let program = program.and_then(|program| self.program(program));
        unsafe { self.gl.use_program(program) };
    }

    fn upload_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferId, String> {
        let buffer = unsafe {
            let buffer = self.gl.create_buffer()?;
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
            buffer
        };
        let id = self.next();
        self.buffers.insert(id, buffer);
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(buffer) = self.buffers.remove(&buffer.0) {
            unsafe { self.gl.delete_buffer(buffer) };
        }
    }

    fn vertex_attrib_pointer(&mut self, location: u32, components: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, 0, 0)
        };
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) };
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(location) };
    }

    fn uniform_1_i32(&mut self, location: UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(self.uniform(location), value) };
    }

    fn uniform_1_f32(&mut self, location: UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(self.uniform(location), value) };
    }

    fn uniform_2_f32(&mut self, location: UniformLocation, value: [f32; 2]) {
        unsafe { self.gl.uniform_2_f32_slice(self.uniform(location), &value) };
    }

    fn uniform_3_f32(&mut self, location: UniformLocation, value: [f32; 3]) {
        unsafe { self.gl.uniform_3_f32_slice(self.uniform(location), &value) };
    }

    fn uniform_4_f32(&mut self, location: UniformLocation, value: [f32; 4]) {
        unsafe { self.gl.uniform_4_f32_slice(self.uniform(location), &value) };
    }

    fn uniform_matrix_3_f32(&mut self, location: UniformLocation, value: [f32; 9]) {
        unsafe {
            self.gl
                .uniform_matrix_3_f32_slice(self.uniform(location), false, &value)
        };
    }

    fn uniform_matrix_4_f32(&mut self, location: UniformLocation, value: [f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(self.uniform(location), false, &value)
        };
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(primitive_to_gl(primitive), first, count) };
    }

    fn draw_arrays_instanced(&mut self, primitive: Primitive, first: i32, count: i32, instances: i32) {
        unsafe {
            self.gl
                .draw_arrays_instanced(primitive_to_gl(primitive), first, count, instances)
        };
    }

    fn clear(&mut self, colour: [f32; 4]) {
        let [r, g, b, a] = colour;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }
}
