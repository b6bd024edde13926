use std::collections::{HashMap, HashSet};

use flow_gl::{
    UniformValue,
    context::{
        BufferId, GpuContext, Primitive, ProgramId, ShaderId, ShaderStage, UniformLocation,
    },
};

pub(crate) const TRIANGLE_VERT: &str = r#"#version 300 es
in vec2 positions;
void main() {
    gl_Position = vec4(positions, 0, 1);
}
"#;

pub(crate) const RED_FRAG: &str = r#"#version 300 es
precision highp float;
out vec4 fragColor;
void main() {
    fragColor = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

pub(crate) const TRANSFORM_VERT: &str = r#"#version 300 es
in vec2 positions;
uniform mat4 transform;
void main() {
    gl_Position = transform * vec4(positions, 0, 1);
}
"#;

pub(crate) const COLOR_FRAG: &str = r#"#version 300 es
precision highp float;
uniform vec4 color;
out vec4 fragColor;
void main() {
    fragColor = color;
}
"#;

pub(crate) const SHADED_VERT: &str = r#"#version 300 es
in float weight;
in vec2 positions;
in vec3 normal;
in vec4 tint;
out vec4 v_tint;
void main() {
    v_tint = vec4(normal, 1.0) * tint * weight;
    gl_Position = vec4(positions, 0, 1);
}
"#;

pub(crate) const SHADED_FRAG: &str = r#"#version 300 es
precision highp float;
in vec4 v_tint;
out vec4 fragColor;
void main() {
    fragColor = v_tint;
}
"#;

/// A draw call as seen by the GPU: the program in use and every value its
/// attributes and uniforms held at that moment.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawCall {
    pub program: ProgramId,
    pub primitive: Primitive,
    pub first: i32,
    pub count: i32,
    pub instances: Option<i32>,
    pub uniforms: HashMap<String, UniformValue>,
    /// Components per vertex and flattened data for each enabled attribute.
    pub attributes: HashMap<String, (i32, Vec<f32>)>,
}

impl DrawCall {
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }
}

#[derive(Debug)]
struct FakeShader {
    stage: ShaderStage,
    compiled: bool,
    log: String,
    /// (type, name) of `in` declarations that are used past their declaration.
    inputs: Vec<(String, String)>,
    /// (type, name) of every `in` declaration, used or not.
    declared_inputs: Vec<(String, String)>,
    outputs: Vec<(String, String)>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    attributes: HashMap<String, u32>,
    uniforms: HashSet<String>,
}

/// Software stand-in for a GL context.
///
/// Compiling scans for `in`/`out`/`uniform` declarations. A source without
/// `void main`, with unbalanced brackets or with `#error` fails to compile.
/// Linking fails when a fragment input has no matching vertex output. Like a
/// real driver, declared names that are never used become inactive and get
/// no location.
#[derive(Debug, Default)]
pub(crate) struct RecordingContext {
    next_id: u32,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    uniform_names: HashMap<u32, (u32, String)>,
    buffers: HashMap<u32, Vec<f32>>,
    bound_buffer: Option<u32>,
    pointers: HashMap<u32, (u32, i32)>,
    enabled: HashSet<u32>,
    current_program: Option<u32>,
    uniform_values: HashMap<(u32, String), UniformValue>,
    pub draws: Vec<DrawCall>,
    pub deleted_shaders: Vec<ShaderId>,
    pub deleted_programs: Vec<ProgramId>,
    pub deleted_buffers: Vec<BufferId>,
    pub clears: Vec<[f32; 4]>,
    pub refuse_buffers: bool,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn enabled_arrays(&self) -> usize {
        self.enabled.len()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program.map(ProgramId)
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some((program, name)) = self.uniform_names.get(&location.0).cloned() else {
            panic!("upload to unknown uniform location {location:?}");
        };
        assert_eq!(
            self.current_program,
            Some(program),
            "uniform '{name}' uploaded while another program is in use"
        );
        self.uniform_values.insert((program, name), value);
    }

    fn record_draw(&mut self, primitive: Primitive, first: i32, count: i32, instances: Option<i32>) {
        let Some(program_id) = self.current_program else {
            panic!("draw call issued without a program in use");
        };
        let program = &self.programs[&program_id];
        let uniforms = program
            .uniforms
            .iter()
            .filter_map(|name| {
                self.uniform_values
                    .get(&(program_id, name.clone()))
                    .map(|value| (name.clone(), *value))
            })
            .collect();
        let attributes = program
            .attributes
            .iter()
            .filter(|(_, location)| self.enabled.contains(*location))
            .filter_map(|(name, location)| {
                let (buffer, components) = self.pointers.get(location)?;
                let data = self.buffers.get(buffer)?.clone();
                Some((name.clone(), (*components, data)))
            })
            .collect();
        self.draws.push(DrawCall {
            program: ProgramId(program_id),
            primitive,
            first,
            count,
            instances,
            uniforms,
            attributes,
        });
    }
}

fn balanced(source: &str) -> bool {
    let mut stack = Vec::new();
    for c in source.chars() {
        match c {
            '(' | '{' | '[' => stack.push(c),
            ')' => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            '}' => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            _ => (),
        }
    }
    stack.is_empty()
}

fn occurrences(source: &str, name: &str) -> usize {
    source
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| *word == name)
        .count()
}

/// (qualifier, type, name) for every top-level `in`/`out`/`uniform` declaration.
fn declarations(source: &str) -> Vec<(String, String, String)> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim().strip_suffix(';')?;
            let words: Vec<&str> = line.split_whitespace().collect();
            let qualifier = *words.first()?;
            if !matches!(qualifier, "in" | "out" | "uniform") || words.len() < 3 {
                return None;
            }
            let name = words[words.len() - 1];
            let ty = words[words.len() - 2];
            Some((qualifier.to_string(), ty.to_string(), name.to_string()))
        })
        .collect()
}

impl GpuContext for RecordingContext {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, String> {
        let id = self.next();
        self.shaders.insert(
            id,
            FakeShader {
                stage,
                compiled: false,
                log: String::new(),
                inputs: vec![],
                declared_inputs: vec![],
                outputs: vec![],
                uniforms: vec![],
            },
        );
        Ok(ShaderId(id))
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> bool {
        let shader = self.shaders.get_mut(&shader.0).expect("unknown shader");
        if !source.contains("void main") || !balanced(source) || source.contains("#error") {
            shader.compiled = false;
            shader.log = "ERROR: 0:1: syntax error".to_string();
            return false;
        }
        for (qualifier, ty, name) in declarations(source) {
            let used = occurrences(source, &name) > 1;
            match qualifier.as_str() {
                "in" => {
                    shader.declared_inputs.push((ty.clone(), name.clone()));
                    if used {
                        shader.inputs.push((ty, name));
                    }
                }
                "out" => shader.outputs.push((ty, name)),
                _ => {
                    if used {
                        shader.uniforms.push(name);
                    }
                }
            }
        }
        shader.compiled = true;
        true
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> String {
        self.shaders
            .get(&shader.0)
            .map(|shader| shader.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader.0);
        self.deleted_shaders.push(shader);
    }

    fn create_program(&mut self) -> Result<ProgramId, String> {
        let id = self.next();
        self.programs.insert(id, FakeProgram::default());
        Ok(ProgramId(id))
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        let program = self.programs.get_mut(&program.0).expect("unknown program");
        program.attached.push(shader.0);
    }

    fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        let program = self.programs.get_mut(&program.0).expect("unknown program");
        program.attached.retain(|id| *id != shader.0);
    }

    fn link_program(&mut self, program: ProgramId) -> bool {
        let attached: Vec<&FakeShader> = self.programs[&program.0]
            .attached
            .iter()
            .filter_map(|id| self.shaders.get(id))
            .filter(|shader| shader.compiled)
            .collect();
        let vertex = attached.iter().find(|s| s.stage == ShaderStage::Vertex);
        let fragment = attached.iter().find(|s| s.stage == ShaderStage::Fragment);
        let result = match (vertex, fragment) {
            (Some(vertex), Some(fragment)) => {
                let missing = fragment
                    .declared_inputs
                    .iter()
                    .find(|input| !vertex.outputs.contains(input));
                match missing {
                    Some((_, name)) => Err(format!(
                        "ERROR: Linking failed: varying '{name}' is not written by the vertex shader"
                    )),
                    None => {
                        let attributes: HashMap<String, u32> = vertex
                            .inputs
                            .iter()
                            .enumerate()
                            .map(|(location, (_, name))| (name.clone(), location as u32))
                            .collect();
                        let uniforms: HashSet<String> = vertex
                            .uniforms
                            .iter()
                            .chain(fragment.uniforms.iter())
                            .cloned()
                            .collect();
                        Ok((attributes, uniforms))
                    }
                }
            }
            _ => Err("ERROR: Linking failed: missing shader stage".to_string()),
        };

        let program = self.programs.get_mut(&program.0).expect("unknown program");
        match result {
            Ok((attributes, uniforms)) => {
                program.attributes = attributes;
                program.uniforms = uniforms;
                program.linked = true;
            }
            Err(log) => {
                program.linked = false;
                program.log = log;
            }
        }
        program.linked
    }

    fn program_info_log(&mut self, program: ProgramId) -> String {
        self.programs
            .get(&program.0)
            .map(|program| program.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program.0);
        self.deleted_programs.push(program);
    }

    fn attrib_location(&mut self, program: ProgramId, name: &str) -> Option<u32> {
        let program = self.programs.get(&program.0)?;
        program.attributes.get(name).copied()
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if !self.programs.get(&program.0)?.uniforms.contains(name) {
            return None;
        }
        let id = self.next();
        self.uniform_names.insert(id, (program.0, name.to_string()));
        Some(UniformLocation(id))
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        if let Some(program) = program {
            assert!(
                self.programs.get(&program.0).is_some_and(|p| p.linked),
                "using a program that is not linked"
            );
        }
        self.current_program = program.map(|program| program.0);
    }

    fn upload_vertex_buffer(&mut self, data: &[f32]) -> Result<BufferId, String> {
        if self.refuse_buffers {
            return Err("out of memory".to_string());
        }
        let id = self.next();
        self.buffers.insert(id, data.to_vec());
        self.bound_buffer = Some(id);
        Ok(BufferId(id))
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer.0);
        self.deleted_buffers.push(buffer);
    }

    fn vertex_attrib_pointer(&mut self, location: u32, components: i32) {
        let buffer = self.bound_buffer.expect("no array buffer bound");
        self.pointers.insert(location, (buffer, components));
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.enabled.insert(location);
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        self.enabled.remove(&location);
    }

    fn uniform_1_i32(&mut self, location: UniformLocation, value: i32) {
        self.set_uniform(location, UniformValue::Int(value));
    }

    fn uniform_1_f32(&mut self, location: UniformLocation, value: f32) {
        self.set_uniform(location, UniformValue::Float(value));
    }

    fn uniform_2_f32(&mut self, location: UniformLocation, value: [f32; 2]) {
        self.set_uniform(location, UniformValue::Vec2(value));
    }

    fn uniform_3_f32(&mut self, location: UniformLocation, value: [f32; 3]) {
        self.set_uniform(location, UniformValue::Vec3(value));
    }

    fn uniform_4_f32(&mut self, location: UniformLocation, value: [f32; 4]) {
        self.set_uniform(location, UniformValue::Vec4(value));
    }

    fn uniform_matrix_3_f32(&mut self, location: UniformLocation, value: [f32; 9]) {
        self.set_uniform(location, UniformValue::Mat3(value));
    }

    fn uniform_matrix_4_f32(&mut self, location: UniformLocation, value: [f32; 16]) {
        self.set_uniform(location, UniformValue::Mat4(value));
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        self.record_draw(primitive, first, count, None);
    }

    fn draw_arrays_instanced(&mut self, primitive: Primitive, first: i32, count: i32, instances: i32) {
        self.record_draw(primitive, first, count, Some(instances));
    }

    fn clear(&mut self, colour: [f32; 4]) {
        self.clears.push(colour);
    }
}

/// Program drawing `positions` through a `transform`, filled with `color`.
pub(crate) fn colour_program() -> flow_gl::ProgramBuilder {
    flow_gl::ProgramBuilder::new(TRANSFORM_VERT, COLOR_FRAG)
        .attribute("positions", flow_gl::AttributeType::Vec2)
        .uniform("transform", flow_gl::UniformType::Mat4)
        .uniform("color", flow_gl::UniformType::Vec4)
}

/// Program drawing `positions` in solid red.
pub(crate) fn red_program() -> flow_gl::ProgramBuilder {
    flow_gl::ProgramBuilder::new(TRIANGLE_VERT, RED_FRAG)
        .attribute("positions", flow_gl::AttributeType::Vec2)
}

/// Program with one attribute of every arity: `weight` (float), `positions`
/// (vec2), `normal` (vec3) and `tint` (vec4).
pub(crate) fn shaded_program() -> flow_gl::ProgramBuilder {
    flow_gl::ProgramBuilder::new(SHADED_VERT, SHADED_FRAG)
        .attribute("weight", flow_gl::AttributeType::Float)
        .attribute("positions", flow_gl::AttributeType::Vec2)
        .attribute("normal", flow_gl::AttributeType::Vec3)
        .attribute("tint", flow_gl::AttributeType::Vec4)
}

pub(crate) const TRIANGLE: [[f32; 2]; 3] = [[0.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];
