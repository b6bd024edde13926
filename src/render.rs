//! Scene traversal and draw-call issuance.
//!
//! [`Renderer::render`] walks a [`SceneNode`] tree depth-first, pre-order.
//! Every node sees an *effective* state made of the state inherited from its
//! parent overlaid with the node's own values:
//!
//! - program: the node's own, else the nearest ancestor's
//! - attributes and uniforms: the parent's effective map with the node's own
//!   entries replacing same-named ones wholesale
//!
//! A node with an effective program gets that program activated, the whole
//! effective state bound and exactly one draw call. A node without one is
//! skipped (no draw) but its children are still visited. Nothing that goes
//! wrong at one node stops the traversal.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    binder::{bind_attributes, bind_uniforms},
    context::{BufferId, GpuContext, Primitive},
    data_structures::{
        scene_graph::SceneNode,
        values::{UniformValue, VertexArray},
    },
    error::{NodePath, ProgramError, RenderWarning},
    program::{ProgramBuilder, ShaderProgram},
};

/// Renderer settings.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Primitive used by nodes that do not declare one.
    pub primitive: Primitive,
    /// Vertex count for nodes that neither declare a count nor bind any
    /// attribute. `None` uses the minimum of the node's primitive.
    pub fallback_count: Option<u32>,
    /// Cleared to at the start of every pass when set.
    pub clear_colour: Option<[f32; 4]>,
    /// Delete the vertex buffers uploaded during a pass when the next pass starts.
    pub release_buffers: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            primitive: Primitive::Triangles,
            fallback_count: None,
            clear_colour: Some([0.0, 0.0, 0.0, 1.0]),
            release_buffers: true,
        }
    }
}

/// Outcome of one render pass.
#[derive(Debug, Default, PartialEq)]
pub struct FrameReport {
    pub visited: usize,
    pub draw_calls: usize,
    /// Nodes that had no program to draw with.
    pub skipped: usize,
    pub warnings: Vec<RenderWarning>,
}

/// State in force at a node after inheritance.
#[derive(Clone, Default)]
struct Effective<'a> {
    program: Option<&'a Arc<ShaderProgram>>,
    attributes: BTreeMap<&'a str, &'a VertexArray>,
    uniforms: BTreeMap<&'a str, &'a UniformValue>,
}

impl<'a> Effective<'a> {
    fn overlay(&self, node: &'a SceneNode) -> Self {
        let mut effective = self.clone();
        if let Some(program) = node.program() {
            effective.program = Some(program);
        }
        effective
            .attributes
            .extend(node.attributes().iter().map(|(name, values)| (name.as_str(), values)));
        effective
            .uniforms
            .extend(node.uniforms().iter().map(|(name, value)| (name.as_str(), value)));
        effective
    }
}

/// Draws scene trees onto a [`GpuContext`] it owns for its lifetime.
pub struct Renderer<C: GpuContext> {
    ctx: C,
    config: RendererConfig,
    transient: Vec<BufferId>,
    /// Attribute arrays left enabled by the previous draw.
    enabled: Vec<u32>,
}

impl<C: GpuContext> Renderer<C> {
    pub fn new(ctx: C) -> Self {
        Self::with_config(ctx, RendererConfig::default())
    }

    pub fn with_config(ctx: C, config: RendererConfig) -> Self {
        Self {
            ctx,
            config,
            transient: Vec::new(),
            enabled: Vec::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RendererConfig {
        &mut self.config
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    /// Builds a program on this renderer's context, ready to be shared by nodes.
    pub fn build_program(&mut self, builder: &ProgramBuilder) -> Result<Arc<ShaderProgram>, ProgramError> {
        builder.build(&mut self.ctx).map(Arc::new)
    }

    /// Renders one frame.
    pub fn render(&mut self, root: &SceneNode) -> FrameReport {
        if self.config.release_buffers {
            self.release_buffers();
        }
        if let Some(colour) = self.config.clear_colour {
            self.ctx.clear(colour);
        }

        let mut report = FrameReport::default();
        self.visit(root, &Effective::default(), NodePath::default(), &mut report);
        self.disable_arrays(&[]);
        self.ctx.use_program(None);

        log::trace!(
            "frame done: {} nodes, {} draw calls, {} skipped",
            report.visited,
            report.draw_calls,
            report.skipped
        );
        report
    }

    /// Releases the pending transient buffers and hands the context back.
    pub fn into_context(mut self) -> C {
        self.release_buffers();
        self.ctx
    }

    fn release_buffers(&mut self) {
        for buffer in self.transient.drain(..) {
            self.ctx.delete_buffer(buffer);
        }
    }

    /// Disables every array enabled by the previous draw that is not in `keep`,
    /// so a draw only ever reads the attributes it bound itself.
    fn disable_arrays(&mut self, keep: &[u32]) {
        for location in self.enabled.drain(..) {
            if !keep.contains(&location) {
                self.ctx.disable_vertex_attrib_array(location);
            }
        }
        self.enabled.extend_from_slice(keep);
    }

    fn visit<'a>(
        &mut self,
        node: &'a SceneNode,
        inherited: &Effective<'a>,
        path: NodePath,
        report: &mut FrameReport,
    ) {
        let effective = inherited.overlay(node);
        report.visited += 1;

        match effective.program {
            Some(program) => self.draw(node, &effective, program, &path, report),
            None => {
                // Pure grouping nodes are expected to have no program.
                let drawable = !node.attributes().is_empty()
                    || node.count().is_some()
                    || node.instances().is_some();
                let warning = RenderWarning::MissingProgram { path: path.clone() };
                if drawable {
                    log::warn!("{warning}");
                } else {
                    log::debug!("{warning}");
                }
                report.skipped += 1;
                report.warnings.push(warning);
            }
        }

        for (index, child) in node.children().iter().enumerate() {
            self.visit(child, &effective, path.child(index), report);
        }
    }

    fn draw(
        &mut self,
        node: &SceneNode,
        effective: &Effective<'_>,
        program: &ShaderProgram,
        path: &NodePath,
        report: &mut FrameReport,
    ) {
        self.ctx.use_program(Some(program.id()));

        let attributes = bind_attributes(
            &mut self.ctx,
            program,
            effective.attributes.iter().map(|(name, values)| (*name, *values)),
        );
        self.transient.extend(attributes.buffers);
        self.disable_arrays(&attributes.locations);
        let uniform_warnings = bind_uniforms(
            &mut self.ctx,
            program,
            effective.uniforms.iter().map(|(name, value)| (*name, *value)),
        );
        report.warnings.extend(
            attributes
                .warnings
                .into_iter()
                .chain(uniform_warnings)
                .map(|warning| RenderWarning::Binding {
                    path: path.clone(),
                    warning,
                }),
        );

        let primitive = node.primitive().unwrap_or(self.config.primitive);
        let count = node
            .count()
            .or(attributes.vertex_count)
            .or(self.config.fallback_count)
            .unwrap_or_else(|| primitive.min_vertices());
        let Some(count) = draw_parameter(path, "count", count, report) else {
            return;
        };
        match node.instances() {
            Some(instances) => {
                let Some(instances) = draw_parameter(path, "instances", instances, report) else {
                    return;
                };
                self.ctx.draw_arrays_instanced(primitive, 0, count, instances)
            }
            None => self.ctx.draw_arrays(primitive, 0, count),
        }
        report.draw_calls += 1;
        log::trace!(
            "{path}{}: drew {count} vertices as {primitive:?}",
            node.label().map(|l| format!(" ({l})")).unwrap_or_default()
        );
    }
}

/// Converts a draw parameter to the range GL accepts, reporting it when it does not fit.
fn draw_parameter(path: &NodePath, parameter: &'static str, value: u32, report: &mut FrameReport) -> Option<i32> {
    match i32::try_from(value) {
        Ok(value) => Some(value),
        Err(_) => {
            let warning = RenderWarning::DrawRange {
                path: path.clone(),
                parameter,
                value,
            };
            log::warn!("{warning}");
            report.warnings.push(warning);
            None
        }
    }
}

/// Wraps a context into a per-frame render callback.
pub fn create_renderer<C: GpuContext>(ctx: C) -> impl FnMut(&SceneNode) {
    let mut renderer = Renderer::new(ctx);
    move |root: &SceneNode| {
        renderer.render(root);
    }
}
