//! Frame driving.
//!
//! The renderer does not schedule frames. Whatever drives the frames (an
//! animation-frame callback, a winit redraw, a test loop) calls in once per
//! frame with a timestamp. State is threaded through frames fold-style:
//! `(state, timestamp) -> state`, after which the flow describes the scene for
//! the new state and the renderer draws it.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S>`] is the trait for anything that updates state and describes a scene
//! - [`FlowRunner`] owns a renderer, a flow and the current state, and runs one frame per call
//! - [`fold_frames`] is the bare fold for drivers that only need the state

use instant::{Duration, Instant};

use crate::{
    context::GpuContext,
    data_structures::scene_graph::SceneNode,
    render::{FrameReport, Renderer},
};

/// Trait for a scene whose content is a function of some state `S`.
///
/// # Lifecycle
///
/// 1. `on_update()` is called every frame with the time since the runner started
/// 2. `on_render()` is called right after and returns the tree to draw
pub trait GraphicsFlow<S> {
    /// Produces the state for this frame from the previous one.
    fn on_update(&mut self, state: S, timestamp: Duration) -> S;

    /// Describes the scene for `state`. Called every frame; the returned tree
    /// is drawn and dropped.
    fn on_render(&self, state: &S) -> SceneNode;
}

/// Any `(state, timestamp) -> state` closure paired with a scene function is a flow.
impl<S, U, R> GraphicsFlow<S> for (U, R)
where
    U: FnMut(S, Duration) -> S,
    R: Fn(&S) -> SceneNode,
{
    fn on_update(&mut self, state: S, timestamp: Duration) -> S {
        (self.0)(state, timestamp)
    }

    fn on_render(&self, state: &S) -> SceneNode {
        (self.1)(state)
    }
}

/// Runs a [`GraphicsFlow`] against a [`Renderer`], one frame per call.
pub struct FlowRunner<C: GpuContext, S, F: GraphicsFlow<S>> {
    renderer: Renderer<C>,
    flow: F,
    state: Option<S>,
    started: Instant,
    frames: u64,
}

impl<C: GpuContext, S, F: GraphicsFlow<S>> FlowRunner<C, S, F> {
    pub fn new(renderer: Renderer<C>, flow: F, initial: S) -> Self {
        Self {
            renderer,
            flow,
            state: Some(initial),
            started: Instant::now(),
            frames: 0,
        }
    }

    /// Runs a frame stamped with the wall-clock time since the runner was created.
    pub fn frame(&mut self) -> anyhow::Result<FrameReport> {
        let timestamp = self.started.elapsed();
        self.frame_at(timestamp)
    }

    /// Runs a frame with a caller-provided timestamp.
    pub fn frame_at(&mut self, timestamp: Duration) -> anyhow::Result<FrameReport> {
        let state = self
            .state
            .take()
            .ok_or_else(|| anyhow::anyhow!("flow state was lost during a previous frame"))?;
        let state = self.flow.on_update(state, timestamp);
        let root = self.flow.on_render(&state);
        self.state = Some(state);

        let report = self.renderer.render(&root);
        self.frames += 1;
        if !report.warnings.is_empty() {
            log::debug!(
                "frame {} at {:?} finished with {} warnings",
                self.frames,
                timestamp,
                report.warnings.len()
            );
        }
        Ok(report)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn renderer(&self) -> &Renderer<C> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<C> {
        &mut self.renderer
    }

    /// Stops the runner, returning the renderer and the last state.
    pub fn finish(self) -> (Renderer<C>, Option<S>) {
        (self.renderer, self.state)
    }
}

/// Threads `state` through `step` once per timestamp and returns the final state.
pub fn fold_frames<S, I, F>(state: S, timestamps: I, step: F) -> S
where
    I: IntoIterator<Item = Duration>,
    F: FnMut(S, Duration) -> S,
{
    timestamps.into_iter().fold(state, step)
}
