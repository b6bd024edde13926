//! Scene graph.
//!
//! A [`SceneNode`] is an immutable description of one draw: an optional
//! program, its own attributes and uniforms, draw parameters and an ordered
//! list of children. Children are owned, so a node can never be its own
//! ancestor. Trees are cheap to rebuild and are meant to be rebuilt by the
//! caller every frame rather than mutated.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    context::Primitive,
    data_structures::values::{UniformValue, VertexArray},
    error::ShapeError,
    program::ShaderProgram,
};

/// One element of the scene tree.
#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    label: Option<String>,
    program: Option<Arc<ShaderProgram>>,
    attributes: BTreeMap<String, VertexArray>,
    uniforms: BTreeMap<String, UniformValue>,
    count: Option<u32>,
    instances: Option<u32>,
    primitive: Option<Primitive>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn builder() -> NodeBuilder {
        NodeBuilder::default()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The node's own program. `None` means "use the one inherited from above".
    pub fn program(&self) -> Option<&Arc<ShaderProgram>> {
        self.program.as_ref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, VertexArray> {
        &self.attributes
    }

    pub fn uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.uniforms
    }

    /// Explicit vertex count, if the node declares one.
    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn instances(&self) -> Option<u32> {
        self.instances
    }

    pub fn primitive(&self) -> Option<Primitive> {
        self.primitive
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }
}

/// Starts building a node. Shorthand for [`SceneNode::builder`].
pub fn node() -> NodeBuilder {
    NodeBuilder::default()
}

/// Builder for [`SceneNode`].
#[derive(Clone, Debug, Default)]
pub struct NodeBuilder {
    node: SceneNode,
}

impl NodeBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.node.label = Some(label.into());
        self
    }

    pub fn program(mut self, program: Arc<ShaderProgram>) -> Self {
        self.node.program = Some(program);
        self
    }

    /// Sets an attribute. Setting the same name twice keeps the last value.
    pub fn attribute(mut self, name: impl Into<String>, values: impl Into<VertexArray>) -> Self {
        self.node.attributes.insert(name.into(), values.into());
        self
    }

    /// Sets an attribute from untyped tuples, rejecting mixed or unsupported arities.
    pub fn try_attribute<T: AsRef<[f32]>>(
        self,
        name: impl Into<String>,
        tuples: &[T],
    ) -> Result<Self, ShapeError> {
        let values = VertexArray::from_tuples(tuples)?;
        Ok(self.attribute(name, values))
    }

    pub fn uniform(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.node.uniforms.insert(name.into(), value.into());
        self
    }

    /// Sets a uniform from a float slice, interpreted by its length.
    pub fn try_uniform(self, name: impl Into<String>, values: &[f32]) -> Result<Self, ShapeError> {
        let value = UniformValue::from_slice(values)?;
        Ok(self.uniform(name, value))
    }

    pub fn count(mut self, count: u32) -> Self {
        self.node.count = Some(count);
        self
    }

    pub fn instances(mut self, instances: u32) -> Self {
        self.node.instances = Some(instances);
        self
    }

    pub fn primitive(mut self, primitive: Primitive) -> Self {
        self.node.primitive = Some(primitive);
        self
    }

    pub fn child(mut self, child: SceneNode) -> Self {
        self.node.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.node.children.extend(children);
        self
    }

    pub fn build(self) -> SceneNode {
        self.node
    }
}

impl From<NodeBuilder> for SceneNode {
    fn from(builder: NodeBuilder) -> Self {
        builder.build()
    }
}
