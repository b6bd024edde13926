//! Scene data: the node tree and the values nodes carry.
//!
//! - `scene_graph` holds the immutable [`SceneNode`](scene_graph::SceneNode) tree and its builder
//! - `values` holds typed vertex arrays and uniform values

pub mod scene_graph;
pub mod values;
