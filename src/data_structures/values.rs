//! Attribute and uniform values carried by scene nodes.
//!
//! The shape of a value is part of its type: a [`VertexArray`] knows its
//! per-vertex arity and a [`UniformValue`] knows whether it is a scalar, a
//! vector or a matrix. Dynamically shaped input goes through the fallible
//! constructors, which is the only validation a node ever does.

use cgmath::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

use crate::error::ShapeError;

/// Per-vertex data for one attribute, tagged with its arity.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexArray {
    Scalar(Vec<f32>),
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
    Vec4(Vec<[f32; 4]>),
}

impl VertexArray {
    /// Builds an array from untyped tuples, checking that every tuple has the
    /// same arity and that it is between 1 and 4.
    pub fn from_tuples<T: AsRef<[f32]>>(tuples: &[T]) -> Result<Self, ShapeError> {
        let expected = tuples.first().map_or(1, |t| t.as_ref().len());
        if !(1..=4).contains(&expected) {
            return Err(ShapeError::UnsupportedArity(expected));
        }
        if let Some((index, found)) = tuples
            .iter()
            .map(|t| t.as_ref().len())
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(ShapeError::InconsistentArity {
                index,
                expected,
                found,
            });
        }
        let flat: Vec<f32> = tuples.iter().flat_map(|t| t.as_ref().iter().copied()).collect();
        Ok(match expected {
            1 => VertexArray::Scalar(flat),
            2 => VertexArray::Vec2(flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect()),
            3 => VertexArray::Vec3(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()),
            _ => VertexArray::Vec4(
                flat.chunks_exact(4)
                    .map(|c| [c[0], c[1], c[2], c[3]])
                    .collect(),
            ),
        })
    }

    /// Components per vertex.
    pub fn components(&self) -> usize {
        match self {
            VertexArray::Scalar(_) => 1,
            VertexArray::Vec2(_) => 2,
            VertexArray::Vec3(_) => 3,
            VertexArray::Vec4(_) => 4,
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        match self {
            VertexArray::Scalar(v) => v.len(),
            VertexArray::Vec2(v) => v.len(),
            VertexArray::Vec3(v) => v.len(),
            VertexArray::Vec4(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The data as one tightly packed float slice, ready for upload.
    pub fn as_flat(&self) -> &[f32] {
        match self {
            VertexArray::Scalar(v) => v,
            VertexArray::Vec2(v) => v.as_flattened(),
            VertexArray::Vec3(v) => v.as_flattened(),
            VertexArray::Vec4(v) => v.as_flattened(),
        }
    }
}

impl From<Vec<f32>> for VertexArray {
    fn from(v: Vec<f32>) -> Self {
        VertexArray::Scalar(v)
    }
}

impl From<Vec<[f32; 2]>> for VertexArray {
    fn from(v: Vec<[f32; 2]>) -> Self {
        VertexArray::Vec2(v)
    }
}

impl From<Vec<[f32; 3]>> for VertexArray {
    fn from(v: Vec<[f32; 3]>) -> Self {
        VertexArray::Vec3(v)
    }
}

impl From<Vec<[f32; 4]>> for VertexArray {
    fn from(v: Vec<[f32; 4]>) -> Self {
        VertexArray::Vec4(v)
    }
}

impl<const N: usize> From<[[f32; 2]; N]> for VertexArray {
    fn from(v: [[f32; 2]; N]) -> Self {
        VertexArray::Vec2(v.to_vec())
    }
}

impl<const N: usize> From<[[f32; 3]; N]> for VertexArray {
    fn from(v: [[f32; 3]; N]) -> Self {
        VertexArray::Vec3(v.to_vec())
    }
}

impl<const N: usize> From<[[f32; 4]; N]> for VertexArray {
    fn from(v: [[f32; 4]; N]) -> Self {
        VertexArray::Vec4(v.to_vec())
    }
}

impl From<Vec<Vector2<f32>>> for VertexArray {
    fn from(v: Vec<Vector2<f32>>) -> Self {
        VertexArray::Vec2(v.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Vector3<f32>>> for VertexArray {
    fn from(v: Vec<Vector3<f32>>) -> Self {
        VertexArray::Vec3(v.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<Vector4<f32>>> for VertexArray {
    fn from(v: Vec<Vector4<f32>>) -> Self {
        VertexArray::Vec4(v.into_iter().map(Into::into).collect())
    }
}

/// A value for one uniform. Matrices are stored column-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

impl UniformValue {
    /// Interprets a float slice by its length: 1 is a float, 2..=4 a vector,
    /// 9 a 3×3 and 16 a 4×4 column-major matrix.
    pub fn from_slice(values: &[f32]) -> Result<Self, ShapeError> {
        Ok(match values.len() {
            1 => UniformValue::Float(values[0]),
            2 => UniformValue::Vec2([values[0], values[1]]),
            3 => UniformValue::Vec3([values[0], values[1], values[2]]),
            4 => UniformValue::Vec4([values[0], values[1], values[2], values[3]]),
            9 => {
                let mut m = [0.0; 9];
                m.copy_from_slice(values);
                UniformValue::Mat3(m)
            }
            16 => {
                let mut m = [0.0; 16];
                m.copy_from_slice(values);
                UniformValue::Mat4(m)
            }
            n => return Err(ShapeError::UnsupportedUniformLength(n)),
        })
    }

    /// Short name of the value's shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            UniformValue::Int(_) => "int",
            UniformValue::Float(_) => "float",
            UniformValue::Bool(_) => "bool",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat3(_) => "mat3",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<[f32; 9]> for UniformValue {
    fn from(v: [f32; 9]) -> Self {
        UniformValue::Mat3(v)
    }
}

impl From<[f32; 16]> for UniformValue {
    fn from(v: [f32; 16]) -> Self {
        UniformValue::Mat4(v)
    }
}

impl From<Vector2<f32>> for UniformValue {
    fn from(v: Vector2<f32>) -> Self {
        UniformValue::Vec2(v.into())
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(v: Vector3<f32>) -> Self {
        UniformValue::Vec3(v.into())
    }
}

impl From<Vector4<f32>> for UniformValue {
    fn from(v: Vector4<f32>) -> Self {
        UniformValue::Vec4(v.into())
    }
}

impl From<Matrix3<f32>> for UniformValue {
    fn from(m: Matrix3<f32>) -> Self {
        let columns: [[f32; 3]; 3] = m.into();
        let mut flat = [0.0; 9];
        flat.copy_from_slice(columns.as_flattened());
        UniformValue::Mat3(flat)
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(m: Matrix4<f32>) -> Self {
        let columns: [[f32; 4]; 4] = m.into();
        let mut flat = [0.0; 16];
        flat.copy_from_slice(columns.as_flattened());
        UniformValue::Mat4(flat)
    }
}
