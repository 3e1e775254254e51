use std::fmt;

/// A value pushed to a uniform location.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
    /// Up to the declared array length; missing tail elements read as zero.
    Vec4Array(Vec<[f32; 4]>),
    /// Texture unit a sampled texture uniform reads from.
    TextureUnit(u32),
}

impl UniformValue {
    /// Short kind name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Int(_) => "int",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::Vec4Array(_) => "vec4 array",
            UniformValue::TextureUnit(_) => "texture unit",
        }
    }

    /// Writes the value as tightly packed little-endian bytes.
    ///
    /// `TextureUnit` has no buffer representation and writes nothing.
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        match self {
            UniformValue::Float(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Int(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec3(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec4(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Mat4(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec4Array(v) => out.extend_from_slice(bytemuck::cast_slice(v)),
            UniformValue::TextureUnit(_) => {}
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<glam::Vec3> for UniformValue {
    fn from(v: glam::Vec3) -> Self {
        UniformValue::Vec3(v.to_array())
    }
}

impl From<glam::Vec4> for UniformValue {
    fn from(v: glam::Vec4) -> Self {
        UniformValue::Vec4(v.to_array())
    }
}

impl From<glam::Mat4> for UniformValue {
    fn from(m: glam::Mat4) -> Self {
        UniformValue::Mat4(m.to_cols_array())
    }
}

/// Uniform type as declared by a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformType {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Vec4Array(u32),
    Texture2d,
}

impl UniformType {
    /// Whether `value` may be written to a uniform of this type.
    pub fn accepts(self, value: &UniformValue) -> bool {
        match (self, value) {
            (UniformType::Float, UniformValue::Float(_))
            | (UniformType::Int, UniformValue::Int(_))
            | (UniformType::Vec2, UniformValue::Vec2(_))
            | (UniformType::Vec3, UniformValue::Vec3(_))
            | (UniformType::Vec4, UniformValue::Vec4(_))
            | (UniformType::Mat4, UniformValue::Mat4(_))
            | (UniformType::Texture2d, UniformValue::TextureUnit(_)) => true,
            (UniformType::Vec4Array(len), UniformValue::Vec4Array(items)) => {
                items.len() <= len as usize
            }
            _ => false,
        }
    }

    /// Size of the backing uniform buffer, `None` for texture bindings.
    pub fn buffer_size(self) -> Option<u64> {
        match self {
            UniformType::Float | UniformType::Int => Some(4),
            UniformType::Vec2 => Some(8),
            UniformType::Vec3 => Some(12),
            UniformType::Vec4 => Some(16),
            UniformType::Mat4 => Some(64),
            UniformType::Vec4Array(len) => Some(16 * len as u64),
            UniformType::Texture2d => None,
        }
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformType::Float => f.write_str("float"),
            UniformType::Int => f.write_str("int"),
            UniformType::Vec2 => f.write_str("vec2"),
            UniformType::Vec3 => f.write_str("vec3"),
            UniformType::Vec4 => f.write_str("vec4"),
            UniformType::Mat4 => f.write_str("mat4"),
            UniformType::Vec4Array(n) => write!(f, "vec4[{n}]"),
            UniformType::Texture2d => f.write_str("texture2d"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_kinds_are_accepted() {
        assert!(UniformType::Mat4.accepts(&glam::Mat4::IDENTITY.into()));
        assert!(UniformType::Texture2d.accepts(&UniformValue::TextureUnit(0)));
        assert!(UniformType::Vec4Array(4).accepts(&UniformValue::Vec4Array(vec![[0.0; 4]; 2])));
    }

    #[test]
    fn mismatched_kinds_are_rejected() {
        assert!(!UniformType::Vec4.accepts(&UniformValue::Vec3([1.0; 3])));
        assert!(!UniformType::Int.accepts(&UniformValue::TextureUnit(0)));
        assert!(!UniformType::Vec4Array(1).accepts(&UniformValue::Vec4Array(vec![[0.0; 4]; 2])));
    }

    #[test]
    fn bytes_are_tightly_packed() {
        let mut out = Vec::new();
        UniformValue::Vec3([1.0, 2.0, 3.0]).write_bytes(&mut out);
        assert_eq!(out.len(), 12);
        assert_eq!(UniformType::Vec3.buffer_size(), Some(12));
    }
}
