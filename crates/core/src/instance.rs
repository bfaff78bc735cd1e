//! Rendering-API-independent instance data.
//!
//! An [`InstanceBuffer`] maps attribute names (`aOffset`, `aSpeed`, ...) to
//! flat `f32` arrays with a component count, exactly what a GPU instanced
//! draw consumes. It is filled once at construction and never mutated
//! afterwards. [`Uniforms`] holds the handful of per-system scalars and
//! vectors the host pushes each frame.

use crate::error::AquariumError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One named per-instance attribute: `count * components` floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceAttribute {
    components: usize,
    data: Vec<f32>,
}

impl InstanceAttribute {
    /// Number of floats per instance (1 for scalars, 3 for `vec3`).
    pub fn components(&self) -> usize {
        self.components
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The attribute value for instance `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.components)?;
        self.data.get(start..start + self.components)
    }
}

/// A fixed-size set of instances described attribute by attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceBuffer {
    count: usize,
    attributes: BTreeMap<String, InstanceAttribute>,
}

impl InstanceBuffer {
    /// Creates an empty buffer for `count` instances.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute (builder style).
    ///
    /// Returns `AquariumError::AttributeLength` if `data.len()` is not
    /// `count * components`, or `InvalidCount` if `components` is outside 1..=4.
    pub fn with_attribute(
        mut self,
        name: &str,
        components: usize,
        data: Vec<f32>,
    ) -> Result<Self, AquariumError> {
        if !(1..=4).contains(&components) {
            return Err(AquariumError::InvalidCount {
                name: format!("{name} components"),
                value: components,
            });
        }
        let expected = self.count * components;
        if data.len() != expected {
            return Err(AquariumError::AttributeLength {
                name: name.to_string(),
                expected,
                got: data.len(),
            });
        }
        self.attributes
            .insert(name.to_string(), InstanceAttribute { components, data });
        Ok(self)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn attribute(&self, name: &str) -> Option<&InstanceAttribute> {
        self.attributes.get(name)
    }

    /// Attributes in name order (stable across runs, so attribute locations are too).
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &InstanceAttribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total bytes that will be uploaded to the GPU.
    pub fn byte_len(&self) -> usize {
        self.attributes
            .values()
            .map(|a| a.data.len() * std::mem::size_of::<f32>())
            .sum()
    }
}

/// A uniform value a shader program can receive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniformValue {
    Float(f32),
    Vec3([f32; 3]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
}

/// Named uniforms for one particle system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uniforms {
    values: BTreeMap<String, UniformValue>,
}

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: UniformValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    /// Convenience for scalar uniforms; `None` if missing or not a float.
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.values.get(name) {
            Some(UniformValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_with_matching_length_is_accepted() {
        let buf = InstanceBuffer::new(2)
            .with_attribute("aOffset", 3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_attribute("aSpeed", 1, vec![2.0, 3.0])
            .unwrap();
        assert_eq!(buf.count(), 2);
        assert_eq!(buf.attribute("aOffset").unwrap().components(), 3);
        assert_eq!(
            buf.attribute("aOffset").unwrap().get(1),
            Some(&[3.0_f32, 4.0, 5.0][..])
        );
        assert_eq!(buf.byte_len(), 8 * 4);
    }

    #[test]
    fn attribute_with_wrong_length_is_rejected() {
        let result = InstanceBuffer::new(3).with_attribute("aSpeed", 1, vec![1.0, 2.0]);
        match result {
            Err(AquariumError::AttributeLength { expected, got, .. }) => {
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("expected AttributeLength, got {other:?}"),
        }
    }

    #[test]
    fn attribute_component_count_is_bounded() {
        assert!(InstanceBuffer::new(1)
            .with_attribute("aBad", 0, vec![])
            .is_err());
        assert!(InstanceBuffer::new(1)
            .with_attribute("aBad", 5, vec![0.0; 5])
            .is_err());
    }

    #[test]
    fn empty_buffer_accepts_empty_attributes() {
        let buf = InstanceBuffer::new(0)
            .with_attribute("aOffset", 3, Vec::new())
            .unwrap();
        assert_eq!(buf.count(), 0);
        assert_eq!(buf.attribute("aOffset").unwrap().get(0), None);
    }

    #[test]
    fn attributes_iterate_in_name_order() {
        let buf = InstanceBuffer::new(1)
            .with_attribute("aSpeed", 1, vec![1.0])
            .unwrap()
            .with_attribute("aOffset", 3, vec![0.0; 3])
            .unwrap();
        let names: Vec<&str> = buf.attributes().map(|(n, _)| n).collect();
        assert_eq!(names, ["aOffset", "aSpeed"]);
    }

    #[test]
    fn uniforms_overwrite_by_name() {
        let mut u = Uniforms::new();
        u.set("uTime", UniformValue::Float(1.0));
        u.set("uTime", UniformValue::Float(2.5));
        assert_eq!(u.float("uTime"), Some(2.5));
        assert_eq!(u.iter().count(), 1);
    }

    #[test]
    fn float_accessor_ignores_vectors() {
        let mut u = Uniforms::new();
        u.set("uOrigin", UniformValue::Vec3([1.0, 2.0, 3.0]));
        assert_eq!(u.float("uOrigin"), None);
        assert_eq!(u.get("uOrigin"), Some(UniformValue::Vec3([1.0, 2.0, 3.0])));
    }

    #[test]
    fn untagged_serde_picks_variant_by_shape() {
        let v: UniformValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(v, UniformValue::Float(2.5));
        let v: UniformValue = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(v, UniformValue::Vec3([1.0, 2.0, 3.0]));
        let identity = [
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ];
        let json = serde_json::to_string(&UniformValue::Mat4(identity)).unwrap();
        let back: UniformValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UniformValue::Mat4(identity));
    }
}
