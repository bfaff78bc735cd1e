//! Serializable per-frame output.
//!
//! A [`FrameState`] is everything a renderer reads after a tick: one
//! transform per fish and the current uniforms of each particle system.
//! Instance buffers are omitted because they never change after
//! construction.

use aquarium_core::instance::Uniforms;
use aquarium_school::{AgentTransform, Species};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolFrame {
    pub species: Species,
    pub model: String,
    pub agents: Vec<AgentTransform>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleFrame {
    pub name: String,
    pub instance_count: usize,
    pub uniforms: Uniforms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub frame: u64,
    pub elapsed: f64,
    pub schools: Vec<SchoolFrame>,
    pub particles: Vec<ParticleFrame>,
}

impl FrameState {
    pub fn agent_count(&self) -> usize {
        self.schools.iter().map(|s| s.agents.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_core::instance::UniformValue;
    use glam::{DQuat, DVec3};

    fn sample() -> FrameState {
        let mut uniforms = Uniforms::new();
        uniforms.set("uTime", UniformValue::Float(1.5));
        FrameState {
            frame: 90,
            elapsed: 1.5,
            schools: vec![SchoolFrame {
                species: Species::Koi,
                model: Species::Koi.model_path().into(),
                agents: vec![AgentTransform {
                    position: DVec3::new(1.0, 2.0, 3.0),
                    orientation: DQuat::IDENTITY,
                    scale: 0.15,
                    playback_time: 1.5,
                }],
            }],
            particles: vec![ParticleFrame {
                name: "bubbles".into(),
                instance_count: 20,
                uniforms,
            }],
        }
    }

    #[test]
    fn json_round_trip_preserves_frame() {
        let frame = sample();
        let json = serde_json::to_string(&frame).unwrap();
        let back: FrameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn json_uses_plain_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["schools"][0]["species"], "koi");
        assert_eq!(value["particles"][0]["uniforms"]["uTime"], 1.5);
    }

    #[test]
    fn agent_count_sums_schools() {
        let mut frame = sample();
        frame.schools.push(frame.schools[0].clone());
        assert_eq!(frame.agent_count(), 2);
    }
}
