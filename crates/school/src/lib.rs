#![deny(unsafe_code)]
//! Schools of fish steered by a shared noise field.
//!
//! A [`School`] owns a fixed, ordered arena of [`Agent`]s plus one
//! animation binding slot per agent. Agent parameters are drawn once at
//! creation from the seeded PRNG; after that the only mutation is
//! [`School::tick`], which runs the motion controller and then the
//! animation binder for every agent in index order.
//!
//! Schools never see each other. Cohesion comes from agents sampling the
//! same [`NoiseField`] at different phases around nearby centers.

pub mod agent;
pub mod animation;
pub mod motion;
pub mod species;

pub use agent::{Agent, AgentParams, AgentTransform};
pub use animation::{
    AnimationBinder, AnimationBinding, AnimationClip, ClipAction, ClipLibrary, ClipSelection,
    ClipSource,
};
pub use motion::{Heading, MotionController};
pub use species::Species;

use aquarium_core::config::{validate_bounds, Easing, FishRanges};
use aquarium_core::error::AquariumError;
use aquarium_core::noise_field::NoiseField;
use aquarium_core::prng::Xorshift64;
use glam::DVec3;

/// A fixed-size group of fish sharing roaming bounds.
#[derive(Debug, Clone)]
pub struct School {
    controller: MotionController,
    agents: Vec<Agent>,
    animations: AnimationBinder,
}

impl School {
    /// Creates `count` agents with parameters drawn from `ranges`.
    ///
    /// Fails on invalid bounds or ranges. A count of zero is allowed and
    /// produces a school that ticks as a no-op.
    pub fn create(
        count: usize,
        bounds: DVec3,
        ranges: &FishRanges,
        easing: Easing,
        rng: &mut Xorshift64,
    ) -> Result<Self, AquariumError> {
        validate_bounds(bounds)?;
        ranges.validate()?;
        let agents = (0..count)
            .map(|_| Agent::new(AgentParams::draw(rng, ranges)))
            .collect();
        Ok(Self::from_parts(bounds, easing, agents))
    }

    /// Builds a school around agents constructed elsewhere.
    pub fn from_agents(
        bounds: DVec3,
        easing: Easing,
        agents: Vec<Agent>,
    ) -> Result<Self, AquariumError> {
        validate_bounds(bounds)?;
        Ok(Self::from_parts(bounds, easing, agents))
    }

    fn from_parts(bounds: DVec3, easing: Easing, agents: Vec<Agent>) -> Self {
        log::debug!("school: {} agents, bounds {bounds}", agents.len());
        let animations = AnimationBinder::new(agents.len());
        Self {
            controller: MotionController::new(bounds, easing),
            agents,
            animations,
        }
    }

    /// Binds the same clip selection to every agent.
    ///
    /// A missing clip is logged once per agent and leaves those agents in
    /// their rest pose.
    pub fn bind_animations(&mut self, source: &dyn ClipSource, selection: &ClipSelection) {
        for index in 0..self.agents.len() {
            self.animations.bind(index, source, selection.clone());
        }
    }

    /// Binds one agent; `None` if the index is out of range.
    pub fn bind_agent(
        &mut self,
        index: usize,
        source: &dyn ClipSource,
        selection: ClipSelection,
    ) -> Option<&AnimationBinding> {
        self.animations.bind(index, source, selection)
    }

    /// Advances every agent by one frame, in index order.
    pub fn tick(&mut self, noise: &dyn NoiseField, dt: f64, elapsed: f64) {
        for (index, agent) in self.agents.iter_mut().enumerate() {
            self.controller.tick(noise, agent, dt, elapsed);
            self.animations.advance(index, dt);
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn binding(&self, index: usize) -> Option<&AnimationBinding> {
        self.animations.binding(index)
    }

    pub fn bounds(&self) -> DVec3 {
        self.controller.bounds()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Position, orientation, scale and playback time of every agent.
    pub fn transforms(&self) -> Vec<AgentTransform> {
        self.agents
            .iter()
            .enumerate()
            .map(|(index, agent)| AgentTransform {
                position: agent.position(),
                orientation: agent.orientation(),
                scale: agent.params().scale,
                playback_time: self.animations.playback_time(index),
            })
            .collect()
    }
}
