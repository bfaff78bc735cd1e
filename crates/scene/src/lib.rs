#![deny(unsafe_code)]
//! Frame orchestration for the aquarium.
//!
//! [`Aquarium`] builds every school, both particle systems and the sea floor
//! from one validated [`AquariumConfig`], then advances them once per host
//! frame: schools tick their agents in order, then each particle system
//! receives the elapsed time. Everything random is drawn at construction
//! from sub-streams of the config seed.

pub mod frame;
pub mod raster;
pub mod terrain;

#[cfg(feature = "png")]
pub mod snapshot;

pub use frame::{FrameState, ParticleFrame, SchoolFrame};
pub use terrain::{Heightfield, Pebble};

use aquarium_core::config::AquariumConfig;
use aquarium_core::error::AquariumError;
use aquarium_core::noise_field::{noise_seed, SimplexNoise};
use aquarium_core::prng::Xorshift64;
use aquarium_core::system::ParticleSystem;
use aquarium_particles::{BubbleParams, Bubbles, Seaweed, SeaweedParams};
use aquarium_school::{AnimationClip, ClipLibrary, ClipSelection, School, Species};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Clips available for each species' model.
///
/// Stands in for loaded model assets: only clip names and durations are
/// needed to drive playback. Species without an entry get no clips, so
/// their fish stay in the rest pose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipCatalog {
    libraries: BTreeMap<Species, ClipLibrary>,
}

impl ClipCatalog {
    /// Every species with just its own swim clip, `duration` seconds long.
    pub fn swim_clips(duration: f64) -> Self {
        let libraries = Species::ALL
            .into_iter()
            .map(|s| {
                let clip = AnimationClip::new(s.clip_name(), duration);
                (s, ClipLibrary::new(vec![clip]))
            })
            .collect();
        Self { libraries }
    }

    /// Parses `{"koi": [{"name": ..., "duration": ...}], ...}`.
    pub fn from_json(value: &Value) -> Result<Self, AquariumError> {
        serde_json::from_value(value.clone()).map_err(|e| AquariumError::InvalidConfig(e.to_string()))
    }

    pub fn insert(&mut self, species: Species, library: ClipLibrary) {
        self.libraries.insert(species, library);
    }

    pub fn library(&self, species: Species) -> Option<&ClipLibrary> {
        self.libraries.get(&species)
    }
}

/// One school and the species it is drawn as.
#[derive(Debug, Clone)]
pub struct SchoolEntry {
    pub species: Species,
    pub school: School,
}

/// The whole tank.
pub struct Aquarium {
    config: AquariumConfig,
    noise: SimplexNoise,
    schools: Vec<SchoolEntry>,
    bubbles: Bubbles,
    seaweed: Seaweed,
    floor: Heightfield,
    pebbles: Vec<Pebble>,
    frame: u64,
    elapsed: f64,
}

impl Aquarium {
    /// Validates `config` and builds the tank.
    pub fn new(config: &AquariumConfig, clips: &ClipCatalog) -> Result<Self, AquariumError> {
        config.validate()?;
        let bounds = config.bounds;
        let root = Xorshift64::new(config.seed);
        let noise = SimplexNoise::new(noise_seed(config.seed));

        let mut school_rng = root.fork("schools");
        let per_school = config.agents_per_school();
        let empty = ClipLibrary::default();
        let mut schools = Vec::with_capacity(config.school_count);
        for _ in 0..config.school_count {
            let species = school_rng
                .pick(&Species::ALL)
                .copied()
                .unwrap_or(Species::Koi);
            let mut school = School::create(
                per_school,
                bounds,
                &config.fish,
                config.easing,
                &mut school_rng,
            )?;
            let library = clips.library(species).unwrap_or(&empty);
            school.bind_animations(library, &ClipSelection::Named(species.clip_name().into()));
            schools.push(SchoolEntry { species, school });
        }

        let floor = Heightfield::for_bounds(&noise, bounds)?;
        let pebbles =
            terrain::scatter_pebbles(config.pebble_count, bounds, &floor, &mut root.fork("pebbles"));

        let mut bubbles = Bubbles::new(
            BubbleParams::from_json(&config.bubbles)?,
            &mut root.fork("bubbles"),
        )?;
        bubbles.set_origin(Self::bubble_emitter(bounds));

        let mut seaweed_params = SeaweedParams::from_json(&config.seaweed)?;
        if config.seaweed.get("spread_x").is_none() {
            seaweed_params.spread_x = bounds.x;
        }
        if config.seaweed.get("spread_z").is_none() {
            seaweed_params.spread_z = bounds.z;
        }
        let seaweed = Seaweed::new(seaweed_params, &mut root.fork("seaweed"), &|x, z| {
            floor.height_at(x, z)
        })?;

        log::info!(
            "aquarium: {} schools x {} fish, {} bubbles, {} seaweed, {} pebbles",
            schools.len(),
            per_school,
            bubbles.instances().count(),
            seaweed.instances().count(),
            pebbles.len()
        );

        Ok(Self {
            config: config.clone(),
            noise,
            schools,
            bubbles,
            seaweed,
            floor,
            pebbles,
            frame: 0,
            elapsed: 0.0,
        })
    }

    /// The bubble column sits left of center, near the back of the roaming box.
    pub fn bubble_emitter(bounds: DVec3) -> DVec3 {
        DVec3::new(-0.2 * bounds.x, 0.0, -bounds.z + 3.0)
    }

    /// Advances one host frame.
    pub fn tick(&mut self, dt: f64, elapsed: f64) {
        for entry in &mut self.schools {
            entry.school.tick(&self.noise, dt, elapsed);
        }
        self.bubbles.set_time(elapsed);
        self.seaweed.set_time(elapsed);
        self.frame += 1;
        self.elapsed = elapsed;
    }

    pub fn config(&self) -> &AquariumConfig {
        &self.config
    }

    pub fn schools(&self) -> &[SchoolEntry] {
        &self.schools
    }

    pub fn bubbles(&self) -> &Bubbles {
        &self.bubbles
    }

    pub fn seaweed(&self) -> &Seaweed {
        &self.seaweed
    }

    pub fn floor(&self) -> &Heightfield {
        &self.floor
    }

    pub fn pebbles(&self) -> &[Pebble] {
        &self.pebbles
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Both particle systems, for upload and per-frame uniform pushes.
    pub fn particle_systems(&self) -> [&dyn ParticleSystem; 2] {
        [&self.bubbles, &self.seaweed]
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            frame: self.frame,
            elapsed: self.elapsed,
            schools: self
                .schools
                .iter()
                .map(|entry| SchoolFrame {
                    species: entry.species,
                    model: entry.species.model_path().to_string(),
                    agents: entry.school.transforms(),
                })
                .collect(),
            particles: self
                .particle_systems()
                .iter()
                .map(|system| ParticleFrame {
                    name: system.name().to_string(),
                    instance_count: system.instances().count(),
                    uniforms: system.uniforms().clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_core::TIME_UNIFORM;
    use aquarium_school::ClipSource;
    use serde_json::json;

    fn small_config(seed: u64) -> AquariumConfig {
        AquariumConfig::from_json(&json!({
            "seed": seed,
            "total_fish_count": 6,
            "school_count": 2,
            "pebble_count": 5,
            "bubbles": {"count": 8},
            "seaweed": {"count": 10, "segments": 4}
        }))
        .unwrap()
    }

    fn tank(seed: u64) -> Aquarium {
        Aquarium::new(&small_config(seed), &ClipCatalog::swim_clips(1.0)).unwrap()
    }

    #[test]
    fn builds_everything_from_config() {
        let a = tank(42);
        assert_eq!(a.schools().len(), 2);
        assert!(a.schools().iter().all(|e| e.school.len() == 3));
        assert_eq!(a.bubbles().instances().count(), 8);
        assert_eq!(a.seaweed().instances().count(), 10);
        assert_eq!(a.pebbles().len(), 5);
        assert_eq!(a.frame(), 0);
    }

    #[test]
    fn default_config_builds_stock_tank() {
        let a = Aquarium::new(&AquariumConfig::default(), &ClipCatalog::swim_clips(1.0)).unwrap();
        assert_eq!(a.frame_state().agent_count(), 15);
        assert_eq!(a.bubbles().instances().count(), 20);
        assert_eq!(a.seaweed().instances().count(), 250);
        assert_eq!(a.pebbles().len(), 50);
    }

    #[test]
    fn invalid_config_fails_construction() {
        let mut config = small_config(1);
        config.bounds = DVec3::new(60.0, -1.0, 10.0);
        assert!(Aquarium::new(&config, &ClipCatalog::default()).is_err());
        let mut config = small_config(1);
        config.bubbles = json!({"ceiling": 0.0});
        assert!(Aquarium::new(&config, &ClipCatalog::default()).is_err());
    }

    #[test]
    fn malformed_particle_config_fails_construction() {
        let mut config = small_config(1);
        config.bubbles = json!({"count": -5});
        assert!(matches!(
            Aquarium::new(&config, &ClipCatalog::default()),
            Err(AquariumError::InvalidConfig(_))
        ));
        let mut config = small_config(1);
        config.seaweed = json!({"count": "many"});
        assert!(matches!(
            Aquarium::new(&config, &ClipCatalog::default()),
            Err(AquariumError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_particle_systems_are_allowed() {
        let mut config = small_config(2);
        config.bubbles = json!({"count": 0});
        config.seaweed = json!({"count": 0});
        let mut a = Aquarium::new(&config, &ClipCatalog::default()).unwrap();
        a.tick(0.1, 0.1);
        assert_eq!(a.bubbles().instances().count(), 0);
        assert_eq!(a.seaweed().instances().count(), 0);
        assert_eq!(a.frame_state().particles.len(), 2);
    }

    #[test]
    fn tick_pushes_time_to_particles() {
        let mut a = tank(3);
        a.tick(1.0 / 60.0, 2.0);
        for system in a.particle_systems() {
            assert_eq!(system.uniforms().float(TIME_UNIFORM), Some(2.0));
        }
        assert_eq!(a.frame(), 1);
        assert_eq!(a.elapsed(), 2.0);
    }

    #[test]
    fn same_seed_same_frames() {
        let mut a = tank(11);
        let mut b = tank(11);
        for frame in 1..=30 {
            let elapsed = frame as f64 / 30.0;
            a.tick(1.0 / 30.0, elapsed);
            b.tick(1.0 / 30.0, elapsed);
        }
        assert_eq!(a.frame_state(), b.frame_state());
    }

    #[test]
    fn swim_clips_animate_every_fish() {
        let mut a = tank(5);
        for frame in 1..=60 {
            a.tick(1.0 / 60.0, frame as f64 / 60.0);
        }
        for school in a.frame_state().schools {
            for agent in school.agents {
                assert!((agent.playback_time - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn missing_clips_leave_fish_static_but_moving() {
        let mut a = Aquarium::new(&small_config(5), &ClipCatalog::default()).unwrap();
        for frame in 1..=60 {
            a.tick(1.0 / 60.0, frame as f64 / 60.0);
        }
        let state = a.frame_state();
        assert!(state
            .schools
            .iter()
            .flat_map(|s| &s.agents)
            .all(|t| t.playback_time == 0.0));
        assert!(state
            .schools
            .iter()
            .flat_map(|s| &s.agents)
            .any(|t| t.position != DVec3::ZERO));
    }

    #[test]
    fn seaweed_is_rooted_on_the_floor() {
        let a = tank(8);
        for blade in a.seaweed().blades() {
            let ground = a.floor().height_at(blade.offset.x, blade.offset.z);
            assert_eq!(blade.offset.y, ground);
            assert!(blade.offset.x.abs() <= a.config().bounds.x);
        }
    }

    #[test]
    fn bubbles_rise_from_the_emitter() {
        let a = tank(8);
        let emitter = Aquarium::bubble_emitter(a.config().bounds);
        assert_eq!(a.bubbles().origin(), emitter);
    }

    #[test]
    fn clip_catalog_parses_species_keys() {
        let catalog = ClipCatalog::from_json(&json!({
            "gold_fish": [{"name": "Armature|Swim", "duration": 0.8}]
        }))
        .unwrap();
        let lib = catalog.library(Species::GoldFish).unwrap();
        assert_eq!(lib.clips().len(), 1);
        assert!(catalog.library(Species::Koi).is_none());
        assert!(ClipCatalog::from_json(&json!({"shark": []})).is_err());
    }
}
