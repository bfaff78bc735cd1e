//! Binding skeletal animation clips to agents and advancing their playback.
//!
//! Only clip names and durations are inspected; pose evaluation belongs to
//! the renderer. A binding whose clip cannot be found is kept but has no
//! active actions, so the fish holds its rest pose while the rest of the
//! school animates normally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name and length of one clip shipped with a skeletal asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds; a non-positive duration plays as a single frozen frame.
    pub duration: f64,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Anything that exposes named clips, typically a loaded model.
pub trait ClipSource {
    fn clips(&self) -> &[AnimationClip];

    fn find(&self, name: &str) -> Option<&AnimationClip> {
        self.clips().iter().find(|c| c.name == name)
    }

    fn clip_names(&self) -> Vec<&str> {
        self.clips().iter().map(|c| c.name.as_str()).collect()
    }
}

/// A plain list of clips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipLibrary {
    clips: Vec<AnimationClip>,
}

impl ClipLibrary {
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        Self { clips }
    }
}

impl ClipSource for ClipLibrary {
    fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }
}

/// Which clips a binding plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipSelection {
    Named(String),
    All,
}

impl fmt::Display for ClipSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipSelection::Named(name) => f.write_str(name),
            ClipSelection::All => f.write_str("all"),
        }
    }
}

impl FromStr for ClipSelection {
    type Err = std::convert::Infallible;

    /// `"all"` selects every clip; anything else is a clip name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => ClipSelection::All,
            name => ClipSelection::Named(name.to_string()),
        })
    }
}

/// One playing clip and its local time, wrapped to the clip duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipAction {
    pub clip: String,
    pub duration: f64,
    pub time: f64,
}

impl ClipAction {
    fn advance(&mut self, dt: f64) {
        if self.duration > 0.0 {
            self.time = (self.time + dt).rem_euclid(self.duration);
        }
    }
}

/// The animation state of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationBinding {
    agent_index: usize,
    selection: ClipSelection,
    actions: Vec<ClipAction>,
    playback_time: f64,
}

impl AnimationBinding {
    /// Resolves `selection` against `source`.
    ///
    /// A named clip that `source` does not have is logged at warn level with
    /// the names that are available, and yields an unanimated binding.
    pub fn bind(agent_index: usize, source: &dyn ClipSource, selection: ClipSelection) -> Self {
        let actions: Vec<ClipAction> = match &selection {
            ClipSelection::All => source.clips().iter().map(ClipAction::from).collect(),
            ClipSelection::Named(name) => match source.find(name) {
                Some(clip) => vec![ClipAction::from(clip)],
                None => {
                    log::warn!(
                        "agent {agent_index}: clip not found: {name:?}; available clips: {:?}",
                        source.clip_names()
                    );
                    Vec::new()
                }
            },
        };
        Self {
            agent_index,
            selection,
            actions,
            playback_time: 0.0,
        }
    }

    /// Steps every active clip by `dt`. Unanimated bindings ignore the call,
    /// as does a non-finite `dt`.
    pub fn advance(&mut self, dt: f64) {
        if self.actions.is_empty() || !dt.is_finite() {
            return;
        }
        for action in &mut self.actions {
            action.advance(dt);
        }
        self.playback_time += dt;
    }

    pub fn agent_index(&self) -> usize {
        self.agent_index
    }

    pub fn selection(&self) -> &ClipSelection {
        &self.selection
    }

    pub fn actions(&self) -> &[ClipAction] {
        &self.actions
    }

    pub fn is_animated(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Total seconds of playback since binding.
    pub fn playback_time(&self) -> f64 {
        self.playback_time
    }
}

impl From<&AnimationClip> for ClipAction {
    fn from(clip: &AnimationClip) -> Self {
        Self {
            clip: clip.name.clone(),
            duration: clip.duration,
            time: 0.0,
        }
    }
}

/// Bindings for every agent of a school, indexed like the agents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationBinder {
    bindings: Vec<Option<AnimationBinding>>,
}

impl AnimationBinder {
    pub fn new(agent_count: usize) -> Self {
        Self {
            bindings: vec![None; agent_count],
        }
    }

    /// Binds (or rebinds) one agent. Out-of-range indices are ignored and
    /// return `None`.
    pub fn bind(
        &mut self,
        agent_index: usize,
        source: &dyn ClipSource,
        selection: ClipSelection,
    ) -> Option<&AnimationBinding> {
        let slot = self.bindings.get_mut(agent_index)?;
        *slot = Some(AnimationBinding::bind(agent_index, source, selection));
        slot.as_ref()
    }

    /// Advances one agent's binding; agents never bound stay at time 0.
    pub fn advance(&mut self, agent_index: usize, dt: f64) {
        if let Some(Some(binding)) = self.bindings.get_mut(agent_index) {
            binding.advance(dt);
        }
    }

    pub fn binding(&self, agent_index: usize) -> Option<&AnimationBinding> {
        self.bindings.get(agent_index).and_then(Option::as_ref)
    }

    /// Playback time for an agent, 0 if it was never bound.
    pub fn playback_time(&self, agent_index: usize) -> f64 {
        self.binding(agent_index)
            .map(AnimationBinding::playback_time)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> ClipLibrary {
        ClipLibrary::new(vec![
            AnimationClip::new("Fish_Armature|Swimming_Normal", 1.0),
            AnimationClip::new("Fish_Armature|Swimming_Fast", 0.5),
        ])
    }

    #[test]
    fn named_clip_is_bound_and_loops() {
        let mut b = AnimationBinding::bind(
            0,
            &library(),
            ClipSelection::Named("Fish_Armature|Swimming_Normal".into()),
        );
        assert!(b.is_animated());
        for _ in 0..15 {
            b.advance(0.1);
        }
        assert!((b.playback_time() - 1.5).abs() < 1e-12);
        assert!((b.actions()[0].time - 0.5).abs() < 1e-9);
    }

    #[test]
    fn all_binds_every_clip() {
        let mut b = AnimationBinding::bind(3, &library(), ClipSelection::All);
        assert_eq!(b.actions().len(), 2);
        b.advance(0.75);
        assert!((b.actions()[0].time - 0.75).abs() < 1e-12);
        assert!((b.actions()[1].time - 0.25).abs() < 1e-12);
    }

    #[test]
    fn missing_clip_leaves_agent_static() {
        let mut b = AnimationBinding::bind(1, &library(), ClipSelection::Named("Armature|Swim".into()));
        assert!(!b.is_animated());
        for _ in 0..100 {
            b.advance(1.0 / 60.0);
        }
        assert_eq!(b.playback_time(), 0.0);
    }

    #[test]
    fn missing_clip_does_not_stop_other_agents() {
        let lib = library();
        let mut binder = AnimationBinder::new(3);
        binder.bind(0, &lib, ClipSelection::Named("Fish_Armature|Swimming_Normal".into()));
        binder.bind(1, &lib, ClipSelection::Named("nope".into()));
        binder.bind(2, &lib, ClipSelection::All);
        for _ in 0..10 {
            for i in 0..binder.len() {
                binder.advance(i, 0.1);
            }
        }
        assert!((binder.playback_time(0) - 1.0).abs() < 1e-12);
        assert_eq!(binder.playback_time(1), 0.0);
        assert!((binder.playback_time(2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_source_with_all_is_static() {
        let b = AnimationBinding::bind(0, &ClipLibrary::default(), ClipSelection::All);
        assert!(!b.is_animated());
    }

    #[test]
    fn zero_duration_clip_stays_at_start() {
        let lib = ClipLibrary::new(vec![AnimationClip::new("pose", 0.0)]);
        let mut b = AnimationBinding::bind(0, &lib, ClipSelection::All);
        b.advance(0.5);
        assert_eq!(b.actions()[0].time, 0.0);
        assert!((b.playback_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_dt_is_ignored() {
        let mut b = AnimationBinding::bind(0, &library(), ClipSelection::All);
        b.advance(f64::NAN);
        b.advance(f64::INFINITY);
        assert_eq!(b.playback_time(), 0.0);
    }

    #[test]
    fn binder_ignores_out_of_range_index() {
        let mut binder = AnimationBinder::new(1);
        assert!(binder.bind(5, &library(), ClipSelection::All).is_none());
        binder.advance(5, 1.0);
        assert_eq!(binder.playback_time(5), 0.0);
    }

    #[test]
    fn rebinding_resets_playback() {
        let lib = library();
        let mut binder = AnimationBinder::new(1);
        binder.bind(0, &lib, ClipSelection::All);
        binder.advance(0, 0.3);
        binder.bind(0, &lib, ClipSelection::All);
        assert_eq!(binder.playback_time(0), 0.0);
    }

    #[test]
    fn selection_parses_all_keyword() {
        assert_eq!("all".parse::<ClipSelection>().unwrap(), ClipSelection::All);
        assert_eq!(
            "Armature|Swim".parse::<ClipSelection>().unwrap(),
            ClipSelection::Named("Armature|Swim".into())
        );
        assert_eq!(ClipSelection::All.to_string(), "all");
    }

    #[test]
    fn library_deserializes_from_plain_array() {
        let lib: ClipLibrary =
            serde_json::from_str(r#"[{"name": "Armature|Swim", "duration": 1.25}]"#).unwrap();
        assert_eq!(lib.find("Armature|Swim").map(|c| c.duration), Some(1.25));
        assert_eq!(lib.clip_names(), ["Armature|Swim"]);
    }
}
