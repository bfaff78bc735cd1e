//! Fish species and the asset each one is drawn with.

use aquarium_core::error::AquariumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Swim clip shared by most of the fish models.
pub const SWIM_CLIP: &str = "Fish_Armature|Swimming_Normal";

/// Every species a school can be made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Koi,
    GoldFish,
    BlueTang,
    Betta,
    MandarinFish,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Koi,
        Species::GoldFish,
        Species::BlueTang,
        Species::Betta,
        Species::MandarinFish,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Species::Koi => "koi",
            Species::GoldFish => "gold_fish",
            Species::BlueTang => "blue_tang",
            Species::Betta => "betta",
            Species::MandarinFish => "mandarin_fish",
        }
    }

    /// Path of the skinned model, relative to the asset root.
    pub fn model_path(self) -> &'static str {
        match self {
            Species::Koi => "/models/koi.glb",
            Species::GoldFish => "/models/gold_fish.glb",
            Species::BlueTang => "/models/blue_tang.glb",
            Species::Betta => "/models/betta.glb",
            Species::MandarinFish => "/models/mandarin_fish.glb",
        }
    }

    /// The swim clip baked into the model.
    pub fn clip_name(self) -> &'static str {
        match self {
            Species::GoldFish => "Armature|Swim",
            _ => SWIM_CLIP,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, AquariumError> {
        Species::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| AquariumError::UnknownSpecies(name.to_string()))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = AquariumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for species in Species::ALL {
            assert_eq!(Species::from_name(species.name()).unwrap(), species);
            assert_eq!(species.to_string().parse::<Species>().unwrap(), species);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        match Species::from_name("shark") {
            Err(AquariumError::UnknownSpecies(name)) => assert_eq!(name, "shark"),
            other => panic!("expected UnknownSpecies, got {other:?}"),
        }
    }

    #[test]
    fn gold_fish_uses_its_own_rig() {
        assert_eq!(Species::GoldFish.clip_name(), "Armature|Swim");
        assert_eq!(Species::Koi.clip_name(), SWIM_CLIP);
    }

    #[test]
    fn model_paths_are_distinct() {
        let mut paths: Vec<_> = Species::ALL.iter().map(|s| s.model_path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Species::ALL.len());
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&Species::MandarinFish).unwrap();
        assert_eq!(json, "\"mandarin_fish\"");
    }
}
