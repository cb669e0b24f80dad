use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Poses offered on the pose-selection surface.
///
/// Tags are kebab-case (`holding-hands`, `group-photo`, ...) both on the wire
/// and in the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pose {
    Hugging,
    Standing,
    Sitting,
    HoldingHands,
    ShoulderToShoulder,
    ParentChild,
    GroupPhoto,
    Casual,
}

impl Pose {
    pub const ALL: [Pose; 8] = [
        Pose::Hugging,
        Pose::Standing,
        Pose::Sitting,
        Pose::HoldingHands,
        Pose::ShoulderToShoulder,
        Pose::ParentChild,
        Pose::GroupPhoto,
        Pose::Casual,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Pose::Hugging => "hugging",
            Pose::Standing => "standing",
            Pose::Sitting => "sitting",
            Pose::HoldingHands => "holding-hands",
            Pose::ShoulderToShoulder => "shoulder-to-shoulder",
            Pose::ParentChild => "parent-child",
            Pose::GroupPhoto => "group-photo",
            Pose::Casual => "casual",
        }
    }

    /// Human-readable card title
    pub fn label(self) -> &'static str {
        match self {
            Pose::Hugging => "Hugging",
            Pose::Standing => "Standing Together",
            Pose::Sitting => "Sitting Together",
            Pose::HoldingHands => "Holding Hands",
            Pose::ShoulderToShoulder => "Shoulder to Shoulder",
            Pose::ParentChild => "Parent & Child",
            Pose::GroupPhoto => "Family Portrait",
            Pose::Casual => "Casual",
        }
    }

    /// Canned phrase inserted into the generation instruction
    pub fn description(self) -> &'static str {
        match self {
            Pose::Hugging => {
                "two people hugging each other warmly in a loving embrace, standing close together"
            }
            Pose::Standing => {
                "two people standing side by side, shoulder to shoulder, in a friendly pose"
            }
            Pose::Sitting => {
                "two people sitting next to each other in a relaxed, comfortable position"
            }
            Pose::HoldingHands => {
                "two people holding hands affectionately, standing close together"
            }
            Pose::ShoulderToShoulder => {
                "two people standing with shoulders touching, in a friendly casual pose"
            }
            Pose::ParentChild => {
                "a parent and child in a loving family moment, with parent protective and caring"
            }
            Pose::GroupPhoto => {
                "two people posing together for a family portrait, looking at camera with warm smiles"
            }
            Pose::Casual => "two people in a natural, casual stance standing together",
        }
    }

    /// Look up a pose by tag. Matching ignores case and surrounding whitespace.
    pub fn from_tag(tag: &str) -> Option<Pose> {
        let normalized = tag.trim().to_lowercase();
        Pose::ALL.into_iter().find(|pose| pose.tag() == normalized)
    }

    /// Resolve a tag, falling back to [`Pose::Casual`] for anything unrecognized.
    pub fn from_tag_or_casual(tag: &str) -> Pose {
        Pose::from_tag(tag).unwrap_or(Pose::Casual)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pose: {0}")]
pub struct UnknownPose(pub String);

impl FromStr for Pose {
    type Err = UnknownPose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pose::from_tag(s).ok_or_else(|| UnknownPose(s.to_string()))
    }
}

/// Build the natural-language instruction for a pose tag.
///
/// Deterministic for a given tag. Unknown tags use the "casual" phrase.
pub fn build_instruction(pose_tag: &str) -> String {
    let description = Pose::from_tag_or_casual(pose_tag).description();

    format!(
        "Create a highly realistic, photorealistic image showing {description}.
The image should look natural and professionally photographed with:
- Realistic lighting and shadows that match between both people
- Proper depth of field and bokeh in background
- Natural skin tones and textures
- Cohesive composition with both people in the same environment
- Professional photography quality
- Warm, inviting atmosphere
- High detail and clarity
- The two people should appear to genuinely be in the same photograph together
Make it look like a real photograph that was taken in one shot, not a composite."
    )
}
