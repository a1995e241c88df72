use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Pricing plan of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPlan {
    /// Free tier.
    Free,
    /// Paid tier.
    Pro,
}

/// Hosting region of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRegion {
    /// European Union.
    Eu,
    /// United States.
    Us,
}

/// Acquisition channel of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentChannel {
    /// Signed up without sales contact.
    SelfServe,
    /// Sales-assisted signup.
    Sales,
}

/// Onboarding experiment arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentVariant {
    /// Baseline onboarding.
    Control,
    /// Experimental onboarding.
    Treatment,
}

impl SegmentPlan {
    const ALL: [Self; 2] = [Self::Free, Self::Pro];

    /// Returns the stable property value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    /// Returns the human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Pro => "Pro",
        }
    }
}

impl SegmentRegion {
    const ALL: [Self; 2] = [Self::Eu, Self::Us];

    /// Returns the stable property value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eu => "eu",
            Self::Us => "us",
        }
    }

    /// Returns the human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Eu => "EU",
            Self::Us => "US",
        }
    }
}

impl SegmentChannel {
    const ALL: [Self; 2] = [Self::SelfServe, Self::Sales];

    /// Returns the stable property value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfServe => "self_serve",
            Self::Sales => "sales",
        }
    }

    /// Returns the human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SelfServe => "Self-Serve",
            Self::Sales => "Sales",
        }
    }
}

impl ExperimentVariant {
    const ALL: [Self; 2] = [Self::Control, Self::Treatment];

    /// Returns the stable property value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Treatment => "treatment",
        }
    }

    /// Returns the human readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Control => "Control",
            Self::Treatment => "Treatment",
        }
    }
}

/// Segment a workspace is attributed to for funnel breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentSelection {
    /// Pricing plan.
    pub plan: SegmentPlan,
    /// Hosting region.
    pub region: SegmentRegion,
    /// Acquisition channel.
    pub channel: SegmentChannel,
    /// Experiment arm.
    pub variant: ExperimentVariant,
}

impl Default for SegmentSelection {
    fn default() -> Self {
        Self {
            plan: SegmentPlan::Free,
            region: SegmentRegion::Eu,
            channel: SegmentChannel::SelfServe,
            variant: ExperimentVariant::Control,
        }
    }
}

impl SegmentSelection {
    /// Returns every plan/region/channel/variant combination.
    #[must_use]
    pub fn all_combinations() -> Vec<Self> {
        let mut combinations = Vec::with_capacity(16);
        for plan in SegmentPlan::ALL {
            for region in SegmentRegion::ALL {
                for channel in SegmentChannel::ALL {
                    for variant in ExperimentVariant::ALL {
                        combinations.push(Self {
                            plan,
                            region,
                            channel,
                            variant,
                        });
                    }
                }
            }
        }

        combinations
    }

    /// Returns the event properties attributing an event to this segment.
    #[must_use]
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert("segment_plan".to_owned(), json!(self.plan.as_str()));
        properties.insert("segment_region".to_owned(), json!(self.region.as_str()));
        properties.insert("segment_channel".to_owned(), json!(self.channel.as_str()));
        properties.insert(
            "experiment_variant".to_owned(),
            json!(self.variant.as_str()),
        );
        properties
    }

    /// Returns a one-line human readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        [
            self.plan.label().to_owned(),
            self.region.label().to_owned(),
            self.channel.label().to_owned(),
            format!("Variant: {}", self.variant.label()),
        ]
        .join(" \u{2022} ")
    }
}
