use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Predefined marker vocabularies understood by the detector backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Dictionary {
    #[value(name = "4x4-50")]
    #[serde(rename = "4x4-50")]
    Dict4x4_50,
    #[value(name = "4x4-100")]
    #[serde(rename = "4x4-100")]
    Dict4x4_100,
    #[value(name = "4x4-250")]
    #[serde(rename = "4x4-250")]
    Dict4x4_250,
    #[value(name = "4x4-1000")]
    #[serde(rename = "4x4-1000")]
    Dict4x4_1000,
    #[value(name = "5x5-50")]
    #[serde(rename = "5x5-50")]
    Dict5x5_50,
    #[value(name = "5x5-100")]
    #[serde(rename = "5x5-100")]
    Dict5x5_100,
    #[value(name = "5x5-250")]
    #[serde(rename = "5x5-250")]
    Dict5x5_250,
    #[value(name = "5x5-1000")]
    #[serde(rename = "5x5-1000")]
    Dict5x5_1000,
    #[value(name = "6x6-50")]
    #[serde(rename = "6x6-50")]
    Dict6x6_50,
    #[value(name = "6x6-100")]
    #[serde(rename = "6x6-100")]
    Dict6x6_100,
    #[default]
    #[value(name = "6x6-250")]
    #[serde(rename = "6x6-250")]
    Dict6x6_250,
    #[value(name = "6x6-1000")]
    #[serde(rename = "6x6-1000")]
    Dict6x6_1000,
    #[value(name = "7x7-50")]
    #[serde(rename = "7x7-50")]
    Dict7x7_50,
    #[value(name = "7x7-100")]
    #[serde(rename = "7x7-100")]
    Dict7x7_100,
    #[value(name = "7x7-250")]
    #[serde(rename = "7x7-250")]
    Dict7x7_250,
    #[value(name = "7x7-1000")]
    #[serde(rename = "7x7-1000")]
    Dict7x7_1000,
    ArucoOriginal,
    #[value(name = "apriltag-16h5")]
    #[serde(rename = "apriltag-16h5")]
    AprilTag16h5,
    #[value(name = "apriltag-25h9")]
    #[serde(rename = "apriltag-25h9")]
    AprilTag25h9,
    #[value(name = "apriltag-36h10")]
    #[serde(rename = "apriltag-36h10")]
    AprilTag36h10,
    #[value(name = "apriltag-36h11")]
    #[serde(rename = "apriltag-36h11")]
    AprilTag36h11,
    #[value(name = "aruco-mip-36h12")]
    #[serde(rename = "aruco-mip-36h12")]
    ArucoMip36h12,
}

impl Dictionary {
    pub fn name(&self) -> &'static str {
        use Dictionary::*;
        match self {
            Dict4x4_50 => "4x4-50",
            Dict4x4_100 => "4x4-100",
            Dict4x4_250 => "4x4-250",
            Dict4x4_1000 => "4x4-1000",
            Dict5x5_50 => "5x5-50",
            Dict5x5_100 => "5x5-100",
            Dict5x5_250 => "5x5-250",
            Dict5x5_1000 => "5x5-1000",
            Dict6x6_50 => "6x6-50",
            Dict6x6_100 => "6x6-100",
            Dict6x6_250 => "6x6-250",
            Dict6x6_1000 => "6x6-1000",
            Dict7x7_50 => "7x7-50",
            Dict7x7_100 => "7x7-100",
            Dict7x7_250 => "7x7-250",
            Dict7x7_1000 => "7x7-1000",
            ArucoOriginal => "aruco-original",
            AprilTag16h5 => "apriltag-16h5",
            AprilTag25h9 => "apriltag-25h9",
            AprilTag36h10 => "apriltag-36h10",
            AprilTag36h11 => "apriltag-36h11",
            ArucoMip36h12 => "aruco-mip-36h12",
        }
    }

}

impl std::fmt::Display for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
