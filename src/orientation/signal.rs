//! Device orientation readings and the fixed orientation → view table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    UprightPortrait,
    RightLandscape,
    InvertedPortrait,
    LeftLandscape,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ToolView {
    Alarm,
    Stopwatch,
    Timer,
    Weather,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::UprightPortrait,
        Orientation::RightLandscape,
        Orientation::InvertedPortrait,
        Orientation::LeftLandscape,
    ];

    pub fn view(self) -> ToolView {
        match self {
            Orientation::UprightPortrait => ToolView::Alarm,
            Orientation::RightLandscape => ToolView::Stopwatch,
            Orientation::InvertedPortrait => ToolView::Timer,
            Orientation::LeftLandscape => ToolView::Weather,
        }
    }

    /// Screen-orientation type strings (`portrait-primary` and friends).
    pub fn from_screen_type(value: &str) -> Option<Self> {
        match value.trim() {
            "portrait-primary" => Some(Orientation::UprightPortrait),
            "landscape-primary" => Some(Orientation::RightLandscape),
            "portrait-secondary" => Some(Orientation::InvertedPortrait),
            "landscape-secondary" => Some(Orientation::LeftLandscape),
            _ => None,
        }
    }

    /// Legacy rotation angle in degrees; `-90` and `270` both mean left-landscape.
    pub fn from_angle(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Orientation::UprightPortrait),
            90 => Some(Orientation::RightLandscape),
            180 => Some(Orientation::InvertedPortrait),
            270 => Some(Orientation::LeftLandscape),
            _ => None,
        }
    }
}

impl ToolView {
    pub fn label(self) -> &'static str {
        match self {
            ToolView::Alarm => "Alarm Clock (Portrait ↑)",
            ToolView::Stopwatch => "Stopwatch (Landscape →)",
            ToolView::Timer => "Timer (Portrait ↓)",
            ToolView::Weather => "Weather (Landscape ←)",
        }
    }
}

/// One reading from whichever orientation source the host offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOrientation {
    ScreenType(String),
    Angle(i32),
    Dimensions { width: u32, height: u32 },
    Unknown,
}

impl RawOrientation {
    /// Chooses the best available source: orientation type, then angle, then window size.
    pub fn probe(
        screen_type: Option<String>,
        angle: Option<i32>,
        dimensions: Option<(u32, u32)>,
    ) -> Self {
        if let Some(kind) = screen_type {
            RawOrientation::ScreenType(kind)
        } else if let Some(degrees) = angle {
            RawOrientation::Angle(degrees)
        } else if let Some((width, height)) = dimensions {
            RawOrientation::Dimensions { width, height }
        } else {
            RawOrientation::Unknown
        }
    }

    /// Window-size readings arrive from resize events and get the longer debounce.
    pub fn is_dimension_heuristic(&self) -> bool {
        matches!(self, RawOrientation::Dimensions { .. })
    }
}

/// Anything unrecognised resolves to upright portrait.
pub fn resolve_orientation(raw: &RawOrientation) -> Orientation {
    let resolved = match raw {
        RawOrientation::ScreenType(kind) => Orientation::from_screen_type(kind),
        RawOrientation::Angle(degrees) => Orientation::from_angle(*degrees),
        RawOrientation::Dimensions { width, height } if width > height => {
            Some(Orientation::RightLandscape)
        }
        RawOrientation::Dimensions { .. } => Some(Orientation::UprightPortrait),
        RawOrientation::Unknown => None,
    };
    resolved.unwrap_or(Orientation::UprightPortrait)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_table_is_fixed() {
        let views: Vec<ToolView> = Orientation::ALL.iter().map(|o| o.view()).collect();
        assert_eq!(
            views,
            vec![
                ToolView::Alarm,
                ToolView::Stopwatch,
                ToolView::Timer,
                ToolView::Weather
            ]
        );
    }

    #[test]
    fn screen_types_resolve() {
        let cases = [
            ("portrait-primary", Orientation::UprightPortrait),
            ("landscape-primary", Orientation::RightLandscape),
            ("portrait-secondary", Orientation::InvertedPortrait),
            ("landscape-secondary", Orientation::LeftLandscape),
        ];
        for (kind, expected) in cases {
            assert_eq!(
                resolve_orientation(&RawOrientation::ScreenType(kind.into())),
                expected
            );
        }
    }

    #[test]
    fn angles_resolve_including_negative() {
        assert_eq!(
            resolve_orientation(&RawOrientation::Angle(0)),
            Orientation::UprightPortrait
        );
        assert_eq!(
            resolve_orientation(&RawOrientation::Angle(90)),
            Orientation::RightLandscape
        );
        assert_eq!(
            resolve_orientation(&RawOrientation::Angle(180)),
            Orientation::InvertedPortrait
        );
        assert_eq!(
            resolve_orientation(&RawOrientation::Angle(-90)),
            Orientation::LeftLandscape
        );
        assert_eq!(
            resolve_orientation(&RawOrientation::Angle(270)),
            Orientation::LeftLandscape
        );
    }

    #[test]
    fn dimensions_only_distinguish_two_orientations() {
        assert_eq!(
            resolve_orientation(&RawOrientation::Dimensions {
                width: 800,
                height: 600
            }),
            Orientation::RightLandscape
        );
        assert_eq!(
            resolve_orientation(&RawOrientation::Dimensions {
                width: 600,
                height: 600
            }),
            Orientation::UprightPortrait
        );
    }

    #[test]
    fn unrecognised_signals_default_to_upright() {
        assert_eq!(
            resolve_orientation(&RawOrientation::ScreenType("sideways".into())),
            Orientation::UprightPortrait
        );
        assert_eq!(
            resolve_orientation(&RawOrientation::Angle(45)),
            Orientation::UprightPortrait
        );
        assert_eq!(
            resolve_orientation(&RawOrientation::Unknown),
            Orientation::UprightPortrait
        );
    }

    #[test]
    fn probe_prefers_screen_type_then_angle() {
        assert_eq!(
            RawOrientation::probe(Some("landscape-primary".into()), Some(180), Some((1, 2))),
            RawOrientation::ScreenType("landscape-primary".into())
        );
        assert_eq!(
            RawOrientation::probe(None, Some(180), Some((1, 2))),
            RawOrientation::Angle(180)
        );
        assert_eq!(
            RawOrientation::probe(None, None, Some((3, 2))),
            RawOrientation::Dimensions {
                width: 3,
                height: 2
            }
        );
        assert_eq!(RawOrientation::probe(None, None, None), RawOrientation::Unknown);
    }
}
