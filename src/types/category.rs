use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryKind {
    /// Short all-out efforts; ranked on the single fastest stroke.
    PeakPower { max_distance_m: u32 },
    SingleDistance {
        distance_m: u32,
        step_m: u32,
        splits: usize,
    },
    SingleTime {
        time_tenths: u32,
        step_tenths: u32,
        splits: usize,
    },
    DistanceIntervals { interval_m: u32, count: usize },
    TimeIntervals { interval_tenths: u32, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub slug: &'static str,
    pub title: &'static str,
    #[serde(flatten)]
    pub kind: CategoryKind,
}

pub const CATALOG: &[Category] = &[
    Category {
        slug: "peak_power",
        title: "Peak Power",
        kind: CategoryKind::PeakPower { max_distance_m: 100 },
    },
    Category {
        slug: "1min",
        title: "1 Minute",
        kind: CategoryKind::SingleTime {
            time_tenths: 600,
            step_tenths: 600,
            splits: 0,
        },
    },
    Category {
        slug: "1k",
        title: "1km",
        kind: CategoryKind::SingleDistance {
            distance_m: 1000,
            step_m: 200,
            splits: 5,
        },
    },
    Category {
        slug: "2k",
        title: "2km",
        kind: CategoryKind::SingleDistance {
            distance_m: 2000,
            step_m: 250,
            splits: 8,
        },
    },
    Category {
        slug: "6k",
        title: "6km",
        kind: CategoryKind::SingleDistance {
            distance_m: 6000,
            step_m: 500,
            splits: 12,
        },
    },
    Category {
        slug: "hour",
        title: "Hour of Power",
        kind: CategoryKind::SingleTime {
            time_tenths: 36_000,
            step_tenths: 3_000,
            splits: 12,
        },
    },
    Category {
        slug: "4x1k",
        title: "4x1km",
        kind: CategoryKind::DistanceIntervals {
            interval_m: 1000,
            count: 4,
        },
    },
    Category {
        slug: "3x6k",
        title: "3x6km",
        kind: CategoryKind::DistanceIntervals {
            interval_m: 6000,
            count: 3,
        },
    },
    Category {
        slug: "3x12min",
        title: "3x12min",
        kind: CategoryKind::TimeIntervals {
            interval_tenths: 7_200,
            count: 3,
        },
    },
    Category {
        slug: "3x30min",
        title: "3x30min",
        kind: CategoryKind::TimeIntervals {
            interval_tenths: 18_000,
            count: 3,
        },
    },
];

impl Category {
    pub fn find(slug: &str) -> Option<&'static Category> {
        CATALOG.iter().find(|category| category.slug.eq_ignore_ascii_case(slug))
    }

    pub fn split_columns(&self) -> usize {
        match self.kind {
            CategoryKind::PeakPower { .. } => 0,
            CategoryKind::SingleDistance { splits, .. }
            | CategoryKind::SingleTime { splits, .. } => splits,
            CategoryKind::DistanceIntervals { count, .. }
            | CategoryKind::TimeIntervals { count, .. } => count,
        }
    }

    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = ["Name", "Bike", "Date"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        match self.kind {
            CategoryKind::PeakPower { .. } => {}
            CategoryKind::SingleDistance { .. } => header.push("Time".to_string()),
            CategoryKind::SingleTime { .. } => header.push("Distance".to_string()),
            CategoryKind::DistanceIntervals { .. } | CategoryKind::TimeIntervals { .. } => {}
        }

        let split_label = match self.kind {
            CategoryKind::PeakPower { .. } => "Split",
            _ => "Avg Split",
        };
        header.extend([split_label, "Watts", "SPM"].iter().map(|s| s.to_string()));

        match self.kind {
            CategoryKind::PeakPower { .. } => {}
            CategoryKind::SingleDistance { step_m, splits, .. } => {
                header.extend((1..=splits as u32).map(|k| format!("{}m", k * step_m)));
            }
            CategoryKind::SingleTime {
                step_tenths, splits, ..
            } => {
                header.extend((1..=splits as u32).map(|k| minutes_label(k * step_tenths)));
            }
            CategoryKind::DistanceIntervals { count, .. }
            | CategoryKind::TimeIntervals { count, .. } => {
                header.extend((1..=count).map(|k| format!("Split {}", k)));
            }
        }

        header
    }
}

fn minutes_label(tenths: u32) -> String {
    format!("{}:{:02}", tenths / 600, (tenths / 10) % 60)
}
