//! Built-in demo data: the dashboard snapshot, six months of KPI history and
//! a daily series with two spikes for the anomaly view.

use serde::Serialize;

use crate::analyze::anomaly::SeriesPoint;

#[derive(Debug, Clone, Serialize)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: &'static str,
    pub change: &'static str,
}

pub const CURRENT_KPIS: [KpiCard; 4] = [
    KpiCard {
        title: "Water Usage",
        value: "89%",
        change: "+2.1%",
    },
    KpiCard {
        title: "Energy Consumption",
        value: "85%",
        change: "-1.5%",
    },
    KpiCard {
        title: "Air Quality Index",
        value: "92",
        change: "+4.2%",
    },
    KpiCard {
        title: "Temperature",
        value: "24°C",
        change: "+0.8°C",
    },
];

const MONTHS: [&str; 6] = ["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"];
const WATER: [f64; 6] = [85.0, 88.0, 82.0, 90.0, 86.0, 89.0];
const ENERGY: [f64; 6] = [92.0, 89.0, 94.0, 87.0, 91.0, 85.0];
const AIR: [f64; 6] = [78.0, 82.0, 85.0, 79.0, 88.0, 92.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKpi {
    Water,
    Energy,
    Air,
}

impl SampleKpi {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" => Some(SampleKpi::Water),
            "energy" => Some(SampleKpi::Energy),
            "air" | "air_quality" => Some(SampleKpi::Air),
            _ => None,
        }
    }

    fn values(self) -> &'static [f64; 6] {
        match self {
            SampleKpi::Water => &WATER,
            SampleKpi::Energy => &ENERGY,
            SampleKpi::Air => &AIR,
        }
    }
}

pub fn kpi_history(kpi: SampleKpi) -> Vec<SeriesPoint> {
    MONTHS
        .iter()
        .zip(kpi.values().iter())
        .map(|(m, v)| SeriesPoint::new(*m, *v))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyKpis {
    pub month: &'static str,
    pub water: f64,
    pub energy: f64,
    pub air: f64,
}

pub fn monthly_overview() -> Vec<MonthlyKpis> {
    (0..MONTHS.len())
        .map(|i| MonthlyKpis {
            month: MONTHS[i],
            water: WATER[i],
            energy: ENERGY[i],
            air: AIR[i],
        })
        .collect()
}

pub fn anomaly_sample() -> Vec<SeriesPoint> {
    [
        ("2024-01-01", 85.0),
        ("2024-01-02", 92.0),
        ("2024-01-03", 88.0),
        ("2024-01-04", 125.0),
        ("2024-01-05", 90.0),
        ("2024-01-06", 87.0),
        ("2024-01-07", 145.0),
        ("2024-01-08", 89.0),
        ("2024-01-09", 91.0),
        ("2024-01-10", 86.0),
    ]
    .into_iter()
    .map(|(d, v)| SeriesPoint::new(d, v))
    .collect()
}
