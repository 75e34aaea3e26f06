//! Markdown sustainability report.
//!
//! Water and energy are utilisation percentages and use the 90/70 bands;
//! air quality is an index and uses 100/50. The two scales are kept apart
//! on purpose. Recommendations only change in the top band.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Average of water and energy above this yields the "needs improvement" conclusion.
pub const CONCLUSION_CUTOFF: f64 = 85.0;
pub const NOTES_PLACEHOLDER: &str = "No additional notes provided.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFields {
    pub city_name: String,
    pub report_type: String,
    #[serde(default)]
    pub water_usage: KpiLevel,
    #[serde(default)]
    pub energy_consumption: KpiLevel,
    #[serde(default)]
    pub air_quality: KpiLevel,
    #[serde(default)]
    pub additional_notes: String,
}

/// Form inputs arrive as text. Blank text is 0; unparsable text is NaN,
/// which compares false against every threshold and lands in the lowest band.
pub fn parse_kpi(raw: &str) -> f64 {
    let t = raw.trim();
    if t.is_empty() {
        return 0.0;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// A KPI as the caller supplied it. The text is echoed into the report
/// verbatim; the parsed number only drives banding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiLevel {
    text: String,
    value: f64,
}

impl KpiLevel {
    pub fn from_text(raw: impl Into<String>) -> Self {
        let text = raw.into();
        let value = parse_kpi(&text);
        Self { text, value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<f64> for KpiLevel {
    fn from(value: f64) -> Self {
        Self {
            text: value.to_string(),
            value,
        }
    }
}

impl fmt::Display for KpiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for KpiLevel {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for KpiLevel {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }
        Ok(match Raw::deserialize(de)? {
            Raw::Num(n) => KpiLevel::from(n),
            Raw::Text(s) => KpiLevel::from_text(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKind {
    Water,
    Energy,
    AirQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    High,
    Moderate,
    Good,
}

impl KpiKind {
    /// `(upper, lower)`: above `upper` is High, above `lower` is Moderate.
    pub fn thresholds(self) -> (f64, f64) {
        match self {
            KpiKind::Water | KpiKind::Energy => (90.0, 70.0),
            KpiKind::AirQuality => (100.0, 50.0),
        }
    }

    pub fn band(self, value: f64) -> Band {
        let (upper, lower) = self.thresholds();
        if value > upper {
            Band::High
        } else if value > lower {
            Band::Moderate
        } else {
            Band::Good
        }
    }

    pub fn status(self, value: f64) -> &'static str {
        match (self, self.band(value)) {
            (KpiKind::AirQuality, Band::High) => "Poor - Immediate Action Required",
            (KpiKind::AirQuality, Band::Moderate) => "Moderate - Continue Monitoring",
            (KpiKind::AirQuality, Band::Good) => "Good - Healthy Levels",
            (_, Band::High) => "High - Requires Attention",
            (_, Band::Moderate) => "Moderate - Monitor Closely",
            (_, Band::Good) => "Good - Within Normal Range",
        }
    }

    pub fn recommendation(self, value: f64) -> &'static str {
        let high = self.band(value) == Band::High;
        match (self, high) {
            (KpiKind::Water, true) => "Implement water conservation measures immediately",
            (KpiKind::Water, false) => "Continue current water management practices",
            (KpiKind::Energy, true) => "Increase renewable energy adoption and efficiency measures",
            (KpiKind::Energy, false) => "Maintain current energy management strategies",
            (KpiKind::AirQuality, true) => {
                "Implement emission reduction strategies and increase green spaces"
            }
            (KpiKind::AirQuality, false) => "Maintain current air quality management practices",
        }
    }
}

pub fn conclusion(fields: &ReportFields) -> &'static str {
    if (fields.water_usage.value() + fields.energy_consumption.value()) / 2.0 > CONCLUSION_CUTOFF {
        "areas for improvement in resource management"
    } else {
        "positive progress in sustainability metrics"
    }
}

fn kpi_section(title: &str, kind: KpiKind, level: &KpiLevel, unit: &str) -> String {
    format!(
        "### {title}\n- Current Level: {level}{unit}\n- Status: {}\n- Recommendation: {}\n",
        kind.status(level.value()),
        kind.recommendation(level.value())
    )
}

/// Render the report. `generated_at` is the only time source, so equal
/// inputs produce equal documents.
pub fn compose_report(fields: &ReportFields, generated_at: DateTime<Utc>) -> String {
    let date = generated_at.format("%Y-%m-%d");
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC");
    let notes = if fields.additional_notes.trim().is_empty() {
        NOTES_PLACEHOLDER
    } else {
        fields.additional_notes.as_str()
    };
    let city = &fields.city_name;

    let water = kpi_section("Water Usage", KpiKind::Water, &fields.water_usage, "%");
    let energy = kpi_section(
        "Energy Consumption",
        KpiKind::Energy,
        &fields.energy_consumption,
        "%",
    );
    let air = kpi_section("Air Quality Index", KpiKind::AirQuality, &fields.air_quality, "");

    format!(
        "# {report_type} Report - {city}

## Executive Summary
This report provides a comprehensive analysis of sustainability metrics for {city} as of {date}.

## Key Performance Indicators

{water}
{energy}
{air}
## Sustainability Initiatives

### Recommended Actions
1. **Short-term (1-3 months)**
   - Conduct energy audits for public buildings
   - Launch citizen awareness campaigns
   - Implement smart water meters

2. **Medium-term (3-12 months)**
   - Expand renewable energy infrastructure
   - Develop green transportation networks
   - Create urban green spaces

3. **Long-term (1-3 years)**
   - Achieve carbon neutrality goals
   - Implement circular economy principles
   - Develop smart city technologies

## Additional Notes
{notes}

## Conclusion
{city} shows {conclusion}. Continued focus on sustainable practices and citizen engagement will be key to achieving long-term environmental goals.

---
*Report generated on {stamp}*
*Smart City Assistant - Sustainability Analytics Platform*",
        report_type = fields.report_type,
        conclusion = conclusion(fields),
    )
}

/// Download name for a report, e.g. `New_York_sustainability_report.md`.
pub fn report_file_name(city_name: &str) -> String {
    let safe: String = city_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if safe.is_empty() { "city" } else { safe.as_str() };
    format!("{stem}_sustainability_report.md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap()
    }

    fn fields(water: f64, energy: f64, air: f64) -> ReportFields {
        ReportFields {
            city_name: "Metropolis".into(),
            report_type: "Monthly Sustainability".into(),
            water_usage: water.into(),
            energy_consumption: energy.into(),
            air_quality: air.into(),
            additional_notes: String::new(),
        }
    }

    #[test]
    fn bands_use_kpi_specific_thresholds() {
        assert_eq!(KpiKind::Water.band(95.0), Band::High);
        assert_eq!(KpiKind::Water.band(90.0), Band::Moderate);
        assert_eq!(KpiKind::Energy.band(70.0), Band::Good);
        assert_eq!(KpiKind::AirQuality.band(95.0), Band::Moderate);
        assert_eq!(KpiKind::AirQuality.band(100.5), Band::High);
        assert_eq!(KpiKind::AirQuality.band(50.0), Band::Good);
    }

    #[test]
    fn nan_lands_in_lowest_band() {
        assert_eq!(KpiKind::Water.band(parse_kpi("n/a")), Band::Good);
        assert_eq!(parse_kpi(""), 0.0);
        assert_eq!(parse_kpi(" 42.5 "), 42.5);
    }

    #[test]
    fn renders_statuses_and_recommendations() {
        let md = compose_report(&fields(95.0, 60.0, 120.0), at());
        assert!(md.starts_with("# Monthly Sustainability Report - Metropolis\n"));
        assert!(md.contains("- Current Level: 95%\n- Status: High - Requires Attention"));
        assert!(md.contains("- Status: Good - Within Normal Range"));
        assert!(md.contains("- Status: Poor - Immediate Action Required"));
        assert!(md.contains("Implement water conservation measures immediately"));
        assert!(md.contains("Maintain current energy management strategies"));
        assert!(md.contains("- Current Level: 120\n"));
        assert!(md.contains("as of 2024-07-01."));
        assert!(md.contains("*Report generated on 2024-07-01 09:30:00 UTC*"));
    }

    #[test]
    fn conclusion_switches_on_average() {
        assert_eq!(
            conclusion(&fields(95.0, 80.0, 0.0)),
            "areas for improvement in resource management"
        );
        // average exactly 85 is not above the cutoff
        assert_eq!(
            conclusion(&fields(90.0, 80.0, 0.0)),
            "positive progress in sustainability metrics"
        );
    }

    #[test]
    fn blank_notes_use_placeholder() {
        let mut f = fields(10.0, 10.0, 10.0);
        f.additional_notes = "  ".into();
        let md = compose_report(&f, at());
        assert!(md.contains("## Additional Notes\nNo additional notes provided.\n"));

        f.additional_notes = "Heatwave expected in August.".into();
        let md = compose_report(&f, at());
        assert!(md.contains("## Additional Notes\nHeatwave expected in August.\n"));
    }

    #[test]
    fn same_input_same_document() {
        let f = fields(75.0, 91.0, 55.0);
        assert_eq!(compose_report(&f, at()), compose_report(&f, at()));
    }

    #[test]
    fn deserializes_text_and_numbers() {
        let f: ReportFields = serde_json::from_str(
            r#"{"cityName":"Metropolis","reportType":"Annual Sustainability",
                "waterUsage":"95","energyConsumption":60,"airQuality":"abc"}"#,
        )
        .unwrap();
        assert_eq!(f.water_usage.value(), 95.0);
        assert_eq!(f.energy_consumption.value(), 60.0);
        assert!(f.air_quality.value().is_nan());
        assert!(f.additional_notes.is_empty());
    }

    #[test]
    fn current_level_echoes_supplied_text() {
        let f: ReportFields = serde_json::from_str(
            r#"{"cityName":"Metropolis","reportType":"Monthly Sustainability",
                "waterUsage":"abc","energyConsumption":"95.50","airQuality":"1e2"}"#,
        )
        .unwrap();
        let md = compose_report(&f, at());
        assert!(md.contains("### Water Usage\n- Current Level: abc%\n- Status: Good - Within Normal Range"));
        // banded as 95.5, printed as typed
        assert!(md.contains("### Energy Consumption\n- Current Level: 95.50%\n- Status: High - Requires Attention"));
        assert!(md.contains("### Air Quality Index\n- Current Level: 1e2\n- Status: Moderate - Continue Monitoring"));
    }

    #[test]
    fn missing_kpi_behaves_like_blank_text() {
        let f: ReportFields = serde_json::from_str(
            r#"{"cityName":"Metropolis","reportType":"Monthly Sustainability","airQuality":120}"#,
        )
        .unwrap();
        assert_eq!(f.water_usage, KpiLevel::from_text(""));
        assert_eq!(f.energy_consumption.value(), 0.0);
        let md = compose_report(&f, at());
        assert!(md.contains("### Water Usage\n- Current Level: %\n- Status: Good - Within Normal Range"));
        assert!(md.contains("### Air Quality Index\n- Current Level: 120\n- Status: Poor"));
    }

    #[test]
    fn file_name_is_header_safe() {
        assert_eq!(report_file_name("New York"), "New_York_sustainability_report.md");
        assert_eq!(report_file_name(" "), "city_sustainability_report.md");
    }
}
