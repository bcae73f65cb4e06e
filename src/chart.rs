use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Topical category a chart belongs to
///
/// The set is fixed; anything else is rejected when parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Agriculture,
    Healthcare,
    Education,
    Budget,
    Traffic,
    Utilities,
}

impl Sector {
    /// All sectors, in dashboard order
    pub const ALL: [Sector; 6] = [
        Sector::Agriculture,
        Sector::Healthcare,
        Sector::Education,
        Sector::Budget,
        Sector::Traffic,
        Sector::Utilities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Agriculture => "agriculture",
            Sector::Healthcare => "healthcare",
            Sector::Education => "education",
            Sector::Budget => "budget",
            Sector::Traffic => "traffic",
            Sector::Utilities => "utilities",
        }
    }

    /// Display name shown above the sector's row of charts
    pub fn name(&self) -> &'static str {
        match self {
            Sector::Agriculture => "Agriculture & Food Security",
            Sector::Healthcare => "Healthcare & Public Health",
            Sector::Education => "Education & Learning",
            Sector::Budget => "Government Budgets & Finance",
            Sector::Traffic => "Transport & Traffic",
            Sector::Utilities => "Power & Utilities",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Sector::Agriculture => {
                "Explore interactive visualizations of agricultural production, food security, and farming trends across Indian states."
            }
            Sector::Healthcare => {
                "Analyze hospital data, healthcare budget allocation, and medical infrastructure across India."
            }
            Sector::Education => {
                "Discover literacy rates, school enrollment, and education spending statistics in India."
            }
            Sector::Budget => {
                "Examine Indian Union Budget trends, ministry allocations, and revenue sources."
            }
            Sector::Traffic => {
                "View vehicle registration data and transportation statistics across Indian states."
            }
            Sector::Utilities => {
                "Analyze electricity generation, renewable energy, and power infrastructure in India."
            }
        }
    }

    /// Accepted sector names, in dashboard order
    pub fn names() -> Vec<&'static str> {
        Sector::ALL.iter().map(Sector::as_str).collect()
    }
}

impl FromStr for Sector {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sector::ALL
            .into_iter()
            .find(|sector| sector.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSector(s.to_string()))
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual rendering style of a chart
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Doughnut,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Doughnut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
        }
    }

    /// Pie and doughnut charts color each category separately
    pub fn is_radial(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

impl FromStr for ChartKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A color setting: one color for the whole dataset, or one per category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colors {
    Single(String),
    PerCategory(Vec<String>),
}

impl From<&str> for Colors {
    fn from(color: &str) -> Self {
        Colors::Single(color.to_string())
    }
}

impl From<&[&str]> for Colors {
    fn from(colors: &[&str]) -> Self {
        Colors::PerCategory(colors.iter().map(|c| c.to_string()).collect())
    }
}

/// One named numeric series, aligned positionally to the chart labels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Colors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Colors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

impl Dataset {
    /// An unstyled dataset
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            data,
            background_color: None,
            border_color: None,
            border_width: None,
            fill: None,
            tension: None,
        }
    }
}

/// Category labels plus the datasets plotted against them
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.datasets.is_empty()
    }

    /// Checks that every dataset has one value per label
    pub fn check_alignment(&self) -> Result<(), ValidationError> {
        match self
            .datasets
            .iter()
            .find(|d| d.data.len() != self.labels.len())
        {
            Some(d) => Err(ValidationError::MisalignedSeries {
                label: d.label.clone(),
                values: d.data.len(),
                labels: self.labels.len(),
            }),
            None => Ok(()),
        }
    }
}

/// A complete chart, as persisted and as sent over the wire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub source: String,
    pub sector: Sector,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    #[serde(rename = "data")]
    pub series: ChartSeries,
    pub last_updated: DateTime<Utc>,
}

/// Raw, unvalidated chart fields as submitted by a user
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChartDraft {
    pub sector: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "data", default)]
    pub series: Option<ChartSeries>,
}

impl ChartDefinition {
    /// Validates a draft and turns it into a new user chart
    ///
    /// The chart gets a freshly generated id and the current time as its
    /// `lastUpdated`. Blank description and source fall back to defaults.
    ///
    /// # Errors
    /// * `UnknownSector` / `UnknownKind` for values outside the fixed sets
    /// * `EmptyTitle` if the title is blank
    /// * `MissingSeries` if there is no data or it has no labels or datasets
    /// * `MisalignedSeries` if a dataset length differs from the label count
    pub fn from_draft(draft: ChartDraft) -> Result<Self, ValidationError> {
        let sector: Sector = draft.sector.trim().parse()?;
        let kind: ChartKind = draft.kind.trim().parse()?;

        if draft.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let series = match draft.series {
            Some(series) if !series.is_empty() => series,
            _ => return Err(ValidationError::MissingSeries),
        };
        series.check_alignment()?;

        let description = if draft.description.trim().is_empty() {
            format!("Custom {} chart", kind)
        } else {
            draft.description
        };
        let source = if draft.source.trim().is_empty() {
            "User uploaded data".to_string()
        } else {
            draft.source
        };

        Ok(ChartDefinition {
            id: generate_chart_id(),
            title: draft.title,
            description,
            source,
            sector,
            kind,
            series,
            last_updated: Utc::now(),
        })
    }

    /// Re-checks the invariants of an already built chart
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.series.is_empty() {
            return Err(ValidationError::MissingSeries);
        }
        self.series.check_alignment()
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates an id for a user chart: `custom-<unix millis>-<9 base-36 chars>`
///
/// Uniqueness is probabilistic, not cryptographic.
pub fn generate_chart_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("custom-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Sector metadata without charts
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectorInfo {
    pub id: Sector,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<Sector> for SectorInfo {
    fn from(sector: Sector) -> Self {
        SectorInfo {
            id: sector,
            name: sector.name(),
            description: sector.description(),
        }
    }
}

/// A sector together with the charts shown in its row
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectorData {
    #[serde(flatten)]
    pub info: SectorInfo,
    pub charts: Vec<ChartDefinition>,
}
