//! Sector chart providers
//!
//! A provider supplies the built-in charts for a sector. The canned provider
//! serves fixed statistics from Indian government publications and is
//! regenerated on every call, so `lastUpdated` is always the request time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::chart::{ChartDefinition, ChartKind, ChartSeries, Colors, Dataset, Sector};
use crate::error::ProviderError;
use crate::inference::CATEGORY_PALETTE;
use crate::record::Row;

/// Source of the built-in charts for a sector
#[async_trait]
pub trait ChartProvider: Send + Sync {
    async fn provide(&self, sector: Sector) -> Result<Vec<ChartDefinition>, ProviderError>;
}

/// Calls `provider`, degrading any failure to an empty list
pub async fn provide_or_empty<P: ChartProvider + ?Sized>(
    provider: &P,
    sector: Sector,
) -> Vec<ChartDefinition> {
    match provider.provide(sector).await {
        Ok(charts) => charts,
        Err(e) => {
            log::warn!("{} charts unavailable: {}", sector, e);
            Vec::new()
        }
    }
}

/// Serves the fixed sample charts
#[derive(Clone, Copy, Debug, Default)]
pub struct CannedProvider;

#[async_trait]
impl ChartProvider for CannedProvider {
    async fn provide(&self, sector: Sector) -> Result<Vec<ChartDefinition>, ProviderError> {
        Ok(canned_charts(sector, Utc::now()))
    }
}

fn rgba(rgb: &str, alpha: f64) -> String {
    format!("rgba({}, {})", rgb, alpha)
}

fn bar(label: &str, rgb: &str, data: &[f64]) -> Dataset {
    Dataset {
        background_color: Some(Colors::Single(rgba(rgb, 0.8))),
        border_color: Some(Colors::Single(rgba(rgb, 1.0))),
        border_width: Some(1.0),
        ..Dataset::new(label, data.to_vec())
    }
}

fn line(label: &str, rgb: &str, data: &[f64], fill: bool) -> Dataset {
    Dataset {
        background_color: Some(Colors::Single(rgba(rgb, 0.2))),
        border_color: Some(Colors::Single(rgba(rgb, 1.0))),
        border_width: Some(2.0),
        fill: Some(fill),
        tension: Some(0.4),
        ..Dataset::new(label, data.to_vec())
    }
}

fn radial(label: &str, colors: &[&str], data: &[f64]) -> Dataset {
    Dataset {
        background_color: Some(Colors::from(colors)),
        border_width: Some(1.0),
        ..Dataset::new(label, data.to_vec())
    }
}

struct Canned<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    source: &'a str,
    kind: ChartKind,
    labels: &'a [&'a str],
    datasets: Vec<Dataset>,
}

impl Canned<'_> {
    fn build(self, sector: Sector, now: DateTime<Utc>) -> ChartDefinition {
        ChartDefinition {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            source: self.source.to_string(),
            sector,
            kind: self.kind,
            series: ChartSeries {
                labels: self.labels.iter().map(|l| l.to_string()).collect(),
                datasets: self.datasets,
            },
            last_updated: now,
        }
    }
}

const GREEN: &str = "34, 197, 94";
const EMERALD: &str = "16, 185, 129";
const AMBER: &str = "245, 158, 11";
const RED: &str = "239, 68, 68";
const BLUE: &str = "59, 130, 246";
const VIOLET: &str = "139, 92, 246";

const GRAY_OTHERS: &str = "rgba(156, 163, 175, 0.8)";

const FISCAL_YEARS: [&str; 5] = ["2020-21", "2021-22", "2022-23", "2023-24", "2024-25"];
const ACADEMIC_YEARS: [&str; 5] = ["2019-20", "2020-21", "2021-22", "2022-23", "2023-24"];

/// The canned charts for one sector, stamped with `now`
pub fn canned_charts(sector: Sector, now: DateTime<Utc>) -> Vec<ChartDefinition> {
    let charts = match sector {
        Sector::Agriculture => agriculture(),
        Sector::Healthcare => healthcare(),
        Sector::Education => education(),
        Sector::Budget => budget(),
        Sector::Traffic => traffic(),
        Sector::Utilities => utilities(),
    };
    charts.into_iter().map(|c| c.build(sector, now)).collect()
}

fn agriculture() -> Vec<Canned<'static>> {
    let mut fertilizer_colors = CATEGORY_PALETTE[..6].to_vec();
    fertilizer_colors.push(GRAY_OTHERS);

    vec![
        Canned {
            id: "agriculture-1",
            title: "Crop Production by Indian States",
            description: "Major crop production statistics across Indian states for 2023-24",
            source: "Ministry of Agriculture, Government of India",
            kind: ChartKind::Bar,
            labels: &[
                "Uttar Pradesh",
                "Punjab",
                "Haryana",
                "Madhya Pradesh",
                "Bihar",
                "West Bengal",
                "Rajasthan",
                "Maharashtra",
                "Karnataka",
                "Andhra Pradesh",
            ],
            datasets: vec![bar(
                "Rice Production (Million Tonnes)",
                GREEN,
                &[12.8, 11.5, 4.2, 7.1, 6.8, 15.2, 1.2, 3.8, 3.2, 5.1],
            )],
        },
        Canned {
            id: "agriculture-2",
            title: "Wheat vs Rice Production Trends",
            description: "Comparison of wheat and rice production in India over recent years",
            source: "Department of Agriculture & Farmers Welfare, India",
            kind: ChartKind::Line,
            labels: &FISCAL_YEARS[..4],
            datasets: vec![
                line("Wheat (Million Tonnes)", AMBER, &[109.5, 106.8, 110.5, 112.9], false),
                line("Rice (Million Tonnes)", GREEN, &[124.3, 129.5, 132.8, 137.2], false),
            ],
        },
        Canned {
            id: "agriculture-3",
            title: "Fertilizer Consumption by State",
            description: "NPK fertilizer consumption across major Indian agricultural states",
            source: "Fertilizer Association of India",
            kind: ChartKind::Doughnut,
            labels: &[
                "Uttar Pradesh",
                "Maharashtra",
                "Punjab",
                "Haryana",
                "Karnataka",
                "Madhya Pradesh",
                "Others",
            ],
            datasets: vec![radial(
                "Fertilizer Consumption (%)",
                &fertilizer_colors,
                &[18.5, 14.2, 12.8, 8.9, 7.3, 6.8, 31.5],
            )],
        },
    ]
}

fn healthcare() -> Vec<Canned<'static>> {
    vec![
        Canned {
            id: "healthcare-1",
            title: "Hospitals by Indian States",
            description: "Number of government and private hospitals across major Indian states",
            source: "Ministry of Health & Family Welfare, India",
            kind: ChartKind::Bar,
            labels: &[
                "Uttar Pradesh",
                "Karnataka",
                "Maharashtra",
                "Tamil Nadu",
                "West Bengal",
                "Rajasthan",
                "Madhya Pradesh",
                "Andhra Pradesh",
            ],
            datasets: vec![
                bar(
                    "Government Hospitals",
                    BLUE,
                    &[3247.0, 2156.0, 1876.0, 1654.0, 1432.0, 1234.0, 1123.0, 987.0],
                ),
                bar(
                    "Private Hospitals",
                    EMERALD,
                    &[8945.0, 6789.0, 7234.0, 5432.0, 4321.0, 3456.0, 2987.0, 3123.0],
                ),
            ],
        },
        Canned {
            id: "healthcare-2",
            title: "Healthcare Budget Allocation Trends",
            description: "Indian government healthcare budget allocation over recent years",
            source: "Union Budget, Ministry of Finance, India",
            kind: ChartKind::Line,
            labels: &FISCAL_YEARS,
            datasets: vec![line(
                "Healthcare Budget (₹ Crore)",
                RED,
                &[67112.0, 73931.0, 86200.0, 89155.0, 90659.0],
                true,
            )],
        },
        Canned {
            id: "healthcare-3",
            title: "Doctor-Patient Ratio by State",
            description: "Doctor to patient ratio across Indian states (per 1000 population)",
            source: "Indian Medical Association & Health Ministry",
            kind: ChartKind::Pie,
            labels: &[
                "Delhi",
                "Goa",
                "Sikkim",
                "Chandigarh",
                "Kerala",
                "Karnataka",
                "Punjab",
                "Others",
            ],
            datasets: vec![radial(
                "Doctors per 1000",
                &CATEGORY_PALETTE,
                &[2.8, 2.6, 2.1, 1.9, 1.8, 1.5, 1.4, 1.2],
            )],
        },
    ]
}

fn education() -> Vec<Canned<'static>> {
    vec![
        Canned {
            id: "education-1",
            title: "Literacy Rate by Indian States",
            description: "Adult literacy rates across major Indian states (2011 Census)",
            source: "Ministry of Education, Government of India",
            kind: ChartKind::Bar,
            labels: &[
                "Kerala",
                "Mizoram",
                "Tripura",
                "Goa",
                "Himachal Pradesh",
                "Maharashtra",
                "Sikkim",
                "Tamil Nadu",
                "Uttarakhand",
                "Punjab",
            ],
            datasets: vec![bar(
                "Literacy Rate (%)",
                VIOLET,
                &[93.91, 91.58, 87.75, 87.40, 83.78, 82.91, 82.20, 80.33, 79.63, 76.68],
            )],
        },
        Canned {
            id: "education-2",
            title: "School Enrollment Trends",
            description: "Primary and secondary school enrollment in India over recent years",
            source: "UDISE+ & Ministry of Education, India",
            kind: ChartKind::Line,
            labels: &ACADEMIC_YEARS,
            datasets: vec![
                line(
                    "Primary Enrollment (Million)",
                    EMERALD,
                    &[128.5, 125.2, 131.8, 134.2, 137.1],
                    false,
                ),
                line(
                    "Secondary Enrollment (Million)",
                    AMBER,
                    &[87.3, 84.1, 89.2, 91.8, 94.5],
                    false,
                ),
            ],
        },
        Canned {
            id: "education-3",
            title: "Education Budget Distribution",
            description: "Distribution of education budget across different levels in India",
            source: "Union Budget & Ministry of Education, India",
            kind: ChartKind::Doughnut,
            labels: &[
                "Higher Education",
                "School Education",
                "Skill Development",
                "Digital Education",
                "Teacher Training",
                "Infrastructure",
            ],
            datasets: vec![radial(
                "Budget Allocation (%)",
                &CATEGORY_PALETTE[..6],
                &[35.2, 28.8, 12.5, 8.7, 7.9, 6.9],
            )],
        },
    ]
}

fn budget() -> Vec<Canned<'static>> {
    vec![
        Canned {
            id: "budget-1",
            title: "India's Union Budget Trends",
            description: "Total Union Budget expenditure and revenue trends over recent years",
            source: "Ministry of Finance, Government of India",
            kind: ChartKind::Line,
            labels: &FISCAL_YEARS,
            datasets: vec![
                line(
                    "Total Expenditure (₹ Lakh Crore)",
                    RED,
                    &[34.83, 37.70, 41.87, 45.03, 47.66],
                    false,
                ),
                line(
                    "Total Revenue (₹ Lakh Crore)",
                    EMERALD,
                    &[22.46, 25.16, 29.32, 33.14, 36.73],
                    false,
                ),
            ],
        },
        Canned {
            id: "budget-2",
            title: "Ministry-wise Budget Allocation 2024-25",
            description: "Top ministries by budget allocation in India's Union Budget 2024-25",
            source: "Union Budget 2024-25, Ministry of Finance",
            kind: ChartKind::Bar,
            labels: &[
                "Defence",
                "Railways",
                "Roads & Highways",
                "Consumer Affairs",
                "Home Affairs",
                "Agriculture",
                "Rural Development",
                "Health & Family Welfare",
            ],
            datasets: vec![bar(
                "Budget Allocation (₹ Thousand Crore)",
                BLUE,
                &[658.0, 261.0, 270.0, 205.0, 196.0, 125.0, 186.0, 906.0],
            )],
        },
        Canned {
            id: "budget-3",
            title: "Revenue Sources Distribution",
            description: "Breakdown of Indian government revenue sources for 2024-25",
            source: "Controller General of Accounts, India",
            kind: ChartKind::Pie,
            labels: &[
                "Income Tax",
                "Corporate Tax",
                "GST",
                "Customs Duty",
                "Excise Duty",
                "Other Taxes",
                "Non-Tax Revenue",
            ],
            datasets: vec![radial(
                "Revenue Share (%)",
                &CATEGORY_PALETTE[..7],
                &[18.5, 24.2, 32.1, 8.7, 6.8, 4.2, 5.5],
            )],
        },
    ]
}

fn traffic() -> Vec<Canned<'static>> {
    vec![
        Canned {
            id: "traffic-1",
            title: "Vehicle Registration by State",
            description: "New vehicle registrations across major Indian states in 2023-24",
            source: "Ministry of Road Transport & Highways, India",
            kind: ChartKind::Bar,
            labels: &[
                "Maharashtra",
                "Uttar Pradesh",
                "Gujarat",
                "Tamil Nadu",
                "Karnataka",
                "Rajasthan",
                "West Bengal",
                "Delhi",
            ],
            datasets: vec![bar(
                "New Registrations (Lakh)",
                AMBER,
                &[42.5, 38.9, 35.2, 31.8, 28.7, 25.6, 22.4, 19.8],
            )],
        },
        Canned {
            id: "traffic-2",
            title: "Road Accident Statistics",
            description: "Road accident fatalities and injuries across Indian states in 2023",
            source: "Ministry of Road Transport & Highways, India",
            kind: ChartKind::Line,
            labels: &[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ],
            datasets: vec![
                line(
                    "Fatalities",
                    RED,
                    &[
                        12456.0, 11890.0, 13245.0, 12978.0, 13567.0, 14123.0, 14789.0, 15234.0,
                        13876.0, 12998.0, 12456.0, 13234.0,
                    ],
                    false,
                ),
                line(
                    "Injuries",
                    AMBER,
                    &[
                        45678.0, 43456.0, 47890.0, 46234.0, 48567.0, 51234.0, 52876.0, 54321.0,
                        49876.0, 46789.0, 45234.0, 47890.0,
                    ],
                    false,
                ),
            ],
        },
        Canned {
            id: "traffic-3",
            title: "Highway Infrastructure by Region",
            description: "National highway length and quality distribution across Indian regions",
            source: "National Highways Authority of India (NHAI)",
            kind: ChartKind::Doughnut,
            labels: &["North", "South", "East", "West", "Central", "Northeast"],
            datasets: vec![radial(
                "Highway Length (km)",
                &CATEGORY_PALETTE[..6],
                &[28456.0, 25789.0, 18234.0, 31567.0, 22345.0, 8976.0],
            )],
        },
    ]
}

fn utilities() -> Vec<Canned<'static>> {
    vec![
        Canned {
            id: "utilities-1",
            title: "Power Generation by Source",
            description: "Electricity generation in India by different energy sources (2023-24)",
            source: "Central Electricity Authority, India",
            kind: ChartKind::Pie,
            labels: &["Coal", "Renewable", "Gas", "Nuclear", "Hydro", "Diesel"],
            datasets: vec![radial(
                "Generation Share (%)",
                &[
                    "rgba(75, 85, 99, 0.8)",
                    "rgba(34, 197, 94, 0.8)",
                    "rgba(59, 130, 246, 0.8)",
                    "rgba(245, 158, 11, 0.8)",
                    "rgba(16, 185, 129, 0.8)",
                    "rgba(239, 68, 68, 0.8)",
                ],
                &[44.3, 28.1, 2.5, 3.2, 17.1, 0.1],
            )],
        },
        Canned {
            id: "utilities-2",
            title: "Renewable Energy Growth Trends",
            description: "Growth of renewable energy capacity in India over recent years",
            source: "Ministry of New & Renewable Energy, India",
            kind: ChartKind::Line,
            labels: &ACADEMIC_YEARS,
            datasets: vec![
                line("Solar Capacity (GW)", AMBER, &[34.6, 40.1, 54.4, 66.8, 73.3], false),
                line("Wind Capacity (GW)", EMERALD, &[59.2, 64.8, 69.9, 75.1, 81.3], false),
            ],
        },
        Canned {
            id: "utilities-3",
            title: "Electricity Consumption by State",
            description: "Per capita electricity consumption across major Indian states (2023-24)",
            source: "Central Electricity Authority & State Electricity Boards",
            kind: ChartKind::Bar,
            labels: &[
                "Gujarat",
                "Punjab",
                "Goa",
                "Haryana",
                "Tamil Nadu",
                "Karnataka",
                "Maharashtra",
                "Delhi",
            ],
            datasets: vec![bar(
                "Per Capita Consumption (kWh)",
                VIOLET,
                &[2456.0, 2234.0, 2189.0, 2098.0, 1987.0, 1876.0, 1765.0, 1654.0],
            )],
        },
    ]
}

/// Sample health records for `kind` (`hospitals`, `budget` or `doctors`)
///
/// Unknown kinds have no records.
pub fn health_records(kind: &str) -> Vec<Row> {
    match kind {
        "hospitals" => [
            ("Uttar Pradesh", 3247.0, 8945.0),
            ("Karnataka", 2156.0, 6789.0),
            ("Maharashtra", 1876.0, 7234.0),
            ("Tamil Nadu", 1654.0, 5432.0),
            ("West Bengal", 1432.0, 4321.0),
        ]
        .into_iter()
        .map(|(state, government, private)| {
            Row::new()
                .with("state", state)
                .with("government", government)
                .with("private", private)
        })
        .collect(),
        "budget" => [
            ("2020-21", 67112.0),
            ("2021-22", 73931.0),
            ("2022-23", 86200.0),
            ("2023-24", 89155.0),
            ("2024-25", 90659.0),
        ]
        .into_iter()
        .map(|(year, amount)| Row::new().with("year", year).with("amount", amount))
        .collect(),
        "doctors" => [
            ("Delhi", 2.8),
            ("Goa", 2.6),
            ("Sikkim", 2.1),
            ("Chandigarh", 1.9),
            ("Kerala", 1.8),
        ]
        .into_iter()
        .map(|(state, ratio)| Row::new().with("state", state).with("ratio", ratio))
        .collect(),
        _ => Vec::new(),
    }
}
