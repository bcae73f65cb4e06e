use govgraph::chart::{
    ChartDefinition, ChartDraft, ChartKind, ChartSeries, Dataset, Sector, generate_chart_id,
};
use govgraph::error::ValidationError;
use serde_json::json;

fn draft() -> ChartDraft {
    ChartDraft {
        sector: "education".to_string(),
        kind: "bar".to_string(),
        title: "Literacy rate".to_string(),
        series: Some(ChartSeries {
            labels: vec!["Kerala".to_string(), "Punjab".to_string()],
            datasets: vec![Dataset::new("rate", vec![93.91, 76.68])],
        }),
        ..ChartDraft::default()
    }
}

#[test]
fn draft_becomes_chart_with_defaults() {
    let chart = ChartDefinition::from_draft(draft()).unwrap();
    assert!(chart.id.starts_with("custom-"));
    assert_eq!(chart.sector, Sector::Education);
    assert_eq!(chart.kind, ChartKind::Bar);
    assert_eq!(chart.description, "Custom bar chart");
    assert_eq!(chart.source, "User uploaded data");
    assert!(chart.validate().is_ok());
}

#[test]
fn unknown_sector_and_kind_are_rejected() {
    let mut bad_sector = draft();
    bad_sector.sector = "sports".to_string();
    assert_eq!(
        ChartDefinition::from_draft(bad_sector),
        Err(ValidationError::UnknownSector("sports".to_string()))
    );

    let mut bad_kind = draft();
    bad_kind.kind = "scatter".to_string();
    assert_eq!(
        ChartDefinition::from_draft(bad_kind),
        Err(ValidationError::UnknownKind("scatter".to_string()))
    );
}

#[test]
fn blank_title_is_rejected() {
    let mut blank = draft();
    blank.title = "   ".to_string();
    assert_eq!(
        ChartDefinition::from_draft(blank),
        Err(ValidationError::EmptyTitle)
    );
}

#[test]
fn missing_or_empty_series_is_rejected() {
    let mut missing = draft();
    missing.series = None;
    assert_eq!(
        ChartDefinition::from_draft(missing),
        Err(ValidationError::MissingSeries)
    );

    let mut empty = draft();
    empty.series = Some(ChartSeries::default());
    assert_eq!(
        ChartDefinition::from_draft(empty),
        Err(ValidationError::MissingSeries)
    );
}

#[test]
fn misaligned_dataset_is_rejected() {
    let mut misaligned = draft();
    misaligned.series = Some(ChartSeries {
        labels: vec!["Kerala".to_string(), "Punjab".to_string()],
        datasets: vec![Dataset::new("rate", vec![93.91])],
    });
    assert_eq!(
        ChartDefinition::from_draft(misaligned),
        Err(ValidationError::MisalignedSeries {
            label: "rate".to_string(),
            values: 1,
            labels: 2,
        })
    );
}

#[test]
fn chart_serializes_with_wire_field_names() {
    let chart = ChartDefinition::from_draft(draft()).unwrap();
    let value = serde_json::to_value(&chart).unwrap();

    assert_eq!(value["type"], "bar");
    assert_eq!(value["sector"], "education");
    assert_eq!(value["data"]["labels"], json!(["Kerala", "Punjab"]));
    assert_eq!(value["data"]["datasets"][0]["data"], json!([93.91, 76.68]));
    assert!(value["lastUpdated"].is_string());
    // unset styling is left out
    assert!(value["data"]["datasets"][0].get("backgroundColor").is_none());

    let back: ChartDefinition = serde_json::from_value(value).unwrap();
    assert_eq!(back, chart);
}

#[test]
fn draft_reads_json_request_body() {
    let body = json!({
        "sector": "budget",
        "type": "pie",
        "title": "Ministry allocations",
        "data": {
            "labels": ["Defence", "Railways"],
            "datasets": [{ "label": "Crore", "data": [621541, 255393], "borderWidth": 1 }]
        }
    });
    let draft: ChartDraft = serde_json::from_value(body).unwrap();
    let chart = ChartDefinition::from_draft(draft).unwrap();
    assert_eq!(chart.kind, ChartKind::Pie);
    assert_eq!(chart.series.datasets[0].border_width, Some(1.0));
}

#[test]
fn sector_names_are_fixed() {
    assert_eq!(
        Sector::names(),
        vec!["agriculture", "healthcare", "education", "budget", "traffic", "utilities"]
    );
    assert_eq!("traffic".parse::<Sector>(), Ok(Sector::Traffic));
    assert!("Traffic".parse::<Sector>().is_err());
}

#[test]
fn generated_ids_have_the_custom_shape() {
    let id = generate_chart_id();
    let parts: Vec<&str> = id.splitn(3, '-').collect();
    assert_eq!(parts[0], "custom");
    assert!(parts[1].parse::<i64>().is_ok());
    assert_eq!(parts[2].len(), 9);
    assert!(
        parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    );
    assert_ne!(generate_chart_id(), id);
}
