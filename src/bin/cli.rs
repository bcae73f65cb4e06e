#![cfg(not(tarpaulin_include))]

use govgraph::backup::{load_backup, save_backup};
use govgraph::chart::{ChartDefinition, ChartDraft, ChartKind, Sector};
use govgraph::config::ServerConfig;
use govgraph::inference::{AlignmentPolicy, Preview, infer_series};
use govgraph::loader::load_rows;
use govgraph::record::Row;
use govgraph::store::{ChartStore, FileBackend};

use std::io::{self, Write};
use std::time::Instant;

fn print_help() {
    println!("Commands:");
    println!("  q: Quit");
    println!("  load <file>: Load rows from a CSV or Excel file");
    println!("  type <line|bar|pie|doughnut>: Set the chart type");
    println!("  align <positional|row-keyed>: Set how labels and values are paired");
    println!("  preview: Show the inferred chart data");
    println!("  save <sector> <title>: Save the previewed chart");
    println!("  list [sector]: List saved charts");
    println!("  delete <id>: Delete a saved chart");
    println!("  clear: Delete all saved charts");
    println!("  export <file>: Write saved charts to a backup file");
    println!("  import <file>: Replace saved charts with a backup file");
}

fn print_preview(preview: &Preview) {
    println!(
        "label field: {}  value field: {}",
        preview.columns.label_field, preview.columns.value_field
    );
    let values = preview
        .series
        .datasets
        .first()
        .map(|d| d.data.as_slice())
        .unwrap_or_default();
    for (label, value) in preview.series.labels.iter().zip(values) {
        println!("  {:<30} {}", label, value);
    }
}

fn print_charts(charts: &[ChartDefinition]) {
    if charts.is_empty() {
        println!("(no charts)");
    }
    for chart in charts {
        println!(
            "{}  [{}/{}]  {}  ({} points)",
            chart.id,
            chart.sector,
            chart.kind,
            chart.title,
            chart.series.labels.len()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let s = Instant::now(); // Start time for the entire program
    let config = ServerConfig::from_env()?;
    let store = ChartStore::new(FileBackend::open(&config.data_dir)?);

    let mut rows: Vec<Row> = Vec::new();
    let mut kind = ChartKind::Bar;
    let mut alignment = config.alignment;
    let mut preview: Option<Preview> = None;

    let mut start_time = Instant::now();
    let mut status = String::from("ok");

    loop {
        let elapsed_time = start_time.elapsed().as_secs_f64();
        print!("[{:.1}] ({}) > ", elapsed_time, status);
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();
        start_time = Instant::now();

        let (verb, rest) = match command.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (command, ""),
        };

        status = match verb {
            "" => String::from("invalid command"),
            "q" => break,
            "help" => {
                print_help();
                String::from("ok")
            }
            "load" => match load_rows(rest) {
                Ok(loaded) => {
                    let count = loaded.len();
                    rows = loaded;
                    preview = None;
                    format!("ok ({} rows)", count)
                }
                Err(e) => e.to_string(),
            },
            "type" => match rest.parse::<ChartKind>() {
                Ok(k) => {
                    kind = k;
                    preview = None;
                    String::from("ok")
                }
                Err(e) => e.to_string(),
            },
            "align" => match rest.parse::<AlignmentPolicy>() {
                Ok(policy) => {
                    alignment = policy;
                    preview = None;
                    String::from("ok")
                }
                Err(e) => e.to_string(),
            },
            "preview" => match infer_series(&rows, kind, alignment) {
                Ok(p) => {
                    print_preview(&p);
                    preview = Some(p);
                    String::from("ok")
                }
                Err(e) => e.to_string(),
            },
            "save" => {
                let (sector, title) = rest.split_once(' ').unwrap_or((rest, ""));
                match &preview {
                    None => String::from("no preview available"),
                    Some(p) => {
                        let draft = ChartDraft {
                            sector: sector.to_string(),
                            kind: kind.to_string(),
                            title: title.trim().to_string(),
                            series: Some(p.series.clone()),
                            ..ChartDraft::default()
                        };
                        match ChartDefinition::from_draft(draft) {
                            Ok(chart) => {
                                let id = chart.id.clone();
                                match store.add(chart) {
                                    Ok(()) => format!("saved {}", id),
                                    Err(e) => e.to_string(),
                                }
                            }
                            Err(e) => e.to_string(),
                        }
                    }
                }
            }
            "list" if rest.is_empty() => {
                print_charts(&store.list());
                String::from("ok")
            }
            "list" => match rest.parse::<Sector>() {
                Ok(sector) => {
                    print_charts(&store.list_by_sector(sector));
                    String::from("ok")
                }
                Err(e) => e.to_string(),
            },
            "delete" => match store.remove(rest) {
                Ok(()) => String::from("ok"),
                Err(e) => e.to_string(),
            },
            "clear" => match store.clear() {
                Ok(()) => String::from("ok"),
                Err(e) => e.to_string(),
            },
            "export" => match save_backup(&store.list(), rest) {
                Ok(()) => String::from("ok"),
                Err(e) => e.to_string(),
            },
            "import" => match load_backup(rest).map(|charts| store.replace_all(charts)) {
                Ok(Ok(())) => String::from("ok"),
                Ok(Err(e)) => e.to_string(),
                Err(e) => e.to_string(),
            },
            _ => String::from("invalid command"),
        };
    }

    let e = s.elapsed().as_secs_f64(); // Calculate total elapsed time
    println!("Total elapsed time: {:.1} seconds", e);

    Ok(())
}
