/*!
# GovGraph

A dashboard service for charts of Indian government statistics, built in Rust.

## Overview

Charts are grouped into six sectors: agriculture, healthcare, education,
budget, traffic and utilities. Each sector has a set of built-in charts, and
users can add their own by uploading a CSV or Excel file (or pointing at a
JSON API). The service guesses which column holds the category labels and
which holds the values, builds a chart from them and keeps it in a persisted
store until it is deleted.

## Architecture

### Core
- **Record model** - loosely typed rows with explicit numeric parsing
- **Inference engine** - picks the label and value fields and builds the series
- **Chart model** - sectors, chart kinds, datasets and validated definitions
- **Custom chart store** - persisted collection with change notification

### Data Persistence Layer
- One JSON array per store key, in memory or on disk
- Gzip-compressed JSON backups for export and import

### Web Layer
- **Technologies**: Rust, axum, tokio
- Built-in sector charts, the data.gov.in proxy and sample health records
- Upload and remote-API previews, custom chart CRUD and a change event stream

## Modules

- **record**: Field values and rows
- **inference**: Label/value column inference
- **chart**: Chart definitions and validation
- **store**: Custom chart store and storage backends
- **loader**: CSV, Excel and JSON row extraction
- **providers**: Built-in sector charts and sample datasets
- **dashboard**: Merging built-in and custom charts per sector
- **backup**: Compressed export/import
- **config**: Environment configuration
- **upstream**: HTTP client for external data (web feature)
- **app**: Routing and handlers (web feature)

## REST API Endpoints

- `/api/sectors` - Sector names and descriptions
- `/api/charts/{sector}` - Built-in charts of a sector
- `/api/dashboard` - Every sector with built-in and custom charts
- `/api/custom-charts` - List, add and clear custom charts
- `/api/custom-charts/{id}` - Delete one custom chart
- `/api/custom-charts/events` - Server-sent change notifications
- `/api/custom-charts/export`, `/api/custom-charts/import` - Backups
- `/api/preview`, `/api/preview/remote` - Chart previews from a file or an API
- `/api/datagov/{resource_id}` - data.gov.in records
- `/api/india/health/{type}` - Sample health records
*/

pub mod backup;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod inference;
pub mod loader;
pub mod providers;
pub mod record;
pub mod store;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod upstream;

/// Re-export the everyday types to make them easier to use
pub use chart::{ChartDefinition, ChartDraft, ChartKind, ChartSeries, Dataset, Sector};
pub use error::GovGraphError;
pub use inference::{AlignmentPolicy, infer_series};
pub use record::{FieldValue, Row};
pub use store::{ChartStore, FileBackend, MemoryBackend, StorageBackend};
