//! Metric documentation output

use clap::ValueEnum;
use prometheus::core::Desc;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for the `metrics` command
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// One documented metric
#[derive(Debug, Serialize, Tabled)]
pub struct MetricDoc {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Labels", display_with = "display_labels")]
    pub labels: Vec<String>,
    #[tabled(rename = "Help")]
    pub help: String,
}

fn display_labels(labels: &[String]) -> String {
    labels.join(", ")
}

impl From<&Desc> for MetricDoc {
    fn from(desc: &Desc) -> Self {
        Self {
            name: desc.fq_name.clone(),
            labels: desc.variable_labels.clone(),
            help: desc.help.clone(),
        }
    }
}

/// Render metric documentation in the requested format
pub fn render_docs(docs: &[MetricDoc], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(Table::new(docs).with(Style::rounded()).to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(docs)?),
    }
}
