//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use covenant_domain::{
    Dashboard, ExclusionType, ExclusionTypeCount, GrantorCount, HeadlineCounts, StoreHealth, TimeSeriesRow,
};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the headline counts.
    pub fn format_counts(&self, counts: &HeadlineCounts) -> Result<String> {
        self.render(counts, || self.counts_table(counts))
    }

    /// Format a grantor ranking.
    pub fn format_grantors(&self, rows: &[GrantorCount]) -> Result<String> {
        self.render(rows, || self.grantors_table(rows))
    }

    /// Format an exclusion type ranking.
    pub fn format_exclusion_type_counts(&self, rows: &[ExclusionTypeCount]) -> Result<String> {
        self.render(rows, || self.exclusion_type_counts_table(rows))
    }

    /// Format the exclusion time series.
    pub fn format_time_series(&self, rows: &[TimeSeriesRow]) -> Result<String> {
        self.render(rows, || self.time_series_table(rows))
    }

    /// Format the exclusion type vocabulary.
    pub fn format_exclusion_types(&self, types: &[ExclusionType]) -> Result<String> {
        self.render(types, || self.exclusion_types_table(types))
    }

    /// Format a store health probe.
    pub fn format_health(&self, health: &StoreHealth) -> Result<String> {
        self.render(health, || {
            let message = format!("Store reachable (checked at {})", health.checked_at);
            if health.ok {
                self.success(&message)
            } else {
                self.error("Store not reachable")
            }
        })
    }

    /// Format every dashboard panel.
    pub fn format_dashboard(&self, dashboard: &Dashboard) -> Result<String> {
        self.render(dashboard, || {
            let sections = [
                ("Headline counts", self.counts_table(&dashboard.counts)),
                ("Top grantors", self.grantors_table(&dashboard.top_grantors)),
                (
                    "Top grantors (normalized)",
                    self.grantors_table(&dashboard.top_grantors_normalized),
                ),
                (
                    "Top grantors (distinct deeds)",
                    self.grantors_table(&dashboard.top_grantors_deduped),
                ),
                (
                    "Top exclusion types",
                    self.exclusion_type_counts_table(&dashboard.top_exclusion_types),
                ),
                (
                    "Top exclusion types (confirmed reviews)",
                    self.exclusion_type_counts_table(&dashboard.top_exclusion_types_reviewed),
                ),
                ("Exclusion time series", self.time_series_table(&dashboard.time_series)),
                ("Exclusion types", self.exclusion_types_table(&dashboard.exclusion_types)),
            ];
            sections
                .iter()
                .map(|(title, body)| format!("{}\n{}", self.heading(title), body))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
    }

    /// JSON for the JSON format, otherwise the given table.
    fn render<T, F>(&self, value: &T, table: F) -> Result<String>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> String,
    {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Table => Ok(table()),
        }
    }

    fn counts_table(&self, counts: &HeadlineCounts) -> String {
        self.table(
            ["Measure", "Count"],
            [
                ("Identified deeds", counts.identified),
                ("Confirmed deeds", counts.confirmed),
                ("Pending reviews", counts.pending_reviews),
                ("Reviews requesting help", counts.review_requested),
                ("False positives", counts.false_positives),
            ]
            .into_iter()
            .map(|(label, n)| [label.to_string(), n.to_string()]),
        )
    }

    fn grantors_table(&self, rows: &[GrantorCount]) -> String {
        self.table(
            ["#", "Grantor", "Count"],
            rows.iter()
                .enumerate()
                .map(|(i, r)| [(i + 1).to_string(), r.grantor.clone(), r.count.to_string()]),
        )
    }

    fn exclusion_type_counts_table(&self, rows: &[ExclusionTypeCount]) -> String {
        self.table(
            ["ID", "Exclusion type", "Count"],
            rows.iter()
                .map(|r| [r.exclusion_type_id.to_string(), r.title.clone(), r.count.to_string()]),
        )
    }

    fn time_series_table(&self, rows: &[TimeSeriesRow]) -> String {
        self.table(
            ["Year", "Type ID", "Exclusion type", "County", "Deeds"],
            rows.iter().map(|r| {
                [
                    r.year.to_string(),
                    r.exclusion_type_id.to_string(),
                    r.title.clone(),
                    r.county.clone(),
                    r.deed_count.to_string(),
                ]
            }),
        )
    }

    fn exclusion_types_table(&self, types: &[ExclusionType]) -> String {
        self.table(
            ["ID", "Title"],
            types.iter().map(|t| [t.id.to_string(), t.title.clone()]),
        )
    }

    /// Build a rounded table, or a notice when there are no rows.
    fn table<const N: usize, I>(&self, header: [&str; N], rows: I) -> String
    where
        I: IntoIterator<Item = [String; N]>,
    {
        let mut rows = rows.into_iter().peekable();
        if rows.peek().is_none() {
            return self.colorize("No rows found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(header);
        for row in rows {
            builder.push_record(row);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a section heading.
    pub fn heading(&self, title: &str) -> String {
        if self.color_enabled {
            title.bold().cyan().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
