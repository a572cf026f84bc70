//! Table formatting for CLI output

use aegis_kernel::security::Finding;
use comfy_table::{Cell, Color, ContentArrangement, Table as ComfyTable, presets::UTF8_FULL};

/// Table builder for CLI output
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(mut self, headers: &[&str]) -> Self {
        self.headers = headers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn add_row(mut self, row: &[&str]) -> Self {
        self.rows.push(row.iter().map(Cell::new).collect());
        self
    }

    pub fn add_cells(mut self, row: Vec<Cell>) -> Self {
        self.rows.push(row);
        self
    }

    #[must_use]
    pub fn build(self) -> Table {
        let mut inner = ComfyTable::new();
        inner
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(&self.headers);
        for row in self.rows {
            inner.add_row(row);
        }
        Table { inner }
    }
}

/// Table for CLI output
#[derive(Debug, Clone)]
pub struct Table {
    inner: ComfyTable,
}

impl Table {
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    /// One row per finding. Matched text is never shown.
    pub fn findings(findings: &[Finding]) -> Self {
        let mut builder = Self::builder().headers(&["Entity", "Start", "End", "Confidence", "Weight"]);
        for finding in findings {
            let color = match finding.entity_type.risk_weight() {
                w if w >= 40 => Color::Red,
                w if w >= 25 => Color::Yellow,
                _ => Color::Reset,
            };
            builder = builder.add_cells(vec![
                Cell::new(finding.entity_type).fg(color),
                Cell::new(finding.start),
                Cell::new(finding.end),
                Cell::new(format!("{:.2}", finding.confidence)),
                Cell::new(finding.entity_type.risk_weight()),
            ]);
        }
        builder.build()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.row_count() == 0
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
