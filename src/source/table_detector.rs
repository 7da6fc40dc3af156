//! Table detection from text positions (stream mode).
//!
//! Rows are spans sharing a baseline; columns are left edges that line up
//! across enough rows. No ruling lines are consulted.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::{TableGrid, TableRow};

use super::interpret::TextSpan;

/// Left edges within this many points share a bucket.
const EDGE_BUCKET: f32 = 5.0;

/// Tolerance for a span to count as aligned with a column edge.
const ALIGN_TOLERANCE: f32 = 5.0;

/// A row of spans sharing a baseline.
#[derive(Debug, Clone)]
struct SpanRow {
    y: f32,
    spans: Vec<TextSpan>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 8,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a page's text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables, top to bottom.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<TableGrid> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            log::debug!("TableDetector: not enough spans ({})", spans.len());
            return Vec::new();
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return Vec::new();
        }

        let columns = self.detect_columns(&rows);
        if columns.is_empty() || columns.len() < self.config.min_columns {
            log::debug!("TableDetector: {} columns, no table", columns.len());
            return Vec::new();
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let region = &rows[start..=end];

            // Columns of this region alone
            let region_columns = self.detect_columns(region);
            if region_columns.is_empty() || region_columns.len() < self.config.min_columns {
                continue;
            }
            if region_columns.len() > self.config.max_columns {
                log::debug!(
                    "TableDetector: skipping region with {} columns",
                    region_columns.len()
                );
                continue;
            }
            if self.is_list_pattern(region, &region_columns) {
                log::debug!("TableDetector: skipping region that looks like a list");
                continue;
            }

            log::debug!(
                "TableDetector: {} rows x {} columns between y={} and y={}",
                region.len(),
                region_columns.len(),
                region[0].y,
                region[region.len() - 1].y
            );
            tables.push(self.to_grid(region, &region_columns));
        }

        log::debug!("TableDetector: {} tables", tables.len());
        tables
    }

    /// Group spans into rows, top row first.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<SpanRow> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        let mut rows: Vec<SpanRow> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(make_row(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(make_row(current));
        }

        rows
    }

    /// Column left edges that recur across rows.
    ///
    /// Rows with several spans are preferred; when too few exist, every span
    /// of every row votes.
    fn detect_columns(&self, rows: &[SpanRow]) -> Vec<f32> {
        let multi: Vec<&SpanRow> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let voters: Vec<&SpanRow> = if multi.len() >= self.config.min_rows {
            multi
        } else {
            rows.iter().collect()
        };
        if voters.is_empty() {
            return Vec::new();
        }

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &voters {
            // Each bucket counts once per row
            let buckets: HashSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / EDGE_BUCKET).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((voters.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * EDGE_BUCKET)
            .collect();
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Contiguous runs of well-aligned rows, as inclusive index ranges.
    fn find_table_regions(&self, rows: &[SpanRow], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    /// Build the grid: one cell per column, absent when no span falls in it.
    fn to_grid(&self, rows: &[SpanRow], columns: &[f32]) -> TableGrid {
        let mut grid = TableGrid::new();
        for row in rows {
            let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
            for span in &row.spans {
                let col = column_for(span.x, columns);
                cells[col].push(span.text.trim());
            }
            let table_row: TableRow = cells
                .into_iter()
                .map(|parts| {
                    let text = parts.join(" ");
                    (!text.is_empty()).then_some(text)
                })
                .collect();
            grid.add_row(table_row);
        }
        grid
    }

    /// Whether the region is a bulleted or numbered list rather than a table.
    fn is_list_pattern(&self, rows: &[SpanRow], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullets = 0;
        let mut numbers = 0;
        for row in rows {
            // Spans are sorted by x within a row
            if let Some(first) = row.spans.first() {
                let text = first.text.trim();
                if is_bullet_marker(text) {
                    bullets += 1;
                } else if is_number_marker(text) {
                    numbers += 1;
                }
            }
        }

        let bullet_ratio = bullets as f32 / rows.len() as f32;
        let marker_ratio = (bullets + numbers) as f32 / rows.len() as f32;

        // Numbered first columns are common in real tables; only two-column
        // regions are rejected for them
        bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
    }
}

/// Row from spans within one baseline tolerance, ordered left to right.
fn make_row(mut spans: Vec<TextSpan>) -> SpanRow {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    SpanRow { y, spans }
}

fn alignment_score(row: &SpanRow, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|s| columns.iter().any(|c| (s.x - c).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// Column whose band contains `x`, else the nearest edge.
fn column_for(x: f32, columns: &[f32]) -> usize {
    // Spans may start slightly left of their column edge
    const SLACK: f32 = 10.0;

    for (i, &start) in columns.iter().enumerate() {
        let end = columns.get(i + 1).copied().unwrap_or(f32::INFINITY);
        if x >= start - SLACK && x < end - SLACK {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (x - **a)
                .abs()
                .partial_cmp(&(x - **b).abs())
                .unwrap_or(Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪"
            | "◦" | "▸" | "►" | "■" | "●" | "□" | "◆" | "▶"
    )
}

/// "1.", "12)", bare numbers and single-letter markers like "a.".
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }
    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    let mut chars = cleaned.chars();
    if !matches!(chars.next_back(), Some('.') | Some(')')) {
        return false;
    }
    let body = chars.as_str();
    (!body.is_empty() && body.chars().all(|c| c.is_ascii_digit()))
        || (body.chars().count() == 1 && body.chars().all(char::is_alphabetic))
}
