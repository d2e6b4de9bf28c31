//! Delimited-file reader for rectangle datasets.
//!
//! Input files carry a header row naming the columns `ID, xmin, ymin, xmax,
//! ymax` (case-insensitive, any order, extra columns ignored) followed by one
//! row per rectangle. The delimiter is a tab when the header contains one and a
//! comma otherwise, and must be consistent within a file.

use crate::compute::validation::validate_record;
use crate::config::LoadPolicy;
use crate::error::{GridQueryError, Result};
use gridquery_types::rect::Rectangle;
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const COLUMNS: [&str; 5] = ["id", "xmin", "ymin", "xmax", "ymax"];

/// One rejected input row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// 1-based line number (or record position for in-memory loads)
    pub line: usize,
    pub value: String,
    pub reason: String,
}

/// Outcome of loading one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub label: Option<String>,
    /// Rectangles accepted
    pub loaded: usize,
    /// Rows rejected as malformed (lenient policy only)
    pub malformed: usize,
    /// Rows rejected for repeating an id (lenient policy only)
    pub duplicates: usize,
    pub issues: Vec<RowIssue>,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.malformed + self.duplicates
    }
}

/// Rectangles parsed from one source together with their load report.
#[derive(Debug, Clone, Default)]
pub struct ParsedDataset {
    pub rects: Vec<Rectangle>,
    pub report: LoadReport,
}

/// Accumulates accepted rectangles while applying the load policy.
///
/// Shared by the file reader and in-memory grid loads so both follow the same
/// duplicate-id and malformed-row rules.
pub(crate) struct DatasetBuilder {
    policy: LoadPolicy,
    label: Option<String>,
    seen: FxHashSet<String>,
    rects: Vec<Rectangle>,
    report: LoadReport,
}

impl DatasetBuilder {
    pub(crate) fn new(label: Option<&str>, policy: LoadPolicy) -> Self {
        Self {
            policy,
            label: label.map(str::to_owned),
            seen: FxHashSet::default(),
            rects: Vec::new(),
            report: LoadReport {
                label: label.map(str::to_owned),
                ..LoadReport::default()
            },
        }
    }

    /// Accept a rectangle unless its id was already seen in this load.
    pub(crate) fn push(&mut self, line: usize, rect: Rectangle) -> Result<()> {
        if self.seen.contains(rect.id()) {
            return match self.policy {
                LoadPolicy::Strict => Err(GridQueryError::DuplicateId {
                    line,
                    id: rect.id,
                }),
                LoadPolicy::Lenient => {
                    self.report.duplicates += 1;
                    self.report.issues.push(RowIssue {
                        line,
                        value: rect.id,
                        reason: "duplicate id".to_string(),
                    });
                    Ok(())
                }
            };
        }

        self.seen.insert(rect.id.clone());
        let rect = match &self.label {
            Some(label) => rect.with_label(label.as_str()),
            None => rect,
        };
        self.rects.push(rect);
        Ok(())
    }

    /// Record a malformed row: fatal under `Strict`, counted under `Lenient`.
    pub(crate) fn reject(&mut self, err: GridQueryError) -> Result<()> {
        match (self.policy, err) {
            (
                LoadPolicy::Lenient,
                GridQueryError::MalformedRecord {
                    line,
                    value,
                    reason,
                },
            ) => {
                log::warn!("Skipping malformed record at line {}: {}", line, reason);
                self.report.malformed += 1;
                self.report.issues.push(RowIssue {
                    line,
                    value,
                    reason,
                });
                Ok(())
            }
            (_, err) => Err(err),
        }
    }

    pub(crate) fn finish(mut self) -> ParsedDataset {
        self.report.loaded = self.rects.len();
        if self.report.skipped() > 0 {
            log::warn!(
                "Loaded {} rectangles, skipped {} malformed and {} duplicate rows",
                self.report.loaded,
                self.report.malformed,
                self.report.duplicates
            );
        }
        ParsedDataset {
            rects: self.rects,
            report: self.report,
        }
    }
}

/// Column positions resolved from the header row.
struct Layout {
    delimiter: char,
    positions: [usize; 5],
}

impl Layout {
    fn from_header(line_no: usize, header: &str) -> Result<Self> {
        let delimiter = if header.contains('\t') { '\t' } else { ',' };
        let names: Vec<String> = header
            .split(delimiter)
            .map(|name| clean_field(name).to_ascii_lowercase())
            .collect();

        let mut positions = [0usize; 5];
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            *slot = names.iter().position(|n| n == column).ok_or_else(|| {
                GridQueryError::InvalidHeader(format!(
                    "line {}: missing column '{}' in header '{}'",
                    line_no,
                    column,
                    header.trim()
                ))
            })?;
        }

        Ok(Self {
            delimiter,
            positions,
        })
    }

    fn width(&self) -> usize {
        self.positions.iter().copied().max().unwrap_or(0) + 1
    }

    fn parse_row(&self, line_no: usize, row: &str) -> Result<Rectangle> {
        let fields: Vec<&str> = row.split(self.delimiter).map(clean_field).collect();
        if fields.len() < self.width() {
            return Err(GridQueryError::malformed(
                line_no,
                row.trim(),
                format!(
                    "expected at least {} fields, found {}",
                    self.width(),
                    fields.len()
                ),
            ));
        }

        let id = fields[self.positions[0]];
        if id.is_empty() {
            return Err(GridQueryError::malformed(line_no, row.trim(), "empty ID"));
        }

        let mut coords = [0.0f64; 4];
        for (i, coord) in coords.iter_mut().enumerate() {
            let raw = fields[self.positions[i + 1]];
            *coord = raw.parse::<f64>().map_err(|_| {
                GridQueryError::malformed(
                    line_no,
                    raw,
                    format!("{} is not a number", COLUMNS[i + 1]),
                )
            })?;
        }

        let [xmin, ymin, xmax, ymax] = coords;
        validate_record(line_no, xmin, ymin, xmax, ymax)?;
        Ok(Rectangle::new(id, xmin, ymin, xmax, ymax))
    }
}

fn clean_field(field: &str) -> &str {
    field.trim().trim_start_matches('\u{feff}').trim_matches('"').trim()
}

/// Parse a delimited rectangle source.
///
/// Every accepted rectangle is tagged with `label` when one is given. Row
/// errors follow `policy`; header and I/O errors are always fatal.
///
/// # Examples
///
/// ```
/// use gridquery::reader::read_rectangles;
/// use gridquery::LoadPolicy;
///
/// let csv = "ID,xmin,ymin,xmax,ymax\nR1,0,0,10,10\nR2,oops,0,1,1\n";
/// let parsed = read_rectangles(csv.as_bytes(), Some("A"), LoadPolicy::Lenient).unwrap();
/// assert_eq!(parsed.report.loaded, 1);
/// assert_eq!(parsed.report.malformed, 1);
/// assert_eq!(parsed.rects[0].label(), Some("A"));
/// ```
pub fn read_rectangles<R: BufRead>(
    source: R,
    label: Option<&str>,
    policy: LoadPolicy,
) -> Result<ParsedDataset> {
    let mut builder = DatasetBuilder::new(label, policy);
    let mut layout: Option<Layout> = None;

    for (idx, line) in source.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        match &layout {
            None => layout = Some(Layout::from_header(line_no, &line)?),
            Some(layout) => match layout.parse_row(line_no, &line) {
                Ok(rect) => builder.push(line_no, rect)?,
                Err(err) => builder.reject(err)?,
            },
        }
    }

    if layout.is_none() {
        return Err(GridQueryError::InvalidHeader(
            "missing header row 'ID,xmin,ymin,xmax,ymax'".to_string(),
        ));
    }

    Ok(builder.finish())
}

/// Open and parse a delimited rectangle file.
pub fn read_path<P: AsRef<Path>>(
    path: P,
    label: Option<&str>,
    policy: LoadPolicy,
) -> Result<ParsedDataset> {
    let file = File::open(path.as_ref())?;
    let parsed = read_rectangles(BufReader::new(file), label, policy)?;
    log::debug!(
        "Read {} rectangles from {}",
        parsed.report.loaded,
        path.as_ref().display()
    );
    Ok(parsed)
}
