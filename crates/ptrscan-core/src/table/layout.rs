//! Positioned text from PDF content streams.
//!
//! Glyph widths are estimated from the font size rather than read from font
//! metrics, which is enough to separate table columns.

use lopdf::content::Content;
use lopdf::Object;

/// Average glyph width as a fraction of the font size.
const GLYPH_WIDTH_FACTOR: f64 = 0.5;

/// TJ adjustments beyond this many thousandths of an em are word gaps.
const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Horizontal gap, in font sizes, that separates two segments on a line.
const SEGMENT_GAP_FACTOR: f64 = 1.2;

/// Segment starts closer than this share a column anchor.
pub const COLUMN_TOLERANCE: f64 = 10.0;

/// A string drawn at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub font_size: f64,
    pub text: String,
}

/// Adjacent runs on a line with no column gap between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub y: f64,
    pub segments: Vec<Segment>,
}

impl Line {
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other` in PDF row-vector convention.
    fn then(self, other: Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn horizontal_scale(self) -> f64 {
        self.0[0].hypot(self.0[1])
    }

    fn vertical_scale(self) -> f64 {
        self.0[2].hypot(self.0[3])
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    (operands.len() >= N).then_some(out)
}

/// UTF-16BE when the string carries a byte-order mark, Latin-1 otherwise.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

#[derive(Debug)]
struct TextState {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    leading: f64,
    font_size: f64,
    runs: Vec<TextRun>,
}

impl TextState {
    fn new() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            leading: 0.0,
            font_size: 0.0,
            runs: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).then(self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Record `text` at the current position and advance by `advance` text-space units.
    fn show(&mut self, text: String, advance: f64) {
        let device = self.tm.then(self.ctm);
        if !text.trim().is_empty() {
            self.runs.push(TextRun {
                x: device.0[4],
                y: device.0[5],
                width: advance * device.horizontal_scale(),
                font_size: self.font_size * device.vertical_scale(),
                text,
            });
        }
        self.tm = Matrix::translate(advance, 0.0).then(self.tm);
    }

    fn string_advance(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * GLYPH_WIDTH_FACTOR
    }

    fn show_string(&mut self, bytes: &[u8]) {
        let text = decode_pdf_string(bytes);
        let advance = self.string_advance(&text);
        self.show(text, advance);
    }

    fn show_array(&mut self, items: &[Object]) {
        let mut text = String::new();
        let mut advance = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let piece = decode_pdf_string(bytes);
                    advance += self.string_advance(&piece);
                    text.push_str(&piece);
                }
                other => {
                    if let Some(adjust) = number(other) {
                        advance -= adjust / 1000.0 * self.font_size;
                        if -adjust > TJ_SPACE_THRESHOLD {
                            text.push(' ');
                        }
                    }
                }
            }
        }
        self.show(text, advance);
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(values) = numbers::<6>(operands) {
                    self.ctm = Matrix(values).then(self.ctm);
                }
            }
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    self.font_size = size;
                }
            }
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    self.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    self.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(values) = numbers::<6>(operands) {
                    self.tlm = Matrix(values);
                    self.tm = self.tlm;
                }
            }
            "T*" => self.next_line(),
            "Tj" | "'" | "\"" => {
                if operator != "Tj" {
                    self.next_line();
                }
                let string = operands.iter().rev().find_map(|operand| match operand {
                    Object::String(bytes, _) => Some(bytes.as_slice()),
                    _ => None,
                });
                if let Some(bytes) = string {
                    self.show_string(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    self.show_array(items);
                }
            }
            _ => {}
        }
    }
}

/// Decode a page content stream into positioned text runs.
pub fn text_runs(content: &[u8]) -> Result<Vec<TextRun>, lopdf::Error> {
    let content = Content::decode(content)?;
    let mut state = TextState::new();
    for operation in &content.operations {
        state.apply(&operation.operator, &operation.operands);
    }
    Ok(state.runs)
}

/// Group runs into top-to-bottom lines of left-to-right segments.
pub fn group_lines(mut runs: Vec<TextRun>) -> Vec<Line> {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut grouped: Vec<(f64, Vec<TextRun>)> = Vec::new();
    for run in runs {
        let tolerance = (run.font_size * 0.5).max(2.0);
        match grouped.last_mut() {
            Some((y, members)) if (*y - run.y).abs() <= tolerance => members.push(run),
            _ => grouped.push((run.y, vec![run])),
        }
    }

    grouped
        .into_iter()
        .map(|(y, mut members)| {
            members.sort_by(|a, b| a.x.total_cmp(&b.x));
            Line {
                y,
                segments: merge_segments(members),
            }
        })
        .collect()
}

fn merge_segments(runs: Vec<TextRun>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    for run in runs {
        let gap_limit = run.font_size.max(1.0) * SEGMENT_GAP_FACTOR;
        match segments.last_mut() {
            Some(last) if run.x - last.end <= gap_limit => {
                if run.x - last.end > run.font_size * 0.1 {
                    last.text.push(' ');
                }
                last.text.push_str(run.text.trim());
                last.end = last.end.max(run.x + run.width);
            }
            _ => segments.push(Segment {
                x: run.x,
                end: run.x + run.width,
                text: run.text.trim().to_string(),
            }),
        }
    }
    segments
}

/// Merge sorted values closer than `threshold` and return cluster centroids.
pub fn cluster_values(values: &[f64], threshold: f64) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some(cluster) if cluster.last().is_some_and(|last| value - last <= threshold) => {
                cluster.push(value)
            }
            _ => clusters.push(vec![value]),
        }
    }

    clusters
        .iter()
        .map(|cluster| cluster.iter().sum::<f64>() / cluster.len() as f64)
        .collect()
}

fn nearest_anchor(anchors: &[f64], x: f64) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - x).abs().total_cmp(&(*b - x).abs()))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

/// Rebuild table rows from the multi-segment region of a page.
///
/// The region spans the first to the last line with two or more segments.
/// Single-segment lines inside it that start right of the first column are
/// wrapped text and are appended to the previous row's cell. `None` when the
/// page has fewer than two multi-segment lines.
pub fn table_rows(lines: &[Line]) -> Option<Vec<Vec<String>>> {
    let first = lines.iter().position(|line| line.segments.len() > 1)?;
    let last = lines.iter().rposition(|line| line.segments.len() > 1)?;
    if first == last {
        return None;
    }

    let region = &lines[first..=last];
    let starts: Vec<f64> = region
        .iter()
        .filter(|line| line.segments.len() > 1)
        .flat_map(|line| line.segments.iter().map(|segment| segment.x))
        .collect();
    let anchors = cluster_values(&starts, COLUMN_TOLERANCE);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for line in region {
        // A lone segment under a filled row is wrapped cell text, in any column.
        if let [segment] = line.segments.as_slice() {
            if let Some(previous) = rows.last_mut().filter(|row| filled_cells(row) > 1) {
                append_cell(&mut previous[nearest_anchor(&anchors, segment.x)], &segment.text);
                continue;
            }
        }

        let mut cells = vec![String::new(); anchors.len()];
        for segment in &line.segments {
            append_cell(&mut cells[nearest_anchor(&anchors, segment.x)], &segment.text);
        }
        rows.push(cells);
    }

    Some(rows)
}

fn filled_cells(row: &[String]) -> usize {
    row.iter().filter(|cell| !cell.trim().is_empty()).count()
}

fn append_cell(cell: &mut String, text: &str) {
    if !cell.is_empty() {
        cell.push(' ');
    }
    cell.push_str(text);
}
