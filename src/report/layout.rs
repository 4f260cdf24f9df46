//! Page layout for the PDF report.
//!
//! The report is first flattened into [`Block`]s (header fields, headings,
//! table rows) and then flowed onto US Letter pages as positioned [`Shape`]s.
//! All coordinates are points measured from the top-left corner of the page;
//! the PDF writer flips them.

use crate::model::{AggregateReport, RepositorySummary};
use crate::report::text::{DATETIME_FORMAT, NO_COMMITS};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;

const INCH: f32 = 72.0;
const TOP: f32 = MARGIN;
const BOTTOM: f32 = PAGE_HEIGHT - MARGIN;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

// Average glyph width as a fraction of the font size. Exact for Courier,
// an upper bound for most Helvetica text.
const GLYPH_WIDTH: f32 = 0.6;

const FIELD_COLUMNS: [f32; 2] = [3.0 * INCH, 3.0 * INCH];
const FIELD_SIZE: f32 = 10.0;
const FIELD_LINE: f32 = 12.0;
const FIELD_PADDING: f32 = 12.0;

const HEADING_SIZE: f32 = 16.0;
const HEADING_LINE: f32 = 20.0;
const HEADING_SPACE_AFTER: f32 = 12.0;

const BODY_SIZE: f32 = 10.0;
const BODY_LINE: f32 = 14.0;

/// `#`, message, date, hash.
const TABLE_COLUMNS: [f32; 4] = [0.4 * INCH, 3.5 * INCH, 1.5 * INCH, 1.0 * INCH];
const TABLE_HEADINGS: [&str; 4] = ["#", "Message", "Date", "Hash"];
const TABLE_HEADER_SIZE: f32 = 10.0;
const TABLE_HEADER_HEIGHT: f32 = 24.0;
const ROW_SIZE: f32 = 8.0;
const ROW_LINE: f32 = 10.0;
const CELL_PADDING_X: f32 = 6.0;
const CELL_PADDING_Y: f32 = 4.0;

const SECTION_GAP: f32 = 20.0;
const PARAGRAPH_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

pub const ACCENT: Rgb8 = Rgb8(0x2E, 0x5A, 0x88);
pub const STRIPE: Rgb8 = Rgb8(0xF5, 0xF5, 0xF5);
pub const BORDER: Rgb8 = Rgb8(0xCC, 0xCC, 0xCC);
pub const DARK: Rgb8 = Rgb8(0x33, 0x33, 0x33);
pub const WHITE: Rgb8 = Rgb8(0xFF, 0xFF, 0xFF);
pub const BLACK: Rgb8 = Rgb8(0x00, 0x00, 0x00);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Font {
    Regular,
    Bold,
    Mono,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Filled, bordered box. `y` is its top edge.
    Cell {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb8,
    },
    /// Single line of text. `y` is its baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Rgb8,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub shapes: Vec<Shape>,
}

/// Where the first piece of a commit row ended up.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PlacedRow {
    pub summary: usize,
    pub index: usize,
    pub page: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<Page>,
    pub rows: Vec<PlacedRow>,
}

impl DocumentLayout {
    pub fn rows_for(&self, summary: usize) -> impl Iterator<Item = &PlacedRow> {
        self.rows.iter().filter(move |row| row.summary == summary)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Field { key: String, value: Vec<String> },
    Gap(f32),
    Heading(Vec<String>),
    Paragraph(Vec<String>),
    TableHeader,
    Row(Row),
}

#[derive(Debug, Clone, PartialEq)]
struct Row {
    summary: usize,
    index: usize,
    message: Vec<String>,
    date: String,
    hash: String,
}

pub fn layout(report: &AggregateReport) -> DocumentLayout {
    let mut paginator = Paginator::new();
    for block in blocks(report) {
        paginator.place(&block);
    }
    paginator.finish()
}

fn blocks(report: &AggregateReport) -> Vec<Block> {
    let value_chars = chars_per_line(FIELD_COLUMNS[1], FIELD_SIZE);
    let field = |key: &str, value: String| Block::Field {
        key: key.to_string(),
        value: wrap(&value, value_chars),
    };

    let mut blocks = vec![
        field("Developer Name", report.developer_name().to_string()),
        field(
            "Report Generated On",
            report.generated_at().format(DATETIME_FORMAT).to_string(),
        ),
        field("Date Range", report.date_range().to_string()),
        field(
            "Total Repositories Worked",
            report.summaries().len().to_string(),
        ),
        field("Total Commits", report.overall_commit_count().to_string()),
        Block::Gap(SECTION_GAP),
    ];
    for (position, summary) in report.summaries().iter().enumerate() {
        blocks.extend(summary_blocks(position, summary));
    }
    blocks
}

fn summary_blocks(position: usize, summary: &RepositorySummary) -> Vec<Block> {
    let body_chars = chars_per_line(CONTENT_WIDTH, BODY_SIZE);
    let message_chars = chars_per_line(TABLE_COLUMNS[1], ROW_SIZE);

    let mut blocks = vec![
        Block::Heading(wrap(
            summary.repo_name(),
            chars_per_line(CONTENT_WIDTH, HEADING_SIZE),
        )),
        Block::Paragraph(wrap(
            &format!("Total Commits: {}", summary.total_commits()),
            body_chars,
        )),
        Block::Gap(PARAGRAPH_GAP),
    ];
    if summary.commits().is_empty() {
        blocks.push(Block::Paragraph(wrap(NO_COMMITS, body_chars)));
    } else {
        blocks.push(Block::TableHeader);
        blocks.extend(summary.commits().iter().enumerate().map(|(idx, commit)| {
            Block::Row(Row {
                summary: position,
                index: idx + 1,
                message: wrap(commit.message(), message_chars),
                date: commit.date().format(DATETIME_FORMAT).to_string(),
                hash: commit.short_hash().to_string(),
            })
        }));
    }
    blocks.push(Block::Gap(SECTION_GAP));
    blocks
}

struct Paginator {
    pages: Vec<Page>,
    rows: Vec<PlacedRow>,
    y: f32,
    table_open: bool,
    fresh: bool,
}

impl Paginator {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            rows: Vec::new(),
            y: TOP,
            table_open: false,
            fresh: true,
        }
    }

    fn finish(self) -> DocumentLayout {
        DocumentLayout {
            pages: self.pages,
            rows: self.rows,
        }
    }

    fn remaining(&self) -> f32 {
        BOTTOM - self.y
    }

    fn shapes(&mut self) -> &mut Vec<Shape> {
        let last = self.pages.len() - 1;
        &mut self.pages[last].shapes
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = TOP;
        if self.table_open {
            self.table_header();
        }
        self.fresh = true;
    }

    /// Starts a new page unless `height` fits or the page has nothing on it yet.
    fn reserve(&mut self, height: f32) {
        if height > self.remaining() && !self.fresh {
            self.new_page();
        }
    }

    fn place(&mut self, block: &Block) {
        match block {
            Block::Field { key, value } => {
                self.table_open = false;
                self.field(key, value);
            }
            Block::Gap(height) => {
                self.y = (self.y + height).min(BOTTOM);
            }
            Block::Heading(lines) => {
                self.table_open = false;
                let height = lines.len() as f32 * HEADING_LINE + HEADING_SPACE_AFTER;
                // keep the heading with the line that follows it
                self.reserve(height + BODY_LINE);
                self.lines(lines, HEADING_LINE, HEADING_SIZE, Font::Bold, ACCENT);
                self.y = (self.y + HEADING_SPACE_AFTER).min(BOTTOM);
            }
            Block::Paragraph(lines) => {
                self.table_open = false;
                self.reserve(lines.len() as f32 * BODY_LINE);
                self.lines(lines, BODY_LINE, BODY_SIZE, Font::Regular, BLACK);
            }
            Block::TableHeader => {
                self.reserve(TABLE_HEADER_HEIGHT + row_height(1));
                self.table_header();
                self.table_open = true;
            }
            Block::Row(row) => self.row(row),
        }
    }

    fn field(&mut self, key: &str, value: &[String]) {
        let mut value = value;
        let mut first = true;
        loop {
            if field_height(value.len()) > self.remaining() && !self.fresh {
                self.new_page();
                continue;
            }
            let fit = field_lines_fitting(self.remaining()).clamp(1, value.len().max(1));
            let (piece, rest) = value.split_at(fit.min(value.len()));
            self.field_piece(if first { key } else { "" }, piece);
            if rest.is_empty() {
                return;
            }
            value = rest;
            first = false;
            self.new_page();
        }
    }

    fn field_piece(&mut self, key: &str, value: &[String]) {
        let height = field_height(value.len());
        let y = self.y;
        let mut x = MARGIN;
        for (column, width) in FIELD_COLUMNS.iter().enumerate() {
            self.shapes().push(Shape::Cell {
                x,
                y,
                width: *width,
                height,
                fill: STRIPE,
            });
            let text_lines = match column {
                0 if key.is_empty() => vec![],
                0 => vec![key.to_string()],
                _ => value.to_vec(),
            };
            for (i, line) in text_lines.into_iter().enumerate() {
                self.shapes().push(Shape::Text {
                    x: x + CELL_PADDING_X,
                    y: y + FIELD_PADDING + FIELD_SIZE + i as f32 * FIELD_LINE,
                    size: FIELD_SIZE,
                    font: Font::Bold,
                    color: DARK,
                    text: line,
                });
            }
            x += width;
        }
        self.y += height;
        self.fresh = false;
    }

    fn lines(&mut self, lines: &[String], line_height: f32, size: f32, font: Font, color: Rgb8) {
        for line in lines {
            self.reserve(line_height);
            let y = self.y + size;
            self.shapes().push(Shape::Text {
                x: MARGIN,
                y,
                size,
                font,
                color,
                text: line.clone(),
            });
            self.y += line_height;
            self.fresh = false;
        }
    }

    fn table_header(&mut self) {
        let y = self.y;
        let mut x = MARGIN;
        for (width, heading) in TABLE_COLUMNS.iter().zip(TABLE_HEADINGS) {
            self.shapes().push(Shape::Cell {
                x,
                y,
                width: *width,
                height: TABLE_HEADER_HEIGHT,
                fill: ACCENT,
            });
            self.shapes().push(Shape::Text {
                x: x + CELL_PADDING_X,
                y: y + CELL_PADDING_Y + TABLE_HEADER_SIZE,
                size: TABLE_HEADER_SIZE,
                font: Font::Bold,
                color: WHITE,
                text: heading.to_string(),
            });
            x += width;
        }
        self.y += TABLE_HEADER_HEIGHT;
    }

    fn row(&mut self, row: &Row) {
        let fill = if row.index % 2 == 1 { WHITE } else { STRIPE };
        let mut message = &row.message[..];
        let mut first = true;
        loop {
            if row_height(message.len()) > self.remaining() && !self.fresh {
                self.new_page();
                continue;
            }
            let fit = lines_fitting(self.remaining()).clamp(1, message.len().max(1));
            let (piece, rest) = message.split_at(fit.min(message.len()));
            if first {
                self.rows.push(PlacedRow {
                    summary: row.summary,
                    index: row.index,
                    page: self.pages.len() - 1,
                });
            }
            self.row_piece(row, piece, first, fill);
            if rest.is_empty() {
                return;
            }
            message = rest;
            first = false;
            self.new_page();
        }
    }

    fn row_piece(&mut self, row: &Row, message: &[String], first: bool, fill: Rgb8) {
        let height = row_height(message.len());
        let y = self.y;
        let columns: [Vec<String>; 4] = if first {
            [
                vec![row.index.to_string()],
                message.to_vec(),
                vec![row.date.clone()],
                vec![row.hash.clone()],
            ]
        } else {
            [vec![], message.to_vec(), vec![], vec![]]
        };
        let mut x = MARGIN;
        for (width, lines) in TABLE_COLUMNS.iter().zip(columns) {
            self.shapes().push(Shape::Cell {
                x,
                y,
                width: *width,
                height,
                fill,
            });
            for (i, line) in lines.into_iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                self.shapes().push(Shape::Text {
                    x: x + CELL_PADDING_X,
                    y: y + CELL_PADDING_Y + ROW_SIZE + i as f32 * ROW_LINE,
                    size: ROW_SIZE,
                    font: Font::Mono,
                    color: BLACK,
                    text: line,
                });
            }
            x += width;
        }
        self.y += height;
        self.fresh = false;
    }
}

fn field_height(lines: usize) -> f32 {
    lines.max(1) as f32 * FIELD_LINE + 2.0 * FIELD_PADDING
}

fn field_lines_fitting(space: f32) -> usize {
    ((space - 2.0 * FIELD_PADDING) / FIELD_LINE).floor().max(0.0) as usize
}

fn row_height(lines: usize) -> f32 {
    lines.max(1) as f32 * ROW_LINE + 2.0 * CELL_PADDING_Y
}

fn lines_fitting(space: f32) -> usize {
    ((space - 2.0 * CELL_PADDING_Y) / ROW_LINE).floor().max(0.0) as usize
}

fn chars_per_line(column_width: f32, size: f32) -> usize {
    (((column_width - 2.0 * CELL_PADDING_X) / (size * GLYPH_WIDTH)).floor() as usize).max(1)
}

/// Greedy word wrap. Newlines always break; words longer than a line are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let chars = raw.trim_end_matches('\r').chars().collect::<Vec<_>>();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut start = 0;
        while start < chars.len() {
            let end = (start + max_chars).min(chars.len());
            if end == chars.len() {
                lines.push(chars[start..end].iter().collect());
                break;
            }
            let window = &chars[start..=end];
            match window.iter().rposition(|c| *c == ' ') {
                Some(space) if space > 0 => {
                    lines.push(chars[start..start + space].iter().collect());
                    start += space + 1;
                }
                _ => {
                    lines.push(chars[start..end].iter().collect());
                    start = end;
                }
            }
        }
    }
    lines
}
