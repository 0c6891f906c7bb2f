//! Paginated report layout in A4 millimetres, top-left origin.
//!
//! The layout is format-neutral: [`super::pdf`] turns it into bytes.

use chrono::NaiveDate;
use risk_registry::CategoryInsight;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const MARGIN: f64 = 15.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
pub const TOP_Y: f64 = 20.0;
/// Content must end above this line; anything lower starts a new page.
pub const PAGE_BREAK_Y: f64 = 270.0;
pub const FOOTER_Y: f64 = 287.0;

const HEADER_BAND: f64 = 30.0;
const TABLE_FONT: f64 = 9.0;
const LINE_HEIGHT: f64 = 4.2;
const CELL_PAD: f64 = 1.5;
const SECTION_GAP: f64 = 8.0;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_RATIO: f64 = 0.5;
const PT_TO_MM: f64 = 25.4 / 72.0;

pub type Rgb = (u8, u8, u8);

pub const BRAND: Rgb = (30, 64, 175);
pub const WHITE: Rgb = (255, 255, 255);
pub const INK: Rgb = (30, 41, 59);
pub const MUTED: Rgb = (100, 116, 139);
pub const PANEL: Rgb = (241, 245, 249);
pub const RULE: Rgb = (203, 213, 225);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Rgb,
    },
    /// `y` is the text baseline.
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        color: Rgb,
        text: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Rgb,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Item::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages
            .iter()
            .any(|p| p.texts().any(|t| t.contains(needle)))
    }
}

/// Split `text` into lines that fit `width` mm at `size` pt. Words longer
/// than a line are broken.
pub fn wrap(text: &str, width: f64, size: f64) -> Vec<String> {
    let per_char = size * PT_TO_MM * GLYPH_RATIO;
    let max_chars = ((width / per_char).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct Column {
    title: &'static str,
    width: f64,
}

const fn col(title: &'static str, width: f64) -> Column {
    Column { title, width }
}

struct Layout {
    pages: Vec<Page>,
    y: f64,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP_Y,
        }
    }

    fn push(&mut self, item: Item) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = TOP_Y;
    }

    /// Start a new page unless `height` more millimetres fit above the break line.
    fn ensure(&mut self, height: f64) -> bool {
        if self.y + height > PAGE_BREAK_Y {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn text(&mut self, x: f64, y: f64, size: f64, font: Font, color: Rgb, text: impl Into<String>) {
        self.push(Item::Text {
            x,
            y,
            size,
            font,
            color,
            text: text.into(),
        });
    }

    fn header_band(&mut self, insight: &CategoryInsight, date: NaiveDate) {
        self.push(Item::Rect {
            x: 0.0,
            y: 0.0,
            w: PAGE_WIDTH,
            h: HEADER_BAND,
            fill: BRAND,
        });
        self.text(MARGIN, 13.0, 20.0, Font::Bold, WHITE, "SupplyShield");
        self.text(
            MARGIN,
            22.0,
            11.0,
            Font::Regular,
            WHITE,
            format!("{} Supply Chain Risk Report", insight.category),
        );
        self.text(
            PAGE_WIDTH - MARGIN - 38.0,
            22.0,
            9.0,
            Font::Regular,
            WHITE,
            format!("Generated {}", date.format("%Y-%m-%d")),
        );
        self.y = HEADER_BAND + 8.0;
    }

    fn summary_box(&mut self, insight: &CategoryInsight) {
        let height = 34.0;
        let top = self.y;
        self.push(Item::Rect {
            x: MARGIN,
            y: top,
            w: CONTENT_WIDTH,
            h: height,
            fill: PANEL,
        });
        self.text(MARGIN + 4.0, top + 8.0, 13.0, Font::Bold, INK, "Risk Summary");

        let score = if insight.risk_score.is_finite() {
            insight.risk_score
        } else {
            0.0
        };
        let level = insight.risk_level;
        self.text(
            MARGIN + 4.0,
            top + 16.0,
            10.0,
            Font::Regular,
            INK,
            format!("Category: {}", insight.category),
        );
        self.text(
            MARGIN + 4.0,
            top + 22.0,
            10.0,
            Font::Regular,
            INK,
            format!("Risk Score: {score:.1} / 100"),
        );
        self.text(
            MARGIN + 4.0,
            top + 28.0,
            10.0,
            Font::Bold,
            level.rgb(),
            format!("Risk Level: {}", level.label()),
        );
        self.text(
            MARGIN + 95.0,
            top + 16.0,
            10.0,
            Font::Regular,
            MUTED,
            format!("Commodities tracked: {}", insight.commodities_tracked.len()),
        );
        if !insight.computed_at.is_empty() {
            self.text(
                MARGIN + 95.0,
                top + 22.0,
                10.0,
                Font::Regular,
                MUTED,
                format!("Computed at: {}", insight.computed_at),
            );
        }
        if !insight.commodities_tracked.is_empty() {
            let list = insight.commodities_tracked.join(", ");
            let first = wrap(&list, 85.0, 9.0).into_iter().next().unwrap_or_default();
            self.text(MARGIN + 95.0, top + 28.0, 9.0, Font::Regular, MUTED, first);
        }
        self.y = top + height + SECTION_GAP;
    }

    fn section_title(&mut self, title: &str) {
        self.text(MARGIN, self.y + 5.0, 12.0, Font::Bold, BRAND, title);
        self.y += 8.0;
    }

    fn header_row(&mut self, columns: &[Column]) {
        let height = LINE_HEIGHT + 2.0 * CELL_PAD;
        self.push(Item::Rect {
            x: MARGIN,
            y: self.y,
            w: CONTENT_WIDTH,
            h: height,
            fill: BRAND,
        });
        let mut x = MARGIN;
        for column in columns {
            self.text(
                x + CELL_PAD,
                self.y + CELL_PAD + LINE_HEIGHT - 1.0,
                TABLE_FONT,
                Font::Bold,
                WHITE,
                column.title,
            );
            x += column.width;
        }
        self.y += height;
    }

    fn table(&mut self, title: &str, columns: &[Column], rows: &[Vec<String>]) {
        let header_height = LINE_HEIGHT + 2.0 * CELL_PAD;
        let first_row = rows
            .first()
            .map(|r| self.row_height(columns, r))
            .unwrap_or(0.0);
        self.ensure(8.0 + header_height + first_row);
        self.section_title(title);
        self.header_row(columns);

        for (i, row) in rows.iter().enumerate() {
            let height = self.row_height(columns, row);
            if self.ensure(height) {
                self.section_title(&format!("{title} (continued)"));
                self.header_row(columns);
            }
            if i % 2 == 1 {
                self.push(Item::Rect {
                    x: MARGIN,
                    y: self.y,
                    w: CONTENT_WIDTH,
                    h: height,
                    fill: PANEL,
                });
            }
            let mut x = MARGIN;
            for (column, cell) in columns.iter().zip(row) {
                let lines = wrap(cell, column.width - 2.0 * CELL_PAD, TABLE_FONT);
                for (j, line) in lines.into_iter().enumerate() {
                    self.text(
                        x + CELL_PAD,
                        self.y + CELL_PAD + LINE_HEIGHT * (j as f64 + 1.0) - 1.0,
                        TABLE_FONT,
                        Font::Regular,
                        INK,
                        line,
                    );
                }
                x += column.width;
            }
            self.y += height;
            self.push(Item::Line {
                x1: MARGIN,
                y1: self.y,
                x2: MARGIN + CONTENT_WIDTH,
                y2: self.y,
                width: 0.2,
                color: RULE,
            });
        }
        self.y += SECTION_GAP;
    }

    fn row_height(&self, columns: &[Column], row: &[String]) -> f64 {
        let lines = columns
            .iter()
            .zip(row)
            .map(|(column, cell)| wrap(cell, column.width - 2.0 * CELL_PAD, TABLE_FONT).len())
            .max()
            .unwrap_or(1);
        lines as f64 * LINE_HEIGHT + 2.0 * CELL_PAD
    }

    fn footers(&mut self) {
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.items.push(Item::Line {
                x1: MARGIN,
                y1: FOOTER_Y - 5.0,
                x2: PAGE_WIDTH - MARGIN,
                y2: FOOTER_Y - 5.0,
                width: 0.3,
                color: RULE,
            });
            page.items.push(Item::Text {
                x: MARGIN,
                y: FOOTER_Y,
                size: 8.0,
                font: Font::Regular,
                color: MUTED,
                text: "SupplyShield - Supply Chain Risk Intelligence".into(),
            });
            page.items.push(Item::Text {
                x: PAGE_WIDTH - MARGIN - 20.0,
                y: FOOTER_Y,
                size: 8.0,
                font: Font::Regular,
                color: MUTED,
                text: format!("Page {} of {}", i + 1, total),
            });
        }
    }
}

fn fixed(v: f64, places: usize) -> String {
    if v.is_finite() {
        format!("{v:.places$}")
    } else {
        format!("{:.places$}", 0.0)
    }
}

pub fn layout(insight: &CategoryInsight, date: NaiveDate) -> Document {
    let mut l = Layout::new();
    l.header_band(insight, date);
    l.summary_box(insight);

    let factor_rows: Vec<Vec<String>> = if insight.contributing_factors.is_empty() {
        vec![vec![
            "No contributing factors reported".into(),
            String::new(),
            String::new(),
            String::new(),
        ]]
    } else {
        insight
            .contributing_factors
            .iter()
            .map(|(name, f)| {
                vec![
                    name.replace('_', " "),
                    fixed(f.value, 2),
                    format!("{}%", fixed(f.weight * 100.0, 0)),
                    fixed(f.contribution, 1),
                ]
            })
            .collect()
    };
    l.table(
        "Contributing Factors",
        &[
            col("Factor", 80.0),
            col("Value", 30.0),
            col("Weight", 30.0),
            col("Contribution", 40.0),
        ],
        &factor_rows,
    );

    if !insight.price_data.is_empty() {
        let rows: Vec<Vec<String>> = insight
            .price_data
            .iter()
            .map(|p| {
                vec![
                    p.commodity.clone(),
                    p.market.clone(),
                    p.state.clone(),
                    fixed(p.min_price, 0),
                    fixed(p.max_price, 0),
                    fixed(p.modal_price, 0),
                ]
            })
            .collect();
        l.table(
            "Price Data (INR per quintal)",
            &[
                col("Commodity", 36.0),
                col("Market", 40.0),
                col("State", 32.0),
                col("Min", 24.0),
                col("Max", 24.0),
                col("Modal", 24.0),
            ],
            &rows,
        );
    }

    if !insight.bottlenecks.is_empty() {
        let rows: Vec<Vec<String>> = insight
            .bottlenecks
            .iter()
            .map(|b| {
                vec![
                    b.region.clone(),
                    fixed(b.combined_risk, 1),
                    b.risk_level.label().to_string(),
                    b.summary(),
                ]
            })
            .collect();
        l.table(
            "Bottlenecks",
            &[
                col("Region", 40.0),
                col("Risk", 20.0),
                col("Level", 22.0),
                col("Explanation", 98.0),
            ],
            &rows,
        );
    }

    if !insight.recommendations.is_empty() {
        let rows: Vec<Vec<String>> = insight
            .recommendations
            .iter()
            .map(|r| {
                vec![
                    r.priority.to_string(),
                    r.title.clone(),
                    r.action_label(),
                    r.description.clone(),
                ]
            })
            .collect();
        l.table(
            "Recommendations",
            &[
                col("#", 10.0),
                col("Title", 50.0),
                col("Action", 35.0),
                col("Description", 85.0),
            ],
            &rows,
        );
    }

    l.footers();
    Document {
        title: format!("SupplyShield {} Report", insight.category),
        pages: l.pages,
    }
}
