//! Minimal PDF 1.4 writer for a laid-out [`Document`].
//!
//! Uses the two standard Helvetica faces with WinAnsi encoding so no font
//! data has to be embedded.

use super::document::{Document, Font, Item, Page, Rgb, PAGE_HEIGHT};
use std::fmt::Write as _;

const HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";
const CATALOG: usize = 1;
const PAGES: usize = 2;
const REGULAR: usize = 3;
const BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_PAGE: usize = 6;

fn pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

/// Map text to WinAnsi bytes. Characters outside the code page degrade to
/// an ASCII stand-in or `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '•' => out.push(0x95),
            '–' => out.push(0x96),
            '—' => out.push(0x97),
            '€' => out.push(0x80),
            '‘' => out.push(0x91),
            '’' => out.push(0x92),
            '“' => out.push(0x93),
            '”' => out.push(0x94),
            '…' => out.push(0x85),
            '→' => out.extend_from_slice(b"->"),
            '₹' => out.extend_from_slice(b"Rs"),
            c if (c as u32) < 0x80 => out.push(c as u8),
            c if (0xA0..=0xFF).contains(&(c as u32)) => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

/// A PDF literal string, `(...)`, kept 7-bit clean.
pub fn literal(text: &str) -> String {
    let mut out = String::from("(");
    for b in win_ansi(text) {
        match b {
            b'\\' | b'(' | b')' => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{b:03o}");
            }
        }
    }
    out.push(')');
    out
}

fn color(c: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        f64::from(c.0) / 255.0,
        f64::from(c.1) / 255.0,
        f64::from(c.2) / 255.0
    )
}

fn content_stream(page: &Page) -> String {
    let mut s = String::new();
    for item in &page.items {
        match item {
            Item::Rect { x, y, w, h, fill } => {
                let _ = writeln!(
                    s,
                    "{} rg {:.2} {:.2} {:.2} {:.2} re f",
                    color(*fill),
                    pt(*x),
                    pt(PAGE_HEIGHT - y - h),
                    pt(*w),
                    pt(*h)
                );
            }
            Item::Text {
                x,
                y,
                size,
                font,
                color: c,
                text,
            } => {
                let face = match font {
                    Font::Regular => "F1",
                    Font::Bold => "F2",
                };
                let _ = writeln!(
                    s,
                    "BT /{face} {size:.1} Tf {} rg {:.2} {:.2} Td {} Tj ET",
                    color(*c),
                    pt(*x),
                    pt(PAGE_HEIGHT - y),
                    literal(text)
                );
            }
            Item::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color: c,
            } => {
                let _ = writeln!(
                    s,
                    "{} RG {:.2} w {:.2} {:.2} m {:.2} {:.2} l S",
                    color(*c),
                    pt(*width),
                    pt(*x1),
                    pt(PAGE_HEIGHT - y1),
                    pt(*x2),
                    pt(PAGE_HEIGHT - y2)
                );
            }
        }
    }
    s
}

struct Writer {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl Writer {
    fn object(&mut self, id: usize, body: &str) {
        self.begin(id);
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, data: &str) {
        self.begin(id);
        let _ = write!(Bytes(&mut self.buf), "<< /Length {} >>\nstream\n", data.len());
        self.buf.extend_from_slice(data.as_bytes());
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn begin(&mut self, id: usize) {
        if self.offsets.len() < id {
            self.offsets.resize(id, 0);
        }
        self.offsets[id - 1] = self.buf.len();
        let _ = writeln!(Bytes(&mut self.buf), "{id} 0 obj");
    }
}

struct Bytes<'a>(&'a mut Vec<u8>);

impl std::fmt::Write for Bytes<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

pub fn render(doc: &Document) -> Vec<u8> {
    let mut w = Writer {
        buf: HEADER.to_vec(),
        offsets: Vec::new(),
    };
    let page_count = doc.pages.len();
    let page_ids: Vec<usize> = (0..page_count).map(|i| FIRST_PAGE + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    w.object(CATALOG, &format!("<< /Type /Catalog /Pages {PAGES} 0 R >>"));
    w.object(
        PAGES,
        &format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>"),
    );
    w.object(
        REGULAR,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    w.object(
        BOLD,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );
    w.object(
        INFO,
        &format!(
            "<< /Title {} /Producer {} >>",
            literal(&doc.title),
            literal(super::PRODUCT_NAME)
        ),
    );

    let media = format!("[0 0 {:.2} {:.2}]", pt(super::document::PAGE_WIDTH), pt(PAGE_HEIGHT));
    for (page, id) in doc.pages.iter().zip(&page_ids) {
        w.object(
            *id,
            &format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox {media} \
                 /Resources << /Font << /F1 {REGULAR} 0 R /F2 {BOLD} 0 R >> >> \
                 /Contents {} 0 R >>",
                id + 1
            ),
        );
        w.stream(id + 1, &content_stream(page));
    }

    let xref_at = w.buf.len();
    let size = w.offsets.len() + 1;
    let mut tail = format!("xref\n0 {size}\n0000000000 65535 f \n");
    for offset in &w.offsets {
        let _ = write!(tail, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        tail,
        "trailer\n<< /Size {size} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
    );
    w.buf.extend_from_slice(tail.as_bytes());
    w.buf
}
