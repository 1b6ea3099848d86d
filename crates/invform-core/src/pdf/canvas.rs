//! Millimetre drawing surface over PDF content streams.
//!
//! Coordinates have their origin at the top-left corner of the page and grow
//! downwards; they are flipped into PDF user space when operations are
//! emitted. Text `y` is the baseline.

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];
pub const BLACK: Rgb = [33, 33, 33];

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Width used for characters outside the ASCII tables.
const FALLBACK_WIDTH: u16 = 556;

/// Standard Type1 fonts used on the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Name of the font in the page resource dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    fn char_width(&self, c: char) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA_WIDTHS,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match c {
            ' '..='~' => table[c as usize - 32],
            _ => FALLBACK_WIDTH,
        }
    }

    /// Width of `text` in millimetres at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 / 1000.0 * size / PT_PER_MM
    }
}

/// Horizontal anchor for a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Encode text as WinAnsi (CP1252) bytes.
///
/// Latin-1 maps directly, the euro sign and typographic punctuation use their
/// CP1252 slots, control characters become spaces and everything else is `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => b' ',
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap to `max_width` millimetres. Words wider than the limit
/// get a line of their own.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if font.text_width(&candidate, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn rgb_operands(color: Rgb) -> Vec<Object> {
    color
        .iter()
        .map(|c| Object::from(f32::from(*c) / 255.0))
        .collect()
}

/// Multi-page drawing surface.
pub struct Canvas {
    width_mm: f32,
    height_mm: f32,
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
}

impl Canvas {
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
            finished: Vec::new(),
            current: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width_mm
    }

    pub fn height(&self) -> f32 {
        self.height_mm
    }

    /// Close the current page and start drawing on a fresh one.
    pub fn new_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
    }

    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Content operations of every page, first page first.
    pub fn into_pages(mut self) -> Vec<Vec<Operation>> {
        self.finished.push(self.current);
        self.finished
    }

    fn x(&self, mm: f32) -> Object {
        Object::from(mm * PT_PER_MM)
    }

    fn y(&self, mm: f32) -> Object {
        Object::from((self.height_mm - mm) * PT_PER_MM)
    }

    fn len(&self, mm: f32) -> Object {
        Object::from(mm * PT_PER_MM)
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let rect = vec![self.x(x), self.y(y + h), self.len(w), self.len(h)];
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", rgb_operands(color)),
            Operation::new("re", rect),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, line_width: f32) {
        let rect = vec![self.x(x), self.y(y + h), self.len(w), self.len(h)];
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", rgb_operands(color)),
            Operation::new("w", vec![self.len(line_width)]),
            Operation::new("re", rect),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, line_width: f32) {
        let start = vec![self.x(from.0), self.y(from.1)];
        let end = vec![self.x(to.0), self.y(to.1)];
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", rgb_operands(color)),
            Operation::new("w", vec![self.len(line_width)]),
            Operation::new("m", start),
            Operation::new("l", end),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Draw a single line of text with its baseline at `y`.
    #[allow(clippy::too_many_arguments)]
    pub fn text(&mut self, x: f32, y: f32, text: &str, font: Font, size: f32, color: Rgb, align: Align) {
        if text.is_empty() {
            return;
        }
        let left = match align {
            Align::Left => x,
            Align::Center => x - font.text_width(text, size) / 2.0,
            Align::Right => x - font.text_width(text, size),
        };
        let position = vec![self.x(left), self.y(y)];
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", rgb_operands(color)),
            Operation::new("Tf", vec![font.resource_name().into(), Object::from(size)]),
            Operation::new("Td", position),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("€5 ¥ 中"), vec![0x80, b'5', b' ', 0xA5, b' ', b'?']);
        assert_eq!(encode_win_ansi("Müller\tGmbH"), b"M\xfcller GmbH".to_vec());
    }

    #[test]
    fn test_text_width() {
        let width = Font::Regular.text_width("0", 10.0);
        assert!((width - 5.56 / PT_PER_MM).abs() < 1e-4);
        assert!(Font::Bold.text_width("Total", 10.0) > Font::Regular.text_width("Total", 10.0));
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("8th Floor, Building 1, Huawei Kegu Industrial Park", Font::Regular, 9.0, 40.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "8th Floor, Building 1, Huawei Kegu Industrial Park");
        for line in &lines {
            assert!(Font::Regular.text_width(line, 9.0) <= 40.0 || !line.contains(' '));
        }
        assert!(wrap_text("   ", Font::Regular, 9.0, 40.0).is_empty());
    }

    #[test]
    fn test_pages_and_flipped_coordinates() {
        let mut canvas = Canvas::new(210.0, 297.0);
        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, BLACK);
        canvas.new_page();
        canvas.text(10.0, 20.0, "", Font::Regular, 9.0, BLACK, Align::Left);
        assert_eq!(canvas.page_count(), 2);

        let pages = canvas.into_pages();
        assert_eq!(pages.len(), 2);
        assert!(pages[1].is_empty());

        let rect = pages[0].iter().find(|op| op.operator == "re").unwrap();
        let y = rect.operands[1].as_float().unwrap();
        assert!((y - 287.0 * PT_PER_MM).abs() < 1e-3);
    }
}
