//! Cursor-based page canvas.
//!
//! Coordinates are millimetres from the top-left corner of the page. Font
//! sizes are points. A cell is a rectangle at the cursor that may be filled,
//! framed and labelled; after a cell the cursor moves right, or to the start
//! of the next line when the cell requests a line break.

use crate::metrics::char_width;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

const PT_PER_MM: f32 = 72.0 / 25.4;
const DEFAULT_MARGIN: f32 = 10.0;
const BREAK_MARGIN: f32 = 20.0;
const CELL_PADDING: f32 = 1.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const LINK: Rgb = Rgb(0, 0, 255);
    pub const MUTED: Rgb = Rgb(100, 100, 100);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One positioned drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// `y` is the text baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: Rgb,
        text: String,
    },
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A laid-out document, ready for encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }

    /// True when some text run equals `needle` exactly.
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text == needle)
    }

    /// True when some text run contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text.contains(needle))
    }

    pub fn to_pdf(&self) -> Vec<u8> {
        crate::pdf::encode(self)
    }
}

/// Options for a single [`Canvas::cell`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Cell {
    align: Align,
    fill: bool,
    border: bool,
    line_break: bool,
}

impl Cell {
    pub const fn new() -> Self {
        Self {
            align: Align::Left,
            fill: false,
            border: false,
            line_break: false,
        }
    }

    pub const fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub const fn center(self) -> Self {
        self.align(Align::Center)
    }

    pub const fn right(self) -> Self {
        self.align(Align::Right)
    }

    pub const fn filled(mut self) -> Self {
        self.fill = true;
        self
    }

    pub const fn bordered(mut self) -> Self {
        self.border = true;
        self
    }

    /// Move to the start of the next line after drawing.
    pub const fn ln(mut self) -> Self {
        self.line_break = true;
        self
    }
}

/// Per-page decorations, drawn when a page opens (header) and before it
/// closes (footer).
pub trait PageChrome {
    fn header(&self, canvas: &mut Canvas<'_>);
    fn footer(&self, canvas: &mut Canvas<'_>);
}

/// Chrome that draws nothing.
pub struct NoChrome;

impl PageChrome for NoChrome {
    fn header(&self, _canvas: &mut Canvas<'_>) {}
    fn footer(&self, _canvas: &mut Canvas<'_>) {}
}

#[derive(Copy, Clone)]
struct Pen {
    style: FontStyle,
    size: f32,
    text_color: Rgb,
    fill_color: Rgb,
    draw_color: Rgb,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            style: FontStyle::Regular,
            size: 11.0,
            text_color: Rgb::BLACK,
            fill_color: Rgb::WHITE,
            draw_color: Rgb::BLACK,
        }
    }
}

pub struct Canvas<'a> {
    chrome: &'a dyn PageChrome,
    width: f32,
    height: f32,
    margin_left: f32,
    margin_right: f32,
    margin_top: f32,
    break_margin: f32,
    pages: Vec<Page>,
    x: f32,
    y: f32,
    pen: Pen,
    in_chrome: bool,
}

impl<'a> Canvas<'a> {
    /// A4 portrait canvas with 10 mm margins and a 20 mm automatic page-break
    /// zone at the bottom.
    pub fn a4(chrome: &'a dyn PageChrome) -> Self {
        Self {
            chrome,
            width: A4_WIDTH_MM,
            height: A4_HEIGHT_MM,
            margin_left: DEFAULT_MARGIN,
            margin_right: DEFAULT_MARGIN,
            margin_top: DEFAULT_MARGIN,
            break_margin: BREAK_MARGIN,
            pages: Vec::new(),
            x: DEFAULT_MARGIN,
            y: DEFAULT_MARGIN,
            pen: Pen::default(),
            in_chrome: false,
        }
    }

    pub fn add_page(&mut self) {
        if !self.pages.is_empty() {
            self.run_footer();
        }
        self.pages.push(Page::default());
        self.x = self.margin_left;
        self.y = self.margin_top;
        self.run_header();
    }

    /// Closes the last page and returns the laid-out document. A canvas that
    /// never opened a page still yields one blank page.
    pub fn finish(mut self) -> Document {
        if self.pages.is_empty() {
            self.add_page();
        }
        self.run_footer();
        Document {
            width: self.width,
            height: self.height,
            pages: self.pages,
        }
    }

    pub fn page_no(&self) -> usize {
        self.pages.len()
    }

    pub fn page_width(&self) -> f32 {
        self.width
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn margin_left(&self) -> f32 {
        self.margin_left
    }

    /// Width between the margins.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn set_xy(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Moves the cursor to the left margin, `offset` millimetres above the
    /// bottom edge.
    pub fn set_y_from_bottom(&mut self, offset: f32) {
        self.x = self.margin_left;
        self.y = self.height - offset;
    }

    pub fn set_font(&mut self, style: FontStyle, size: f32) {
        self.pen.style = style;
        self.pen.size = size;
    }

    pub fn set_text_color(&mut self, color: Rgb) {
        self.pen.text_color = color;
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        self.pen.fill_color = color;
    }

    pub fn set_draw_color(&mut self, color: Rgb) {
        self.pen.draw_color = color;
    }

    /// Rendered width of `text` in the current font, in millimetres.
    pub fn string_width(&self, text: &str) -> f32 {
        let units: u32 = text.chars().map(|ch| u32::from(char_width(ch))).sum();
        units as f32 * self.pen.size / 1000.0 / PT_PER_MM
    }

    /// Line feed: back to the left margin and down by `h`.
    pub fn ln(&mut self, h: f32) {
        self.x = self.margin_left;
        self.y += h;
    }

    /// Draws one cell at the cursor. A width of `0` extends the cell to the
    /// right margin.
    pub fn cell(&mut self, w: f32, h: f32, text: &str, opts: Cell) {
        if self.pages.is_empty() {
            self.add_page();
        }
        if !self.in_chrome && self.y + h > self.height - self.break_margin {
            let x = self.x;
            self.add_page();
            self.x = x;
        }

        let w = if w <= 0.0 {
            self.width - self.margin_right - self.x
        } else {
            w
        };
        let (x, y) = (self.x, self.y);
        if opts.fill {
            let color = self.pen.fill_color;
            self.push(Element::Fill {
                x,
                y,
                width: w,
                height: h,
                color,
            });
        }
        if opts.border {
            let color = self.pen.draw_color;
            self.push(Element::Frame {
                x,
                y,
                width: w,
                height: h,
                color,
            });
        }
        if !text.is_empty() {
            let text_width = self.string_width(text);
            let dx = match opts.align {
                Align::Left => CELL_PADDING,
                Align::Center => (w - text_width) / 2.0,
                Align::Right => w - CELL_PADDING - text_width,
            };
            let size_mm = self.pen.size / PT_PER_MM;
            let element = Element::Text {
                x: x + dx,
                y: y + h / 2.0 + 0.3 * size_mm,
                size: self.pen.size,
                style: self.pen.style,
                color: self.pen.text_color,
                text: text.to_string(),
            };
            self.push(element);
        }

        if opts.line_break {
            self.x = self.margin_left;
            self.y += h;
        } else {
            self.x += w;
        }
    }

    /// Word-wrapped text block of width `w` (0 = to the right margin), one
    /// line of height `h` per wrapped line. Leaves the cursor at the start of
    /// the line below the block.
    pub fn multi_cell(&mut self, w: f32, h: f32, text: &str, align: Align) {
        let w = if w <= 0.0 {
            self.width - self.margin_right - self.x
        } else {
            w
        };
        let start_x = self.x;
        for line in self.wrap(text, w - 2.0 * CELL_PADDING) {
            self.x = start_x;
            self.cell(w, h, &line, Cell::new().align(align));
            self.y += h;
        }
        self.x = self.margin_left;
    }

    fn wrap(&self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if !current.is_empty() && self.string_width(&candidate) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current.push_str(word);
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }
        lines
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn run_header(&mut self) {
        let chrome = self.chrome;
        self.with_chrome(|canvas| chrome.header(canvas));
    }

    fn run_footer(&mut self) {
        let chrome = self.chrome;
        let (x, y) = (self.x, self.y);
        self.with_chrome(|canvas| chrome.footer(canvas));
        self.x = x;
        self.y = y;
    }

    /// Chrome drawing never triggers page breaks and leaves the body's pen
    /// untouched.
    fn with_chrome(&mut self, draw: impl FnOnce(&mut Self)) {
        let pen = self.pen;
        self.in_chrome = true;
        draw(self);
        self.in_chrome = false;
        self.pen = pen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Numbered;

    impl PageChrome for Numbered {
        fn header(&self, canvas: &mut Canvas<'_>) {
            canvas.set_font(FontStyle::Bold, 18.0);
            canvas.cell(0.0, 10.0, "Header", Cell::new().ln());
        }

        fn footer(&self, canvas: &mut Canvas<'_>) {
            canvas.set_y_from_bottom(15.0);
            canvas.set_font(FontStyle::Italic, 8.0);
            let label = format!("Page {}", canvas.page_no());
            canvas.cell(0.0, 10.0, &label, Cell::new().center());
        }
    }

    #[test]
    fn rows_past_the_break_zone_open_a_new_page() {
        let chrome = Numbered;
        let mut canvas = Canvas::a4(&chrome);
        canvas.add_page();
        for row in 0..40 {
            canvas.cell(0.0, 8.0, &format!("row {row}"), Cell::new().ln());
        }
        let doc = canvas.finish();
        assert_eq!(doc.page_count(), 2);
        assert!(doc.has_text("Page 1"));
        assert!(doc.has_text("Page 2"));
        assert_eq!(doc.pages[1].texts().filter(|t| *t == "Header").count(), 1);
        assert!(doc.pages[1].texts().any(|t| t == "row 39"));
    }

    #[test]
    fn header_does_not_leak_its_pen_into_the_body() {
        let chrome = Numbered;
        let mut canvas = Canvas::a4(&chrome);
        canvas.set_font(FontStyle::Regular, 11.0);
        canvas.add_page();
        canvas.cell(0.0, 6.0, "body", Cell::new());
        let doc = canvas.finish();
        let body = doc.pages[0].elements.iter().find_map(|element| match element {
            Element::Text {
                text, style, size, ..
            } if text == "body" => Some((*style, *size)),
            _ => None,
        });
        assert_eq!(body, Some((FontStyle::Regular, 11.0)));
    }

    #[test]
    fn right_aligned_text_ends_at_the_cell_padding() {
        let mut canvas = Canvas::a4(&NoChrome);
        canvas.add_page();
        canvas.set_font(FontStyle::Regular, 10.0);
        let width = canvas.string_width("100.00");
        canvas.cell(50.0, 8.0, "100.00", Cell::new().right());
        let doc = canvas.finish();
        match &doc.pages[0].elements[0] {
            Element::Text { x, .. } => {
                assert!((x + width - (10.0 + 50.0 - CELL_PADDING)).abs() < 1e-3)
            }
            other => panic!("unexpected element {other:?}"),
        }
    }

    #[test]
    fn multi_cell_wraps_on_word_boundaries() {
        let mut canvas = Canvas::a4(&NoChrome);
        canvas.add_page();
        canvas.set_font(FontStyle::Regular, 12.0);
        canvas.multi_cell(30.0, 6.0, "Note: Thank you for your business.", Align::Left);
        let doc = canvas.finish();
        let lines: Vec<&str> = doc.texts().collect();
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "Note: Thank you for your business.");
    }

    #[test]
    fn empty_canvas_yields_one_blank_page() {
        let doc = Canvas::a4(&NoChrome).finish();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].elements.is_empty());
    }
}
