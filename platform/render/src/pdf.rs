//! PDF encoding of a laid-out [`Document`] with the standard Helvetica
//! faces.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::layout::{Document, Element, FontStyle, Page, Rgb};

const PT_PER_MM: f32 = 72.0 / 25.4;
const FRAME_WIDTH_PT: f32 = 0.57;

const FACES: [(FontStyle, &[u8], &[u8]); 3] = [
    (FontStyle::Regular, b"F1", b"Helvetica"),
    (FontStyle::Bold, b"F2", b"Helvetica-Bold"),
    (FontStyle::Italic, b"F3", b"Helvetica-Oblique"),
];

struct RefAlloc(i32);

impl RefAlloc {
    fn bump(&mut self) -> Ref {
        let id = Ref::new(self.0);
        self.0 += 1;
        id
    }
}

pub(crate) fn encode(doc: &Document) -> Vec<u8> {
    let mut refs = RefAlloc(1);
    let catalog_id = refs.bump();
    let tree_id = refs.bump();
    let font_ids: Vec<Ref> = FACES.iter().map(|_| refs.bump()).collect();
    let page_ids: Vec<(Ref, Ref)> = doc
        .pages
        .iter()
        .map(|_| (refs.bump(), refs.bump()))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    for ((_, _, base), id) in FACES.iter().zip(&font_ids) {
        pdf.type1_font(*id)
            .base_font(Name(*base))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    let width_pt = doc.width * PT_PER_MM;
    let height_pt = doc.height * PT_PER_MM;
    for (page, (page_id, content_id)) in doc.pages.iter().zip(&page_ids) {
        {
            let mut writer = pdf.page(*page_id);
            writer
                .media_box(Rect::new(0.0, 0.0, width_pt, height_pt))
                .parent(tree_id)
                .contents(*content_id);
            let mut resources = writer.resources();
            let mut fonts = resources.fonts();
            for ((_, resource, _), id) in FACES.iter().zip(&font_ids) {
                fonts.pair(Name(*resource), *id);
            }
        }
        let content = page_content(page, height_pt);
        pdf.stream(*content_id, &content.finish());
    }

    pdf.finish()
}

fn page_content(page: &Page, height_pt: f32) -> Content {
    let mut content = Content::new();
    for element in &page.elements {
        match element {
            Element::Fill {
                x,
                y,
                width,
                height,
                color,
            } => {
                content.save_state();
                let (r, g, b) = unit_rgb(*color);
                content.set_fill_rgb(r, g, b);
                content.rect(
                    x * PT_PER_MM,
                    height_pt - (y + height) * PT_PER_MM,
                    width * PT_PER_MM,
                    height * PT_PER_MM,
                );
                content.fill_nonzero();
                content.restore_state();
            }
            Element::Frame {
                x,
                y,
                width,
                height,
                color,
            } => {
                content.save_state();
                let (r, g, b) = unit_rgb(*color);
                content.set_stroke_rgb(r, g, b);
                content.set_line_width(FRAME_WIDTH_PT);
                content.rect(
                    x * PT_PER_MM,
                    height_pt - (y + height) * PT_PER_MM,
                    width * PT_PER_MM,
                    height * PT_PER_MM,
                );
                content.stroke();
                content.restore_state();
            }
            Element::Text {
                x,
                y,
                size,
                style,
                color,
                text,
            } => {
                content.save_state();
                let (r, g, b) = unit_rgb(*color);
                content.set_fill_rgb(r, g, b);
                content.begin_text();
                content.set_font(Name(face_resource(*style)), *size);
                content.next_line(x * PT_PER_MM, height_pt - y * PT_PER_MM);
                content.show(Str(&win_ansi(text)));
                content.end_text();
                content.restore_state();
            }
        }
    }
    content
}

fn face_resource(style: FontStyle) -> &'static [u8] {
    FACES
        .iter()
        .find(|(face, _, _)| *face == style)
        .map(|(_, resource, _)| *resource)
        .unwrap_or(b"F1")
}

fn unit_rgb(Rgb(r, g, b): Rgb) -> (f32, f32, f32) {
    (
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    )
}

/// Latin-1 subset of WinAnsiEncoding; anything else becomes `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match u32::from(ch) {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::layout::{Canvas, Cell, NoChrome};

    use super::*;

    #[test]
    fn output_is_a_pdf_with_one_page_object_per_page() {
        let mut canvas = Canvas::a4(&NoChrome);
        canvas.add_page();
        canvas.cell(0.0, 6.0, "Invoice #: INV00001", Cell::new().ln());
        canvas.add_page();
        let bytes = canvas.finish().to_pdf();
        assert!(bytes.starts_with(b"%PDF-"));
        let body = String::from_utf8_lossy(&bytes);
        assert!(body.contains("/Helvetica-Bold"));
        assert!(body.contains("/Count 2"));
        assert!(body.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn non_latin_text_is_replaced() {
        assert_eq!(win_ansi("Café ₹"), vec![b'C', b'a', b'f', 0xE9, b' ', b'?']);
    }
}
