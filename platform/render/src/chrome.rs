use crate::layout::{Canvas, Cell, FontStyle, PageChrome, Rgb};

/// The organisation printed in every document header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Issuer {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub website: String,
    pub email: String,
}

impl Default for Issuer {
    fn default() -> Self {
        Self {
            name: "MHD Tech".into(),
            address: "8825 Perimeter Park Blvd Ste 501".into(),
            city: "Jacksonville, Florida, USA".into(),
            phone: "+15075561971".into(),
            website: "youtube.com/@mhd_tech".into(),
            email: "aria@mhdtechpro.com".into(),
        }
    }
}

/// Issuer block on top of each page and a centred `Page N` at the bottom.
pub struct StandardChrome<'a> {
    issuer: &'a Issuer,
}

impl<'a> StandardChrome<'a> {
    pub fn new(issuer: &'a Issuer) -> Self {
        Self { issuer }
    }
}

impl PageChrome for StandardChrome<'_> {
    fn header(&self, canvas: &mut Canvas<'_>) {
        let issuer = self.issuer;
        canvas.set_xy(canvas.margin_left(), 10.0);
        canvas.set_text_color(Rgb::BLACK);
        canvas.set_font(FontStyle::Bold, 18.0);
        canvas.cell(0.0, 10.0, &issuer.name, Cell::new().ln());
        canvas.set_font(FontStyle::Regular, 11.0);
        canvas.cell(0.0, 6.0, &issuer.address, Cell::new().ln());
        canvas.cell(0.0, 6.0, &issuer.city, Cell::new().ln());
        canvas.cell(0.0, 6.0, &format!("Phone: {}", issuer.phone), Cell::new().ln());
        canvas.set_text_color(Rgb::LINK);
        canvas.cell(0.0, 6.0, &issuer.website, Cell::new().ln());
        canvas.cell(0.0, 6.0, &issuer.email, Cell::new().ln());
        canvas.ln(12.0);
    }

    fn footer(&self, canvas: &mut Canvas<'_>) {
        canvas.set_y_from_bottom(15.0);
        canvas.set_font(FontStyle::Italic, 8.0);
        canvas.set_text_color(Rgb::MUTED);
        let label = format!("Page {}", canvas.page_no());
        canvas.cell(0.0, 10.0, &label, Cell::new().center());
    }
}
