//! Salary-slip layout. Everything printed comes from the frozen snapshot so
//! a re-render matches the original byte for byte.

use entity::payslips::PayslipSnapshot;
use platform_api::{Money, validate::DMY_DATE};
use platform_render::{Align, Canvas, Cell, Document, FontStyle, Issuer, Rgb, StandardChrome};

use super::structure::total_earnings;

const HEADER_FILL: Rgb = Rgb(52, 73, 94);
const LABEL_FILL: Rgb = Rgb(236, 240, 241);
const ROW_HEIGHT: f32 = 8.0;
const LABEL_WIDTH: f32 = 45.0;
const VALUE_WIDTH: f32 = 50.0;
const AMOUNT_WIDTH: f32 = 60.0;

pub fn render(issuer: &Issuer, snapshot: &PayslipSnapshot) -> Document {
    let chrome = StandardChrome::new(issuer);
    let mut canvas = Canvas::a4(&chrome);
    canvas.add_page();

    canvas.set_text_color(Rgb::BLACK);
    canvas.set_font(FontStyle::Bold, 14.0);
    let title = format!("Salary Slip for {}", snapshot.as_of.format("%B %Y"));
    canvas.cell(0.0, 10.0, &title, Cell::new().center().ln());
    canvas.set_font(FontStyle::Regular, 10.0);
    let dated = format!("Date: {}", snapshot.as_of.format(DMY_DATE));
    canvas.cell(0.0, 6.0, &dated, Cell::new().right().ln());
    canvas.ln(4.0);

    let details = [
        ("Employee Name", snapshot.full_name.clone()),
        ("Employee No", snapshot.emp_no.clone()),
        ("Designation", snapshot.designation.clone()),
        ("Department", snapshot.department.clone()),
        ("Date of Joining", snapshot.doj.clone()),
        ("Bank Account", snapshot.bank_account.clone()),
        ("Tax ID", snapshot.tax_id.clone()),
        ("LOP Days", format_days(snapshot.lop)),
        (
            "Monthly Salary",
            Money::from_cents(snapshot.monthly_salary_cents).to_string(),
        ),
        ("Pay Date", snapshot.as_of.format(DMY_DATE).to_string()),
    ];
    canvas.set_fill_color(LABEL_FILL);
    for pair in details.chunks(2) {
        for (index, (label, value)) in pair.iter().enumerate() {
            let last = index + 1 == pair.len();
            canvas.set_font(FontStyle::Bold, 10.0);
            canvas.cell(LABEL_WIDTH, ROW_HEIGHT, label, Cell::new().filled().bordered());
            canvas.set_font(FontStyle::Regular, 10.0);
            let cell = Cell::new().bordered();
            canvas.cell(VALUE_WIDTH, ROW_HEIGHT, value, if last { cell.ln() } else { cell });
        }
    }
    canvas.ln(8.0);

    let description_width = canvas.content_width() - AMOUNT_WIDTH;
    canvas.set_fill_color(HEADER_FILL);
    canvas.set_text_color(Rgb::WHITE);
    canvas.set_font(FontStyle::Bold, 11.0);
    canvas.cell(description_width, 10.0, "EARNINGS", Cell::new().filled());
    canvas.cell(AMOUNT_WIDTH, 10.0, "AMOUNT", Cell::new().center().filled().ln());

    canvas.set_text_color(Rgb::BLACK);
    canvas.set_font(FontStyle::Regular, 10.0);
    for component in &snapshot.salary_structure {
        let amount = Money::from_cents(component.amount_cents).to_string();
        canvas.cell(description_width, ROW_HEIGHT, &component.name, Cell::new().bordered());
        canvas.cell(AMOUNT_WIDTH, ROW_HEIGHT, &amount, Cell::new().right().bordered().ln());
    }

    let total = total_earnings(&snapshot.salary_structure).to_string();
    canvas.set_fill_color(LABEL_FILL);
    canvas.set_font(FontStyle::Bold, 10.0);
    canvas.cell(description_width, ROW_HEIGHT, "Total Earnings", Cell::new().filled().bordered());
    canvas.cell(AMOUNT_WIDTH, ROW_HEIGHT, &total, Cell::new().right().filled().bordered().ln());
    canvas.ln(4.0);

    canvas.set_font(FontStyle::Bold, 12.0);
    canvas.cell(description_width, 10.0, "Net Pay", Cell::new().right());
    canvas.cell(AMOUNT_WIDTH, 10.0, &total, Cell::new().right().ln());
    canvas.ln(10.0);

    canvas.set_font(FontStyle::Italic, 9.0);
    canvas.set_text_color(Rgb::MUTED);
    canvas.multi_cell(
        0.0,
        5.0,
        "This is a system generated payslip and does not require a signature.",
        Align::Left,
    );

    canvas.finish()
}

fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{days:.0}")
    } else {
        format!("{days:.1}")
    }
}
