//! E-pass rendering
//!
//! A single 400×600 pt PDF page: title, QR code, attendee details, footer.
//! The QR code is drawn as filled vector squares, so the document needs no
//! image decoder and scales cleanly when printed.

mod fonts;

pub use fonts::{Font, win_ansi};

use chrono::{Local, NaiveDate};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use qrcode::{Color, QrCode};
use shared::models::{PassPayload, Registration};

use crate::error::RenderError;

const PAGE_WIDTH: f32 = 400.0;
const PAGE_HEIGHT: f32 = 600.0;

const TITLE: &str = "Isai Illam - E-Pass";
const TITLE_SIZE: f32 = 24.0;
const TITLE_BASELINE: f32 = PAGE_HEIGHT - 50.0;

const QR_SIZE: f32 = 150.0;
const QR_BOTTOM: f32 = PAGE_HEIGHT - 250.0;
/// Light modules around the symbol, in modules
pub const QR_QUIET_ZONE: usize = 4;

const DETAIL_SIZE: f32 = 12.0;
const DETAIL_LEFT: f32 = 50.0;
const DETAIL_TOP: f32 = PAGE_HEIGHT - 300.0;
const DETAIL_SPACING: f32 = 25.0;

const FOOTER: &str = "Please present this pass at the venue for entry.";
const FOOTER_SIZE: f32 = 10.0;
const FOOTER_BASELINE: f32 = 30.0;

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

type Rgb = (f32, f32, f32);
const BACKGROUND: Rgb = (0.95, 0.95, 1.0);
const TITLE_COLOR: Rgb = (0.2, 0.2, 0.4);
const DETAIL_COLOR: Rgb = (0.0, 0.0, 0.2);
const FOOTER_COLOR: Rgb = (0.3, 0.3, 0.3);

/// Module grid of an encoded QR symbol, without quiet zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Modules per side
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at column `x`, row `y` (from the top) is dark
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }
}

/// Encode the pass payload as compact JSON in a QR symbol
pub fn qr_matrix(payload: &PassPayload) -> Result<QrMatrix, RenderError> {
    let json = serde_json::to_vec(payload)?;
    let code = QrCode::new(json)?;
    let dark = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
    Ok(QrMatrix {
        width: code.width(),
        dark,
    })
}

/// Renders registrations into printable PDF passes
#[derive(Debug, Clone, Copy, Default)]
pub struct PassRenderer;

impl PassRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a pass dated today (local time)
    pub fn render(&self, registration: &Registration) -> Result<Vec<u8>, RenderError> {
        self.render_on(registration, Local::now().date_naive())
    }

    /// Render a pass with an explicit issue date
    pub fn render_on(
        &self,
        registration: &Registration,
        date: NaiveDate,
    ) -> Result<Vec<u8>, RenderError> {
        let qr = qr_matrix(&PassPayload::for_registration(registration))?;

        let mut content = Content::new();
        fill_rect(&mut content, BACKGROUND, 0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT);

        let title_x = centered_x(Font::HelveticaBold, TITLE, TITLE_SIZE);
        draw_text(
            &mut content,
            (BOLD_FONT, TITLE_SIZE),
            TITLE_COLOR,
            title_x,
            TITLE_BASELINE,
            TITLE,
        );

        draw_qr(&mut content, &qr, (PAGE_WIDTH - QR_SIZE) / 2.0, QR_BOTTOM, QR_SIZE);

        for (i, line) in detail_lines(registration, date).iter().enumerate() {
            let y = DETAIL_TOP - i as f32 * DETAIL_SPACING;
            draw_text(
                &mut content,
                (REGULAR_FONT, DETAIL_SIZE),
                DETAIL_COLOR,
                DETAIL_LEFT,
                y,
                line,
            );
        }

        let footer_x = centered_x(Font::Helvetica, FOOTER, FOOTER_SIZE);
        draw_text(
            &mut content,
            (REGULAR_FONT, FOOTER_SIZE),
            FOOTER_COLOR,
            footer_x,
            FOOTER_BASELINE,
            FOOTER,
        );

        let bytes = write_document(content.finish());
        tracing::debug!(
            participant_id = %registration.id,
            size = bytes.len(),
            qr_modules = qr.width(),
            "Pass rendered"
        );
        Ok(bytes)
    }
}

/// Detail lines in print order
fn detail_lines(registration: &Registration, date: NaiveDate) -> [String; 6] {
    [
        format!("Name: {}", registration.full_name),
        format!("Club: {}", registration.club),
        format!("Event: {}", registration.event),
        format!("Date: {}", date.format("%B %-d, %Y")),
        format!("Contact: {}", registration.phone),
        format!("Email: {}", registration.email),
    ]
}

fn centered_x(font: Font, text: &str, size: f32) -> f32 {
    (PAGE_WIDTH - font.text_width(text, size)) / 2.0
}

fn fill_rect(content: &mut Content, (r, g, b): Rgb, x: f32, y: f32, w: f32, h: f32) {
    content.set_fill_rgb(r, g, b);
    content.rect(x, y, w, h);
    content.fill_nonzero();
}

fn draw_text(
    content: &mut Content,
    (font, size): (Name<'_>, f32),
    (r, g, b): Rgb,
    x: f32,
    y: f32,
    text: &str,
) {
    let encoded = win_ansi(text);
    content.set_fill_rgb(r, g, b);
    content.begin_text();
    content.set_font(font, size);
    content.next_line(x, y);
    content.show(Str(&encoded));
    content.end_text();
}

/// Draw the symbol with its quiet zone into the square at (`left`, `bottom`)
fn draw_qr(content: &mut Content, qr: &QrMatrix, left: f32, bottom: f32, size: f32) {
    fill_rect(content, (1.0, 1.0, 1.0), left, bottom, size, size);

    let modules = qr.width() + 2 * QR_QUIET_ZONE;
    let module = size / modules as f32;
    let top = bottom + size;

    content.set_fill_rgb(0.0, 0.0, 0.0);
    for y in 0..qr.width() {
        let row_top = top - (y + QR_QUIET_ZONE) as f32 * module;
        // One rectangle per horizontal run of dark modules
        let mut x = 0;
        while x < qr.width() {
            if !qr.is_dark(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            while x < qr.width() && qr.is_dark(x, y) {
                x += 1;
            }
            let run_left = left + (start + QR_QUIET_ZONE) as f32 * module;
            content.rect(run_left, row_top - module, (x - start) as f32 * module, module);
        }
    }
    content.fill_nonzero();
}

fn write_document(page_content: Vec<u8>) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let regular_id = Ref::new(4);
    let bold_id = Ref::new(5);
    let content_id = Ref::new(6);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources()
        .fonts()
        .pair(REGULAR_FONT, regular_id)
        .pair(BOLD_FONT, bold_id);
    page.finish();

    for (id, font) in [(regular_id, Font::Helvetica), (bold_id, Font::HelveticaBold)] {
        pdf.type1_font(id)
            .base_font(Name(font.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    pdf.stream(content_id, &page_content);
    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn registration() -> Registration {
        Registration {
            id: "1A2B3C4D".into(),
            full_name: "Kavya Raman".into(),
            email: "kavya@example.com".into(),
            phone: "9876543210".into(),
            club: "Music Club".into(),
            event: "Isai Illam".into(),
            registration_date: Utc.with_ymd_and_hms(2025, 1, 5, 10, 20, 30).unwrap(),
            payment_proof: "payment-1A2B3C4D-1736072430000.png".into(),
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn decode(qr: &QrMatrix) -> String {
        let scale = 4;
        let side = (qr.width() + 2 * QR_QUIET_ZONE) * scale;
        let mut image = rqrr::PreparedImage::prepare_from_greyscale(side, side, |x, y| {
            let (mx, my) = (x / scale, y / scale);
            let inside = QR_QUIET_ZONE..QR_QUIET_ZONE + qr.width();
            if inside.contains(&mx) && inside.contains(&my)
                && qr.is_dark(mx - QR_QUIET_ZONE, my - QR_QUIET_ZONE)
            {
                0
            } else {
                255
            }
        });
        let grids = image.detect_grids();
        assert_eq!(grids.len(), 1);
        let (_, content) = grids[0].decode().unwrap();
        content
    }

    #[test]
    fn test_qr_carries_pass_payload() {
        let payload = PassPayload::for_registration(&registration());
        let qr = qr_matrix(&payload).unwrap();

        let decoded: PassPayload = serde_json::from_str(&decode(&qr)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_qr_payload_is_compact_json() {
        let payload = PassPayload::for_registration(&registration());
        let qr = qr_matrix(&payload).unwrap();
        assert_eq!(
            decode(&qr),
            r#"{"id":"1A2B3C4D","name":"Kavya Raman","event":"Isai Illam"}"#
        );
    }

    #[test]
    fn test_render_produces_single_page_pdf() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let pdf = PassRenderer::new().render_on(&registration(), date).unwrap();

        assert!(pdf.starts_with(b"%PDF-"));
        assert!(contains(&pdf, b"/MediaBox [0 0 400 600]"));
        assert!(contains(&pdf, b"/BaseFont /Helvetica-Bold"));
        assert!(contains(&pdf, b"/Encoding /WinAnsiEncoding"));
        assert!(contains(&pdf, b"(Isai Illam - E-Pass)"));
        assert!(contains(&pdf, b"(Name: Kavya Raman)"));
        assert!(contains(&pdf, b"(Club: Music Club)"));
        assert!(contains(&pdf, b"(Date: January 5, 2025)"));
        assert!(contains(&pdf, b"(Contact: 9876543210)"));
        assert!(contains(&pdf, b"(Please present this pass at the venue for entry.)"));
    }

    #[test]
    fn test_render_replaces_unencodable_text() {
        let mut registration = registration();
        registration.full_name = "கவியா".into();
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let pdf = PassRenderer::new().render_on(&registration, date).unwrap();
        assert!(contains(&pdf, b"(Name: ?????)"));
    }

    #[test]
    fn test_render_rejects_payload_too_large_for_qr() {
        let mut registration = registration();
        registration.full_name = "x".repeat(4000);
        let err = PassRenderer::new().render(&registration).unwrap_err();
        assert!(matches!(err, RenderError::Qr(_)));
    }

    #[test]
    fn test_title_is_centered() {
        let x = centered_x(Font::HelveticaBold, TITLE, TITLE_SIZE);
        let width = Font::HelveticaBold.text_width(TITLE, TITLE_SIZE);
        assert!((x + width / 2.0 - PAGE_WIDTH / 2.0).abs() < 1e-3);
        assert!(x > 0.0);
    }
}
