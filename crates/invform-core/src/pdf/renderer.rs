//! Invoice PDF layout.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::canvas::{wrap_text, Align, Canvas, Font, Rgb, BLACK, WHITE};
use super::Result;
use crate::error::RenderError;
use crate::extract::rules::country_code;
use crate::models::config::{InvformConfig, PdfConfig, SellerConfig};
use crate::models::customer::CustomerInfo;
use crate::models::invoice::{
    Currency, Invoice, InvoiceHeader, InvoiceSummary, LineItem, AMOUNT_OVERFLOW,
};

const HEADER_HEIGHT: f32 = 24.0;
const SECTION_GAP: f32 = 7.0;
const BODY_SIZE: f32 = 9.0;
const LINE_HEIGHT: f32 = 4.6;
const TABLE_SIZE: f32 = 8.5;
const TABLE_LINE_HEIGHT: f32 = 4.2;
const TABLE_HEADER_HEIGHT: f32 = 8.0;
const MIN_ROW_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 2.0;
const TOTALS_WIDTH: f32 = 72.0;
const TOTALS_ROW_HEIGHT: f32 = 6.5;

const BORDER: Rgb = [200, 200, 200];
const MUTED: Rgb = [110, 110, 110];
const ZEBRA: Rgb = [245, 248, 252];

/// Column titles and width fractions of the product table.
const COLUMNS: [(&str, f32); 6] = [
    ("Product", 0.27),
    ("Model", 0.17),
    ("HS Code", 0.16),
    ("Qty", 0.12),
    ("Unit Price", 0.14),
    ("Total", 0.14),
];

/// First column that holds numbers (right aligned).
const FIRST_NUMERIC_COLUMN: usize = 3;

/// Renders completed invoices to PDF bytes.
pub struct InvoiceRenderer {
    seller: SellerConfig,
    layout: PdfConfig,
}

impl InvoiceRenderer {
    pub fn new(seller: SellerConfig, layout: PdfConfig) -> Self {
        Self { seller, layout }
    }

    pub fn from_config(config: &InvformConfig) -> Self {
        Self::new(config.seller.clone(), config.pdf.clone())
    }

    /// Render an invoice.
    ///
    /// Incomplete invoices are refused with [`RenderError::Invalid`]. Only
    /// complete line items are printed. The table continues on a new page
    /// when it runs out of room.
    pub fn render(&self, invoice: &Invoice) -> Result<Vec<u8>> {
        let issues = invoice.validate();
        if !issues.is_empty() {
            warn!("Refusing to render incomplete invoice: {}", issues.join("; "));
            return Err(RenderError::Invalid(issues));
        }
        let summary = invoice
            .summary()
            .ok_or_else(|| RenderError::Invalid(vec![AMOUNT_OVERFLOW.to_string()]))?;

        debug!(
            "Rendering invoice {} with {} line items",
            invoice.header.number,
            invoice.complete_items().count()
        );

        let seller = invoice.seller.as_ref().unwrap_or(&self.seller);
        let mut canvas = Canvas::new(self.layout.page_width_mm, self.layout.page_height_mm);

        let mut y = self.draw_header(&mut canvas, seller, &invoice.header);
        y = self.draw_parties(&mut canvas, seller, &invoice.buyer, y);
        y = self.draw_terms(&mut canvas, &invoice.header, y);
        y = self.draw_items(&mut canvas, invoice, y);
        self.draw_totals(&mut canvas, invoice.header.currency, &summary, y);

        let bytes = self.write_document(canvas, &invoice.header.number)?;
        debug!("Rendered {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Render an invoice and write it to `path`.
    pub fn render_to_file(&self, invoice: &Invoice, path: &Path) -> Result<()> {
        let bytes = self.render(invoice)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn margin(&self) -> f32 {
        self.layout.margin_mm
    }

    fn content_width(&self, canvas: &Canvas) -> f32 {
        canvas.width() - 2.0 * self.margin()
    }

    fn bottom_limit(&self, canvas: &Canvas) -> f32 {
        canvas.height() - self.margin()
    }

    fn draw_header(&self, canvas: &mut Canvas, seller: &SellerConfig, header: &InvoiceHeader) -> f32 {
        let m = self.margin();
        let right = canvas.width() - m - 5.0;
        let brand = self.layout.brand_color;

        canvas.fill_rect(m, m, self.content_width(canvas), HEADER_HEIGHT, brand);
        canvas.text(m + 5.0, m + 15.0, &seller.logo_text, Font::Bold, 20.0, WHITE, Align::Left);
        canvas.text(right, m + 11.0, "INVOICE", Font::Bold, 20.0, WHITE, Align::Right);

        let date = header.date.format("%Y-%m-%d");
        let meta = if header.number.trim().is_empty() {
            format!("Date: {}", date)
        } else {
            format!("No. {}   Date: {}", header.number, date)
        };
        canvas.text(right, m + 19.0, &meta, Font::Regular, BODY_SIZE, WHITE, Align::Right);

        m + HEADER_HEIGHT + SECTION_GAP
    }

    fn draw_parties(&self, canvas: &mut Canvas, seller: &SellerConfig, buyer: &CustomerInfo, y: f32) -> f32 {
        let m = self.margin();
        let box_width = (self.content_width(canvas) - 6.0) / 2.0;
        let text_width = box_width - 8.0;

        let seller_lines = wrap_lines(seller_lines(seller), text_width);
        let buyer_lines = wrap_lines(buyer_lines(buyer), text_width);
        let rows = seller_lines.len().max(buyer_lines.len());
        let height = 12.0 + rows as f32 * LINE_HEIGHT + 2.0;

        for (x, title, lines) in [
            (m, "SELLER", &seller_lines),
            (m + box_width + 6.0, "BUYER", &buyer_lines),
        ] {
            canvas.stroke_rect(x, y, box_width, height, BORDER, 0.3);
            canvas.text(x + 4.0, y + 6.5, title, Font::Bold, 10.0, self.layout.brand_color, Align::Left);
            for (i, (line, font)) in lines.iter().enumerate() {
                let baseline = y + 12.0 + (i as f32 + 0.5) * LINE_HEIGHT;
                canvas.text(x + 4.0, baseline, line, *font, BODY_SIZE, BLACK, Align::Left);
            }
        }

        y + height + SECTION_GAP
    }

    fn draw_terms(&self, canvas: &mut Canvas, header: &InvoiceHeader, y: f32) -> f32 {
        let terms = format!(
            "Terms: {} / {}    Currency: {}",
            header.delivery_method.trim(),
            header.payment_method.trim(),
            header.currency.code()
        );
        canvas.text(self.margin(), y + 3.0, &terms, Font::Regular, BODY_SIZE, BLACK, Align::Left);
        y + 3.0 + SECTION_GAP
    }

    fn column_layout(&self, canvas: &Canvas) -> Vec<(f32, f32)> {
        let width = self.content_width(canvas);
        let mut x = self.margin();
        COLUMNS
            .iter()
            .map(|(_, fraction)| {
                let column = (x, width * fraction);
                x += width * fraction;
                column
            })
            .collect()
    }

    fn draw_table_header(&self, canvas: &mut Canvas, columns: &[(f32, f32)], y: f32) -> f32 {
        let width = self.content_width(canvas);
        canvas.fill_rect(self.margin(), y, width, TABLE_HEADER_HEIGHT, self.layout.brand_color);

        for (i, ((title, _), (x, w))) in COLUMNS.iter().zip(columns).enumerate() {
            let (anchor, align) = cell_anchor(i, *x, *w);
            canvas.text(anchor, y + 5.5, title, Font::Bold, TABLE_SIZE, WHITE, align);
        }
        y + TABLE_HEADER_HEIGHT
    }

    fn draw_items(&self, canvas: &mut Canvas, invoice: &Invoice, y: f32) -> f32 {
        let columns = self.column_layout(canvas);
        let currency = invoice.header.currency;
        let mut y = self.draw_table_header(canvas, &columns, y);

        for (row, item) in invoice.complete_items().enumerate() {
            let cells = item_cells(item, |amount| currency.format_amount(amount));
            let wrapped: Vec<Vec<String>> = cells
                .iter()
                .zip(&columns)
                .map(|(cell, (_, w))| {
                    let lines = wrap_text(cell, Font::Regular, TABLE_SIZE, w - 2.0 * CELL_PADDING);
                    if lines.is_empty() { vec![String::new()] } else { lines }
                })
                .collect();
            let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
            let height = MIN_ROW_HEIGHT.max(lines as f32 * TABLE_LINE_HEIGHT + 3.0);

            if y + height > self.bottom_limit(canvas) {
                debug!("Product table continues on page {}", canvas.page_count() + 1);
                canvas.new_page();
                y = self.draw_table_header(canvas, &columns, self.margin());
            }

            if row % 2 == 1 {
                canvas.fill_rect(self.margin(), y, self.content_width(canvas), height, ZEBRA);
            }
            for (i, (lines, (x, w))) in wrapped.iter().zip(&columns).enumerate() {
                let (anchor, align) = cell_anchor(i, *x, *w);
                for (n, line) in lines.iter().enumerate() {
                    let baseline = y + 4.8 + n as f32 * TABLE_LINE_HEIGHT;
                    canvas.text(anchor, baseline, line, Font::Regular, TABLE_SIZE, BLACK, align);
                }
            }

            y += height;
            let right = self.margin() + self.content_width(canvas);
            canvas.line((self.margin(), y), (right, y), BORDER, 0.2);
        }

        y + SECTION_GAP
    }

    fn draw_totals(&self, canvas: &mut Canvas, currency: Currency, summary: &InvoiceSummary, y: f32) {

        let mut rows = vec![("Subtotal", currency.format_amount(summary.subtotal))];
        if summary.shipping_fee > Decimal::ZERO {
            rows.push(("Shipping", currency.format_amount(summary.shipping_fee)));
        }
        if summary.custom_fee > Decimal::ZERO {
            rows.push(("Custom Fee", currency.format_amount(summary.custom_fee)));
        }
        if summary.discount > Decimal::ZERO {
            rows.push(("Discount", format!("-{}", currency.format_amount(summary.discount))));
        }

        let needed = (rows.len() as f32 + 1.0) * TOTALS_ROW_HEIGHT + 2.0;
        let mut y = y;
        if y + needed > self.bottom_limit(canvas) {
            canvas.new_page();
            y = self.margin();
        }

        let right = canvas.width() - self.margin();
        let left = right - TOTALS_WIDTH;

        let packages = format!("Total packages: {}", summary.total_packages);
        canvas.text(self.margin(), y + 4.5, &packages, Font::Regular, BODY_SIZE, MUTED, Align::Left);

        canvas.stroke_rect(left, y, TOTALS_WIDTH, needed, BORDER, 0.3);
        for (i, (label, amount)) in rows.iter().enumerate() {
            let baseline = y + 4.5 + i as f32 * TOTALS_ROW_HEIGHT;
            canvas.text(left + 3.0, baseline, label, Font::Regular, BODY_SIZE, BLACK, Align::Left);
            canvas.text(right - 3.0, baseline, amount, Font::Regular, BODY_SIZE, BLACK, Align::Right);
        }

        let total_top = y + rows.len() as f32 * TOTALS_ROW_HEIGHT + 1.0;
        canvas.fill_rect(left, total_top, TOTALS_WIDTH, TOTALS_ROW_HEIGHT + 1.0, self.layout.brand_color);
        let total = currency.format_amount(summary.total);
        canvas.text(left + 3.0, total_top + 5.0, "TOTAL", Font::Bold, 10.0, WHITE, Align::Left);
        canvas.text(right - 3.0, total_top + 5.0, &total, Font::Bold, 10.0, WHITE, Align::Right);
    }

    fn write_document(&self, canvas: Canvas, title: &str) -> Result<Vec<u8>> {
        let width = canvas.width() * super::canvas::PT_PER_MM;
        let height = canvas.height() * super::canvas::PT_PER_MM;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(Font::Regular));
        let bold_id = doc.add_object(font_dictionary(Font::Bold));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource_name() => regular_id,
                Font::Bold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in canvas.into_pages() {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(format!("Invoice {}", title).trim()),
            "Producer" => Object::string_literal("invform"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn font_dictionary(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn cell_anchor(column: usize, x: f32, width: f32) -> (f32, Align) {
    if column >= FIRST_NUMERIC_COLUMN {
        (x + width - CELL_PADDING, Align::Right)
    } else {
        (x + CELL_PADDING, Align::Left)
    }
}

fn item_cells(item: &LineItem, money: impl Fn(Decimal) -> String) -> [String; 6] {
    [
        item.name.trim().to_string(),
        item.model.trim().to_string(),
        item.hs_code.trim().to_string(),
        format!("{} {}", item.quantity, item.unit.as_str()),
        money(item.unit_price.unwrap_or_default()),
        item.total().map(&money).unwrap_or_default(),
    ]
}

fn seller_lines(seller: &SellerConfig) -> Vec<(String, Font)> {
    let mut lines = vec![(seller.company.clone(), Font::Bold)];
    lines.extend(seller.address_lines.iter().map(|l| (l.clone(), Font::Regular)));
    if !seller.contact.trim().is_empty() {
        lines.push((format!("Attn: {}", seller.contact.trim()), Font::Regular));
    }
    if !seller.phone.trim().is_empty() {
        lines.push((format!("Tel: {}", seller.phone.trim()), Font::Regular));
    }
    lines
}

fn buyer_lines(buyer: &CustomerInfo) -> Vec<(String, Font)> {
    let company = match buyer.company.trim() {
        "" => "Individual",
        company => company,
    };
    let mut lines = vec![(company.to_string(), Font::Bold)];

    lines.push((format!("Attn: {}", buyer.contact.trim()), Font::Regular));
    lines.push((buyer.address.trim().to_string(), Font::Regular));

    let country = match country_code(&buyer.country) {
        Some(code) => format!("{} ({})", buyer.country.trim(), code),
        None => buyer.country.trim().to_string(),
    };
    let locality = [buyer.city.trim(), country.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    lines.push((format!("{} {}", locality, buyer.postal_code.trim()).trim().to_string(), Font::Regular));

    lines.push((format!("Tel: {}", buyer.phone.trim()), Font::Regular));
    if !buyer.email.trim().is_empty() {
        lines.push((format!("Email: {}", buyer.email.trim()), Font::Regular));
    }
    if !buyer.tax_id.trim().is_empty() {
        lines.push((format!("Tax ID: {}", buyer.tax_id.trim()), Font::Regular));
    }
    lines
}

fn wrap_lines(lines: Vec<(String, Font)>, width: f32) -> Vec<(String, Font)> {
    lines
        .into_iter()
        .flat_map(|(text, font)| {
            wrap_text(&text, font, BODY_SIZE, width)
                .into_iter()
                .map(move |line| (line, font))
        })
        .collect()
}
