//! Landscape A4 certificate pages built directly with `lopdf`.
//!
//! Text uses the standard Helvetica Type1 fonts with WinAnsi encoding, so no
//! font files are embedded. Centring relies on the Helvetica AFM advance
//! widths below; the bold face is approximated from the regular widths.

use crate::domain::model::CertificateText;
use crate::domain::ports::DocumentRenderer;
use crate::utils::error::{CertificateError, Result};
use image::GenericImageView;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const PAGE_WIDTH: f32 = 842.0;
pub const PAGE_HEIGHT: f32 = 595.0;

const BOLD_WIDTH_FACTOR: f32 = 1.06;

// Helvetica advance widths (1/1000 em) for ' '..='~'
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Positions and sizes in PDF points, measured from the bottom-left corner
/// unless the field says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfLayout {
    pub title_size: f32,
    /// Distance of the title baseline from the top edge.
    pub title_from_top: f32,
    pub salutation_size: f32,
    pub salutation_from_top: f32,
    pub name_size: f32,
    pub name_from_top: f32,
    pub body_size: f32,
    pub body_from_top: f32,
    pub body_leading: f32,
    pub footer_size: f32,
    pub footer_y: f32,
    pub footer_right_margin: f32,
    pub signature_line: bool,
    pub signature_y: f32,
    pub signature_half_width: f32,
    pub signature_label: String,
    pub signature_label_size: f32,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            title_size: 36.0,
            title_from_top: 100.0,
            salutation_size: 24.0,
            salutation_from_top: 150.0,
            name_size: 30.0,
            name_from_top: 200.0,
            body_size: 18.0,
            body_from_top: 250.0,
            body_leading: 25.0,
            footer_size: 16.0,
            footer_y: 100.0,
            footer_right_margin: 50.0,
            signature_line: true,
            signature_y: 150.0,
            signature_half_width: 150.0,
            signature_label: "Assinatura".to_string(),
            signature_label_size: 12.0,
        }
    }
}

/// Background image, prepared once and stretched over every page.
#[derive(Debug, Clone)]
pub struct Background {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: Option<&'static str>,
    data: Vec<u8>,
}

impl Background {
    /// JPEG data is embedded as-is; any other format is decoded to RGB.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data).map_err(|e| {
            CertificateError::InvalidBackground {
                message: e.to_string(),
            }
        })?;
        let (width, height) = decoded.dimensions();

        let passthrough = matches!(image::guess_format(data), Ok(image::ImageFormat::Jpeg))
            && matches!(
                decoded.color(),
                image::ColorType::L8 | image::ColorType::Rgb8
            );
        if passthrough {
            let color_space = match decoded.color() {
                image::ColorType::L8 => "DeviceGray",
                _ => "DeviceRGB",
            };
            return Ok(Self {
                width,
                height,
                color_space,
                filter: Some("DCTDecode"),
                data: data.to_vec(),
            });
        }

        Ok(Self {
            width,
            height,
            color_space: "DeviceRGB",
            filter: None,
            data: decoded.to_rgb8().into_raw(),
        })
    }

    fn to_stream(&self) -> Stream {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => self.color_space,
            "BitsPerComponent" => 8,
        };
        match self.filter {
            Some(filter) => {
                dict.set("Filter", filter);
                Stream::new(dict, self.data.clone()).with_compression(false)
            }
            None => Stream::new(dict, self.data.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    layout: PdfLayout,
    background: Option<Background>,
}

impl PdfRenderer {
    pub fn new(layout: PdfLayout, background: Option<Background>) -> Self {
        Self { layout, background }
    }

    fn page_content(&self, text: &CertificateText) -> Vec<u8> {
        let layout = &self.layout;
        let mut content = Vec::new();

        if self.background.is_some() {
            push_op(
                &mut content,
                &format!("q {:.2} 0 0 {:.2} 0 0 cm /Bg Do Q", PAGE_WIDTH, PAGE_HEIGHT),
            );
        }

        let center = PAGE_WIDTH / 2.0;
        centered(
            &mut content,
            Font::Bold,
            layout.title_size,
            center,
            PAGE_HEIGHT - layout.title_from_top,
            &text.title,
        );
        centered(
            &mut content,
            Font::Regular,
            layout.salutation_size,
            center,
            PAGE_HEIGHT - layout.salutation_from_top,
            &text.salutation,
        );
        centered(
            &mut content,
            Font::Bold,
            layout.name_size,
            center,
            PAGE_HEIGHT - layout.name_from_top,
            &text.name,
        );

        let mut y = PAGE_HEIGHT - layout.body_from_top;
        for line in &text.body_lines {
            centered(&mut content, Font::Regular, layout.body_size, center, y, line);
            y -= layout.body_leading;
        }

        if let Some(footer) = &text.footer {
            let x = PAGE_WIDTH
                - layout.footer_right_margin
                - text_width(footer, Font::Regular, layout.footer_size);
            show_text(&mut content, Font::Regular, layout.footer_size, x, layout.footer_y, footer);
        }

        if layout.signature_line {
            push_op(
                &mut content,
                &format!(
                    "0.8 w {:.2} {:.2} m {:.2} {:.2} l S",
                    center - layout.signature_half_width,
                    layout.signature_y,
                    center + layout.signature_half_width,
                    layout.signature_y
                ),
            );
            centered(
                &mut content,
                Font::Regular,
                layout.signature_label_size,
                center,
                layout.signature_y - 15.0,
                &layout.signature_label,
            );
        }

        content
    }

    fn build_pdf(&self, text: &CertificateText) -> std::result::Result<Vec<u8>, String> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut xobjects = Dictionary::new();
        if let Some(background) = &self.background {
            let background_id = doc.add_object(background.to_stream());
            xobjects.set("Bg", background_id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => regular_id, "F2" => bold_id },
            "XObject" => xobjects,
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, self.page_content(text)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 842.into(), 595.into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(&format!("{} - {}", text.title, text.name))),
            "Producer" => Object::string_literal("certificados"),
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(|e| e.to_string())?;
        Ok(buffer)
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, text: &CertificateText) -> Result<Vec<u8>> {
        self.build_pdf(text)
            .map_err(|message| CertificateError::render(&text.name, message))
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

fn push_op(content: &mut Vec<u8>, op: &str) {
    content.extend_from_slice(op.as_bytes());
    content.push(b'\n');
}

fn centered(content: &mut Vec<u8>, font: Font, size: f32, center: f32, y: f32, text: &str) {
    let x = center - text_width(text, font, size) / 2.0;
    show_text(content, font, size, x, y, text);
}

fn show_text(content: &mut Vec<u8>, font: Font, size: f32, x: f32, y: f32, text: &str) {
    if text.is_empty() {
        return;
    }
    let mut op = String::new();
    let _ = write!(op, "BT /{} {:.1} Tf {:.2} {:.2} Td (", font.resource(), size, x, y);
    content.extend_from_slice(op.as_bytes());
    for byte in encode_win_ansi(text) {
        if matches!(byte, b'(' | b')' | b'\\') {
            content.push(b'\\');
        }
        content.push(byte);
    }
    content.extend_from_slice(b") Tj ET\n");
}

/// Approximate rendered width of `text` in points.
fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c) as u32).sum();
    let factor = match font {
        Font::Regular => 1.0,
        Font::Bold => BOLD_WIDTH_FACTOR,
    };
    units as f32 * size / 1000.0 * factor
}

fn glyph_width(c: char) -> u16 {
    match c as u32 {
        code @ 0x20..=0x7E => HELVETICA_WIDTHS[(code - 0x20) as usize],
        0xC0..=0xDE => 700,
        0xDF..=0xFF => 556,
        _ => 556,
    }
}

/// Maps text to WinAnsi bytes; characters outside the code page become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn certificate() -> CertificateText {
        CertificateText {
            name: "João (Jota) Silva".to_string(),
            title: "CERTIFICADO".to_string(),
            salutation: "Certificamos que".to_string(),
            body_lines: vec![
                "Participou das atividades realizadas pela Associação Allos".to_string(),
                "com carga horária total de 4 horas.".to_string(),
            ],
            footer: Some("Belo Horizonte, 14 de outubro de 2026".to_string()),
        }
    }

    fn page_content(bytes: &[u8]) -> Vec<u8> {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();
        doc.get_page_content(page_id).unwrap()
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_renders_single_page_pdf() {
        let bytes = PdfRenderer::default().render(&certificate()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let content = page_content(&bytes);
        assert!(contains(&content, b"(CERTIFICADO) Tj"));
        assert!(contains(&content, b"(Certificamos que) Tj"));
        assert!(contains(&content, b"Jo\xe3o \\(Jota\\) Silva"));
        assert!(contains(&content, b"(Assinatura) Tj"));
        assert!(!contains(&content, b"/Bg Do"));
    }

    #[test]
    fn test_signature_line_is_optional() {
        let layout = PdfLayout {
            signature_line: false,
            ..PdfLayout::default()
        };
        let bytes = PdfRenderer::new(layout, None).render(&certificate()).unwrap();
        assert!(!contains(&page_content(&bytes), b"(Assinatura) Tj"));
    }

    #[test]
    fn test_background_is_drawn_full_page() {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(8, 4))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let background = Background::from_bytes(&png).unwrap();
        assert_eq!(background.filter, None);
        assert_eq!(background.data.len(), 8 * 4 * 3);

        let bytes = PdfRenderer::new(PdfLayout::default(), Some(background))
            .render(&certificate())
            .unwrap();
        assert!(contains(&page_content(&bytes), b"842.00 0 0 595.00 0 0 cm /Bg Do"));
    }

    #[test]
    fn test_invalid_background_is_rejected() {
        assert!(matches!(
            Background::from_bytes(b"not an image"),
            Err(CertificateError::InvalidBackground { .. })
        ));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("ação"), vec![b'a', 0xE7, 0xE3, b'o']);
        assert_eq!(encode_win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_win_ansi("✓"), vec![b'?']);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let small = text_width("CERTIFICADO", Font::Regular, 10.0);
        let large = text_width("CERTIFICADO", Font::Regular, 20.0);
        assert!((large - 2.0 * small).abs() < 0.01);
        assert!(text_width("CERTIFICADO", Font::Bold, 10.0) > small);
    }
}
