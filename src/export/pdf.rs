//! Single-page A4 PDF containing the composite image and a metadata footer.

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::constants::{A4_HEIGHT_PT, A4_WIDTH_PT};

use super::ExportError;
use super::composite::fit_centered;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
const FOOTER_MARGIN_MM: f32 = 10.0;
const FOOTER_FONT_SIZE: f32 = 10.0;
/// Footer baselines, in mm above the bottom edge
const FOOTER_LINES_MM: [f32; 3] = [25.0, 20.0, 15.0];

pub struct PdfMetadata {
    pub annotation_count: usize,
    pub file_name: String,
    /// Already formatted for display
    pub date: String,
}

impl PdfMetadata {
    fn footer_lines(&self) -> [String; 3] {
        [
            format!("Annotations: {}", self.annotation_count),
            format!("File: {}", self.file_name),
            format!("Date: {}", self.date),
        ]
    }
}

fn rgb_bytes(image: &RgbaImage) -> Vec<u8> {
    // The composite is opaque, alpha carries nothing
    image.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect()
}

/// Build the PDF bytes
pub fn build_pdf(composite: &RgbaImage, meta: &PdfMetadata) -> Result<Vec<u8>, ExportError> {
    let (width, height) = composite.dimensions();
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyImage);
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb_bytes(composite),
    );
    let image_id = doc.add_object(image_stream);

    let (origin, size) = fit_centered(
        bevy::math::Vec2::new(width as f32, height as f32),
        bevy::math::Vec2::new(A4_WIDTH_PT, A4_HEIGHT_PT),
    );
    // PDF y grows upward
    let image_y = A4_HEIGHT_PT - origin.y - size.y;

    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                size.x.into(),
                0.into(),
                0.into(),
                size.y.into(),
                origin.x.into(),
                image_y.into(),
            ],
        ),
        Operation::new("Do", vec!["Im0".into()]),
        Operation::new("Q", vec![]),
    ];

    let x = FOOTER_MARGIN_MM * POINTS_PER_MM;
    for (line, mm) in meta.footer_lines().iter().zip(FOOTER_LINES_MM) {
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FOOTER_FONT_SIZE.into()]),
            Operation::new("Td", vec![x.into(), (mm * POINTS_PER_MM).into()]),
            Operation::new("Tj", vec![Object::string_literal(line.as_str())]),
            Operation::new("ET", vec![]),
        ]);
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH_PT.into(), A4_HEIGHT_PT.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(meta.file_name.as_str()),
        "Producer" => Object::string_literal("pdf-annotator"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> PdfMetadata {
        PdfMetadata {
            annotation_count: 3,
            file_name: "plan (v2).pdf".to_string(),
            date: "2024-03-01".to_string(),
        }
    }

    #[test]
    fn test_builds_single_a4_page() {
        let composite = RgbaImage::from_pixel(20, 10, image::Rgba([255, 0, 0, 255]));
        let bytes = build_pdf(&composite, &meta()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page = doc.get_dictionary(pages[&1]).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert!((media_box[2].as_float().unwrap() - A4_WIDTH_PT).abs() < 0.01);
        assert!((media_box[3].as_float().unwrap() - A4_HEIGHT_PT).abs() < 0.01);
    }

    #[test]
    fn test_footer_text_is_in_content() {
        let composite = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
        let bytes = build_pdf(&composite, &meta()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        let content = doc.get_page_content(pages[&1]).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("Annotations: 3"));
        assert!(text.contains("Date: 2024-03-01"));
        assert!(text.contains("/Im0 Do"));
    }

    #[test]
    fn test_empty_composite_is_rejected() {
        let composite = RgbaImage::new(0, 0);
        assert!(matches!(
            build_pdf(&composite, &meta()),
            Err(ExportError::EmptyImage)
        ));
    }

    #[test]
    fn test_footer_lines() {
        assert_eq!(
            meta().footer_lines(),
            [
                "Annotations: 3".to_string(),
                "File: plan (v2).pdf".to_string(),
                "Date: 2024-03-01".to_string(),
            ]
        );
    }
}
