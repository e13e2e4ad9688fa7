//! Structure-only backend: page count and sizes come from the PDF, pages are
//! rasterized as blank sheets.

use image::{Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object};

use super::renderer::{DocumentError, PageRenderer, PageSize, page_index};

const PAGE_BORDER: Rgba<u8> = Rgba([220, 220, 220, 255]);

/// How far up the page tree to look for an inherited MediaBox
const MAX_INHERIT_DEPTH: usize = 8;

#[derive(Debug, Clone)]
pub struct LopdfRenderer {
    page_sizes: Vec<PageSize>,
}

impl LopdfRenderer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let doc = Document::load_mem(bytes)?;
        // Only the trailer says whether the file is encrypted
        if doc.is_encrypted() {
            return Err(DocumentError::Encrypted);
        }

        let mut page_sizes = Vec::new();
        for (_, object_id) in doc.get_pages() {
            let dict = doc.get_dictionary(object_id)?;
            page_sizes.push(media_box(&doc, dict).unwrap_or_default());
        }

        if page_sizes.is_empty() {
            return Err(DocumentError::NoPages);
        }
        Ok(Self { page_sizes })
    }
}

/// MediaBox of a page, following `/Parent` for inherited boxes
fn media_box(doc: &Document, page: &Dictionary) -> Option<PageSize> {
    let mut dict = page;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Some(size) = dict
            .get(b"MediaBox")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_array().ok())
            .and_then(|array| parse_box(array))
        {
            return Some(size);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn parse_box(array: &[Object]) -> Option<PageSize> {
    let [x0, y0, x1, y1] = array else {
        return None;
    };
    let width = (x1.as_float().ok()? - x0.as_float().ok()?).abs();
    let height = (y1.as_float().ok()? - y0.as_float().ok()?).abs();
    (width > 0.0 && height > 0.0).then_some(PageSize { width, height })
}

impl PageRenderer for LopdfRenderer {
    fn backend_name(&self) -> &'static str {
        "lopdf"
    }

    fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<PageSize, DocumentError> {
        let index = page_index(page, self.page_count())?;
        Ok(self.page_sizes[index])
    }

    fn render_page(&self, page: u32, scale: f32) -> Result<RgbaImage, DocumentError> {
        let (width, height) = self.page_size(page)?.pixels(scale);
        let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        if width >= 4 && height >= 4 {
            for x in 0..width {
                image.put_pixel(x, 0, PAGE_BORDER);
                image.put_pixel(x, height - 1, PAGE_BORDER);
            }
            for y in 0..height {
                image.put_pixel(0, y, PAGE_BORDER);
                image.put_pixel(width - 1, y, PAGE_BORDER);
            }
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    /// Two pages: the first with its own MediaBox, the second inheriting A4
    /// from the page tree
    fn sample_pdf() -> Vec<u8> {
        to_bytes(sample_document())
    }

    fn to_bytes(mut doc: Document) -> Vec<u8> {
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn sample_document() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let own = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 300.into()],
        });
        let inherited = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![own.into(), inherited.into()],
                "Count" => 2,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);
        doc
    }

    #[test]
    fn test_reads_page_count_and_sizes() {
        let renderer = LopdfRenderer::from_bytes(&sample_pdf()).unwrap();
        assert_eq!(renderer.page_count(), 2);
        assert_eq!(
            renderer.page_size(1).unwrap(),
            PageSize {
                width: 200.0,
                height: 300.0
            }
        );
        assert_eq!(
            renderer.page_size(2).unwrap(),
            PageSize {
                width: 595.0,
                height: 842.0
            }
        );
    }

    #[test]
    fn test_render_scales_page() {
        let renderer = LopdfRenderer::from_bytes(&sample_pdf()).unwrap();
        let image = renderer.render_page(1, 1.5).unwrap();
        assert_eq!(image.dimensions(), (300, 450));
        assert_eq!(image.get_pixel(150, 200).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 0), &PAGE_BORDER);
    }

    #[test]
    fn test_page_out_of_range() {
        let renderer = LopdfRenderer::from_bytes(&sample_pdf()).unwrap();
        assert!(matches!(
            renderer.page_size(0),
            Err(DocumentError::PageOutOfRange { page: 0, .. })
        ));
        assert!(matches!(
            renderer.render_page(3, 1.0),
            Err(DocumentError::PageOutOfRange { page: 3, page_count: 2 })
        ));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        assert!(matches!(
            LopdfRenderer::from_bytes(b"not a pdf"),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn test_encrypt_token_in_content_is_not_encryption() {
        let mut doc = sample_document();
        doc.add_object(Stream::new(
            dictionary! {},
            b"BT /F1 12 Tf (see /Encrypt in the trailer) Tj ET".to_vec(),
        ));
        let bytes = to_bytes(doc);
        assert!(bytes.windows(8).any(|w| w == b"/Encrypt"));

        let renderer = LopdfRenderer::from_bytes(&bytes).unwrap();
        assert_eq!(renderer.page_count(), 2);
    }

    #[test]
    fn test_encrypted_trailer_is_rejected() {
        let mut doc = sample_document();
        let encrypt = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
        });
        doc.trailer.set("Encrypt", encrypt);

        assert!(matches!(
            LopdfRenderer::from_bytes(&to_bytes(doc)),
            Err(DocumentError::Encrypted)
        ));
    }
}
