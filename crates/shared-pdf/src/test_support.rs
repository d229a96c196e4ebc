//! Fixture builders for unit tests

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;

pub const PAGE_TEXT: &[u8] = b"BT /F1 12 Tf 72 720 Td (Contract body) Tj ET";
pub const FOOTER_TEXT: &[u8] = b"BT /F1 8 Tf 72 40 Td (Page footer) Tj ET";

#[derive(Clone, Copy)]
enum ContentsForm {
    Stream,
    Missing,
    /// Reference to an array of two streams: PAGE_TEXT then FOOTER_TEXT
    IndirectArray,
}

#[derive(Clone, Copy)]
enum ResourcesForm {
    Own,
    Inherited,
    /// Reference to one Resources dictionary used by every such page
    Shared,
}

/// How a test page declares its box, contents and resources
pub struct TestPage {
    media_box: Option<[f32; 4]>,
    contents: ContentsForm,
    resources: ResourcesForm,
}

impl TestPage {
    pub fn letter() -> Self {
        Self {
            media_box: Some([0.0, 0.0, 612.0, 792.0]),
            contents: ContentsForm::Stream,
            resources: ResourcesForm::Own,
        }
    }

    pub fn a4() -> Self {
        Self {
            media_box: Some([0.0, 0.0, 595.28, 841.89]),
            contents: ContentsForm::Stream,
            resources: ResourcesForm::Own,
        }
    }

    /// No MediaBox or Resources of its own; both come from the Pages node
    pub fn inheriting() -> Self {
        Self {
            media_box: None,
            contents: ContentsForm::Stream,
            resources: ResourcesForm::Inherited,
        }
    }

    pub fn offset_origin(x: f32, y: f32) -> Self {
        Self {
            media_box: Some([x, y, x + 612.0, y + 792.0]),
            contents: ContentsForm::Stream,
            resources: ResourcesForm::Own,
        }
    }

    /// Letter page with no Contents entry at all
    pub fn blank() -> Self {
        Self {
            contents: ContentsForm::Missing,
            ..Self::letter()
        }
    }

    /// Letter page whose Contents is a reference to an array of streams
    pub fn split_contents() -> Self {
        Self {
            contents: ContentsForm::IndirectArray,
            ..Self::letter()
        }
    }

    /// Letter page pointing at the document-wide shared Resources object
    pub fn shared_resources() -> Self {
        Self {
            resources: ResourcesForm::Shared,
            ..Self::letter()
        }
    }
}

fn font(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    })
}

/// Build a PDF whose Pages node carries a Letter MediaBox and a font resource
pub fn pdf_with_pages(pages: &[TestPage]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = font(&mut doc);
    let shared_resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let mut dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        match page.contents {
            ContentsForm::Stream => {
                let content_id = doc.add_object(Stream::new(dictionary! {}, PAGE_TEXT.to_vec()));
                dict.set("Contents", content_id);
            }
            ContentsForm::Missing => {}
            ContentsForm::IndirectArray => {
                let body = doc.add_object(Stream::new(dictionary! {}, PAGE_TEXT.to_vec()));
                let footer = doc.add_object(Stream::new(dictionary! {}, FOOTER_TEXT.to_vec()));
                let array_id = doc.add_object(vec![Object::Reference(body), Object::Reference(footer)]);
                dict.set("Contents", array_id);
            }
        }
        if let Some(rect) = page.media_box {
            dict.set(
                "MediaBox",
                rect.iter().map(|&v| Object::Real(v)).collect::<Vec<_>>(),
            );
        }
        match page.resources {
            ResourcesForm::Own => dict.set(
                "Resources",
                dictionary! { "Font" => dictionary! { "F1" => font_id } },
            ),
            ResourcesForm::Inherited => {}
            ResourcesForm::Shared => dict.set("Resources", shared_resources_id),
        }
        kids.push(Object::Reference(doc.add_object(dict)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn letter_pdf(page_count: usize) -> Vec<u8> {
    let pages: Vec<_> = (0..page_count).map(|_| TestPage::letter()).collect();
    pdf_with_pages(&pages)
}

fn png(width: u32, height: u32, color: png::ColorType, pixels: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(pixels).unwrap();
        writer.finish().unwrap();
    }
    out
}

pub fn rgba_png(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    png(width, height, png::ColorType::Rgba, pixels)
}

pub fn gray_png(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    png(width, height, png::ColorType::Grayscale, pixels)
}

/// Half-transparent ink stroke, wider than tall
pub fn signature_png() -> Vec<u8> {
    let (w, h) = (40u32, 10u32);
    let mut pixels = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for _ in 0..w {
            let ink = if y == h / 2 { 255 } else { 0 };
            pixels.extend_from_slice(&[0, 0, 80, ink]);
        }
    }
    rgba_png(w, h, &pixels)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([20, 40, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg).unwrap();
    out.into_inner()
}
