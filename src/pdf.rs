//! Page decoding and PDF assembly.
//!
//! Pages are normalised to 8-bit RGB on decode, then each one becomes a PDF
//! page of the same size in points, holding the page as a JPEG image.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Decodes a downloaded page and drops any alpha channel or palette.
pub fn decode(url: &str, bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes).map_err(|source| Error::Decode {
        url: url.to_owned(),
        source,
    })?;
    Ok(image.to_rgb8())
}

/// Packs `pages` into one PDF, first page first.
#[instrument(skip(pages), fields(pages = pages.len()))]
pub fn pack(chapter: u32, pages: &[RgbImage]) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(Error::NoPages { chapter });
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for (index, page) in pages.iter().enumerate() {
        let page_id = add_page(&mut doc, pages_id, index, page)?;
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(lopdf::Error::from)?;
    debug!(bytes = buffer.len(), "pdf assembled");
    Ok(buffer)
}

fn add_page(doc: &mut Document, parent: ObjectId, index: usize, page: &RgbImage) -> Result<ObjectId> {
    let (width, height) = page.dimensions();
    let (width, height) = (i64::from(width), i64::from(height));

    let mut jpeg = Vec::new();
    page.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .map_err(|source| Error::Encode { page: index, source })?;

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![width.into(), 0.into(), 0.into(), height.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    }))
}
