use lopdf::{dictionary, Document, Object, Stream};

use super::RenderError;

/// US Letter in points.
const LETTER: (f64, f64) = (612.0, 792.0);
const MARGIN: f64 = 36.0;

/// Builds a one-page PDF showing a JPEG image scaled to fit the page.
///
/// Landscape images get a landscape page.
pub fn jpeg_page_pdf(jpeg_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::Pdf("image has zero size".to_string()));
    }

    let (page_width, page_height) = if width > height {
        (LETTER.1, LETTER.0)
    } else {
        LETTER
    };

    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let resources_id = doc.new_object_id();
    let content_id = doc.new_object_id();
    let page_id = doc.new_object_id();
    let image_id = doc.new_object_id();

    let image_stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg_data.to_vec(),
    );
    doc.objects.insert(image_id, Object::Stream(image_stream));

    doc.objects.insert(
        resources_id,
        Object::Dictionary(dictionary! {
            "XObject" => dictionary! {
                "Im1" => image_id,
            },
        }),
    );

    let scale_x = (page_width - 2.0 * MARGIN) / width as f64;
    let scale_y = (page_height - 2.0 * MARGIN) / height as f64;
    let scale = scale_x.min(scale_y);

    let img_width = (width as f64 * scale) as i64;
    let img_height = (height as f64 * scale) as i64;
    let x = ((page_width - img_width as f64) / 2.0) as i64;
    let y = ((page_height - img_height as f64) / 2.0) as i64;

    let content = format!(
        "q\n{} 0 0 {} {} {} cm\n/Im1 Do\nQ\n",
        img_width, img_height, x, y
    );
    doc.objects.insert(
        content_id,
        Object::Stream(Stream::new(dictionary! {}, content.into_bytes())),
    );

    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                (page_width as i64).into(),
                (page_height as i64).into(),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        }),
    );

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
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    Ok(buffer)
}
