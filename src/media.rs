use std::fmt;
use std::io::Cursor;

use anyhow::{Context as _, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::Mailbox;

pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
pub const STL_MIME: &str = "model/stl";

/// Raw file as it came out of the file dialog.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, PartialEq)]
pub struct ImageUpload {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    pub dimensions: (u32, u32),
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty()).then(|| ext.to_ascii_lowercase())
}

fn mime_of(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

impl ImageUpload {
    /// Checks name, size and content of a picked file.
    pub fn from_file(name: &str, bytes: Vec<u8>) -> anyhow::Result<Self> {
        match extension(name) {
            Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => bail!("{name}: only {} images are supported", ACCEPTED_EXTENSIONS.join(", ")),
        }
        if bytes.is_empty() {
            bail!("{name} is empty");
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            bail!(
                "{name} is {}, the limit is {}",
                human_size(bytes.len()),
                human_size(MAX_UPLOAD_BYTES)
            );
        }

        let format = image::guess_format(&bytes).with_context(|| format!("{name} is not an image"))?;
        let mime = mime_of(format).ok_or_else(|| anyhow!("{name}: {format:?} images are not supported"))?;
        let dimensions = image::ImageReader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()
            .with_context(|| format!("{name} could not be read"))?;

        Ok(Self { name: name.to_string(), mime, bytes, dimensions })
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Everything after the first `,` (the payload of a data URI); `value` itself when there is none.
pub fn strip_data_uri(value: &str) -> &str {
    value.split_once(',').map_or(value, |(_, payload)| payload)
}

pub fn decode_base64_image(value: &str) -> anyhow::Result<Vec<u8>> {
    let payload: String = strip_data_uri(value).split_whitespace().collect();
    STANDARD.decode(payload).context("image payload is not valid base64")
}

/// Decodes an image and shrinks it so the longest edge is at most `max_edge`.
pub fn decode_thumbnail(bytes: &[u8], max_edge: u32) -> anyhow::Result<egui::ColorImage> {
    let image = image::load_from_memory(bytes).context("could not decode image")?;
    let image = if image.width().max(image.height()) > max_edge {
        image.thumbnail(max_edge, max_edge)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

pub fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 { format!("{bytes} B") } else { format!("{value:.1} {}", UNITS[unit]) }
}

/// Opens the browser file dialog; the chosen file lands in `inbox`.
#[cfg(target_arch = "wasm32")]
pub fn pick_image(inbox: Mailbox<PickedFile>, ctx: egui::Context) {
    crate::execute(async move {
        let Some(handle) = rfd::AsyncFileDialog::new()
            .add_filter("Images (png, jpg, webp)", ACCEPTED_EXTENSIONS)
            .pick_file()
            .await
        else {
            return;
        };
        let picked = PickedFile { name: handle.file_name(), bytes: handle.read().await };
        log::info!("picked {} ({})", picked.name, human_size(picked.bytes.len()));
        crate::post(&inbox, picked);
        ctx.request_repaint();
    });
}

/// Hands `bytes` to the browser as a file download.
#[cfg(target_arch = "wasm32")]
pub fn save_download(filename: &str, bytes: &[u8], mime: &str) -> anyhow::Result<()> {
    use wasm_bindgen::JsCast;

    let js = |e: wasm_bindgen::JsValue| anyhow!("{e:?}");
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow!("no document to attach the download to"))?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js)?
        .dyn_into()
        .map_err(|_| anyhow!("could not create a download link"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    web_sys::Url::revoke_object_url(&url).map_err(js)?;

    log::info!("download of {filename} ({}) started", human_size(bytes.len()));
    Ok(())
}

// --------------------------- non-wasm fallbacks ---------------------------

#[cfg(not(target_arch = "wasm32"))]
pub fn pick_image(_inbox: Mailbox<PickedFile>, _ctx: egui::Context) {
    log::warn!("file dialogs are only available in the browser build");
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_download(filename: &str, _bytes: &[u8], _mime: &str) -> anyhow::Result<()> {
    bail!("{filename}: downloads are only available in the browser build")
}
