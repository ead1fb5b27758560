use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;

use crate::error::ResourceError;

/// Decoded raster image: straight (non-premultiplied) RGBA8, row-major.
/// Pixel data is shared, so cloning a bitmap into a recorded command is
/// cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wraps raw RGBA8 rows. The buffer length must be exactly
    /// `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Bitmap, ResourceError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ResourceError::new(format!(
                "rgba buffer is {} bytes, {}x{} needs {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Bitmap {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// Decodes an encoded image. The mime hint short-circuits format
    /// detection for `image/png` and `image/jpeg`; anything else falls back
    /// to sniffing the payload.
    pub fn decode(bytes: &[u8], mime: Option<&str>) -> Result<Bitmap, ResourceError> {
        let format = match mime {
            Some(mime) if mime.contains("png") => Some(image::ImageFormat::Png),
            Some(mime) if mime.contains("jpeg") || mime.contains("jpg") => {
                Some(image::ImageFormat::Jpeg)
            }
            _ => image::guess_format(bytes).ok(),
        };
        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        }
        .map_err(|err| ResourceError::new(format!("image decode failed: {err}")))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Bitmap {
            width,
            height,
            data: Arc::new(rgba.into_raw()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Completion of a bitmap request. Providers may invoke it before
/// `request_bitmap` returns or later from another thread.
pub type BitmapCallback = Box<dyn FnOnce(Result<Bitmap, ResourceError>) + Send>;

/// Source of raster assets referenced by URL. The engine never fetches
/// anything itself; every image draw goes through an installed provider.
pub trait ResourceProvider {
    fn request_bitmap(&self, url: &str, callback: BitmapCallback);
}

/// In-memory provider backed by registered byte blobs plus inline `data:`
/// URIs. Requests complete synchronously on the calling thread.
#[derive(Debug, Default)]
pub struct AssetProvider {
    entries: HashMap<String, Vec<u8>>,
}

impl AssetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(url.into(), bytes);
    }

    fn load(&self, url: &str) -> Result<Bitmap, ResourceError> {
        if let Some(rest) = url.strip_prefix("data:") {
            let Some((header, payload)) = rest.split_once(',') else {
                return Err(ResourceError::new("data URI has no payload separator"));
            };
            let mime = header.split(';').next().filter(|v| !v.is_empty());
            let bytes = if header.contains("base64") {
                base64::engine::general_purpose::STANDARD
                    .decode(payload)
                    .map_err(|err| ResourceError::new(format!("base64 payload: {err}")))?
            } else {
                payload.as_bytes().to_vec()
            };
            return Bitmap::decode(&bytes, mime);
        }
        match self.entries.get(url) {
            Some(bytes) => Bitmap::decode(bytes, None),
            None => Err(ResourceError::new(format!("no asset registered for {url}"))),
        }
    }
}

impl ResourceProvider for AssetProvider {
    fn request_bitmap(&self, url: &str, callback: BitmapCallback) {
        callback(self.load(url));
    }
}
