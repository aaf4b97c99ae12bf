use std::sync::Arc;

use futures::channel::oneshot;
use image::RgbaImage;

use crate::error::PasteError;

type DecodeResult = Result<RgbaImage, PasteError>;

/// One payload from a paste or a file drop
#[derive(Clone)]
pub struct ClipboardItem {
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl std::fmt::Debug for ClipboardItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardItem")
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ClipboardItem {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Turn a dropped file into a payload, guessing the mime type from the extension when needed
    pub fn from_dropped_file(file: &egui::DroppedFile) -> Option<Self> {
        let mime = if !file.mime.is_empty() {
            file.mime.clone()
        } else {
            let name = file
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| file.name.clone());
            mime_from_extension(&name)?.to_owned()
        };

        if let Some(bytes) = &file.bytes {
            return Some(Self::new(mime, bytes.clone()));
        }

        // For native platforms, we can load the file from the path
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(path) = &file.path {
                return match std::fs::read(path) {
                    Ok(bytes) => Some(Self::new(mime, bytes)),
                    Err(err) => {
                        log::error!("Failed to read dropped file {}: {}", path.display(), err);
                        None
                    }
                };
            }
        }

        log::warn!("Dropped file has no accessible data: {}", file.name);
        None
    }
}

fn mime_from_extension(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Decode an encoded image into RGBA8 pixels
pub fn decode_image(bytes: &[u8]) -> DecodeResult {
    if bytes.is_empty() {
        return Err(PasteError::Empty);
    }
    let image = image::load_from_memory(bytes)?;
    log::debug!("Decoded pasted image: {}x{}", image.width(), image.height());
    Ok(image.to_rgba8())
}

/// Decodes pasted images off the UI thread.
///
/// Submitted payloads do not exist as rasters until [`PasteDecoder::poll_ready`]
/// hands them back.
#[derive(Default)]
pub struct PasteDecoder {
    pending: Vec<oneshot::Receiver<DecodeResult>>,
}

impl std::fmt::Debug for PasteDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteDecoder")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl PasteDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start decoding every image payload; other payloads are skipped.
    ///
    /// Returns how many decodes were started.
    pub fn submit(&mut self, items: impl IntoIterator<Item = ClipboardItem>) -> usize {
        let mut started = 0;
        for item in items {
            if !item.is_image() {
                log::debug!("{}", PasteError::NotAnImage(item.mime));
                continue;
            }
            self.pending.push(spawn_decode(item));
            started += 1;
        }
        started
    }

    /// Number of decodes still in flight
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Collect every finished decode without blocking. Failed payloads are logged and dropped.
    pub fn poll_ready(&mut self) -> Vec<RgbaImage> {
        let mut ready = Vec::new();
        self.pending.retain_mut(|receiver| match receiver.try_recv() {
            Ok(Some(result)) => {
                ready.extend(accept(result));
                false
            }
            Ok(None) => true,
            Err(oneshot::Canceled) => {
                log::warn!("{}", PasteError::Canceled);
                false
            }
        });
        ready
    }

    /// Block until every pending decode has finished
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_all(&mut self) -> Vec<RgbaImage> {
        let pending = std::mem::take(&mut self.pending);
        futures::executor::block_on(futures::future::join_all(pending))
            .into_iter()
            .filter_map(|outcome| accept(outcome.unwrap_or(Err(PasteError::Canceled))))
            .collect()
    }
}

fn accept(result: DecodeResult) -> Option<RgbaImage> {
    match result {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("Skipping pasted item: {}", err);
            None
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_decode(item: ClipboardItem) -> oneshot::Receiver<DecodeResult> {
    let (sender, receiver) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("paste-decode".to_owned())
        .spawn(move || {
            // The receiver may be gone if the app shut down meanwhile
            let _ = sender.send(decode_image(&item.bytes));
        });
    if let Err(err) = spawned {
        // The sender was dropped with the closure, so the receiver reports cancellation
        log::error!("Failed to start paste decoder thread: {}", err);
    }
    receiver
}

#[cfg(target_arch = "wasm32")]
fn spawn_decode(item: ClipboardItem) -> oneshot::Receiver<DecodeResult> {
    let (sender, receiver) = oneshot::channel();
    wasm_bindgen_futures::spawn_local(async move {
        let _ = sender.send(decode_image(&item.bytes));
    });
    receiver
}

/// Where clipboard images come from when the user asks to paste
pub trait ClipboardSource {
    fn read_image(&mut self) -> Option<RgbaImage>;
}

/// The operating system clipboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    #[cfg(not(target_arch = "wasm32"))]
    fn read_image(&mut self) -> Option<RgbaImage> {
        let mut clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => clipboard,
            Err(err) => {
                log::warn!("System clipboard unavailable: {}", err);
                return None;
            }
        };

        // Raw image data, e.g. a screenshot or an image copied from a browser
        if let Ok(data) = clipboard.get_image() {
            let (width, height) = (data.width as u32, data.height as u32);
            let raster = RgbaImage::from_raw(width, height, data.bytes.into_owned());
            if raster.is_none() {
                log::warn!("Clipboard image {}x{} has a malformed buffer", width, height);
            }
            return raster;
        }

        // Text that names an image file, e.g. a path copied from a file manager
        let text = clipboard.get_text().ok()?;
        let path = std::path::Path::new(text.trim());
        if !path.is_file() {
            log::debug!("{}", PasteError::NotAnImage("text/plain".to_owned()));
            return None;
        }
        match image::open(path) {
            Ok(image) => Some(image.to_rgba8()),
            Err(err) => {
                log::warn!("Skipping pasted path {}: {}", path.display(), err);
                None
            }
        }
    }

    // Browsers only hand clipboard text to the app; images arrive as file drops
    #[cfg(target_arch = "wasm32")]
    fn read_image(&mut self) -> Option<RgbaImage> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_from_extension("photo.JPG"), Some("image/jpeg"));
        assert_eq!(mime_from_extension("/tmp/a.b/shot.png"), Some("image/png"));
        assert_eq!(mime_from_extension("notes.txt"), None);
        assert_eq!(mime_from_extension("README"), None);
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(matches!(decode_image(&[]), Err(PasteError::Empty)));
    }

    #[test]
    fn test_decode_garbage_payload() {
        assert!(matches!(decode_image(b"definitely not a png"), Err(PasteError::Decode(_))));
    }

    #[test]
    fn test_dropped_bytes_with_known_mime() {
        let file = egui::DroppedFile {
            name: "screenshot".to_owned(),
            mime: "image/png".to_owned(),
            bytes: Some(Arc::from(&b"png bytes"[..])),
            ..Default::default()
        };
        let item = ClipboardItem::from_dropped_file(&file).unwrap();
        assert_eq!(item.mime, "image/png");
        assert_eq!(&item.bytes[..], b"png bytes");
    }

    #[test]
    fn test_dropped_bytes_guess_mime_from_name() {
        let file = egui::DroppedFile {
            name: "holiday.JPEG".to_owned(),
            bytes: Some(Arc::from(&b"jpeg bytes"[..])),
            ..Default::default()
        };
        assert_eq!(ClipboardItem::from_dropped_file(&file).unwrap().mime, "image/jpeg");
    }

    #[test]
    fn test_dropped_file_without_type_or_data_is_skipped() {
        let unknown = egui::DroppedFile {
            name: "notes".to_owned(),
            bytes: Some(Arc::from(&b"plain"[..])),
            ..Default::default()
        };
        assert!(ClipboardItem::from_dropped_file(&unknown).is_none());

        let empty = egui::DroppedFile {
            name: "photo.png".to_owned(),
            ..Default::default()
        };
        assert!(ClipboardItem::from_dropped_file(&empty).is_none());
    }

    #[test]
    fn test_non_images_are_not_submitted() {
        let mut decoder = PasteDecoder::new();
        let started = decoder.submit([ClipboardItem::new("text/plain", b"hello".to_vec())]);
        assert_eq!(started, 0);
        assert_eq!(decoder.pending(), 0);
        assert!(decoder.poll_ready().is_empty());
    }
}
