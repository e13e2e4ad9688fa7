//! Decoded signature images.
//!
//! Signatures are stored as `data:image/png;base64,...` URLs. Decoding runs on
//! the async compute pool; results are keyed by the data string itself, so a
//! result that arrives after its annotation was undone is harmless.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::annotation::{Annotation, Shape};
use crate::store::AnnotationStore;

use super::pipeline::ImageLookup;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode a base64 image data URL
pub fn decode_data_url(data: &str) -> Result<RgbaImage, DataUrlError> {
    let rest = data.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;
    if !header.ends_with(";base64") {
        return Err(DataUrlError::NotBase64);
    }
    let bytes = STANDARD.decode(payload.trim())?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Encode an image as a PNG data URL
pub fn encode_png_data_url(image: &RgbaImage) -> Result<String, DataUrlError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(bytes)))
}

#[derive(Debug)]
pub enum SignatureEntry {
    Pending,
    Ready(RgbaImage),
    Failed,
}

#[derive(Resource, Default)]
pub struct SignatureCache {
    entries: HashMap<String, SignatureEntry>,
    /// Bumped whenever a decode finishes
    revision: u64,
}

impl SignatureCache {
    pub fn entry(&self, data: &str) -> Option<&SignatureEntry> {
        self.entries.get(data)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mark `data` as pending. Returns false if it is already known.
    fn begin(&mut self, data: &str) -> bool {
        if self.entries.contains_key(data) {
            return false;
        }
        self.entries.insert(data.to_string(), SignatureEntry::Pending);
        true
    }

    /// Store a decode result. Dropped if the entry was pruned meanwhile.
    fn finish(&mut self, data: String, result: Result<RgbaImage, DataUrlError>) {
        let Some(slot) = self.entries.get_mut(&data) else {
            return;
        };
        let entry = match result {
            Ok(image) => SignatureEntry::Ready(image),
            Err(e) => {
                warn!("Failed to decode signature image: {}", e);
                SignatureEntry::Failed
            }
        };
        *slot = entry;
        self.revision += 1;
    }

    /// Forget signatures no annotation in `annotations` refers to.
    /// Returns how many entries were dropped.
    fn retain_used(&mut self, annotations: &[Annotation]) -> usize {
        let used: HashSet<&str> = annotations
            .iter()
            .filter_map(|a| match &a.shape {
                Shape::Signature { data, .. } => Some(data.as_str()),
                _ => None,
            })
            .collect();
        let before = self.entries.len();
        self.entries.retain(|data, _| used.contains(data.as_str()));
        before - self.entries.len()
    }

    /// Insert an already decoded image, e.g. one just drawn in the editor
    pub fn insert_ready(&mut self, data: String, image: RgbaImage) {
        self.entries.insert(data, SignatureEntry::Ready(image));
        self.revision += 1;
    }
}

impl ImageLookup for SignatureCache {
    fn image(&self, data: &str) -> Option<&RgbaImage> {
        match self.entries.get(data) {
            Some(SignatureEntry::Ready(image)) => Some(image),
            _ => None,
        }
    }
}

#[derive(Component)]
pub struct SignatureDecodeTask {
    data: String,
    task: Task<Result<RgbaImage, DataUrlError>>,
}

/// Start decoding every signature in the store the cache hasn't seen, and
/// drop the ones the store no longer holds
pub fn request_signature_decodes(
    mut commands: Commands,
    store: Res<AnnotationStore>,
    mut cache: ResMut<SignatureCache>,
) {
    let dropped = cache.retain_used(store.annotations());
    if dropped > 0 {
        debug!("Dropped {} unused signature images", dropped);
    }

    let task_pool = AsyncComputeTaskPool::get();
    for annotation in store.annotations() {
        let Shape::Signature { data, .. } = &annotation.shape else {
            continue;
        };
        if !cache.begin(data) {
            continue;
        }
        let payload = data.clone();
        let task = task_pool.spawn(async move { decode_data_url(&payload) });
        commands.spawn(SignatureDecodeTask {
            data: data.clone(),
            task,
        });
    }
}

pub fn poll_signature_decodes(
    mut commands: Commands,
    mut cache: ResMut<SignatureCache>,
    mut tasks: Query<(Entity, &mut SignatureDecodeTask)>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.task)) {
            let data = std::mem::take(&mut task.data);
            cache.finish(data, result);
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_round_trip() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(1, 1, image::Rgba([1, 2, 3, 255]));
        let url = encode_png_data_url(&image).unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));

        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [1, 2, 3, 255]);
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(decode_data_url("hello"), Err(DataUrlError::NotDataUrl)));
        assert!(matches!(
            decode_data_url("data:image/png,abc"),
            Err(DataUrlError::NotBase64)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,!!!"),
            Err(DataUrlError::Base64(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,AAAA"),
            Err(DataUrlError::Image(_))
        ));
    }

    #[test]
    fn test_failed_decode_is_remembered() {
        let mut cache = SignatureCache::default();
        assert!(cache.begin("data:x"));
        cache.finish("data:x".to_string(), Err(DataUrlError::NotBase64));
        assert!(!cache.begin("data:x"));
        assert!(matches!(cache.entry("data:x"), Some(SignatureEntry::Failed)));
        assert!(cache.image("data:x").is_none());
        assert_eq!(cache.revision(), 1);
    }

    fn signature(data: &str) -> Annotation {
        let stamp = crate::annotation::Stamp {
            color: "#000000".to_string(),
            stroke_width: 2.0,
            page: 1,
            timestamp_ms: 0,
        };
        Annotation::create(
            Shape::signature(crate::annotation::Point::new(0.0, 0.0), data.to_string()),
            &stamp,
        )
    }

    #[test]
    fn test_unused_signatures_are_dropped() {
        let mut cache = SignatureCache::default();
        cache.insert_ready("data:kept".to_string(), RgbaImage::new(1, 1));
        cache.insert_ready("data:gone".to_string(), RgbaImage::new(1, 1));
        assert!(cache.begin("data:pending"));

        let dropped = cache.retain_used(&[signature("data:kept")]);

        assert_eq!(dropped, 2);
        assert!(cache.image("data:kept").is_some());
        assert!(cache.entry("data:gone").is_none());
        assert!(cache.entry("data:pending").is_none());
    }

    #[test]
    fn test_late_result_for_dropped_entry_is_discarded() {
        let mut cache = SignatureCache::default();
        assert!(cache.begin("data:x"));
        cache.retain_used(&[]);
        cache.finish("data:x".to_string(), Ok(RgbaImage::new(1, 1)));

        assert!(cache.entry("data:x").is_none());
        assert_eq!(cache.revision(), 0);
        // Brought back by undo: decoded again
        assert!(cache.begin("data:x"));
    }
}
