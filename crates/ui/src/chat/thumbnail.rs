use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use gpui::{Image, ImageFormat};
use mimic_chat::DataUrl;

/// Decoded images keyed by their data URL, so each attachment is decoded once.
#[derive(Default)]
pub struct ThumbnailCache {
    images: HashMap<String, Option<Arc<Image>>>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, url: &str) -> Option<Arc<Image>> {
        if let Some(image) = self.images.get(url) {
            return image.clone();
        }

        let image = decode_thumbnail(url);
        self.images.insert(url.to_string(), image.clone());
        image
    }

    /// Drops every cached image whose URL is not in `live`.
    pub fn retain<'a>(&mut self, live: impl IntoIterator<Item = &'a str>) {
        let live = live.into_iter().collect::<HashSet<_>>();
        self.images.retain(|url, _| live.contains(url.as_str()));
    }
}

fn decode_thumbnail(url: &str) -> Option<Arc<Image>> {
    let data = match DataUrl::parse(url) {
        Ok(data) => data,
        Err(error) => {
            tracing::warn!(error = %error, "attachment thumbnail could not be decoded");
            return None;
        }
    };

    let Some(format) = ImageFormat::from_mime_type(&data.mime_type) else {
        tracing::debug!(mime_type = %data.mime_type, "no thumbnail for unsupported image type");
        return None;
    };

    Some(Arc::new(Image::from_bytes(format, data.bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_decodes_are_cached_and_pruned() {
        let mut cache = ThumbnailCache::new();
        assert!(cache.get("not a data url").is_none());
        assert!(cache.get("data:text/plain;base64,aGk=").is_none());
        assert_eq!(cache.images.len(), 2);

        cache.retain(["not a data url"]);
        assert_eq!(cache.images.len(), 1);
        cache.retain(std::iter::empty());
        assert!(cache.images.is_empty());
    }

    #[test]
    fn png_payload_is_decoded_once() {
        let url = DataUrl::encode("image/png", &[0x89, b'P', b'N', b'G']);
        let mut cache = ThumbnailCache::new();
        let first = cache.get(&url).unwrap();
        let second = cache.get(&url).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
