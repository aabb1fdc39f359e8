use std::{fs, path::PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use sha1::{Digest, Sha1};

/// Encodes packed ARGB_8888 pixels (Android `Bitmap.getPixels` layout) as a
/// base64 PNG.
pub fn encode_argb_png(pixels: &[u32], width: u32, height: u32) -> Option<String> {
    if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for pixel in pixels {
        let [a, r, g, b] = pixel.to_be_bytes();
        rgba.extend_from_slice(&[r, g, b, a]);
    }

    let mut png = Vec::new();
    {
        let encoder = PngEncoder::new(&mut png);
        if encoder
            .write_image(&rgba, width, height, ColorType::Rgba8)
            .is_err()
        {
            return None;
        }
    }

    Some(BASE64.encode(png))
}

/// Encoded icons on disk, one `<sha1>.b64` file per package version.
#[derive(Debug, Clone)]
pub struct IconCache {
    dir: PathBuf,
}

impl IconCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load(&self, package_name: &str, version_code: i64) -> Option<String> {
        let data = fs::read_to_string(self.file_path(package_name, version_code)).ok()?;
        if data.is_empty() || BASE64.decode(data.as_bytes()).is_err() {
            return None;
        }
        Some(data)
    }

    pub fn store(&self, package_name: &str, version_code: i64, data: &str) {
        if fs::create_dir_all(&self.dir).is_err() {
            return;
        }
        if let Err(err) = fs::write(self.file_path(package_name, version_code), data) {
            log::debug!("failed to cache icon for {package_name}: {err}");
        }
    }

    fn file_path(&self, package_name: &str, version_code: i64) -> PathBuf {
        self.dir
            .join(format!("{}.b64", cache_key(package_name, version_code)))
    }
}

fn cache_key(package_name: &str, version_code: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(package_name.as_bytes());
    hasher.update(version_code.to_le_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    const LUT: &[u8; 16] = b"0123456789abcdef";
    for byte in digest {
        hex.push(LUT[(byte >> 4) as usize] as char);
        hex.push(LUT[(byte & 0x0f) as usize] as char);
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_pixels_decode_back_as_rgba() {
        let encoded = encode_argb_png(&[0xff11_2233, 0x8044_5566], 2, 1).unwrap();
        let png = BASE64.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(0, 0).0, [0x11, 0x22, 0x33, 0xff]);
        assert_eq!(decoded.get_pixel(1, 0).0, [0x44, 0x55, 0x66, 0x80]);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        assert_eq!(encode_argb_png(&[0; 3], 2, 2), None);
        assert_eq!(encode_argb_png(&[], 0, 0), None);
    }

    #[test]
    fn cache_is_keyed_by_package_and_version() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IconCache::new(dir.path().join("icons"));
        let icon = encode_argb_png(&[0xffff_ffff], 1, 1).unwrap();

        assert_eq!(cache.load("a.app", 1), None);
        cache.store("a.app", 1, &icon);
        assert_eq!(cache.load("a.app", 1), Some(icon));
        assert_eq!(cache.load("a.app", 2), None);
        assert_eq!(cache.load("b.app", 1), None);
    }

    #[test]
    fn corrupt_cache_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IconCache::new(dir.path());
        cache.store("a.app", 1, "%%% not base64 %%%");
        assert_eq!(cache.load("a.app", 1), None);
    }

    #[test]
    fn cache_key_is_hex_sha1() {
        let key = cache_key("a.app", 1);
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
