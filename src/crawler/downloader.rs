use base64::{Engine as _, engine::general_purpose::STANDARD};
use futures::future::join_all;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use tracing::{debug, info};

use super::transport::Transport;
use crate::error::{FetchError, Result};
use crate::models::{Illustration, Picture};

pub const PICTURE_MIME: &str = "image/jpeg";

/// Downloads pictures and normalizes them to base64 JPEG.
pub struct ImageDownloader {
    quality: u8,
}

impl ImageDownloader {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    /// One request per illustration, all in flight at once. Any failed
    /// download or decode fails the whole batch after every request finished.
    pub async fn download_all<T: Transport>(&self, transport: &T, illustrations: &[Illustration]) -> Result<Vec<Picture>> {
        info!("Downloading {} pictures", illustrations.len());
        let results = join_all(illustrations.iter().map(|illustration| self.download_one(transport, illustration))).await;
        let pictures = results.into_iter().collect::<Result<Vec<_>>>()?;
        info!("Downloaded {} pictures", pictures.len());
        Ok(pictures)
    }

    async fn download_one<T: Transport>(&self, transport: &T, illustration: &Illustration) -> Result<Picture> {
        let Illustration { reference, id } = illustration;
        let bytes = transport.get_bytes(reference).await?;
        let data = self.transcode(id, &bytes)?;
        debug!("Picture {}: {} bytes -> {} base64 chars", id, bytes.len(), data.len());
        Ok(Picture {
            id: id.clone(),
            mime: PICTURE_MIME.to_string(),
            data,
        })
    }

    /// Decodes any supported format, flattens alpha onto white and
    /// re-encodes as base64 JPEG.
    pub fn transcode(&self, id: &str, bytes: &[u8]) -> Result<String> {
        let decode_failure = |source| FetchError::ImageDecodeFailure { id: id.to_string(), source };

        let img = image::load_from_memory(bytes).map_err(decode_failure)?;
        let flat = flatten_on_white(&img);

        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(flat)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.quality))
            .map_err(decode_failure)?;

        Ok(STANDARD.encode(&buf))
    }
}

fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(pixel: Rgba<u8>) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, pixel));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn transcodes_png_to_jpeg() {
        let data = ImageDownloader::new(90).transcode("a.png", &png(Rgba([255, 0, 0, 255]))).unwrap();
        let decoded = STANDARD.decode(&data).expect("valid base64");
        assert_eq!(image::guess_format(&decoded).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn transparent_pixels_become_white() {
        let data = ImageDownloader::new(100).transcode("t.png", &png(Rgba([0, 0, 0, 0]))).unwrap();
        let decoded = image::load_from_memory(&STANDARD.decode(&data).unwrap()).unwrap().to_rgb8();
        let [r, g, b] = decoded.get_pixel(4, 4).0;
        assert!(r > 245 && g > 245 && b > 245, "got {r},{g},{b}");
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        match ImageDownloader::new(90).transcode("i_x.jpg", b"<html>404</html>") {
            Err(FetchError::ImageDecodeFailure { id, .. }) => assert_eq!(id, "i_x.jpg"),
            other => panic!("expected ImageDecodeFailure, got {other:?}"),
        }
    }
}
