use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::write::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use tracing::error;

use crate::domain::errors::DomainError;
use crate::domain::ports::ImageStore;
use crate::interface_adapters::protocol::{BasicResponse, DataResponse};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

// A file as it arrives from a multipart form field.
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// Venue photo and menu photo storage. Images are deflate-compressed at rest
// and served back as base64 strings.
pub struct ImageService<VI, MI> {
    pub venue_images: VI,
    pub menu_images: MI,
}

impl<VI, MI> ImageService<VI, MI>
where
    VI: ImageStore,
    MI: ImageStore,
{
    pub async fn upload_venue_image(
        &self,
        venue_id: i32,
        upload: &ImageUpload,
    ) -> Result<BasicResponse, DomainError> {
        let name = validate(upload)?;
        let compressed = compress(&upload.bytes).map_err(DomainError::Storage)?;

        if let Err(err) = self.venue_images.insert(venue_id, name, &compressed).await {
            error!(error = %err, venue_id, "failed to store venue image");
            return Err(DomainError::Storage(
                "Error while saving venue image".to_string(),
            ));
        }

        Ok(BasicResponse::ok(format!(
            "Image '{name}' uploaded successfully"
        )))
    }

    pub async fn upload_menu_image(
        &self,
        venue_id: i32,
        upload: &ImageUpload,
    ) -> Result<BasicResponse, DomainError> {
        let name = validate(upload)?;
        let compressed = compress(&upload.bytes).map_err(DomainError::Storage)?;

        if let Err(err) = self.menu_images.insert(venue_id, name, &compressed).await {
            error!(error = %err, venue_id, "failed to store menu image");
            return Err(DomainError::Storage(
                "Error while saving menu image".to_string(),
            ));
        }

        Ok(BasicResponse::ok(format!(
            "Image '{name}' uploaded successfully"
        )))
    }

    pub async fn get_venue_images(&self, venue_id: i32) -> Result<Vec<String>, DomainError> {
        let stored = self
            .venue_images
            .find_by_venue_id(venue_id)
            .await
            .map_err(DomainError::Storage)?;
        encode_all(stored.iter().map(|image| image.image_data.as_slice()))
    }

    pub async fn get_menu_images(&self, venue_id: i32) -> Result<Vec<String>, DomainError> {
        let stored = self
            .menu_images
            .find_by_venue_id(venue_id)
            .await
            .map_err(DomainError::Storage)?;
        encode_all(stored.iter().map(|image| image.image_data.as_slice()))
    }

    // The first stored venue photo doubles as the listing header.
    pub async fn get_header_image(&self, venue_id: i32) -> Result<DataResponse<String>, DomainError> {
        let stored = self
            .venue_images
            .find_by_venue_id(venue_id)
            .await
            .map_err(DomainError::Storage)?;

        match stored.first() {
            Some(image) => {
                let data = decompress(&image.image_data).map_err(DomainError::Storage)?;
                Ok(DataResponse::ok("Header image found.", STANDARD.encode(data)))
            }
            None => Ok(DataResponse::fail("No header image found.")),
        }
    }
}

fn validate(upload: &ImageUpload) -> Result<&str, DomainError> {
    if upload.bytes.is_empty() {
        return Err(DomainError::InvalidImage("File is empty".to_string()));
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(DomainError::InvalidImage(
            "File size exceeds the limit of 5MB".to_string(),
        ));
    }
    match upload.content_type.as_deref() {
        Some("image/jpeg") | Some("image/png") => {}
        _ => {
            return Err(DomainError::InvalidImage(
                "Invalid file type. Only JPEG and PNG are allowed".to_string(),
            ))
        }
    }
    upload
        .filename
        .as_deref()
        .ok_or_else(|| DomainError::InvalidImage("File name is null".to_string()))
}

fn encode_all<'a>(images: impl Iterator<Item = &'a [u8]>) -> Result<Vec<String>, DomainError> {
    images
        .map(|data| {
            decompress(data)
                .map(|bytes| STANDARD.encode(bytes))
                .map_err(DomainError::Storage)
        })
        .collect()
}

fn compress(data: &[u8]) -> Result<Vec<u8>, String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .and_then(|()| encoder.finish())
        .map_err(|err| format!("image compression failed: {err}"))
}

fn decompress(data: &[u8]) -> Result<Vec<u8>, String> {
    let mut decoder = DeflateDecoder::new(Vec::new());
    decoder
        .write_all(data)
        .and_then(|()| decoder.finish())
        .map_err(|err| format!("image decompression failed: {err}"))
}
