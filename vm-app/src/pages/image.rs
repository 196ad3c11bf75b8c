//! Image upload handling

use base64::{engine::general_purpose::STANDARD, Engine as _};
use vm_common::models::{ImageInput, PredictionRequest};

use crate::error::{ApiError, ApiResult};

pub const NO_IMAGE_MESSAGE: &str = "Please select an image first";

const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode an upload as a `data:<mime>;base64,<payload>` URL
///
/// The MIME type is sniffed from the bytes, then taken from the request's
/// `Content-Type`, then falls back to `application/octet-stream`.
pub fn to_data_url(bytes: &[u8], content_type: Option<&str>) -> String {
    let mime = infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .or_else(|| {
            content_type
                .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_string())
                .filter(|ct| !ct.is_empty())
        })
        .unwrap_or_else(|| FALLBACK_MIME.to_string());

    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Gate an upload and build the proxy request
pub fn image_request(bytes: &[u8], content_type: Option<&str>) -> ApiResult<PredictionRequest> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest(NO_IMAGE_MESSAGE.to_string()));
    }

    Ok(PredictionRequest::Image(ImageInput {
        image_url: to_data_url(bytes, content_type),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniffed_mime_wins() {
        let url = to_data_url(&PNG_HEADER, Some("image/jpeg"));
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(url, format!("data:image/png;base64,{}", STANDARD.encode(PNG_HEADER)));
    }

    #[test]
    fn test_content_type_fallback() {
        let url = to_data_url(b"plain bytes", Some("image/webp; charset=binary"));
        assert!(url.starts_with("data:image/webp;base64,"));

        let url = to_data_url(b"plain bytes", None);
        assert!(url.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_empty_upload_gated() {
        assert!(matches!(
            image_request(&[], Some("image/png")),
            Err(ApiError::BadRequest(msg)) if msg == NO_IMAGE_MESSAGE
        ));
    }
}
