use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{PicblendError, PicblendResult};

/// A compact serialized bitmap (PNG or another container `image` can decode),
/// distinct from the decoded, drawable [`crate::ImageHandle`].
///
/// The remote service transports these as base64 strings, optionally wrapped in
/// a `data:image/...;base64,` URL; both forms parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn from_base64(data: &str) -> PicblendResult<Self> {
        let normalized = data.trim();

        let payload = if normalized.starts_with("data:image/") {
            let marker = normalized.find(";base64,").ok_or_else(|| {
                PicblendError::decode("image data URL is missing a base64 marker")
            })?;
            &normalized[marker + ";base64,".len()..]
        } else {
            normalized
        };

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| PicblendError::decode(format!("base64 image payload: {e}")))?;

        if bytes.is_empty() {
            return Err(PicblendError::decode("image payload is empty"));
        }

        Ok(Self { bytes })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_base64_and_data_url_parse_to_same_bytes() {
        let bytes = vec![137u8, 80, 78, 71];
        let bare = STANDARD.encode(&bytes);
        let data_url = format!("data:image/png;base64,{bare}");

        let a = EncodedImage::from_base64(&bare).unwrap();
        let b = EncodedImage::from_base64(&data_url).unwrap();
        assert_eq!(a.as_bytes(), bytes.as_slice());
        assert_eq!(a, b);
    }

    #[test]
    fn data_url_without_marker_is_rejected() {
        let result = EncodedImage::from_base64("data:image/png,rawpixels");
        assert!(matches!(result, Err(PicblendError::Decode(_))));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            EncodedImage::from_base64(""),
            Err(PicblendError::Decode(_))
        ));
    }
}
