//! Decoding of the base64 annotated image returned by the analysis endpoint.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use thiserror::Error;

/// Standard alphabet, padding optional. Line wrapping is stripped before
/// decoding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("image payload is empty")]
    Empty,
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Raw image bytes plus the media type used when handing them to the browser.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// Decode a base64 image, accepting an optional `data:<type>;base64,` prefix
/// and embedded whitespace.
pub fn decode_image(payload: &str) -> Result<EncodedImage, PayloadError> {
    let body = match payload.trim_start().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, b)| b).unwrap_or(rest),
        None => payload,
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(PayloadError::Empty);
    }

    let bytes = LENIENT.decode(compact.as_bytes())?;
    if bytes.is_empty() {
        return Err(PayloadError::Empty);
    }
    let media_type = sniff_media_type(&bytes);
    Ok(EncodedImage { bytes, media_type })
}

/// Guess an image media type from its leading magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    const PNG_HEADER: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    #[test]
    fn test_decodes_plain_base64_png() {
        let encoded = STANDARD.encode(PNG_HEADER);
        let image = decode_image(&encoded).unwrap();
        assert_eq!(image.bytes, PNG_HEADER.to_vec());
        assert_eq!(image.media_type, "image/png");
    }

    #[test]
    fn test_strips_data_url_prefix() {
        let encoded = format!("data:image/png;base64,{}", STANDARD.encode(PNG_HEADER));
        let image = decode_image(&encoded).unwrap();
        assert_eq!(image.bytes, PNG_HEADER.to_vec());
    }

    #[test]
    fn test_tolerates_line_wrapping_and_missing_padding() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        let encoded = STANDARD.encode(jpeg);
        let unpadded = encoded.trim_end_matches('=');
        let wrapped = format!("{}\n{}\n", &unpadded[..4], &unpadded[4..]);

        let image = decode_image(&wrapped).unwrap();
        assert_eq!(image.bytes, jpeg.to_vec());
        assert_eq!(image.media_type, "image/jpeg");
    }

    #[test]
    fn test_rejects_garbage_and_empty() {
        assert!(matches!(decode_image("not base64!"), Err(PayloadError::Base64(_))));
        assert!(matches!(decode_image("  \n"), Err(PayloadError::Empty)));
        assert!(matches!(decode_image("data:image/png;base64,"), Err(PayloadError::Empty)));
    }

    #[test]
    fn test_sniff_media_type() {
        assert_eq!(sniff_media_type(b"GIF89a...."), "image/gif");
        assert_eq!(sniff_media_type(b"RIFF\x10\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(sniff_media_type(b"BM\0\0"), "image/bmp");
        assert_eq!(sniff_media_type(b"hello"), "application/octet-stream");
    }
}
