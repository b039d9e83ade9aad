//! # Token Encoder — Deterministic QR Rendering
//!
//! Renders a [`TokenPayload`] into a QR image and its base64 form. The
//! rendering constants are part of the token's reproducibility contract
//! and are not configurable: error-correction level L, 10×10 px modules,
//! the standard 4-module quiet zone, and the smallest QR version that
//! holds the payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Luma};
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use crate::payload::TokenPayload;

/// Fixed error-correction level for identity tokens.
pub const ERROR_CORRECTION: EcLevel = EcLevel::L;

/// Rendered size of one QR module, in pixels.
pub const MODULE_PIXELS: u32 = 10;

/// Width of the quiet zone around the code, in modules.
pub const QUIET_ZONE_MODULES: u32 = 4;

/// Errors that can occur while encoding an identity token.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The payload could not be serialized to canonical JSON.
    #[error("canonical payload serialization failed: {0}")]
    Canonicalization(#[from] serde_json::Error),

    /// The payload does not fit in any QR version at the fixed
    /// error-correction level.
    #[error("payload does not fit in a QR code: {0}")]
    Capacity(#[from] qrcode::types::QrError),

    /// PNG encoding of the rendered module grid failed.
    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// An encoded identity token: PNG image bytes and their base64 rendering.
///
/// The `base64` field is what gets persisted on the client record; the
/// raw `image` bytes are served to scanners and print surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedToken {
    /// PNG-encoded grayscale QR image.
    pub image: Vec<u8>,
    /// Standard base64 of `image`.
    pub base64: String,
}

/// Encode a payload snapshot into an identity token.
///
/// Pure function of its input: equal payloads produce byte-identical
/// tokens. The QR version is the smallest capable of holding the
/// canonical JSON at error-correction level L.
///
/// # Errors
///
/// Returns [`TokenError::Capacity`] if the payload exceeds QR capacity
/// (names at the registry's column widths always fit) and
/// [`TokenError::Png`] if image encoding fails.
pub fn encode(payload: &TokenPayload) -> Result<EncodedToken, TokenError> {
    let json = payload.canonical_json()?;
    let code = QrCode::with_error_correction_level(json.as_bytes(), ERROR_CORRECTION)?;

    let img = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::L8,
    )?;

    let base64 = STANDARD.encode(&png);
    Ok(EncodedToken { image: png, base64 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payload() -> TokenPayload {
        TokenPayload::new(
            "Rakoto",
            "Jean",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            Some("Antananarivo".to_string()),
        )
    }

    #[test]
    fn encode_is_deterministic() {
        let a = encode(&payload()).unwrap();
        let b = encode(&payload()).unwrap();
        assert_eq!(a.image, b.image);
        assert_eq!(a.base64, b.base64);
    }

    #[test]
    fn different_payloads_differ() {
        let a = encode(&payload()).unwrap();
        let mut changed = payload();
        changed.prenom = "Jeanne".to_string();
        let b = encode(&changed).unwrap();
        assert_ne!(a.image, b.image);
    }

    #[test]
    fn base64_matches_image_bytes() {
        let token = encode(&payload()).unwrap();
        let decoded = STANDARD.decode(&token.base64).unwrap();
        assert_eq!(decoded, token.image);
    }

    #[test]
    fn output_is_png() {
        let token = encode(&payload()).unwrap();
        // PNG signature
        assert_eq!(&token.image[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }

    #[test]
    fn image_dimensions_follow_constants() {
        let json = payload().canonical_json().unwrap();
        let code = QrCode::with_error_correction_level(json.as_bytes(), ERROR_CORRECTION).unwrap();
        let side = (code.width() as u32 + 2 * QUIET_ZONE_MODULES) * MODULE_PIXELS;

        let img = code
            .render::<Luma<u8>>()
            .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
            .quiet_zone(true)
            .build();
        assert_eq!(img.width(), side);
        assert_eq!(img.height(), side);
    }

    #[test]
    fn null_birthplace_encodes() {
        let mut p = payload();
        p.lieu_naissance = None;
        assert!(encode(&p).is_ok());
    }

    #[test]
    fn spouse_and_children_never_embedded() {
        // The embedded data is exactly the canonical payload JSON —
        // nothing else rides along.
        let json = payload().canonical_json().unwrap();
        assert!(!json.contains("conjoint"));
        assert!(!json.contains("enfants"));
        let parsed = TokenPayload::from_json(&json).unwrap();
        assert_eq!(parsed, payload());
    }
}
