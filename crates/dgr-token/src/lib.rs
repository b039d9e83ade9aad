//! # dgr-token — Identity Token Encoder
//!
//! Turns a snapshot of a client's identifying fields into a scannable
//! encoded payload: a QR image (PNG bytes) plus its base64 rendering.
//!
//! ## Reproducibility Contract
//!
//! The encoder is a pure function of its input snapshot. Every constant
//! that influences the output bytes is fixed — error-correction level,
//! module size, quiet-zone width, payload key order (canonical JCS JSON,
//! RFC 8785) — so the same snapshot always yields byte-identical output.
//! Downstream stores compare stored tokens against freshly derived ones;
//! any nondeterminism here would make every record look stale.
//!
//! ## Payload Scope
//!
//! The payload embeds exactly {nom, prenom, date_naissance,
//! lieu_naissance}. Spouse and children are tracked by the registry but
//! deliberately excluded from the encoded payload.

pub mod encoder;
pub mod payload;

pub use encoder::{encode, EncodedToken, TokenError, ERROR_CORRECTION, MODULE_PIXELS, QUIET_ZONE_MODULES};
pub use payload::TokenPayload;
