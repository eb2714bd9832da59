//! Snapshot codec - the whole roster as a single URL-safe token.
//!
//! The roster is written as JSON, percent-encoded with the character set of
//! `encodeURIComponent`, then base64-encoded with the URL-safe alphabet and no
//! padding. Decoding also accepts standard-alphabet and padded tokens, which is what
//! a plain `btoa` produces.

use crate::{
    core::location::AddressBar,
    errors::{DecodeError, Result},
    models::RosterData,
};
use base64::{
    Engine, alphabet,
    engine::{
        DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::URL_SAFE_NO_PAD,
    },
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Default query parameter carrying the token.
pub const SNAPSHOT_PARAM: &str = "data";

/// Bytes `encodeURIComponent` leaves unescaped besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes the full roster into a share token.
pub fn encode(data: &RosterData) -> Result<String> {
    let json = serde_json::to_string(data)?;
    let escaped = utf8_percent_encode(&json, URI_COMPONENT).to_string();
    Ok(URL_SAFE_NO_PAD.encode(escaped))
}

/// Decodes a share token back into a roster.
///
/// Fails with the stage that rejected the token. Callers treat any failure as
/// "no snapshot available".
pub fn decode(token: &str) -> std::result::Result<RosterData, DecodeError> {
    // `+` may arrive as a space once a query string has been form-decoded.
    let normalized: String = token
        .chars()
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = LENIENT_URL_SAFE.decode(normalized)?;
    let escaped = String::from_utf8(bytes)?;
    let json = percent_decode_str(&escaped).decode_utf8()?;
    Ok(serde_json::from_str(&json)?)
}

/// Builds a share link: `base` with the snapshot parameter set to the encoded roster.
pub fn share_url(base: &str, param: &str, data: &RosterData) -> Result<String> {
    let mut address = AddressBar::parse(base)?;
    address.set_query_param(param, encode(data)?);
    address.href()
}
