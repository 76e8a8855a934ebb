//! Single-line transfer strings for handing a generated map to a viewer.
//!
//! Format: `sar:v1:<width>x<height>:<base64 JSON snapshot>`.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use sar_mission_world::{InvariantViolation, MapSnapshot};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "sar";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const TRANSFER_HEADER: &str = "sar:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding transfer strings.
#[derive(Debug, Error)]
pub(crate) enum MapTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("transfer string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("transfer string is missing the version")]
    MissingVersion,
    /// The grid dimensions were missing.
    #[error("transfer string is missing the grid dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("transfer string is missing the payload")]
    MissingPayload,
    /// The prefix segment named another format.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment named an unsupported revision.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The header dimensions disagree with the embedded snapshot.
    #[error("header declares a {declared_width}x{declared_height} grid but the snapshot is {width}x{height}")]
    DimensionMismatch {
        /// Width named in the header.
        declared_width: u32,
        /// Height named in the header.
        declared_height: u32,
        /// Width of the embedded snapshot.
        width: u32,
        /// Height of the embedded snapshot.
        height: u32,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode transfer payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The snapshot could not be serialised or deserialised.
    #[error("could not process transfer payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The embedded snapshot breaks a map invariant.
    #[error("transferred map is inconsistent: {0}")]
    InvalidSnapshot(#[source] InvariantViolation),
}

/// Encodes the snapshot into a single-line string.
pub(crate) fn encode(snapshot: &MapSnapshot) -> Result<String, MapTransferError> {
    let json = serde_json::to_vec(snapshot).map_err(MapTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    let size = snapshot.size();
    Ok(format!(
        "{TRANSFER_HEADER}{FIELD_DELIMITER}{}x{}{FIELD_DELIMITER}{encoded}",
        size.width(),
        size.height()
    ))
}

/// Decodes and verifies a snapshot from its transfer string.
pub(crate) fn decode(value: &str) -> Result<MapSnapshot, MapTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MapTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(MapTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(MapTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(MapTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(MapTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(MapTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(MapTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (declared_width, declared_height) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(MapTransferError::InvalidEncoding)?;
    let snapshot: MapSnapshot =
        serde_json::from_slice(&bytes).map_err(MapTransferError::InvalidPayload)?;

    let size = snapshot.size();
    if size.width() != declared_width || size.height() != declared_height {
        return Err(MapTransferError::DimensionMismatch {
            declared_width,
            declared_height,
            width: size.width(),
            height: size.height(),
        });
    }
    snapshot.verify().map_err(MapTransferError::InvalidSnapshot)?;

    Ok(snapshot)
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), MapTransferError> {
    let invalid = || MapTransferError::InvalidDimensions(dimensions.to_owned());
    let (width, height) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}
