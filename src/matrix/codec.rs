//! Byte codec for matrix artifacts
//!
//! Artifacts are stored as JSON blobs. The codec must round-trip exactly:
//! index/columns order is preserved and values survive to floating-point bit
//! equality (serde_json emits the shortest representation that parses back to
//! the same f64). Malformed input fails with the codec error variant rather
//! than a raw serde error.

use super::MatrixArtifact;
use crate::{Result, TransportFramesError};

/// Serialize an artifact to a byte blob, validating its shape first
pub fn encode(artifact: &MatrixArtifact) -> Result<Vec<u8>> {
    artifact.validate()?;
    serde_json::to_vec(artifact)
        .map_err(|e| TransportFramesError::Codec(format!("Failed to encode matrix: {}", e)))
}

/// Deserialize an artifact from a byte blob, validating its shape after
pub fn decode(bytes: &[u8]) -> Result<MatrixArtifact> {
    let artifact: MatrixArtifact = serde_json::from_slice(bytes)
        .map_err(|e| TransportFramesError::Codec(format!("Failed to decode matrix: {}", e)))?;
    artifact.validate()?;
    Ok(artifact)
}
