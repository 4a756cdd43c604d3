//! Token codec for `BuildParameters`.
//!
//! Tokens travel inside Slack element values, so they use single-letter keys
//! and base64. The key mapping is a wire format: messages already posted in a
//! channel can be clicked long after a deploy, so keys must never be reused.
//!
//! | key | field                 |
//! |-----|-----------------------|
//! | a   | deployment.id         |
//! | b   | deployment.name       |
//! | c   | currentVersion        |
//! | d   | currentBuildVersion   |
//! | e   | branch                |
//! | f   | version               |
//! | g   | buildVersion          |

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{BuildParameters, Deployment, Stage};

/// Slack's limit for a button `value`
pub const BUTTON_VALUE_LIMIT: usize = 2000;

/// Slack's limit for a static select option `value`
pub const OPTION_VALUE_LIMIT: usize = 150;

/// Why a token could not be turned back into parameters
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not valid: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("token fields are not in step order")]
    OutOfOrder,
    #[error("token has not reached the {0:?} step")]
    Incomplete(Stage),
}

#[derive(Debug, Serialize, Deserialize)]
struct ShortKeys {
    a: String,
    b: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    e: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    f: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    g: Option<u64>,
}

impl From<&BuildParameters> for ShortKeys {
    fn from(p: &BuildParameters) -> Self {
        Self {
            a: p.deployment.id.clone(),
            b: p.deployment.name.clone(),
            c: p.current_version.clone(),
            d: p.current_build_version,
            e: p.branch.clone(),
            f: p.version.clone(),
            g: p.build_version,
        }
    }
}

impl From<ShortKeys> for BuildParameters {
    fn from(k: ShortKeys) -> Self {
        Self {
            deployment: Deployment { id: k.a, name: k.b },
            current_version: k.c,
            current_build_version: k.d,
            branch: k.e,
            version: k.f,
            build_version: k.g,
        }
    }
}

/// Encode parameters into an opaque token
pub fn encode(params: &BuildParameters) -> String {
    // a struct of strings and integers always serializes
    let json = serde_json::to_vec(&ShortKeys::from(params)).unwrap_or_default();
    STANDARD.encode(json)
}

/// Decode a token produced by [`encode`].
///
/// Rejects anything that is not a reachable wizard state, including tokens
/// whose fields skip a step.
pub fn decode(token: &str) -> Result<BuildParameters, DecodeError> {
    let bytes = STANDARD.decode(token.trim())?;
    let keys: ShortKeys = serde_json::from_slice(&bytes)?;
    let params = BuildParameters::from(keys);

    if params.stage().is_none() {
        return Err(DecodeError::OutOfOrder);
    }
    Ok(params)
}
