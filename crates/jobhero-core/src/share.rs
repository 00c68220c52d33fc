//! Shareable resume links.
//!
//! The payload is serialized to compact JSON, base64url encoded and
//! carried in the `shareData` query parameter. There is no signature:
//! anyone holding the link can read the resume it embeds.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entitlement::ResumeTemplate;

/// Query parameter carrying the payload.
pub const SHARE_PARAM: &str = "shareData";

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Link has no 'shareData' parameter")]
    MissingParameter,

    #[error("Share data is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Share data is not a valid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// What a shared link shows: the resume, its template and contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    #[serde(rename = "r")]
    pub resume: String,

    #[serde(rename = "t")]
    pub template: ResumeTemplate,

    #[serde(rename = "n", default)]
    pub name: String,

    #[serde(rename = "e", default)]
    pub email: String,

    #[serde(rename = "p", default)]
    pub phone: String,

    /// LinkedIn / GitHub
    #[serde(rename = "l", default)]
    pub links: String,
}

impl SharePayload {
    /// Encode into the URL-safe token placed in the query string.
    pub fn encode(&self) -> Result<String, ShareError> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token produced by [`SharePayload::encode`].
    pub fn decode(token: &str) -> Result<Self, ShareError> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim().trim_end_matches('='))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Full link: `base_url` with the payload appended as a query parameter.
    pub fn to_link(&self, base_url: &str) -> Result<String, ShareError> {
        let base = base_url.split(['?', '#']).next().unwrap_or(base_url);
        Ok(format!("{}?{}={}", base, SHARE_PARAM, self.encode()?))
    }

    /// Read the payload back out of a link.
    pub fn from_link(url: &str) -> Result<Self, ShareError> {
        let query = url
            .split_once('?')
            .map(|(_, q)| q.split('#').next().unwrap_or(q))
            .ok_or(ShareError::MissingParameter)?;

        let token = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == SHARE_PARAM)
            .map(|(_, value)| value)
            .ok_or(ShareError::MissingParameter)?;

        Self::decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SharePayload {
        SharePayload {
            resume: "Jane Doe\nSummary: builds things — fast & well? yes/no".to_string(),
            template: ResumeTemplate::Modern,
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            links: String::new(),
        }
    }

    #[test]
    fn test_link_round_trip() {
        let link = payload().to_link("https://jobhero.app/view").unwrap();
        assert!(link.starts_with("https://jobhero.app/view?shareData="));

        let decoded = SharePayload::from_link(&link).unwrap();
        assert_eq!(decoded, payload());
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = payload().encode().unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_existing_query_is_replaced() {
        let link = payload().to_link("https://jobhero.app/?old=1#top").unwrap();
        assert!(link.starts_with("https://jobhero.app/?shareData="));
    }

    #[test]
    fn test_param_among_others() {
        let token = payload().encode().unwrap();
        let link = format!("https://jobhero.app/?utm=x&shareData={}&b=2", token);
        assert_eq!(SharePayload::from_link(&link).unwrap(), payload());
    }

    #[test]
    fn test_compact_keys() {
        let json = serde_json::to_value(payload()).unwrap();
        assert_eq!(json["t"], "Modern");
        assert_eq!(json["n"], "Jane Doe");
    }

    #[test]
    fn test_missing_parameter() {
        assert!(matches!(
            SharePayload::from_link("https://jobhero.app/"),
            Err(ShareError::MissingParameter)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(SharePayload::decode("***"), Err(ShareError::Encoding(_))));

        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert!(matches!(SharePayload::decode(&not_json), Err(ShareError::Payload(_))));
    }
}
