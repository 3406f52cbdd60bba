//! AWS Signature Version 4 signing for form-encoded Query API requests.

use chrono::{DateTime, Utc};
use ec2ops_core::{CoreError, Result};
use ring::{digest, hmac};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
const ALGORITHM: &str = "AWS4-HMAC-SHA256";

#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Reads the standard `AWS_*` credential variables.
    pub fn from_env() -> Result<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").map_err(|_| {
            CoreError::InvalidConfiguration("AWS_ACCESS_KEY_ID is not set".to_string())
        })?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
            CoreError::InvalidConfiguration("AWS_SECRET_ACCESS_KEY is not set".to_string())
        })?;

        let mut credentials = Self::new(access_key_id, secret_access_key);
        if let Ok(token) = std::env::var("AWS_SESSION_TOKEN") {
            if !token.is_empty() {
                credentials = credentials.with_session_token(token);
            }
        }
        Ok(credentials)
    }
}

// Keep secrets out of logs.
impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Headers to attach to a signed `POST /` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub amz_date: String,
    pub authorization: String,
    pub security_token: Option<String>,
}

impl SignedRequest {
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("content-type", FORM_CONTENT_TYPE.to_string()),
            ("x-amz-date", self.amz_date.clone()),
            ("authorization", self.authorization.clone()),
        ];
        if let Some(token) = &self.security_token {
            headers.push(("x-amz-security-token", token.clone()));
        }
        headers
    }
}

pub struct RequestSigner {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl RequestSigner {
    pub fn new(credentials: AwsCredentials, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Signs a form-encoded `POST /` to `host` carrying `body`.
    pub fn sign(&self, host: &str, body: &str, now: DateTime<Utc>) -> SignedRequest {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut canonical_headers = vec![
            ("content-type", FORM_CONTENT_TYPE),
            ("host", host),
            ("x-amz-date", amz_date.as_str()),
        ];
        if let Some(token) = &self.credentials.session_token {
            canonical_headers.push(("x-amz-security-token", token.as_str()));
        }

        let signed_headers = canonical_headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");
        let header_block: String = canonical_headers
            .iter()
            .map(|(name, value)| format!("{name}:{}\n", value.trim()))
            .collect();

        let canonical_request = format!(
            "POST\n/\n\n{header_block}\n{signed_headers}\n{}",
            sha256_hex(body.as_bytes())
        );

        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = self.signing_key(&date);
        let signature = hex::encode(hmac::sign(&signing_key, string_to_sign.as_bytes()).as_ref());

        SignedRequest {
            authorization: format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.credentials.access_key_id
            ),
            amz_date,
            security_token: self.credentials.session_token.clone(),
        }
    }

    fn signing_key(&self, date: &str) -> hmac::Key {
        let secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        hmac::Key::new(hmac::HMAC_SHA256, &k_signing)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&key, data).as_ref().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(digest::digest(&digest::SHA256, data).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HOST: &str = "ec2.us-east-1.amazonaws.com";
    const BODY: &str = "Action=DescribeInstances&Version=2016-11-15";

    fn signer(credentials: AwsCredentials) -> RequestSigner {
        RequestSigner::new(credentials, "us-east-1", "ec2")
    }

    fn example_credentials() -> AwsCredentials {
        AwsCredentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    #[test]
    fn test_payload_hash() {
        assert_eq!(
            sha256_hex(BODY.as_bytes()),
            "6171eb09865e32b0602af0f7957e26573a51f53caaedff02ff88883cb0275885"
        );
    }

    #[test]
    fn test_sign_without_session_token() {
        let signed = signer(example_credentials()).sign(HOST, BODY, fixed_time());

        assert_eq!(signed.amz_date, "20150830T123600Z");
        assert_eq!(
            signed.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/ec2/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=16bec6625521eb1b2a944bb8409fdd5a54007d61862cf7074d07d2e75a3a4950"
        );
        assert!(signed.security_token.is_none());
        assert_eq!(signed.headers().len(), 3);
    }

    #[test]
    fn test_sign_with_session_token() {
        let credentials = example_credentials().with_session_token("SESSIONTOKEN");
        let signed = signer(credentials).sign(HOST, BODY, fixed_time());

        assert!(signed
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token"));
        assert!(signed.authorization.ends_with(
            "Signature=da41fa39d0eafd91e8dc35d7bbfc96025b7bc79d279a19ce0a79dc564a42762c"
        ));
        assert!(signed
            .headers()
            .contains(&("x-amz-security-token", "SESSIONTOKEN".to_string())));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", example_credentials().with_session_token("tok"));
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("EXAMPLEKEY"));
        assert!(!rendered.contains("tok\""));
    }
}
