//! SigV4 request signing for the `x-amz-json-1.1` protocol.
//!
//! Only the subset this tool needs is implemented: a POST to the service
//! root with an empty query string, a fixed header set, and a payload hash
//! over the JSON body.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub(crate) struct SigningInput<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: Option<&'a str>,
    pub region: &'a str,
    pub service: &'a str,
    /// Authority the request is sent to, including any non-default port.
    pub host: &'a str,
    pub amz_target: &'a str,
    pub content_type: &'a str,
    pub payload: &'a [u8],
    pub at: DateTime<Utc>,
}

/// Headers to attach to the signed request, including `authorization`.
///
/// The `host` header is part of the signature but omitted from the result;
/// the HTTP client sets it itself and the two must agree.
pub(crate) fn sign(input: &SigningInput<'_>) -> Vec<(String, String)> {
    let amz_date = input.at.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = input.at.format("%Y%m%d").to_string();

    // Canonical headers, already sorted by lowercase name.
    let mut headers: Vec<(String, String)> = vec![
        ("content-type".to_string(), input.content_type.to_string()),
        ("host".to_string(), input.host.to_string()),
        ("x-amz-date".to_string(), amz_date.clone()),
    ];
    if let Some(token) = input.session_token {
        headers.push(("x-amz-security-token".to_string(), token.to_string()));
    }
    headers.push(("x-amz-target".to_string(), input.amz_target.to_string()));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let payload_hash = hex::encode(Sha256::digest(input.payload));
    let canonical_request =
        format!("POST\n/\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}");

    let scope = format!(
        "{date_stamp}/{}/{}/aws4_request",
        input.region, input.service
    );
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{request_hash}",
        request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = derive_key(
        input.secret_access_key,
        &date_stamp,
        input.region,
        input.service,
    );
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes()));
    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={access_key}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        access_key = input.access_key_id
    );

    let mut out: Vec<(String, String)> = headers
        .into_iter()
        .filter(|(name, _)| name != "host")
        .collect();
    out.push(("authorization".to_string(), authorization));
    out
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("hmac-sha256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn derive_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date_stamp.as_bytes());
    let k_region = hmac(&k_date, region.as_bytes());
    let k_service = hmac(&k_region, service.as_bytes());
    hmac(&k_service, b"aws4_request")
}
