//! Blocking AWS SSM client speaking the `x-amz-json-1.1` protocol.
//!
//! Every Parameter Store operation is a POST to the service root with the
//! operation named in the `X-Amz-Target` header; `GetParametersByPath` is
//! the only call this tool needs. Requests are SigV4-signed; credentials
//! come from the environment or the shared credentials file.

use crate::param::{Parameter, ParameterKind, QueryKey, TypeFilter};
use crate::sigv4;
use crate::store::{Page, ParameterStore, StoreError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::time::{Duration, Instant};

const TARGET: &str = "AmazonSSM.GetParametersByPath";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const SERVICE: &str = "ssm";
const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

/// Static credentials resolved before the first request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

/// Blocking client for one SSM endpoint. Stateless between calls.
pub struct SsmClient {
    agent: ureq::Agent,
    endpoint: String,
    host: String,
    region: String,
    credentials: Credentials,
}

impl SsmClient {
    /// Build a client from the process environment.
    ///
    /// Region comes from `AWS_REGION` / `AWS_DEFAULT_REGION`; credentials
    /// from the standard variables, falling back to `~/.aws/credentials`.
    /// The endpoint derives from the region unless `AWS_ENDPOINT_URL_SSM` or
    /// `AWS_ENDPOINT_URL` overrides it (local stacks, tests).
    pub fn from_env() -> Result<Self, StoreError> {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .map_err(|_| StoreError::Config("no region set; export AWS_REGION".to_string()))?;
        let endpoint = env::var("AWS_ENDPOINT_URL_SSM")
            .or_else(|_| env::var("AWS_ENDPOINT_URL"))
            .unwrap_or_else(|_| format!("https://ssm.{region}.amazonaws.com"));
        let credentials = resolve_credentials()?;
        Self::new(endpoint, region, credentials)
    }

    /// Build a client against an explicit endpoint.
    pub fn new(
        endpoint: String,
        region: String,
        credentials: Credentials,
    ) -> Result<Self, StoreError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let host = host_of(&endpoint)?;
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_DEADLINE).build();
        Ok(SsmClient {
            agent,
            endpoint,
            host,
            region,
            credentials,
        })
    }
}

impl ParameterStore for SsmClient {
    fn list_by_path(
        &self,
        prefix: &QueryKey,
        recursive: bool,
        decrypt: bool,
        filter: &TypeFilter,
        token: Option<&str>,
    ) -> Result<Page, StoreError> {
        let values: Vec<&str> = filter.kinds().iter().map(|kind| kind.wire_name()).collect();
        let request = ListRequest {
            path: prefix.as_str(),
            recursive,
            with_decryption: decrypt,
            parameter_filters: [TypeNameFilter {
                key: "Type",
                values,
            }],
            next_token: token,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|err| StoreError::Decode(format!("encode request: {err}")))?;

        let headers = sigv4::sign(&sigv4::SigningInput {
            access_key_id: &self.credentials.access_key_id,
            secret_access_key: &self.credentials.secret_access_key,
            session_token: self.credentials.session_token.as_deref(),
            region: &self.region,
            service: SERVICE,
            host: &self.host,
            amz_target: TARGET,
            content_type: CONTENT_TYPE,
            payload: &payload,
            at: Utc::now(),
        });

        let url = format!("{}/", self.endpoint);
        let mut call = self.agent.post(&url);
        for (name, value) in &headers {
            call = call.set(name, value);
        }

        let started = Instant::now();
        let response = match call.send_bytes(&payload) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(classify_failure(status, &body));
            }
            Err(err) => return Err(transport_failure(&err.to_string())),
        };
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "page request complete"
        );

        let body = response
            .into_string()
            .map_err(|err| StoreError::Decode(format!("read response body: {err}")))?;
        let parsed: ListResponse = serde_json::from_str(&body)
            .map_err(|err| StoreError::Decode(format!("parse response JSON: {err}")))?;

        let mut items = Vec::with_capacity(parsed.parameters.len());
        for parameter in parsed.parameters {
            items.push(Parameter {
                kind: parameter_kind(&parameter.kind)?,
                name: parameter.name,
                value: parameter.value,
            });
        }
        Ok(Page {
            items,
            next_token: parsed.next_token,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ListRequest<'a> {
    path: &'a str,
    recursive: bool,
    with_decryption: bool,
    parameter_filters: [TypeNameFilter<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TypeNameFilter<'a> {
    key: &'a str,
    values: Vec<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListResponse {
    #[serde(default)]
    parameters: Vec<WireParameter>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireParameter {
    name: String,
    value: String,
    #[serde(rename = "Type")]
    kind: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

fn parameter_kind(wire: &str) -> Result<ParameterKind, StoreError> {
    match wire {
        "String" => Ok(ParameterKind::Plain),
        "SecureString" => Ok(ParameterKind::Secret),
        // The type filter restricts what the store may return; anything else
        // is a contract break.
        other => Err(StoreError::Decode(format!(
            "unexpected parameter type {other:?}"
        ))),
    }
}

/// Map a non-2xx response onto a typed store error.
fn classify_failure(status: u16, body: &str) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed
        .kind
        .as_deref()
        .map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_string())
        .unwrap_or_else(|| format!("HTTP{status}"));
    let message = parsed.message.unwrap_or_else(|| snippet(body));

    match code.as_str() {
        "AccessDeniedException"
        | "UnrecognizedClientException"
        | "InvalidSignatureException"
        | "MissingAuthenticationTokenException"
        | "ExpiredTokenException" => StoreError::AccessDenied { code, message },
        "ThrottlingException" | "TooManyRequestsException" => StoreError::Throttled { message },
        _ if status == 403 => StoreError::AccessDenied { code, message },
        _ => StoreError::Service {
            status,
            code,
            message,
        },
    }
}

fn transport_failure(reason: &str) -> StoreError {
    if reason.contains("timed out") {
        StoreError::Timeout(reason.to_string())
    } else {
        StoreError::Transport(reason.to_string())
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no error detail".to_string();
    }
    trimmed.chars().take(200).collect()
}

fn host_of(endpoint: &str) -> Result<String, StoreError> {
    let rest = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .ok_or_else(|| StoreError::Config(format!("endpoint {endpoint:?} has no scheme")))?;
    let authority = match rest.split_once('/') {
        Some((authority, _)) => authority,
        None => rest,
    };
    if authority.is_empty() {
        return Err(StoreError::Config(format!(
            "endpoint {endpoint:?} has no host"
        )));
    }
    Ok(authority.to_string())
}

fn resolve_credentials() -> Result<Credentials, StoreError> {
    if let Ok(access_key_id) = env::var("AWS_ACCESS_KEY_ID") {
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
            StoreError::Config("AWS_ACCESS_KEY_ID is set without AWS_SECRET_ACCESS_KEY".to_string())
        })?;
        return Ok(Credentials {
            access_key_id,
            secret_access_key,
            session_token: env::var("AWS_SESSION_TOKEN").ok(),
        });
    }
    credentials_from_file().ok_or_else(|| {
        StoreError::Config(
            "no credentials found in the environment or ~/.aws/credentials".to_string(),
        )
    })
}

fn credentials_from_file() -> Option<Credentials> {
    let path = dirs::home_dir()?.join(".aws").join("credentials");
    let text = fs::read_to_string(path).ok()?;
    let profile = env::var("AWS_PROFILE").unwrap_or_else(|_| "default".to_string());
    parse_credentials_file(&text, &profile)
}

/// Minimal reader for the shared credentials file: profile sections and the
/// three `aws_*` keys; everything else is ignored.
fn parse_credentials_file(text: &str, profile: &str) -> Option<Credentials> {
    let mut in_profile = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut session_token = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            in_profile = section.trim() == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "aws_access_key_id" => access_key_id = Some(value),
            "aws_secret_access_key" => secret_access_key = Some(value),
            "aws_session_token" => session_token = Some(value),
            _ => {}
        }
    }

    Some(Credentials {
        access_key_id: access_key_id?,
        secret_access_key: secret_access_key?,
        session_token,
    })
}
