use serde::Serialize;

use crate::core::KittError;

/// Upstream job payload. Shape is owned by TryKitt, so any JSON value is passed through untouched.
pub type JobResponse = serde_json::Value;

/// Body of `POST /job/verify_email`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    email: String,
    realtime: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_data: Option<String>,
}

impl VerifyEmailRequest {
    pub fn new(email: impl Into<String>, custom_data: Option<String>) -> Result<Self, KittError> {
        Ok(Self {
            email: required(email.into(), "email")?,
            realtime: true,
            custom_data: non_empty(custom_data),
        })
    }
}

/// Body of `POST /job/find_email`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FindEmailRequest {
    full_name: String,
    domain: String,
    realtime: bool,
    #[serde(
        rename = "linkedinStandardProfileURL",
        skip_serializing_if = "Option::is_none"
    )]
    linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_data: Option<String>,
}

impl FindEmailRequest {
    pub fn new(
        full_name: impl Into<String>,
        domain: impl Into<String>,
        linkedin_url: Option<String>,
        custom_data: Option<String>,
    ) -> Result<Self, KittError> {
        Ok(Self {
            full_name: required(full_name.into(), "full_name")?,
            domain: required(domain.into(), "domain")?,
            realtime: true,
            linkedin_url: non_empty(linkedin_url),
            custom_data: non_empty(custom_data),
        })
    }
}

/// `GET /job?id=...`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobStatusQuery {
    id: String,
}

impl JobStatusQuery {
    pub fn new(id: impl Into<String>) -> Result<Self, KittError> {
        Ok(Self { id: required(id.into(), "job_id")? })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn required(value: String, field: &str) -> Result<String, KittError> {
    if value.trim().is_empty() {
        return Err(KittError::missing(field));
    }
    Ok(value)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
