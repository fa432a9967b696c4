//! Jules sessions API client.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::api::transport::{
    ApiRequest, Credential, HttpBackend, ReqwestBackend, RetryPolicy, RetryingTransport,
};
use crate::api::types::{Page, SessionName};
use crate::clock::{Clock, SystemClock};
use crate::config::{ApiConfig, AuthScheme, Config};
use crate::error::{JulesError, Result};

/// Anything that can serve one page of a session's activity log.
///
/// The synchronization algorithms in [`crate::sync`] are written against
/// this trait only.
pub trait ActivitySource {
    fn fetch_page(
        &self,
        session: &SessionName,
        token: Option<&str>,
        page_size: u32,
    ) -> Result<Page>;
}

impl<T: ActivitySource + ?Sized> ActivitySource for &T {
    fn fetch_page(
        &self,
        session: &SessionName,
        token: Option<&str>,
        page_size: u32,
    ) -> Result<Page> {
        (**self).fetch_page(session, token, page_size)
    }
}

pub struct JulesClient {
    transport: RetryingTransport,
}

impl JulesClient {
    /// Build a client from loaded configuration.
    ///
    /// Fails before any request when no credential is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credential = credential_from(&config.api)?;
        let backend = ReqwestBackend::new(&config.api.base_url, credential, config.api.timeout_secs)?;
        Ok(Self::with_backend(
            Box::new(backend),
            config.retry.policy(),
            Arc::new(SystemClock),
        ))
    }

    pub fn with_backend(
        backend: Box<dyn HttpBackend>,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport: RetryingTransport::new(backend, policy, clock),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.transport.clock()
    }

    pub fn list_sources(&self) -> Result<Value> {
        self.execute_json(&ApiRequest::get("sources"))
    }

    pub fn list_sessions(&self, page_size: u32) -> Result<Value> {
        self.execute_json(&ApiRequest::get("sessions").param("pageSize", page_size))
    }

    pub fn get_session(&self, session: &SessionName) -> Result<Value> {
        self.execute_json(&ApiRequest::get(session.as_str()))
    }

    pub fn send_message(&self, session: &SessionName, prompt: &str) -> Result<Value> {
        if prompt.trim().is_empty() {
            return Err(JulesError::MissingConfig("prompt is required".to_string()));
        }
        let request = ApiRequest::post(
            format!("{session}:sendMessage"),
            serde_json::json!({ "prompt": prompt }),
        );
        self.execute_json(&request)
    }

    fn execute_json(&self, request: &ApiRequest) -> Result<Value> {
        Ok(self
            .transport
            .execute(request)?
            .unwrap_or_else(|| serde_json::json!({ "status": "success" })))
    }
}

impl ActivitySource for JulesClient {
    fn fetch_page(
        &self,
        session: &SessionName,
        token: Option<&str>,
        page_size: u32,
    ) -> Result<Page> {
        let mut request =
            ApiRequest::get(format!("{session}/activities")).param("pageSize", page_size);
        if let Some(token) = token {
            request = request.param("pageToken", token);
        }
        let page = match self.transport.execute(&request)? {
            Some(value) => serde_json::from_value::<Page>(value)?,
            None => Page::default(),
        };
        debug!(
            session = %session,
            token = token.unwrap_or(""),
            activities = page.activities.len(),
            has_next = page.next_token().is_some(),
            "fetched activity page"
        );
        Ok(page)
    }
}

fn credential_from(api: &ApiConfig) -> Result<Credential> {
    let key = api
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            JulesError::MissingConfig(
                "JULES_API_KEY not found in environment or [api].api_key".to_string(),
            )
        })?;
    Ok(match api.auth {
        AuthScheme::ApiKey => Credential::ApiKey(key.to_string()),
        AuthScheme::Bearer => Credential::Bearer(key.to_string()),
    })
}
