//! HTTP backend for remove.bg-compatible services
//!
//! Sends the selected image as a single `image_file` multipart part with the
//! API key in a request header and returns the binary response body.

use crate::{
    config::ServiceConfig,
    error::{BgRemovalError, Result},
    remover::BackgroundRemover,
    services::FormatService,
    types::SelectedImage,
};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    multipart::{Form, Part},
    Client, Url,
};
use std::time::Duration;
use tracing::instrument;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image_file";

/// Longest error body kept for diagnostics
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Background removal through a remote HTTP API
#[derive(Debug, Clone)]
pub struct RemoveBgBackend {
    client: Client,
    endpoint: Url,
    api_key_header: HeaderName,
    api_key: HeaderValue,
}

impl RemoveBgBackend {
    /// Create a backend from a service configuration
    ///
    /// # Errors
    /// - Invalid configuration (endpoint, header name)
    /// - No API key configured
    /// - Failed to create HTTP client
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let endpoint = Url::parse(&config.endpoint).map_err(|_| {
            BgRemovalError::config_value_error("endpoint", &config.endpoint, "an http(s) URL")
        })?;

        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(|_| {
            BgRemovalError::config_value_error(
                "API key header",
                &config.api_key_header,
                "a valid HTTP header name",
            )
        })?;

        let mut api_key = HeaderValue::from_str(config.require_api_key()?.expose()).map_err(|_| {
            BgRemovalError::invalid_config("API key contains characters not allowed in a header")
        })?;
        api_key.set_sensitive(true);

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BgRemovalError::network_error("Failed to create HTTP client", e))?;

        log::debug!("Background removal endpoint: {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key_header,
            api_key,
        })
    }

    /// Endpoint requests are sent to
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_form(image: &SelectedImage) -> Result<Form> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime_type())
            .map_err(|e| {
                BgRemovalError::internal(format!(
                    "Invalid MIME type '{}': {}",
                    image.mime_type(),
                    e
                ))
            })?;
        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

fn truncate_body(body: &str) -> String {
    let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    if truncated.len() < body.len() {
        truncated.push('…');
    }
    truncated
}

#[async_trait]
impl BackgroundRemover for RemoveBgBackend {
    #[instrument(skip(self, image), fields(file_name = %image.file_name(), size = image.len()))]
    async fn remove_background(&self, image: &SelectedImage) -> Result<Vec<u8>> {
        let form = Self::build_form(image)?;

        log::info!(
            "Uploading {} ({} bytes) to {}",
            image.file_name(),
            image.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(self.api_key_header.clone(), self.api_key.clone())
            .header(ACCEPT, "image/*")
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                BgRemovalError::network_error("Failed to reach background removal service", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = truncate_body(&response.text().await.unwrap_or_default());
            log::error!("Background removal service answered {}: {}", status, body);
            return Err(BgRemovalError::transport(
                Some(status.as_u16()),
                format!("{} from {}: {}", status, self.endpoint, body),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response
            .bytes()
            .await
            .map_err(|e| BgRemovalError::network_error("Failed to read response body", e))?;

        if body.is_empty() {
            return Err(BgRemovalError::unexpected_response(
                "service returned an empty body",
            ));
        }

        if let Some(content_type) = content_type {
            if !FormatService::is_image_content_type(&content_type) {
                return Err(BgRemovalError::unexpected_response(format!(
                    "expected an image, got content type '{}'",
                    content_type
                )));
            }
        }

        log::debug!("Received {} bytes from {}", body.len(), self.endpoint);
        Ok(body.to_vec())
    }

    fn name(&self) -> &str {
        "remove.bg"
    }
}
