//! Image classification adapter.
//!
//! The pretrained model runs behind an HTTP inference endpoint
//! (`CLASSIFIER_URL`). [`HttpClassifier`] is built once at startup and held in
//! application state; handlers only see the [`ImageClassifier`] trait.
//!
//! Ingestion helpers accept raw upload bytes or fetch an image by URL, and
//! check the leading bytes so that only recognised image formats (or a PDF,
//! whose first page the endpoint rasterises) are forwarded.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::AnalyzeConfig;

/// Errors from image ingestion and classification.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The submitted bytes are not a supported image or PDF.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// The image URL could not be parsed or fetched.
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// No inference endpoint is configured.
    #[error("classifier is not configured")]
    NotConfigured,

    /// HTTP client could not be constructed.
    #[error("classifier client setup failed: {0}")]
    Setup(String),

    /// HTTP request to the inference endpoint failed.
    #[error("classification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The inference endpoint answered with something unusable.
    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),
}

impl ClassifierError {
    /// True when the error is caused by the caller's input rather than by
    /// the classifier.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidImage(_) | Self::InvalidUrl(_))
    }
}

// =============================================================================
// Input
// =============================================================================

/// Formats accepted for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Pdf,
}

impl ImageFormat {
    /// Identify the format from the file's leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
            Some(Self::Webp)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if bytes.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// MIME type sent to the inference endpoint.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Pdf => "application/pdf",
        }
    }
}

/// An image (or PDF) ready to be classified.
#[derive(Debug, Clone)]
pub struct ImageInput {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImageInput {
    /// Wrap raw bytes after checking their format.
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError::InvalidImage` for empty or unrecognised data.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ClassifierError> {
        if bytes.is_empty() {
            return Err(ClassifierError::InvalidImage("file is empty".to_owned()));
        }
        let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
            ClassifierError::InvalidImage("unsupported file type".to_owned())
        })?;
        Ok(Self { bytes, format })
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }
}

/// Download an image by URL, bounded by `max_bytes`.
///
/// Only `http` and `https` URLs are accepted. The request uses whatever
/// timeout `client` was built with.
///
/// # Errors
///
/// Returns `ClassifierError::InvalidUrl` if the URL is malformed, the fetch
/// fails or the body is too large, and `ClassifierError::InvalidImage` if the
/// body is not a supported format.
#[instrument(skip(client), fields(url = %raw_url))]
pub async fn fetch_image(
    client: &reqwest::Client,
    raw_url: &str,
    max_bytes: usize,
) -> Result<ImageInput, ClassifierError> {
    let url = Url::parse(raw_url.trim()).map_err(|e| ClassifierError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClassifierError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ClassifierError::InvalidUrl(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClassifierError::InvalidUrl(format!("server returned {status}")));
    }

    let too_large = || ClassifierError::InvalidUrl(format!("image exceeds {max_bytes} bytes"));
    if response
        .content_length()
        .is_some_and(|len| usize::try_from(len).map_or(true, |len| len > max_bytes))
    {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ClassifierError::InvalidUrl(e.to_string()))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    ImageInput::from_bytes(bytes)
}

// =============================================================================
// Classifier
// =============================================================================

/// Result of classifying one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Predicted class label.
    pub label: String,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f32,
}

/// The classification capability.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Classify one image.
    async fn classify(&self, image: &ImageInput) -> Result<Prediction, ClassifierError>;
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    #[serde(alias = "prediction")]
    label: String,
    confidence: f32,
}

/// Classifier backed by an HTTP inference endpoint.
///
/// The image bytes are POSTed as the request body with their MIME type; the
/// endpoint answers `{"label": "...", "confidence": 0.93}`.
#[derive(Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: Option<Url>,
}

impl HttpClassifier {
    /// Build the classifier client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError::Setup` if the API key is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: &AnalyzeConfig) -> Result<Self, ClassifierError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.classifier_api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
                .map_err(|_| ClassifierError::Setup("invalid API key for header".to_owned()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Setup(e.to_string()))?;

        if config.classifier_url.is_none() {
            tracing::warn!("CLASSIFIER_URL not set, /api/analyze will report failures");
        }

        Ok(Self {
            client,
            endpoint: config.classifier_url.clone(),
        })
    }
}

#[async_trait]
impl ImageClassifier for HttpClassifier {
    #[instrument(skip(self, image), fields(format = ?image.format(), size = image.bytes().len()))]
    async fn classify(&self, image: &ImageInput) -> Result<Prediction, ClassifierError> {
        let endpoint = self.endpoint.as_ref().ok_or(ClassifierError::NotConfigured)?;

        let response = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, image.format().mime_type())
            .body(image.bytes().to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::InvalidResponse(format!(
                "inference endpoint error ({status}): {body}"
            )));
        }

        let response: InferenceResponse = response.json().await?;
        prediction_from(response)
    }
}

fn prediction_from(response: InferenceResponse) -> Result<Prediction, ClassifierError> {
    if !(0.0..=1.0).contains(&response.confidence) {
        return Err(ClassifierError::InvalidResponse(format!(
            "confidence {} outside [0, 1]",
            response.confidence
        )));
    }
    if response.label.is_empty() {
        return Err(ClassifierError::InvalidResponse("empty label".to_owned()));
    }

    Ok(Prediction {
        label: response.label,
        confidence: response.confidence,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(ImageFormat::sniff(PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x24\0\0\0WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(b"BM\x36\0"), Some(ImageFormat::Bmp));
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7\n"), Some(ImageFormat::Pdf));
    }

    #[test]
    fn test_sniff_rejects_other_data() {
        assert_eq!(ImageFormat::sniff(b"hello world"), None);
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WAVE"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn test_from_bytes_rejects_empty_and_unknown() {
        assert!(matches!(
            ImageInput::from_bytes(Vec::new()),
            Err(ClassifierError::InvalidImage(_))
        ));
        assert!(matches!(
            ImageInput::from_bytes(b"plain text".to_vec()),
            Err(ClassifierError::InvalidImage(_))
        ));
        let input = ImageInput::from_bytes(PNG_HEADER.to_vec()).unwrap();
        assert_eq!(input.format().mime_type(), "image/png");
    }

    #[test]
    fn test_prediction_confidence_bounds() {
        let ok = prediction_from(InferenceResponse {
            label: "tabby".to_owned(),
            confidence: 0.87,
        })
        .unwrap();
        assert_eq!(ok.label, "tabby");

        let err = prediction_from(InferenceResponse {
            label: "tabby".to_owned(),
            confidence: 1.5,
        });
        assert!(matches!(err, Err(ClassifierError::InvalidResponse(_))));

        let nan = prediction_from(InferenceResponse {
            label: "tabby".to_owned(),
            confidence: f32::NAN,
        });
        assert!(nan.is_err());
    }

    #[test]
    fn test_inference_response_accepts_prediction_alias() {
        let parsed: InferenceResponse =
            serde_json::from_str(r#"{"prediction":"golden retriever","confidence":0.5}"#).unwrap();
        assert_eq!(parsed.label, "golden retriever");
    }

    #[tokio::test]
    async fn test_unconfigured_classifier_fails() {
        let classifier = HttpClassifier::new(&AnalyzeConfig::default()).unwrap();
        let input = ImageInput::from_bytes(PNG_HEADER.to_vec()).unwrap();

        assert!(matches!(
            classifier.classify(&input).await,
            Err(ClassifierError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_and_non_http_urls() {
        let client = reqwest::Client::new();

        let malformed = fetch_image(&client, "not a url", 1024).await;
        assert!(matches!(malformed, Err(ClassifierError::InvalidUrl(_))));

        let file = fetch_image(&client, "file:///etc/passwd", 1024).await;
        assert!(matches!(file, Err(ClassifierError::InvalidUrl(_))));
        assert!(file.unwrap_err().to_string().starts_with("Invalid image URL: "));
    }
}
