// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Storage client for logo objects.
//!
//! Thin REST wrapper over the `/v0/b/{bucket}/o` endpoints. Object access
//! control is enforced by the bucket's storage rules, as in the web app.

use crate::error::AppError;
use serde::Deserialize;

const STORAGE_API_BASE: &str = "https://firebasestorage.googleapis.com";

/// Storage client for uploading and deleting objects.
#[derive(Clone)]
pub struct StorageClient {
    inner: Option<StorageInner>,
}

#[derive(Clone)]
struct StorageInner {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

/// Upload response metadata.
#[derive(Debug, Deserialize)]
struct ObjectMetadata {
    name: String,
    #[serde(rename = "downloadTokens")]
    download_tokens: Option<String>,
}

impl StorageClient {
    /// Create a new storage client for a bucket.
    ///
    /// For local development with emulator, set
    /// FIREBASE_STORAGE_EMULATOR_HOST (e.g. "127.0.0.1:9199").
    pub fn new(bucket: &str, api_key: &str) -> Self {
        let base_url = match std::env::var("FIREBASE_STORAGE_EMULATOR_HOST") {
            Ok(host) => format!("http://{}", host),
            Err(_) => STORAGE_API_BASE.to_string(),
        };

        Self {
            inner: Some(StorageInner {
                http: reqwest::Client::new(),
                base_url,
                bucket: bucket.to_string(),
                api_key: api_key.to_string(),
            }),
        }
    }

    /// Create a mock storage client for testing (offline mode).
    ///
    /// All storage operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { inner: None }
    }

    fn get_inner(&self) -> Result<&StorageInner, AppError> {
        self.inner
            .as_ref()
            .ok_or_else(|| AppError::Storage("Storage not connected (offline mode)".to_string()))
    }

    /// Upload an object and return its public download URL.
    pub async fn upload(
        &self,
        object_path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let inner = self.get_inner()?;

        let url = format!(
            "{}/v0/b/{}/o?name={}&key={}",
            inner.base_url,
            inner.bucket,
            urlencoding::encode(object_path),
            inner.api_key
        );

        let response = inner
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Storage(format!(
                "Upload failed: {}",
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Invalid upload response: {}", e)))?;

        let mut download_url = format!(
            "{}/v0/b/{}/o/{}?alt=media",
            inner.base_url,
            inner.bucket,
            urlencoding::encode(&metadata.name)
        );
        if let Some(token) = metadata.download_tokens {
            download_url.push_str(&format!("&token={}", token));
        }

        Ok(download_url)
    }

    /// Delete an object by its storage path.
    pub async fn delete(&self, object_path: &str) -> Result<(), AppError> {
        let inner = self.get_inner()?;

        let url = format!(
            "{}/v0/b/{}/o/{}?key={}",
            inner.base_url,
            inner.bucket,
            urlencoding::encode(object_path),
            inner.api_key
        );

        let response = inner
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Delete request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Storage(format!(
                "Delete failed: {}",
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(())
    }

    /// Recover an object path from a download URL: the percent-encoded
    /// segment following `/o/`.
    pub fn object_path_from_url(url: &str) -> Option<String> {
        let parts: Vec<&str> = url.split('/').collect();
        let o_index = parts.iter().position(|part| *part == "o")?;
        let encoded = parts.get(o_index + 1)?;
        let encoded = encoded.split('?').next()?;
        urlencoding::decode(encoded).ok().map(|s| s.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_from_url() {
        let url = "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/company-logos%2Fuid-1%2Flogo_1700000000000.png?alt=media&token=abc";
        assert_eq!(
            StorageClient::object_path_from_url(url).as_deref(),
            Some("company-logos/uid-1/logo_1700000000000.png")
        );
    }

    #[test]
    fn test_object_path_from_url_without_query() {
        let url = "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/plain%2Fpath.jpg";
        assert_eq!(
            StorageClient::object_path_from_url(url).as_deref(),
            Some("plain/path.jpg")
        );
    }

    #[test]
    fn test_object_path_from_url_rejects_malformed() {
        assert_eq!(
            StorageClient::object_path_from_url("https://example.com/nothing-here"),
            None
        );
    }
}
