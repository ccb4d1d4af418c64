// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Company profile management and logo upload.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::CompanyInfo;
use crate::services::storage::StorageClient;
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;

/// Maximum accepted logo size (5 MB).
const MAX_LOGO_BYTES: usize = 5 * 1024 * 1024;

/// Fallback extension when the filename has none.
const DEFAULT_LOGO_EXT: &str = "png";

/// Editable company profile fields.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CompanyInfoPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// Company profile service.
#[derive(Clone)]
pub struct CompanyService {
    db: FirestoreDb,
    storage: StorageClient,
}

impl CompanyService {
    pub fn new(db: FirestoreDb, storage: StorageClient) -> Self {
        Self { db, storage }
    }

    /// Get the company profile; a missing document reads as the default.
    pub async fn get_company_info(&self, uid: &str) -> Result<CompanyInfo, AppError> {
        Ok(self.db.get_company_info(uid).await?.unwrap_or_default())
    }

    /// Merge the supplied fields into the stored profile.
    pub async fn update_company_info(
        &self,
        uid: &str,
        patch: CompanyInfoPatch,
    ) -> Result<CompanyInfo, AppError> {
        let mut info = self.get_company_info(uid).await?;

        if let Some(name) = patch.name {
            info.name = name;
        }
        if let Some(address) = patch.address {
            info.address = address;
        }
        if let Some(city) = patch.city {
            info.city = city;
        }
        if let Some(state) = patch.state {
            info.state = state;
        }
        if let Some(zip_code) = patch.zip_code {
            info.zip_code = zip_code;
        }
        if let Some(phone) = patch.phone {
            info.phone = phone;
        }
        if let Some(email) = patch.email {
            info.email = email;
        }
        if let Some(website) = patch.website {
            info.website = website;
        }
        info.updated_at = format_utc_rfc3339(Utc::now());

        self.db.set_company_info(uid, &info).await?;
        Ok(info)
    }

    /// Upload a new logo, replacing any previous one.
    ///
    /// The content type and size are validated before any network call.
    /// Deleting the previous logo is best-effort: a failure there is
    /// logged and the upload proceeds.
    pub async fn upload_logo(
        &self,
        uid: &str,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "Logo must be an image file".to_string(),
            ));
        }
        if bytes.len() > MAX_LOGO_BYTES {
            return Err(AppError::BadRequest(
                "Logo file size must be less than 5MB".to_string(),
            ));
        }

        let mut info = self.get_company_info(uid).await?;

        // Replace: remove the previous object first
        if !info.logo_url.is_empty() {
            if let Err(e) = self.delete_logo_object(&info.logo_url).await {
                tracing::warn!(uid, error = %e, "Failed to delete previous logo, continuing");
            }
        }

        // Timestamp-qualified name to avoid collisions
        let extension = filename
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty() && *ext != filename)
            .unwrap_or(DEFAULT_LOGO_EXT);
        let object_path = format!(
            "company-logos/{}/logo_{}.{}",
            uid,
            Utc::now().timestamp_millis(),
            extension
        );

        let download_url = self.storage.upload(&object_path, content_type, bytes).await?;

        info.logo_url = download_url.clone();
        info.updated_at = format_utc_rfc3339(Utc::now());
        self.db.set_company_info(uid, &info).await?;

        tracing::info!(uid, path = %object_path, "Logo uploaded");
        Ok(download_url)
    }

    /// Delete the stored logo and clear the URL field.
    pub async fn delete_logo(&self, uid: &str) -> Result<(), AppError> {
        let mut info = self.get_company_info(uid).await?;
        if info.logo_url.is_empty() {
            return Ok(());
        }

        self.delete_logo_object(&info.logo_url).await?;

        info.logo_url = String::new();
        info.updated_at = format_utc_rfc3339(Utc::now());
        self.db.set_company_info(uid, &info).await?;

        tracing::info!(uid, "Logo deleted");
        Ok(())
    }

    /// Remove the storage object a download URL points at.
    async fn delete_logo_object(&self, logo_url: &str) -> Result<(), AppError> {
        let path = StorageClient::object_path_from_url(logo_url)
            .ok_or_else(|| AppError::Storage(format!("Unrecognized logo URL: {}", logo_url)))?;
        self.storage.delete(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_service() -> CompanyService {
        CompanyService::new(FirestoreDb::new_mock(), StorageClient::new_mock())
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_before_any_network_call() {
        let service = offline_service();
        // Offline mocks error on any network use, so a BadRequest proves
        // validation ran first.
        let err = service
            .upload_logo("uid-1", "logo.pdf", "application/pdf", vec![0u8; 16])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file_before_any_network_call() {
        let service = offline_service();
        let six_mb = vec![0u8; 6 * 1024 * 1024];
        let err = service
            .upload_logo("uid-1", "logo.png", "image/png", six_mb)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_upload_at_limit_passes_validation() {
        let service = offline_service();
        let five_mb = vec![0u8; 5 * 1024 * 1024];
        // Validation passes; the offline mock then fails the read.
        let err = service
            .upload_logo("uid-1", "logo.png", "image/png", five_mb)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
