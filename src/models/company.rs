//! Company profile model.

use serde::{Deserialize, Serialize};

/// Per-user company profile, stored at `users/{uid}/company/info`.
///
/// A missing document reads as the all-empty default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    /// Public download URL of the uploaded logo, empty when none
    #[serde(default)]
    pub logo_url: String,
    /// Last update (RFC3339)
    #[serde(default)]
    pub updated_at: String,
}

impl CompanyInfo {
    /// Street address, city, state and zip joined with ", ", skipping
    /// empty parts.
    pub fn formatted_address(&self) -> String {
        [&self.address, &self.city, &self.state, &self.zip_code]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Company name with a generic fallback.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Your Company"
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_address_skips_empty_parts() {
        let info = CompanyInfo {
            address: "12 Elm St".to_string(),
            city: "Springfield".to_string(),
            zip_code: "01234".to_string(),
            ..CompanyInfo::default()
        };
        assert_eq!(info.formatted_address(), "12 Elm St, Springfield, 01234");
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(CompanyInfo::default().display_name(), "Your Company");

        let named = CompanyInfo {
            name: "Green Thumb LLC".to_string(),
            ..CompanyInfo::default()
        };
        assert_eq!(named.display_name(), "Green Thumb LLC");
    }

    #[test]
    fn test_missing_document_decodes_to_default() {
        let info: CompanyInfo = serde_json::from_value(serde_json::json!({})).expect("decodes");
        assert!(info.name.is_empty());
        assert!(info.logo_url.is_empty());
    }
}
