//! Customer input rules.

use salesdesk_shared::AppError;
use serde::Deserialize;

/// Create request for a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    /// Customer name.
    pub name: String,
    /// Industry.
    #[serde(default)]
    pub industry: Option<String>,
    /// Region.
    #[serde(default)]
    pub region: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New industry.
    #[serde(default)]
    pub industry: Option<String>,
    /// New region.
    #[serde(default)]
    pub region: Option<String>,
}

impl NewCustomer {
    /// Trims the name and rejects a blank one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the name is blank.
    pub fn validate(mut self) -> Result<Self, AppError> {
        self.name = checked_name(&self.name)?;
        Ok(self)
    }
}

impl CustomerPatch {
    /// Rejects a supplied but blank name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the name is blank.
    pub fn validate(mut self) -> Result<Self, AppError> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(checked_name(name)?);
        }
        Ok(self)
    }
}

fn checked_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_customer_name_is_trimmed() {
        let customer = NewCustomer {
            name: "  PT Acme  ".into(),
            industry: None,
            region: Some("Jakarta".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(customer.name, "PT Acme");
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = NewCustomer {
            name: " ".into(),
            industry: None,
            region: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let patch = CustomerPatch {
            name: Some(String::new()),
            ..CustomerPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_empty_patch_is_valid() {
        assert!(CustomerPatch::default().validate().is_ok());
    }
}
