use serde::{Deserialize, Serialize};

use super::media::ImageUpload;
use crate::api::FormFields;
use crate::validation::{self, Validate, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum DealerStatus {
    #[default]
    Active,
    Inactive,
}

impl DealerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealerStatus::Active => "active",
            DealerStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for DealerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DealerStatus::Active => write!(f, "Active"),
            DealerStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DealerImage {
    pub image_id: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Dealer {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub dealer_code: String,
    pub company_name: String,
    pub slug: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    // The list endpoint says "status", the detail view "dealer_status"
    #[serde(alias = "status", default)]
    pub dealer_status: DealerStatus,
    pub notes: Option<String>,
    pub image_id: Option<String>,
    #[serde(default)]
    pub images: Vec<DealerImage>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Dealer {
    pub fn is_active(&self) -> bool {
        self.dealer_status == DealerStatus::Active
    }

    /// Primary image URL for table thumbnails
    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|img| img.image_url.as_str())
    }

    /// "Company (Contact)" when a contact person is known
    pub fn display_name(&self) -> String {
        match self.contact_person.as_deref() {
            Some(contact) if !contact.trim().is_empty() => {
                format!("{} ({})", self.company_name, contact)
            }
            _ => self.company_name.clone(),
        }
    }
}

/// Create-dealer form, sent as multipart.
///
/// The image is either a fresh upload or a reference to an existing media
/// item via `image_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealerForm {
    pub company_name: String,
    pub contact_person: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    pub dealer_status: DealerStatus,
    pub notes: Option<String>,
    pub image_id: Option<String>,
    pub image: Option<ImageUpload>,
}

impl DealerForm {
    pub fn to_form(&self) -> FormFields {
        FormFields::new()
            .text("company_name", self.company_name.as_str())
            .optional_text("contact_person", self.contact_person.as_deref())
            .text("phone", self.phone.as_str())
            .optional_text("email", self.email.as_deref())
            .optional_text("address", self.address.as_deref())
            .optional_text("gst_number", self.gst_number.as_deref())
            .text("dealer_status", self.dealer_status.as_str())
            .optional_text("notes", self.notes.as_deref())
            .optional_text("image_id", self.image_id.as_deref())
            .file("image", self.image.as_ref())
    }
}

fn validate_contact_fields(
    contact_person: Option<&str>,
    email: Option<&str>,
    gst_number: Option<&str>,
) -> Result<(), ValidationError> {
    if let Some(contact) = contact_person {
        validation::max_len("contact_person", contact, 100)?;
    }
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        validation::email("email", email)?;
    }
    if let Some(gst) = gst_number {
        validation::max_len("gst_number", gst, 15)?;
    }
    Ok(())
}

impl Validate for DealerForm {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::required("company_name", &self.company_name, "Company name")?;
        validation::max_len("company_name", &self.company_name, 100)?;
        validation::required("phone", &self.phone, "Phone")?;
        validation::phone("phone", &self.phone)?;
        validate_contact_fields(
            self.contact_person.as_deref(),
            self.email.as_deref(),
            self.gst_number.as_deref(),
        )?;
        if let Some(ref image) = self.image {
            image.validate()?;
        }
        Ok(())
    }
}

/// Update-dealer form; only set, non-blank fields are sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealerUpdate {
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    pub dealer_status: Option<DealerStatus>,
    pub notes: Option<String>,
    pub image_id: Option<String>,
    pub image: Option<ImageUpload>,
}

impl DealerUpdate {
    pub fn to_form(&self) -> FormFields {
        FormFields::new()
            .optional_text("company_name", self.company_name.as_deref())
            .optional_text("contact_person", self.contact_person.as_deref())
            .optional_text("phone", self.phone.as_deref())
            .optional_text("email", self.email.as_deref())
            .optional_text("address", self.address.as_deref())
            .optional_text("gst_number", self.gst_number.as_deref())
            .optional_text("dealer_status", self.dealer_status.map(|s| s.as_str()))
            .optional_text("notes", self.notes.as_deref())
            .optional_text("image_id", self.image_id.as_deref())
            .file("image", self.image.as_ref())
    }
}

impl Validate for DealerUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.company_name {
            validation::required("company_name", name, "Company name")?;
            validation::max_len("company_name", name, 100)?;
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            validation::phone("phone", phone)?;
        }
        validate_contact_fields(
            self.contact_person.as_deref(),
            self.email.as_deref(),
            self.gst_number.as_deref(),
        )?;
        if let Some(ref image) = self.image {
            image.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> DealerForm {
        DealerForm {
            company_name: "Acme Traders".to_string(),
            phone: "9812345678".to_string(),
            ..DealerForm::default()
        }
    }

    #[test]
    fn test_parse_dealer() {
        let json = r#"{
            "_id": "66a9",
            "dealer_code": "DLR007",
            "company_name": "Acme Traders",
            "slug": "acme-traders",
            "contact_person": "Ram",
            "phone": "9812345678",
            "status": "inactive",
            "images": [{"image_id": "m1", "image_url": "https://cdn.example.com/m1.png"}],
            "created_at": "2025-02-01T09:30:00",
            "updated_at": "2025-02-01T09:30:00"
        }"#;
        let dealer: Dealer = serde_json::from_str(json).unwrap();
        assert_eq!(dealer.id, "66a9");
        assert_eq!(dealer.dealer_status, DealerStatus::Inactive);
        assert!(!dealer.is_active());
        assert_eq!(dealer.image_url(), Some("https://cdn.example.com/m1.png"));
        assert_eq!(dealer.display_name(), "Acme Traders (Ram)");
    }

    #[test]
    fn test_parse_dealer_without_images() {
        let json = r#"{"id":"1","company_name":"Bright","slug":"bright","phone":"9800000000","dealer_status":"active"}"#;
        let dealer: Dealer = serde_json::from_str(json).unwrap();
        assert!(dealer.images.is_empty());
        assert_eq!(dealer.display_name(), "Bright");
    }

    #[test]
    fn test_form_fields() {
        let mut dealer = form();
        dealer.notes = Some(String::new());
        dealer.image_id = Some("m1".to_string());

        let fields = dealer.to_form();
        assert_eq!(fields.get_text("company_name"), Some("Acme Traders"));
        assert_eq!(fields.get_text("dealer_status"), Some("active"));
        assert_eq!(fields.get_text("image_id"), Some("m1"));
        assert_eq!(fields.get_text("notes"), None);
    }

    #[test]
    fn test_validation() {
        assert!(form().validate().is_ok());

        let mut bad_phone = form();
        bad_phone.phone = "12345".to_string();
        assert_eq!(bad_phone.validate().unwrap_err().field, "phone");

        let mut bad_email = form();
        bad_email.email = Some("nope".to_string());
        assert_eq!(bad_email.validate().unwrap_err().field, "email");

        let mut long_gst = form();
        long_gst.gst_number = Some("1".repeat(16));
        assert_eq!(long_gst.validate().unwrap_err().field, "gst_number");

        let mut no_name = form();
        no_name.company_name = String::new();
        assert_eq!(no_name.validate().unwrap_err().field, "company_name");
    }

    #[test]
    fn test_update_sends_only_set_fields() {
        let update = DealerUpdate {
            phone: Some("9811111111".to_string()),
            dealer_status: Some(DealerStatus::Inactive),
            ..DealerUpdate::default()
        };
        assert!(update.validate().is_ok());
        let fields = update.to_form();
        assert_eq!(fields.fields().len(), 2);
        assert_eq!(fields.get_text("dealer_status"), Some("inactive"));
    }
}
