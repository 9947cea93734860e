use serde::{Deserialize, Serialize};

use crate::api::FormFields;
use crate::validation::{self, Validate, ValidationError};

/// Largest accepted upload: 5 MiB
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MediaItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub filename: String,
    pub image_url: String,
    #[serde(default)]
    pub image_public_id: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub usage_count: u32,
    pub created_at: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl MediaItem {
    /// Referenced by at least one dealer or product; the API refuses to delete these
    pub fn is_in_use(&self) -> bool {
        self.usage_count > 0
    }

    /// File size for display, e.g. "1.2 MB"
    pub fn size_display(&self) -> String {
        const KB: f64 = 1024.0;
        const MB: f64 = KB * 1024.0;
        let size = self.file_size as f64;
        if size >= MB {
            format!("{:.1} MB", size / MB)
        } else if size >= KB {
            format!("{:.1} KB", size / KB)
        } else {
            format!("{} B", self.file_size)
        }
    }
}

/// A file picked for upload
#[derive(Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// Keep image bytes out of debug logs
impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// File name without its extension, used to pre-fill the media name
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

impl Validate for ImageUpload {
    fn validate(&self) -> Result<(), ValidationError> {
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(ValidationError::new("image", "Only PNG and JPG files are allowed"));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::new("image", "File size must be less than 5MB"));
        }
        Ok(())
    }
}

/// New media item: a name plus the image itself
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpload {
    pub filename: String,
    pub image: ImageUpload,
}

impl MediaUpload {
    /// Upload named after the file itself
    pub fn from_image(image: ImageUpload) -> Self {
        Self {
            filename: image.stem().to_string(),
            image,
        }
    }

    pub fn to_form(&self) -> FormFields {
        FormFields::new()
            .text("filename", self.filename.as_str())
            .file("image", Some(&self.image))
    }
}

impl Validate for MediaUpload {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::required("filename", &self.filename, "Filename")?;
        self.image.validate()
    }
}

/// Rename a media item, replace its image, or drop the image
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpdate {
    pub filename: String,
    pub image: Option<ImageUpload>,
    pub remove_image: bool,
}

impl MediaUpdate {
    pub fn rename(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            image: None,
            remove_image: false,
        }
    }

    pub fn to_form(&self) -> FormFields {
        let form = FormFields::new().text("filename", self.filename.as_str());
        match self.image {
            Some(ref image) => form.file("image", Some(image)),
            None if self.remove_image => form.text("remove_image", "true"),
            None => form,
        }
    }
}

impl Validate for MediaUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::required("filename", &self.filename, "Filename")?;
        if let Some(ref image) = self.image {
            image.validate()?;
        }
        Ok(())
    }
}
