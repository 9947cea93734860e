use serde::{Deserialize, Serialize};

use crate::validation::{self, Validate, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryStatus::Active => write!(f, "Active"),
            CategoryStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub status: CategoryStatus,
    pub slug: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Category {
    pub fn is_active(&self) -> bool {
        self.status == CategoryStatus::Active
    }
}

/// Body of `POST /api/categories`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: CategoryStatus,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), ValidationError> {
        validation::required("name", &self.name, "Category name")
    }
}

/// Body of `PUT /api/categories/{slug}`; unset fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CategoryStatus>,
}

impl Validate for CategoryUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            validation::required("name", name, "Category name")?;
        }
        Ok(())
    }
}
