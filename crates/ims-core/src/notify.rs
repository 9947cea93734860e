//! User-facing notices for write operations.
//!
//! Every write reports a success toast or an error toast. Errors show the
//! server's own `detail` when it sent one and a per-operation fallback
//! otherwise.

use std::fmt;

use crate::api::{ApiError, Resource};

/// Server detail returned when deleting an image that is still referenced
pub const MEDIA_IN_USE_DETAIL: &str = "Cannot delete media: it is used by a product or dealer";

pub const MEDIA_IN_USE_MESSAGE: &str = "This image cannot be deleted because it is used by a product or dealer. Remove the reference before deleting.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Error(m) => m,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateDealer,
    UpdateDealer,
    DeleteDealer,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    AddStock,
    Sell,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    UploadMedia,
    UpdateMedia,
    DeleteMedia,
}

impl Operation {
    pub fn resource(&self) -> Resource {
        use Operation::*;
        match self {
            CreateDealer | UpdateDealer | DeleteDealer => Resource::Dealers,
            CreateProduct | UpdateProduct | DeleteProduct | AddStock | Sell => Resource::Products,
            CreateCategory | UpdateCategory | DeleteCategory => Resource::Categories,
            UploadMedia | UpdateMedia | DeleteMedia => Resource::Media,
        }
    }

    pub fn success_message(&self) -> &'static str {
        use Operation::*;
        match self {
            CreateDealer => "Dealer created successfully!",
            UpdateDealer => "Dealer updated successfully!",
            DeleteDealer => "Dealer deleted successfully!",
            CreateProduct => "Product created successfully!",
            UpdateProduct => "Product updated successfully!",
            DeleteProduct => "Product deleted successfully!",
            AddStock => "Stock updated successfully!",
            Sell => "Sale recorded successfully!",
            CreateCategory => "Category created successfully!",
            UpdateCategory => "Category updated successfully!",
            DeleteCategory => "Category deleted successfully!",
            UploadMedia => "New Media has been uploaded successfully!",
            UpdateMedia => "Media updated successfully!",
            DeleteMedia => "Media deleted successfully!",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        use Operation::*;
        match self {
            CreateDealer => "Failed to create dealer. Please try again.",
            UpdateDealer => "Failed to update dealer. Please try again.",
            DeleteDealer => "Failed to delete dealer. Please try again.",
            CreateProduct => "Failed to create product. Please try again.",
            UpdateProduct => "Failed to update product. Please try again.",
            DeleteProduct => "Failed to delete product. Please try again.",
            AddStock => "Failed to update stock. Please try again.",
            Sell => "Failed to record sale. Please try again.",
            CreateCategory => "Failed to create category. Please try again.",
            UpdateCategory => "Failed to update category. Please try again.",
            DeleteCategory => "Failed to delete category. Please try again.",
            UploadMedia => "Failed to upload media. Please try again.",
            UpdateMedia => "Failed to update media. Please try again.",
            DeleteMedia => "Failed to delete media. Please try again.",
        }
    }

    /// Message for a failed attempt at this operation
    pub fn error_message(&self, error: &ApiError) -> String {
        if *self == Operation::DeleteMedia {
            // Only the in-use refusal gets its own wording
            return match error {
                ApiError::Rejected { detail, .. } if detail.contains(MEDIA_IN_USE_DETAIL) => {
                    MEDIA_IN_USE_MESSAGE.to_string()
                }
                _ => self.failure_message().to_string(),
            };
        }
        error.user_message(self.failure_message())
    }

    pub fn notice<T>(&self, result: &Result<T, ApiError>) -> Notice {
        match result {
            Ok(_) => Notice::Success(self.success_message().to_string()),
            Err(e) => Notice::Error(self.error_message(e)),
        }
    }
}
