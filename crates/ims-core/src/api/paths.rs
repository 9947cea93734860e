//! Resource paths. These strings double as query-cache keys, so every
//! call site that reads the same resource lands on the same cache entry.

pub const DEALERS: &str = "/api/dealers";
pub const PRODUCTS: &str = "/api/products";
pub const CATEGORIES: &str = "/api/categories";
pub const MEDIA_CENTER: &str = "/api/media-center";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Dealers,
    Products,
    Categories,
    Media,
}

impl Resource {
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Dealers => DEALERS,
            Resource::Products => PRODUCTS,
            Resource::Categories => CATEGORIES,
            Resource::Media => MEDIA_CENTER,
        }
    }

    /// Path of one item, addressed by slug (or id for media)
    pub fn item(&self, key: &str) -> String {
        format!("{}/{}", self.collection(), segment(key))
    }

    /// Keys a write to this resource can change: the collection, plus the
    /// item itself when the write targets one
    pub fn affected_keys(&self, item: Option<&str>) -> Vec<String> {
        let mut keys = vec![self.collection().to_string()];
        if let Some(key) = item {
            keys.push(self.item(key));
        }
        keys
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Dealers => "Dealer",
            Resource::Products => "Product",
            Resource::Categories => "Category",
            Resource::Media => "Media",
        }
    }
}

pub fn product_stock(slug: &str) -> String {
    format!("{}/stock", Resource::Products.item(slug))
}

pub fn product_sell(slug: &str) -> String {
    format!("{}/sell", Resource::Products.item(slug))
}

/// Percent-encode a slug or id so it stays one path segment. Only RFC 3986
/// unreserved characters pass through, so ordinary slugs are unchanged.
fn segment(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(char::from(byte))
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
