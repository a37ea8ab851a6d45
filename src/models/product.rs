use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const PRODUCT_NAME_LABEL: &str = "Product Name";
pub const PRICING_MARKER: &str = "=== PRICING ===";
pub const DETAILS_MARKER: &str = "=== DETAILS ===";

pub const MAIN_IMAGE_FILE: &str = "main_image.jpg";
pub const RECORD_FILE: &str = "product_details.csv";

/// One labeled row of a product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Section separator row with an empty value.
    pub fn marker(label: &str) -> Self {
        Self::new(label, "")
    }
}

// Lets tests compare against plain tuples
impl From<(&str, &str)> for Field {
    fn from((label, value): (&str, &str)) -> Self {
        Self::new(label, value)
    }
}

/// Durable namespace for one product, keyed by its sanitized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductFolder(pub String);

impl ProductFolder {
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Path of `file_name` relative to the storage root.
    pub fn file(&self, file_name: &str) -> PathBuf {
        PathBuf::from(&self.0).join(file_name)
    }

    pub fn swatch_file(&self, ordinal: usize) -> PathBuf {
        self.file(&format!("swatch_{}.jpg", ordinal))
    }
}

impl fmt::Display for ProductFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A remote image and the storage-relative path it lands on. Identity is the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub source_url: String,
    pub destination: PathBuf,
}

impl Asset {
    pub fn new(source_url: impl Into<String>, destination: PathBuf) -> Self {
        Self {
            source_url: source_url.into(),
            destination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub folder: ProductFolder,
    pub fields: Vec<Field>,
}

impl ProductRecord {
    /// Record holding only the leading name row.
    pub fn new(name: impl Into<String>, folder: ProductFolder) -> Self {
        let name = name.into();
        Self {
            fields: vec![Field::new(PRODUCT_NAME_LABEL, name.clone())],
            name,
            folder,
        }
    }

    /// Appends the pricing section (only when there is pricing) followed by the details section.
    pub fn with_sections(mut self, pricing: Vec<Field>, details: Vec<Field>) -> Self {
        if !pricing.is_empty() {
            self.fields.push(Field::marker(PRICING_MARKER));
            self.fields.extend(pricing);
        }
        self.fields.push(Field::marker(DETAILS_MARKER));
        self.fields.extend(details);
        self
    }
}
