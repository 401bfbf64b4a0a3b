use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mesopotamia_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

/// Display name of a product.
///
/// Never blank and at most [`ProductName::MAX_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    /// Matches the `VARCHAR(120)` column.
    pub const MAX_LEN: usize = 120;

    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if raw.chars().count() > Self::MAX_LEN {
            return Err(DomainError::validation(format!(
                "name cannot exceed {} characters",
                Self::MAX_LEN
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ProductName {}

impl TryFrom<String> for ProductName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ProductName> for String {
    fn from(value: ProductName) -> Self {
        value.0
    }
}

impl core::fmt::Display for ProductName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product that has not been stored yet (no id, no timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: ProductName,
    pub description: Option<String>,
    pub is_featured: bool,
}

impl NewProduct {
    /// Blank descriptions are stored as absent.
    pub fn new(name: ProductName, description: Option<String>) -> Self {
        Self {
            name,
            description: description.filter(|d| !d.trim().is_empty()),
            is_featured: false,
        }
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }
}

/// Entity: Product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: ProductName,
    description: Option<String>,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Materialize a stored product.
    ///
    /// `updated_at` is clamped so it never precedes `created_at`.
    pub fn from_parts(
        id: ProductId,
        name: ProductName,
        description: Option<String>,
        is_featured: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            is_featured,
            created_at,
            updated_at: updated_at.max(created_at),
        }
    }

    /// Build the stored form of a new product inserted at `at`.
    pub fn created(id: ProductId, new: NewProduct, at: DateTime<Utc>) -> Self {
        Self::from_parts(id, new.name, new.description, new.is_featured, at, at)
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn rename(&mut self, name: ProductName, at: DateTime<Utc>) {
        self.name = name;
        self.touch(at);
    }

    pub fn set_featured(&mut self, featured: bool, at: DateTime<Utc>) {
        self.is_featured = featured;
        self.touch(at);
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at.max(self.created_at);
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
