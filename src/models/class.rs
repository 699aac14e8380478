//! Class (borrower group) model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::store::{Document, StoreError};

/// A borrower group, e.g. a classroom
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Class {
    /// Store document identifier
    #[serde(skip_deserializing)]
    pub id: String,
    pub name: String,
}

impl Class {
    /// Decode a class from its store document
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut class: Class = doc.decode()?;
        class.id = doc.id.clone();
        Ok(class)
    }
}

/// Create class request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClass {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Update class request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClass {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}
