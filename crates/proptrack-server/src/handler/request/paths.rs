//! Path parameter types for HTTP handlers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path parameters for property operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPathParams {
    /// Unique identifier of the property.
    pub property_id: Uuid,
}

/// Path parameters for tenancy agreement operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenancyPathParams {
    /// Unique identifier of the tenancy agreement.
    pub tenancy_id: Uuid,
}

/// Path parameters for invoice operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePathParams {
    /// Unique identifier of the invoice.
    pub invoice_id: Uuid,
}

/// Path parameters for transaction operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPathParams {
    /// Unique identifier of the transaction.
    pub transaction_id: Uuid,
}

/// Path parameters for uploaded file operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePathParams {
    /// Unique identifier of the file.
    pub file_id: Uuid,
}

/// Path parameters for import operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportPathParams {
    /// Unique identifier of the import.
    pub import_id: Uuid,
}
