//! Request types for HTTP handlers.

mod accounts;
mod authentications;
mod files;
mod financials;
mod imports;
mod invoices;
mod paginations;
mod paths;
mod properties;
mod tenancies;
mod transactions;
mod validations;
mod valuations;

pub use accounts::*;
pub use authentications::*;
pub use files::*;
pub use financials::*;
pub use imports::*;
pub use invoices::*;
pub use paginations::*;
pub use paths::*;
pub use properties::*;
pub use tenancies::*;
pub use transactions::*;
pub use validations::*;
pub use valuations::*;
