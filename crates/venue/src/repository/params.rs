//! Parameter objects for the venue statements.
//!
//! Each shape lists its fields in bind order; `#[derive(StatementParams)]`
//! generates the accessors, the builder and the binding list.

use serde::{Deserialize, Serialize};
use shared::params::Repeated;
use shared_macros::StatementParams;

use crate::logic::status::Status;

/// Parameters for inserting a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, StatementParams)]
#[params(builder = BuilderCreateVenueParams)]
pub struct CreateVenueParams {
    slug: String,
    name: String,
    city: String,
    spotify_playlist: String,
    status: Status,
    #[param(item = status_item)]
    statuses: Repeated<Status>,
    #[param(item = tag)]
    tags: Repeated<String>,
}

/// Parameters for renaming a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, StatementParams)]
#[params(builder = BuilderUpdateCityNameParams)]
pub struct UpdateCityNameParams {
    slug: String,
    name: String,
}

/// Parameters for listing the venues of a city.
///
/// When `statuses` is absent the status filter is dropped; when present and
/// empty it matches no venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, StatementParams)]
pub struct ListVenuesParams {
    city: String,
    #[param(item = status)]
    statuses: Repeated<Status>,
    limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, StatementParams)]
pub struct DeleteVenueParams {
    slug: String,
}
