extern crate proc_macro;

mod statement_params;

use proc_macro::TokenStream;

/// Generates accessors, a by-value builder and a
/// `shared::params::StatementParams` implementation for a parameter shape.
///
/// Fields typed `Repeated<T>` become optional repeated fields; every other
/// field is required and must implement `Default`, `Debug` and
/// `shared::params::ToBoundValue`.
///
/// Attributes:
/// - `#[params(builder = Name)]` on the struct names the builder type
///   (default `<Struct>Builder`).
/// - `#[param(item = name)]` on a repeated field names its append-one setter
///   (default `<field>_item`).
#[proc_macro_derive(StatementParams, attributes(params, param))]
pub fn derive_statement_params(input: TokenStream) -> TokenStream {
    statement_params::statement_params_impl(input)
}
