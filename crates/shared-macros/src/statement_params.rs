//! `#[derive(StatementParams)]`
//!
//! Expands a plain struct declaration into an immutable parameter object:
//!
//! - one read accessor per field (`&T` for required fields, `Option<&[T]>` for
//!   `Repeated<T>` fields),
//! - a by-value builder with a setter per required field and an
//!   append-one / append-many / clear triple per repeated field,
//! - an implementation of `shared::params::StatementParams` exposing the field
//!   descriptors and the ordered binding list.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, PartialEq, Eq, StatementParams)]
//! #[params(builder = BuilderCreateVenueParams)]
//! pub struct CreateVenueParams {
//!     slug: String,
//!     status: Status,
//!     #[param(item = status_item)]
//!     statuses: Repeated<Status>,
//!     #[param(item = tag)]
//!     tags: Repeated<String>,
//! }
//!
//! let params = CreateVenueParams::builder()
//!     .slug("nyc")
//!     .status_item(Status::Active)
//!     .build();
//! assert_eq!(params.tags(), None);
//! ```

use std::collections::HashMap;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, Ident, PathArguments, Type,
    ext::IdentExt, parse_macro_input,
};

/// Builder methods that are always generated and cannot be used as setter names.
const RESERVED_BUILDER_METHODS: &[&str] = &["build"];

/// Accessor names that would shadow the generated `builder()` constructor or
/// a `StatementParams` method under method-call syntax.
const RESERVED_ACCESSORS: &[&str] = &["builder", "bindings", "binding", "present_bindings"];

pub fn statement_params_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

enum FieldShape<'a> {
    Required,
    Repeated { item_ty: &'a Type, item_setter: Ident },
}

struct ParamField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    shape: FieldShape<'a>,
}

impl ParamField<'_> {
    fn name(&self) -> String {
        self.ident.unraw().to_string()
    }

    /// Every builder method this field contributes, with the span to report
    /// a collision at.
    fn setter_names(&self) -> Vec<(String, Span)> {
        let mut names = vec![(self.name(), self.ident.span())];
        if let FieldShape::Repeated { item_setter, .. } = &self.shape {
            names.push((item_setter.unraw().to_string(), item_setter.span()));
            names.push((format!("clear_{}", self.name()), self.ident.span()));
        }
        names
    }
}

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(StatementParams)] does not support generic parameters",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "#[derive(StatementParams)] requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(StatementParams)] can only be applied to structs",
            ));
        }
    };

    let fields = named
        .named
        .iter()
        .map(parse_field)
        .collect::<syn::Result<Vec<_>>>()?;

    check_collisions(&fields)?;

    let vis = &input.vis;
    let params_ident = &input.ident;
    let params_name = params_ident.to_string();
    let builder_ident =
        parse_builder_name(input)?.unwrap_or_else(|| format_ident!("{}Builder", params_ident));
    let field_count = fields.len();

    let accessors = fields.iter().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        match &field.shape {
            FieldShape::Required => quote! {
                pub fn #ident(&self) -> &#ty {
                    &self.#ident
                }
            },
            FieldShape::Repeated { item_ty, .. } => quote! {
                pub fn #ident(&self) -> ::core::option::Option<&[#item_ty]> {
                    self.#ident.as_slice()
                }
            },
        }
    });

    let builder_fields = fields.iter().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        quote! { #ident: #ty }
    });

    let setters = fields.iter().map(|field| {
        let ident = field.ident;
        let ty = field.ty;
        match &field.shape {
            FieldShape::Required => quote! {
                pub fn #ident(mut self, #ident: impl ::core::convert::Into<#ty>) -> Self {
                    self.#ident = #ident.into();
                    self
                }
            },
            FieldShape::Repeated {
                item_ty,
                item_setter,
            } => {
                let clear_ident = format_ident!("clear_{}", ident.unraw());
                quote! {
                    pub fn #item_setter(mut self, #item_setter: impl ::core::convert::Into<#item_ty>) -> Self {
                        self.#ident.push(#item_setter.into());
                        self
                    }

                    pub fn #ident<I>(mut self, #ident: I) -> Self
                    where
                        I: ::core::iter::IntoIterator,
                        I::Item: ::core::convert::Into<#item_ty>,
                    {
                        self.#ident
                            .extend(#ident.into_iter().map(::core::convert::Into::into));
                        self
                    }

                    pub fn #clear_ident(mut self) -> Self {
                        self.#ident.clear();
                        self
                    }
                }
            }
        }
    });

    let field_idents: Vec<&Ident> = fields.iter().map(|field| field.ident).collect();

    let descriptors = fields.iter().map(|field| {
        let name = field.name();
        match &field.shape {
            FieldShape::Required => {
                let ty = field.ty;
                quote! {
                    ::shared::params::FieldDescriptor::required(
                        #name,
                        <#ty as ::shared::params::ToBoundValue>::KIND,
                    )
                }
            }
            FieldShape::Repeated { item_ty, .. } => quote! {
                ::shared::params::FieldDescriptor::repeated(
                    #name,
                    <#item_ty as ::shared::params::ToBoundValue>::KIND,
                )
            },
        }
    });

    let bindings = fields.iter().map(|field| {
        let ident = field.ident;
        let name = field.name();
        match &field.shape {
            FieldShape::Required => quote! {
                ::shared::params::Binding::new(
                    #name,
                    ::shared::params::ToBoundValue::to_bound_value(&self.#ident),
                )
            },
            FieldShape::Repeated { .. } => quote! {
                ::shared::params::Binding::new(#name, self.#ident.bound_value())
            },
        }
    });

    let builder_doc = format!("Builder for [`{params_name}`].");

    Ok(quote! {
        impl #params_ident {
            pub fn builder() -> #builder_ident {
                <#builder_ident as ::core::default::Default>::default()
            }

            #(#accessors)*
        }

        #[doc = #builder_doc]
        #[derive(Debug, Default)]
        #vis struct #builder_ident {
            #(#builder_fields,)*
        }

        impl #builder_ident {
            #(#setters)*

            pub fn build(self) -> #params_ident {
                ::shared::tracing::trace!(
                    params = #params_name,
                    fields = #field_count,
                    "Built statement params"
                );
                #params_ident {
                    #(#field_idents: self.#field_idents,)*
                }
            }
        }

        impl ::shared::params::StatementParams for #params_ident {
            type Builder = #builder_ident;

            const NAME: &'static str = #params_name;

            const FIELDS: &'static [::shared::params::FieldDescriptor] = &[
                #(#descriptors,)*
            ];

            fn bindings(&self) -> ::std::vec::Vec<::shared::params::Binding> {
                ::std::vec![
                    #(#bindings,)*
                ]
            }
        }
    })
}

fn parse_field(field: &Field) -> syn::Result<ParamField<'_>> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

    let name = ident.unraw().to_string();
    if RESERVED_ACCESSORS.contains(&name.as_str()) {
        return Err(syn::Error::new_spanned(
            ident,
            format!("field name `{name}` collides with the generated `{name}()` method"),
        ));
    }

    let item_setter = parse_item_setter(field)?;

    let shape = match (repeated_item_type(&field.ty), item_setter) {
        (Some(item_ty), item_setter) => FieldShape::Repeated {
            item_ty,
            item_setter: item_setter.unwrap_or_else(|| format_ident!("{}_item", ident.unraw())),
        },
        (None, Some(item_setter)) => {
            return Err(syn::Error::new_spanned(
                item_setter,
                "`item` is only valid on `Repeated<T>` fields",
            ));
        }
        (None, None) => FieldShape::Required,
    };

    Ok(ParamField {
        ident,
        ty: &field.ty,
        shape,
    })
}

/// Reads `#[param(item = name)]`.
fn parse_item_setter(field: &Field) -> syn::Result<Option<Ident>> {
    let mut item = None;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("param")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("item") {
                item = Some(meta.value()?.parse::<Ident>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported `param` key, expected `item`"))
            }
        })?;
    }
    Ok(item)
}

/// Reads `#[params(builder = Name)]`.
fn parse_builder_name(input: &DeriveInput) -> syn::Result<Option<Ident>> {
    let mut builder = None;
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("params")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("builder") {
                builder = Some(meta.value()?.parse::<Ident>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported `params` key, expected `builder`"))
            }
        })?;
    }
    Ok(builder)
}

/// Returns `T` when `ty` is written as `Repeated<T>` (with any path prefix).
pub(crate) fn repeated_item_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Repeated" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first() {
        Some(GenericArgument::Type(item_ty)) => Some(item_ty),
        _ => None,
    }
}

/// Two fields must never generate builder methods with the same name, e.g. a
/// required `status` next to a repeated `statuses` whose item setter is also
/// `status`.
fn check_collisions(fields: &[ParamField<'_>]) -> syn::Result<()> {
    let mut seen: HashMap<String, Span> = HashMap::new();
    for (name, span) in fields.iter().flat_map(ParamField::setter_names) {
        if RESERVED_BUILDER_METHODS.contains(&name.as_str()) {
            return Err(syn::Error::new(
                span,
                format!("builder method `{name}` is reserved"),
            ));
        }
        if seen.insert(name.clone(), span).is_some() {
            return Err(syn::Error::new(
                span,
                format!(
                    "builder method `{name}` would be generated twice; rename the append-one setter with #[param(item = ...)]"
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_err(input: DeriveInput) -> String {
        match expand(&input) {
            Ok(_) => panic!("expected expansion to fail"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn test_repeated_item_type_detects_qualified_paths() {
        let ty: Type = parse_quote!(::shared::params::Repeated<Status>);
        let item = repeated_item_type(&ty).unwrap();
        let expected: Type = parse_quote!(Status);
        assert_eq!(item, &expected);

        let ty: Type = parse_quote!(Vec<Status>);
        assert!(repeated_item_type(&ty).is_none());

        let ty: Type = parse_quote!(String);
        assert!(repeated_item_type(&ty).is_none());
    }

    #[test]
    fn test_default_item_setter_collision_free() {
        let input: DeriveInput = parse_quote! {
            pub struct ListVenuesParams {
                city: String,
                statuses: Repeated<Status>,
            }
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("statuses_item"));
        assert!(tokens.contains("clear_statuses"));
        assert!(tokens.contains("ListVenuesParamsBuilder"));
    }

    #[test]
    fn test_item_setter_colliding_with_required_field_is_rejected() {
        let input: DeriveInput = parse_quote! {
            pub struct CreateVenueParams {
                status: Status,
                #[param(item = status)]
                statuses: Repeated<Status>,
            }
        };
        assert!(expand_err(input).contains("builder method `status` would be generated twice"));
    }

    #[test]
    fn test_clear_setter_collision_is_rejected() {
        let input: DeriveInput = parse_quote! {
            pub struct Params {
                clear_tags: String,
                tags: Repeated<String>,
            }
        };
        assert!(expand_err(input).contains("`clear_tags`"));
    }

    #[test]
    fn test_item_on_required_field_is_rejected() {
        let input: DeriveInput = parse_quote! {
            pub struct Params {
                #[param(item = slug_item)]
                slug: String,
            }
        };
        assert!(expand_err(input).contains("only valid on `Repeated<T>` fields"));
    }

    #[test]
    fn test_unknown_param_key_is_rejected() {
        let input: DeriveInput = parse_quote! {
            pub struct Params {
                #[param(rename = "x")]
                tags: Repeated<String>,
            }
        };
        assert!(expand_err(input).contains("unsupported `param` key"));
    }

    #[test]
    fn test_reserved_names_are_rejected() {
        let input: DeriveInput = parse_quote! {
            pub struct Params {
                build: String,
            }
        };
        assert!(expand_err(input).contains("`build` is reserved"));

        let input: DeriveInput = parse_quote! {
            pub struct Params {
                builder: String,
            }
        };
        assert!(expand_err(input).contains("generated `builder()` method"));

        for name in ["bindings", "binding", "present_bindings"] {
            let ident = format_ident!("{}", name);
            let input: DeriveInput = parse_quote! {
                pub struct Params {
                    #ident: String,
                }
            };
            assert!(expand_err(input).contains(&format!("generated `{name}()` method")));
        }
    }

    #[test]
    fn test_field_named_default_uses_qualified_default() {
        let input: DeriveInput = parse_quote! {
            pub struct DefaultParams {
                default: String,
                tags: Repeated<String>,
            }
        };
        let tokens = expand(&input).unwrap();
        let expected = quote! { <DefaultParamsBuilder as ::core::default::Default>::default() };
        assert!(tokens.to_string().contains(&expected.to_string()));
    }

    #[test]
    fn test_non_struct_inputs_are_rejected() {
        let input: DeriveInput = parse_quote! {
            pub enum Params { A, B }
        };
        assert!(expand_err(input).contains("can only be applied to structs"));

        let input: DeriveInput = parse_quote! {
            pub struct Params(String);
        };
        assert!(expand_err(input).contains("named fields"));

        let input: DeriveInput = parse_quote! {
            pub struct Params<T> { value: T }
        };
        assert!(expand_err(input).contains("generic parameters"));
    }

    #[test]
    fn test_custom_builder_name() {
        let input: DeriveInput = parse_quote! {
            #[params(builder = BuilderUpdateCityNameParams)]
            pub struct UpdateCityNameParams {
                slug: String,
                name: String,
            }
        };
        let tokens = expand(&input).unwrap().to_string();
        assert!(tokens.contains("BuilderUpdateCityNameParams"));
        assert!(!tokens.contains("UpdateCityNameParamsBuilder"));
    }
}
