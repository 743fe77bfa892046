//! Implementation of the `#[derive(Entity)]` macro.

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type};

/// Parse and generate code for the `#[derive(Entity)]` macro.
pub fn derive_entity_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Entity derive only supports structs",
            ));
        }
    };

    let struct_attrs = parse_struct_attrs(input)?;
    let entity_name = name.to_string();
    let table_name = struct_attrs.table_name.unwrap_or_else(|| entity_name.clone());
    let alias = struct_attrs.alias.unwrap_or_else(|| default_alias(&entity_name));

    let field_infos: Vec<FieldInfo> = fields
        .iter()
        .map(|field| parse_field(field, struct_attrs.rename_all))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    let field_metas = field_infos.iter().map(|f| {
        let property = &f.property;
        let column = &f.column_name;
        quote! { ::lambda_sql::FieldMeta::new(#property, #column) }
    });

    let selectors = field_infos.iter().map(|f| generate_selector(name, vis, f));

    Ok(quote! {
        impl ::lambda_sql::Entity for #name {
            const ENTITY_NAME: &'static str = #entity_name;
            const TABLE_NAME: &'static str = #table_name;
            const DEFAULT_ALIAS: &'static str = #alias;
            const FIELDS: &'static [::lambda_sql::FieldMeta] = &[#(#field_metas),*];
        }

        impl #name {
            #(#selectors)*
        }
    })
}

/// First two characters of the type name, lowercased.
fn default_alias(entity_name: &str) -> String {
    entity_name.chars().take(2).collect::<String>().to_lowercase()
}

/// Struct-level attributes parsed from `#[lambda_sql(...)]`.
#[derive(Debug, Default)]
struct StructAttrs {
    table_name: Option<String>,
    alias: Option<String>,
    rename_all: Option<Case>,
}

/// Parse struct-level `#[lambda_sql(...)]` attributes.
fn parse_struct_attrs(input: &DeriveInput) -> Result<StructAttrs, syn::Error> {
    let mut attrs = StructAttrs::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("lambda_sql") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.table_name = Some(non_empty(value)?);
            } else if meta.path.is_ident("alias") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.alias = Some(non_empty(value)?);
            } else if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                let case = parse_case(&value.value())
                    .ok_or_else(|| syn::Error::new_spanned(&value, "unsupported rename_all case"))?;
                attrs.rename_all = Some(case);
            } else {
                return Err(meta.error("unknown lambda_sql container attribute"));
            }
            Ok(())
        })?;
    }

    Ok(attrs)
}

fn non_empty(value: LitStr) -> Result<String, syn::Error> {
    let text = value.value();
    if text.trim().is_empty() {
        return Err(syn::Error::new_spanned(value, "value must not be empty"));
    }
    Ok(text)
}

/// Map a serde-style case name to a [`Case`].
fn parse_case(name: &str) -> Option<Case> {
    Some(match name {
        "PascalCase" => Case::Pascal,
        "camelCase" => Case::Camel,
        "snake_case" => Case::Snake,
        "SCREAMING_SNAKE_CASE" => Case::UpperSnake,
        "kebab-case" => Case::Kebab,
        "lowercase" => Case::Flat,
        "UPPERCASE" => Case::UpperFlat,
        _ => return None,
    })
}

/// Information about a field.
#[derive(Debug)]
struct FieldInfo {
    property: String,
    ty: Type,
    column_name: String,
}

/// Parse a field and its `#[lambda_sql(...)]` attributes.
///
/// Returns `None` for skipped fields.
fn parse_field(field: &syn::Field, rename_all: Option<Case>) -> Result<Option<FieldInfo>, syn::Error> {
    let name = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "Fields must be named"))?;

    let property = name.to_string().trim_start_matches("r#").to_string();
    let mut column_name = match rename_all {
        Some(case) => property.to_case(case),
        None => property.clone(),
    };
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("lambda_sql") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
            } else if meta.path.is_ident("column") {
                let value: LitStr = meta.value()?.parse()?;
                column_name = non_empty(value)?;
            } else {
                return Err(meta.error("unknown lambda_sql field attribute"));
            }
            Ok(())
        })?;
    }

    if skip {
        return Ok(None);
    }

    Ok(Some(FieldInfo {
        property,
        ty: field.ty.clone(),
        column_name,
    }))
}

/// Generate the selector constant for one field.
fn generate_selector(entity: &Ident, vis: &syn::Visibility, field: &FieldInfo) -> TokenStream {
    let property = &field.property;
    let const_name = format_ident!("{}", property.to_case(Case::UpperSnake));
    let ty = &field.ty;
    let doc = format!("Selector for `{}` (column `{}`).", property, field.column_name);

    quote! {
        #[doc = #doc]
        #[allow(dead_code)]
        #vis const #const_name: ::lambda_sql::Selector<#entity, #ty> =
            ::lambda_sql::Selector::property(#property);
    }
}
