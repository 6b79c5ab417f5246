//! Derive macro for `parsnip`.
//!
//! `#[derive(Xml)]` on a struct with named fields (or a unit struct)
//! implements `parsnip::XmlObject` and `parsnip::XmlValue`, listing the
//! fields in declaration order. On an enum whose variants carry no data it
//! implements `parsnip::XmlValue`, writing each constant by name.
//!
//! # Container attributes
//!
//! - `#[xml(rename = "Name")]`: element name (structs) instead of the type name.
//! - `#[xml(rename_all = "camelCase")]`: case convention for field or constant
//!   names without an explicit name. One of `lowercase`, `UPPERCASE`,
//!   `PascalCase`, `camelCase`, `snake_case`, `SCREAMING_SNAKE_CASE`,
//!   `kebab-case`.
//!
//! # Field attributes
//!
//! - `attribute`, `text`, `tag`: role hints.
//! - `name = "item"`: emitted name; for sequences, the name of each item.
//! - `namespace = "urn:x"`, `prefix = "x"`: namespace of the attribute or tag.
//! - `converter`: format with the converter registered for the field type
//!   (`Option<T>` and `Vec<T>` fields use the converter for `T`).
//! - `serde`: format through the field's `serde::Serialize` impl. The value
//!   must serialize as a scalar (number, string, unit variant, newtype or
//!   `Option` of one). The type is not inspected when the adapter is built,
//!   so a value that serializes as a sequence, map or struct fails each write
//!   with `Error::Unsupported`.
//! - `skip`: leave the field out.
//!
//! # Variant attributes
//!
//! - `#[xml(rename = "ONE")]`: text written for the constant.
//!
//! ```ignore
//! use parsnip::Xml;
//!
//! #[derive(Xml)]
//! #[xml(rename = "book")]
//! struct Book {
//!     #[xml(namespace = "urn:isbn", prefix = "isbn")]
//!     isbn: String,
//!     #[xml(tag)]
//!     title: String,
//!     #[xml(name = "author")]
//!     authors: Vec<String>,
//!     format: Format,
//! }
//!
//! #[derive(Xml)]
//! #[xml(rename_all = "lowercase")]
//! enum Format {
//!     Hardcover,
//!     #[xml(rename = "ebook")]
//!     Electronic,
//! }
//! ```

mod attr;

use attr::{ContainerAttrs, FieldAttrs, Format, RoleAttr, VariantAttrs};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DataEnum, DeriveInput, Field, Fields, GenericArgument, PathArguments, Type, parse_macro_input};

#[proc_macro_derive(Xml, attributes(xml))]
pub fn derive_xml(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let container = ContainerAttrs::parse(&input.attrs)?;
    match &input.data {
        Data::Struct(data) => expand_struct(input, &container, &data.fields),
        Data::Enum(data) => expand_enum(input, &container, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Xml cannot be derived for unions",
        )),
    }
}

fn expand_struct(input: &DeriveInput, container: &ContainerAttrs, fields: &Fields) -> syn::Result<TokenStream2> {
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Xml types must be 'static; borrowed fields are not supported",
        ));
    }

    let statements = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| field_statement(field, container))
            .collect::<syn::Result<Vec<_>>>()?,
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Xml can only be derived for structs with named fields",
            ));
        }
    };

    let name = &input.ident;
    let element = container
        .rename
        .clone()
        .unwrap_or_else(|| name.unraw().to_string());

    let mut generics = input.generics.clone();
    let where_clause = generics.make_where_clause();
    for param in &input.generics.params {
        if let syn::GenericParam::Type(type_param) = param {
            let ident = &type_param.ident;
            where_clause
                .predicates
                .push(syn::parse_quote!(#ident: ::parsnip::XmlValue + 'static));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::parsnip::XmlObject for #name #ty_generics #where_clause {
            fn element_name() -> &'static str {
                #element
            }

            fn describe(fields: &mut ::parsnip::Fields<Self>) {
                #(#statements)*
                let _ = fields;
            }
        }

        impl #impl_generics ::parsnip::XmlValue for #name #ty_generics #where_clause {
            fn shape() -> ::parsnip::Shape {
                ::parsnip::Shape::object::<Self>()
            }

            fn to_value(&self) -> ::parsnip::Result<::parsnip::Value<'_>> {
                ::std::result::Result::Ok(::parsnip::Value::Object(self))
            }
        }
    })
}

fn field_statement(field: &Field, container: &ContainerAttrs) -> syn::Result<TokenStream2> {
    let attrs = FieldAttrs::parse(&field.attrs)?;
    if attrs.skip {
        return Ok(TokenStream2::new());
    }
    let Some(ident) = &field.ident else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let source = ident.unraw().to_string();
    let ty = &field.ty;

    let declare = match attrs.format {
        Format::Value => quote!(field::<#ty>),
        Format::Serde => quote!(serialized::<#ty>),
        Format::Converter => {
            if let Some(inner) = wrapped("Option", ty) {
                quote!(converted_opt::<#inner>)
            } else if let Some(inner) = wrapped("Vec", ty) {
                quote!(converted_seq::<#inner>)
            } else {
                quote!(converted::<#ty>)
            }
        }
    };

    let mut modifiers = Vec::new();
    match attrs.role {
        Some(RoleAttr::Attribute) => modifiers.push(quote!(.attribute())),
        Some(RoleAttr::Text) => modifiers.push(quote!(.text())),
        Some(RoleAttr::Tag) => modifiers.push(quote!(.tag())),
        None => {}
    }

    let name = attrs
        .name
        .or_else(|| container.rename_all.map(|case| case.apply(&source)));
    if let Some(name) = name {
        modifiers.push(quote!(.named(#name)));
    }

    match (attrs.namespace, attrs.prefix) {
        (Some(uri), Some(prefix)) => {
            modifiers.push(quote!(.namespace(::parsnip::NamespaceRef::with_prefix(#uri, #prefix))));
        }
        (Some(uri), None) => {
            modifiers.push(quote!(.namespace(::parsnip::NamespaceRef::new(#uri))));
        }
        (None, Some(_)) => {
            return Err(syn::Error::new_spanned(ident, "`prefix` requires `namespace`"));
        }
        (None, None) => {}
    }

    Ok(quote! {
        fields.#declare(#source, |object: &Self| &object.#ident)#(#modifiers)*;
    })
}

/// `T` when `ty` is written as `wrapper<T>`.
fn wrapped<'t>(wrapper: &str, ty: &'t Type) -> Option<&'t Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn expand_enum(input: &DeriveInput, container: &ContainerAttrs, data: &DataEnum) -> syn::Result<TokenStream2> {
    if container.rename.is_some() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "`rename` names an element; enums are written as text",
        ));
    }

    let mut arms = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Xml can only be derived for enums whose variants carry no data",
            ));
        }
        let attrs = VariantAttrs::parse(&variant.attrs)?;
        let declared = variant.ident.unraw().to_string();
        let text = attrs
            .rename
            .or_else(|| container.rename_all.map(|case| case.apply(&declared)))
            .unwrap_or(declared);
        let ident = &variant.ident;
        arms.push(quote!(Self::#ident => #text));
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let body = if arms.is_empty() {
        quote!(match *self {})
    } else {
        quote! {
            let text = match self {
                #(#arms,)*
            };
            ::std::result::Result::Ok(::parsnip::Value::Text(::std::borrow::Cow::Borrowed(text)))
        }
    };

    Ok(quote! {
        impl #impl_generics ::parsnip::XmlValue for #name #ty_generics #where_clause {
            fn shape() -> ::parsnip::Shape {
                ::parsnip::Shape::Scalar
            }

            fn to_value(&self) -> ::parsnip::Result<::parsnip::Value<'_>> {
                #body
            }
        }
    })
}
