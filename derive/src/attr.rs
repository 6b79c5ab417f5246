//! Parsing of `#[xml(...)]` attributes.

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::{Attribute, LitStr, meta::ParseNestedMeta};

/// Case convention applied by `rename_all`.
#[derive(Clone, Copy)]
pub enum Case {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl Case {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        Ok(match lit.value().as_str() {
            "lowercase" => Case::Lower,
            "UPPERCASE" => Case::Upper,
            "PascalCase" => Case::Pascal,
            "camelCase" => Case::Camel,
            "snake_case" => Case::Snake,
            "SCREAMING_SNAKE_CASE" => Case::ScreamingSnake,
            "kebab-case" => Case::Kebab,
            other => {
                return Err(syn::Error::new(
                    lit.span(),
                    format!("unknown rename_all convention `{other}`"),
                ));
            }
        })
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            Case::Lower => name.to_lowercase(),
            Case::Upper => name.to_uppercase(),
            Case::Pascal => name.to_upper_camel_case(),
            Case::Camel => name.to_lower_camel_case(),
            Case::Snake => name.to_snake_case(),
            Case::ScreamingSnake => name.to_shouty_snake_case(),
            Case::Kebab => name.to_kebab_case(),
        }
    }
}

/// Attributes on the struct or enum itself.
#[derive(Default)]
pub struct ContainerAttrs {
    pub rename: Option<String>,
    pub rename_all: Option<Case>,
}

impl ContainerAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = ContainerAttrs::default();
        for_each_xml_attr(attrs, |meta| {
            if meta.path.is_ident("rename") {
                out.rename = Some(string_value(&meta)?);
                Ok(())
            } else if meta.path.is_ident("rename_all") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename_all = Some(Case::parse(&lit)?);
                Ok(())
            } else {
                Err(meta.error("unknown xml container attribute"))
            }
        })?;
        Ok(out)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RoleAttr {
    Attribute,
    Text,
    Tag,
}

/// How the field's value is turned into XML.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Value,
    Converter,
    Serde,
}

#[derive(Default)]
pub struct FieldAttrs {
    pub role: Option<RoleAttr>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub format: Format,
    pub skip: bool,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = FieldAttrs::default();
        for_each_xml_attr(attrs, |meta| {
            let role = if meta.path.is_ident("attribute") {
                Some(RoleAttr::Attribute)
            } else if meta.path.is_ident("text") {
                Some(RoleAttr::Text)
            } else if meta.path.is_ident("tag") {
                Some(RoleAttr::Tag)
            } else {
                None
            };
            if let Some(role) = role {
                if out.role.replace(role).is_some() {
                    return Err(meta.error("a field takes at most one of `attribute`, `text`, `tag`"));
                }
                return Ok(());
            }

            let format = if meta.path.is_ident("converter") {
                Some(Format::Converter)
            } else if meta.path.is_ident("serde") {
                Some(Format::Serde)
            } else {
                None
            };
            if let Some(format) = format {
                if out.format != Format::Value {
                    return Err(meta.error("`converter` and `serde` cannot be combined"));
                }
                out.format = format;
                return Ok(());
            }

            if meta.path.is_ident("name") || meta.path.is_ident("rename") {
                out.name = Some(string_value(&meta)?);
            } else if meta.path.is_ident("namespace") {
                out.namespace = Some(string_value(&meta)?);
            } else if meta.path.is_ident("prefix") {
                out.prefix = Some(string_value(&meta)?);
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else {
                return Err(meta.error("unknown xml field attribute"));
            }
            Ok(())
        })?;
        Ok(out)
    }
}

/// Attributes on one enum constant.
#[derive(Default)]
pub struct VariantAttrs {
    pub rename: Option<String>,
}

impl VariantAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = VariantAttrs::default();
        for_each_xml_attr(attrs, |meta| {
            if meta.path.is_ident("rename") || meta.path.is_ident("name") {
                out.rename = Some(string_value(&meta)?);
                Ok(())
            } else {
                Err(meta.error("unknown xml variant attribute"))
            }
        })?;
        Ok(out)
    }
}

fn for_each_xml_attr(
    attrs: &[Attribute],
    mut f: impl FnMut(ParseNestedMeta<'_>) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("xml")) {
        attr.parse_nested_meta(&mut f)?;
    }
    Ok(())
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}
