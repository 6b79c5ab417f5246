//! Field classification.
//!
//! Turns the [`FieldSpec`]s a type declares into its [`ClassDescriptor`]:
//!
//! | Field shape | no hint | `attribute` | `text` | `tag` |
//! |-------------|---------|-------------|--------|-------|
//! | scalar / converted | Attribute | Attribute | Text | Tag |
//! | composite   | Nested | error | error | Nested |
//! | sequence    | CollectionTag | error | error | CollectionTag |
//!
//! Attributes and child elements live in disjoint XML constructs, so an
//! attribute may share its emitted name with a tag of the same type.

use crate::descriptor::{ClassDescriptor, FieldDescriptor, Role, Target};
use crate::error::{Error, Result};
use crate::namespace::{NamespaceRef, is_bindable_prefix, is_ncname, is_reserved_name};
use crate::object::{FieldSpec, Fields, RoleHint, XmlObject};
use crate::registry::Registry;
use crate::value::{ConvertedType, Shape};
use std::collections::{HashMap, HashSet};

/// Build the descriptor of `T`. Nested composite types are not visited;
/// they are resolved when a value of them is first emitted.
pub(crate) fn classify<T: XmlObject>(registry: &Registry) -> Result<ClassDescriptor<T>> {
    let ty = std::any::type_name::<T>();
    let element = T::element_name();
    if !is_ncname(element) || is_reserved_name(element) {
        return Err(Error::configuration(
            ty,
            format!("`{element}` is not a valid element name"),
        ));
    }

    let mut fields = Fields::new();
    T::describe(&mut fields);

    let mut checks = Checks::new(ty);
    let mut descriptors = Vec::new();
    for spec in fields.into_specs() {
        let descriptor = classify_field(ty, spec, registry)?;
        checks.check(&descriptor)?;
        descriptors.push(descriptor);
    }

    Ok(ClassDescriptor {
        element,
        fields: descriptors,
    })
}

fn classify_field<T>(
    ty: &'static str,
    spec: FieldSpec<T>,
    registry: &Registry,
) -> Result<FieldDescriptor<T>> {
    let FieldSpec {
        source,
        name,
        hint,
        namespace,
        shape,
        reader,
    } = spec;

    let (role, target) = match shape {
        Shape::Scalar => (scalar_role(hint), Target::Scalar),
        Shape::Converted(conv) => (scalar_role(hint), converter(ty, source, conv, registry)?),
        Shape::Object(object) => match hint {
            RoleHint::Auto | RoleHint::Tag => (Role::Nested, Target::Object(object)),
            RoleHint::Attribute | RoleHint::Text => return Err(unmappable(ty, source, hint, "composite")),
        },
        Shape::Sequence(item) => match hint {
            RoleHint::Auto | RoleHint::Tag => (Role::CollectionTag, item_target(ty, source, *item, registry)?),
            RoleHint::Attribute | RoleHint::Text => return Err(unmappable(ty, source, hint, "sequence")),
        },
    };

    let name = name.unwrap_or_else(|| source.to_owned());
    if !is_ncname(&name) {
        return Err(Error::configuration(
            ty,
            format!("field `{source}` has invalid emitted name `{name}`"),
        ));
    }
    if is_reserved_name(&name) {
        return Err(Error::configuration(
            ty,
            format!("field `{source}` uses reserved name `{name}`"),
        ));
    }
    if role == Role::Text && namespace.is_some() {
        return Err(Error::configuration(
            ty,
            format!("text field `{source}` cannot have a namespace"),
        ));
    }

    Ok(FieldDescriptor {
        source,
        name,
        role,
        namespace,
        target,
        reader,
    })
}

fn scalar_role(hint: RoleHint) -> Role {
    match hint {
        RoleHint::Auto | RoleHint::Attribute => Role::Attribute,
        RoleHint::Text => Role::Text,
        RoleHint::Tag => Role::Tag,
    }
}

fn item_target(ty: &'static str, source: &'static str, item: Shape, registry: &Registry) -> Result<Target> {
    match item {
        Shape::Scalar => Ok(Target::Scalar),
        Shape::Object(object) => Ok(Target::Object(object)),
        Shape::Converted(conv) => converter(ty, source, conv, registry),
        Shape::Sequence(_) => Err(Error::unresolved(
            ty,
            source,
            "items of a collection cannot themselves be sequences",
        )),
    }
}

fn converter(ty: &'static str, source: &'static str, conv: ConvertedType, registry: &Registry) -> Result<Target> {
    registry
        .converter(&conv)
        .map(Target::Converted)
        .ok_or_else(|| Error::unresolved(ty, source, format!("no converter registered for `{}`", conv.name())))
}

fn unmappable(ty: &'static str, source: &'static str, hint: RoleHint, shape: &str) -> Error {
    let role = match hint {
        RoleHint::Attribute => "an attribute",
        _ => "text",
    };
    Error::configuration(ty, format!("field `{source}` is a {shape} and cannot be written as {role}"))
}

/// Per-type invariants that span several fields.
struct Checks {
    ty: &'static str,
    text: Option<&'static str>,
    attributes: HashSet<(Option<String>, String)>,
    prefix_uris: HashMap<String, String>,
    uri_prefixes: HashMap<String, String>,
}

impl Checks {
    fn new(ty: &'static str) -> Self {
        Checks {
            ty,
            text: None,
            attributes: HashSet::new(),
            prefix_uris: HashMap::new(),
            uri_prefixes: HashMap::new(),
        }
    }

    fn check<T>(&mut self, field: &FieldDescriptor<T>) -> Result<()> {
        if let Some(ns) = &field.namespace {
            self.check_namespace(field.source, ns)?;
        }
        match field.role {
            Role::Text => {
                if let Some(first) = self.text.replace(field.source) {
                    return Err(Error::configuration(
                        self.ty,
                        format!("fields `{first}` and `{}` are both marked as text", field.source),
                    ));
                }
            }
            Role::Attribute => {
                let key = (field.namespace.as_ref().map(|ns| ns.uri().to_owned()), field.name.clone());
                if !self.attributes.insert(key) {
                    return Err(Error::configuration(
                        self.ty,
                        format!("attribute `{}` is declared more than once", field.name),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check_namespace(&mut self, source: &'static str, ns: &NamespaceRef) -> Result<()> {
        if ns.uri().is_empty() {
            return Err(Error::configuration(
                self.ty,
                format!("field `{source}` declares an empty namespace uri"),
            ));
        }
        let Some(prefix) = ns.prefix_hint() else {
            return Ok(());
        };
        if !is_bindable_prefix(prefix) {
            return Err(Error::configuration(
                self.ty,
                format!("field `{source}` declares unusable prefix `{prefix}`"),
            ));
        }
        if let Some(uri) = self.prefix_uris.get(prefix)
            && uri != ns.uri()
        {
            return Err(Error::configuration(
                self.ty,
                format!("prefix `{prefix}` is bound to both `{uri}` and `{}`", ns.uri()),
            ));
        }
        if let Some(other) = self.uri_prefixes.get(ns.uri())
            && other != prefix
        {
            return Err(Error::configuration(
                self.ty,
                format!("namespace `{}` is given both prefix `{other}` and `{prefix}`", ns.uri()),
            ));
        }
        self.prefix_uris.insert(prefix.to_owned(), ns.uri().to_owned());
        self.uri_prefixes.insert(ns.uri().to_owned(), prefix.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Xml;

    struct Leaf {
        id: u32,
    }

    impl XmlObject for Leaf {
        fn element_name() -> &'static str {
            "Leaf"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("id", |l: &Self| &l.id);
        }
    }

    struct Mixed {
        id: u32,
        body: String,
        title: String,
        leaf: Leaf,
        tags: Vec<String>,
        leaves: Vec<Leaf>,
    }

    impl XmlObject for Mixed {
        fn element_name() -> &'static str {
            "Mixed"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("id", |m: &Self| &m.id);
            fields.field("body", |m: &Self| &m.body).text();
            fields.field("title", |m: &Self| &m.title).tag();
            fields.field("leaf", |m: &Self| &m.leaf);
            fields.field("tags", |m: &Self| &m.tags).named("tag");
            fields.field("leaves", |m: &Self| &m.leaves).tag().named("item");
        }
    }

    impl crate::XmlValue for Leaf {
        fn shape() -> Shape {
            Shape::object::<Self>()
        }

        fn to_value(&self) -> Result<crate::Value<'_>> {
            Ok(crate::Value::Object(self))
        }
    }

    fn registry() -> Xml {
        Xml::default()
    }

    #[test]
    fn test_roles_follow_shape_and_hint() {
        let class = classify::<Mixed>(registry().registry()).unwrap();
        let roles: Vec<_> = class.fields().iter().map(|f| (f.name(), f.role())).collect();
        assert_eq!(
            roles,
            [
                ("id", Role::Attribute),
                ("body", Role::Text),
                ("title", Role::Tag),
                ("leaf", Role::Nested),
                ("tag", Role::CollectionTag),
                ("item", Role::CollectionTag),
            ]
        );
        assert_eq!(class.field("leaves").unwrap().object_type().unwrap().name(), std::any::type_name::<Leaf>());
        assert!(class.field("tags").unwrap().object_type().is_none());
    }

    struct TwoTexts {
        a: String,
        b: String,
    }

    impl XmlObject for TwoTexts {
        fn element_name() -> &'static str {
            "TwoTexts"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("a", |t: &Self| &t.a).text();
            fields.field("b", |t: &Self| &t.b).text();
        }
    }

    #[test]
    fn test_duplicate_text_is_rejected() {
        let err = classify::<TwoTexts>(registry().registry()).unwrap_err();
        assert!(matches!(err, Error::Configuration { ref reason, .. } if reason.contains("`a` and `b`")));
    }

    struct TextComposite {
        leaf: Leaf,
    }

    impl XmlObject for TextComposite {
        fn element_name() -> &'static str {
            "TextComposite"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("leaf", |t: &Self| &t.leaf).attribute();
        }
    }

    #[test]
    fn test_composite_attribute_is_unmappable() {
        let err = classify::<TextComposite>(registry().registry()).unwrap_err();
        assert!(matches!(err, Error::Configuration { ref reason, .. } if reason.contains("cannot be written as an attribute")));
    }

    struct Nested {
        grid: Vec<Vec<u8>>,
    }

    impl XmlObject for Nested {
        fn element_name() -> &'static str {
            "Nested"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("grid", |n: &Self| &n.grid);
        }
    }

    #[test]
    fn test_sequence_of_sequences_is_unresolved() {
        let err = classify::<Nested>(registry().registry()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { field: "grid", .. }));
    }

    struct Conflicting {
        a: String,
        b: String,
    }

    impl XmlObject for Conflicting {
        fn element_name() -> &'static str {
            "Conflicting"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields
                .field("a", |c: &Self| &c.a)
                .namespace(NamespaceRef::with_prefix("urn:a", "p"));
            fields
                .field("b", |c: &Self| &c.b)
                .namespace(NamespaceRef::with_prefix("urn:b", "p"));
        }
    }

    #[test]
    fn test_prefix_bound_to_two_uris_is_rejected() {
        let err = classify::<Conflicting>(registry().registry()).unwrap_err();
        assert!(matches!(err, Error::Configuration { ref reason, .. } if reason.contains("prefix `p`")));
    }

    struct Reserved {
        a: String,
    }

    impl XmlObject for Reserved {
        fn element_name() -> &'static str {
            "Reserved"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields
                .field("a", |r: &Self| &r.a)
                .namespace(NamespaceRef::with_prefix("urn:a", "xmlns"));
        }
    }

    #[test]
    fn test_reserved_prefix_is_rejected() {
        assert!(matches!(
            classify::<Reserved>(registry().registry()),
            Err(Error::Configuration { .. })
        ));
    }

    struct DefaultNamespaceAttribute {
        xmlns: String,
    }

    impl XmlObject for DefaultNamespaceAttribute {
        fn element_name() -> &'static str {
            "DefaultNamespaceAttribute"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("xmlns", |d: &Self| &d.xmlns);
        }
    }

    struct ReservedTag {
        a: String,
    }

    impl XmlObject for ReservedTag {
        fn element_name() -> &'static str {
            "ReservedTag"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("a", |r: &Self| &r.a).tag().named("XmlData");
        }
    }

    struct ReservedElement;

    impl XmlObject for ReservedElement {
        fn element_name() -> &'static str {
            "xml"
        }

        fn describe(_: &mut Fields<Self>) {}
    }

    #[test]
    fn test_reserved_names_are_rejected() {
        let is_config = |result: Result<_>| matches!(result, Err(Error::Configuration { .. }));
        assert!(is_config(classify::<DefaultNamespaceAttribute>(registry().registry()).map(|_| ())));
        assert!(is_config(classify::<ReservedTag>(registry().registry()).map(|_| ())));
        assert!(is_config(classify::<ReservedElement>(registry().registry()).map(|_| ())));
    }

    struct NamespacedText {
        body: String,
    }

    impl XmlObject for NamespacedText {
        fn element_name() -> &'static str {
            "NamespacedText"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields
                .field("body", |n: &Self| &n.body)
                .text()
                .namespace(NamespaceRef::new("urn:t"));
        }
    }

    #[test]
    fn test_text_with_namespace_is_rejected() {
        let err = classify::<NamespacedText>(registry().registry()).unwrap_err();
        assert!(matches!(err, Error::Configuration { ref reason, .. } if reason.contains("text field `body`")));
    }

    struct SameAttribute {
        a: String,
        b: String,
    }

    impl XmlObject for SameAttribute {
        fn element_name() -> &'static str {
            "SameAttribute"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.field("a", |s: &Self| &s.a).named("x");
            fields.field("b", |s: &Self| &s.b).named("x");
        }
    }

    #[test]
    fn test_repeated_attribute_name_is_rejected() {
        assert!(matches!(
            classify::<SameAttribute>(registry().registry()),
            Err(Error::Configuration { .. })
        ));
    }

    struct Celsius(f64);

    struct Reading {
        temp: Celsius,
    }

    impl XmlObject for Reading {
        fn element_name() -> &'static str {
            "Reading"
        }

        fn describe(fields: &mut Fields<Self>) {
            fields.converted("temp", |r: &Self| &r.temp);
        }
    }

    #[test]
    fn test_converted_field_needs_a_converter() {
        assert!(matches!(
            classify::<Reading>(registry().registry()),
            Err(Error::UnresolvedType { field: "temp", .. })
        ));

        let xml = Xml::builder()
            .converter(|c: &Celsius| format!("{}C", c.0))
            .build();
        let class = classify::<Reading>(xml.registry()).unwrap();
        assert_eq!(class.fields()[0].role(), Role::Attribute);
    }
}
