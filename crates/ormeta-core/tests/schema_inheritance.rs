use ormeta_core::schema::*;
use ormeta_core::stmt::{self, Value};
use ormeta_core::Error;

use pretty_assertions::assert_eq;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Row {
    values: HashMap<String, Value>,
}

fn accessor(name: &str) -> FieldAccessor<Row> {
    let get_name = name.to_string();
    let set_name = name.to_string();

    FieldAccessor::new(
        name,
        move |row: &Row| row.values.get(&get_name).cloned().unwrap_or_default(),
        move |row: &mut Row, value: Value| {
            row.values.insert(set_name.clone(), value);
            Ok(())
        },
    )
}

fn column(name: &str, ty: stmt::Type) -> MemberDef {
    MemberDef::column(name, ty).accessor(accessor(name))
}

fn shape() -> TypeDef {
    TypeDef::new("Shape")
        .table("shapes")
        .inheritance_code(0)
        .inheritance_default()
        .member(column("Id", stmt::Type::I32).primary_key())
        .member(column("Kind", stmt::Type::I32).discriminator())
        .member(column("Name", stmt::Type::String))
}

fn circle() -> TypeDef {
    TypeDef::new("Circle")
        .base("Shape")
        .inheritance_code(1)
        .member(column("Radius", stmt::Type::I64))
}

fn square() -> TypeDef {
    TypeDef::new("Square")
        .base("Shape")
        .inheritance_code(2_i64)
        .member(column("Side", stmt::Type::I64))
}

fn rounded_square() -> TypeDef {
    TypeDef::new("RoundedSquare")
        .base("Square")
        .inheritance_code(3)
        .member(column("CornerRadius", stmt::Type::I64))
}

fn tag() -> TypeDef {
    TypeDef::new("Tag").member(column("Label", stmt::Type::String).primary_key())
}

fn build(defs: Vec<TypeDef>) -> Catalog {
    Builder::new().build(defs).unwrap()
}

fn build_err(defs: Vec<TypeDef>) -> Error {
    let err = Builder::new().build(defs).unwrap_err();
    assert!(err.is_invalid_mapping(), "{err}");
    err
}

fn names(ty: &MetaType) -> Vec<&str> {
    ty.members().map(Member::name).collect()
}

#[test]
fn inherited_members_come_first() {
    let catalog = build(vec![shape(), circle(), square(), rounded_square()]);

    let circle = catalog.ty_by_name("Circle").unwrap();
    assert_eq!(names(circle), vec!["Id", "Kind", "Name", "Radius"]);

    let square = catalog.ty_by_name("Square").unwrap();
    assert_eq!(names(square), vec!["Id", "Kind", "Name", "Side"]);

    let rounded = catalog.ty_by_name("RoundedSquare").unwrap();
    assert_eq!(
        names(rounded),
        vec!["Id", "Kind", "Name", "Side", "CornerRadius"]
    );

    for ty in catalog.types() {
        for (ordinal, member) in ty.members().enumerate() {
            assert_eq!(member.ordinal(), ordinal);
        }
    }
}

#[test]
fn subtypes_share_inherited_members() {
    let catalog = build(vec![shape(), circle(), square()]);

    let shape = catalog.ty_by_name("Shape").unwrap();
    let circle = catalog.ty_by_name("Circle").unwrap();

    for ordinal in 0..3 {
        let inherited = circle.member(ordinal).unwrap();
        assert!(std::ptr::eq(inherited, shape.member(ordinal).unwrap()));
        assert_eq!(inherited.declaring_type(), shape.id());
    }

    let declared: Vec<_> = circle.declared_members().map(Member::name).collect();
    assert_eq!(declared, vec!["Radius"]);

    let radius = circle.member_by_name("Radius").unwrap();
    assert_eq!(radius.declaring_type(), circle.id());
    assert_eq!(catalog.member(radius.id()).name(), "Radius");
}

#[test]
fn is_declared_by_follows_the_hierarchy_downwards() {
    let catalog = build(vec![shape(), circle(), square(), rounded_square(), tag()]);

    let shape = catalog.ty_by_name("Shape").unwrap();
    let circle = catalog.ty_by_name("Circle").unwrap();
    let square = catalog.ty_by_name("Square").unwrap();
    let rounded = catalog.ty_by_name("RoundedSquare").unwrap();
    let tag = catalog.ty_by_name("Tag").unwrap();

    let id = shape.member_by_name("Id").unwrap();
    assert!(id.is_declared_by(shape));
    assert!(id.is_declared_by(circle));
    assert!(id.is_declared_by(square));
    assert!(id.is_declared_by(rounded));
    assert!(!id.is_declared_by(tag));

    let side = square.member_by_name("Side").unwrap();
    assert!(side.is_declared_by(square));
    assert!(side.is_declared_by(rounded));
    assert!(!side.is_declared_by(shape));
    assert!(!side.is_declared_by(circle));
    assert!(!side.is_declared_by(tag));
}

#[test]
fn hierarchy_shares_the_root_table() {
    let catalog = build(vec![shape(), circle(), square(), rounded_square()]);

    let shape = catalog.ty_by_name("Shape").unwrap();
    let rounded = catalog.ty_by_name("RoundedSquare").unwrap();
    let square = catalog.ty_by_name("Square").unwrap();

    for ty in catalog.types() {
        assert_eq!(ty.table_name(), "shapes");
        assert!(ty.has_inheritance());
        assert_eq!(catalog.inheritance_root(ty.id()).id(), shape.id());
    }

    assert!(shape.is_root());
    assert_eq!(rounded.base(), Some(square.id()));
    assert_eq!(rounded.ancestors(), &[square.id(), shape.id()]);
    assert!(rounded.inherits_from(shape));
    assert!(!shape.inherits_from(rounded));

    let hierarchy: Vec<_> = catalog
        .hierarchy(shape)
        .into_iter()
        .map(MetaType::name)
        .collect();
    assert_eq!(hierarchy, vec!["Shape", "Circle", "Square", "RoundedSquare"]);
}

#[test]
fn discriminator_lookup() {
    let catalog = build(vec![shape(), circle(), square()]);

    let shape = catalog.ty_by_name("Shape").unwrap();
    let square = catalog.ty_by_name("Square").unwrap();

    // Codes are cast to the discriminator's type.
    assert_eq!(square.inheritance_code(), Some(&Value::I32(2)));

    let found = |code: i32| {
        catalog
            .type_for_discriminator(shape, &Value::I32(code))
            .map(MetaType::name)
    };

    assert_eq!(found(0), Some("Shape"));
    assert_eq!(found(1), Some("Circle"));
    assert_eq!(found(2), Some("Square"));
    assert_eq!(found(42), Some("Shape"));

    let kind = shape.discriminator_member().unwrap();
    assert_eq!(kind.name(), "Kind");
    assert!(!kind.can_be_null());
}

#[test]
fn declaration_order_does_not_matter() {
    let catalog = build(vec![rounded_square(), circle(), square(), shape()]);

    let rounded = catalog.ty_by_name("RoundedSquare").unwrap();
    assert_eq!(rounded.id(), TypeId(0));
    assert_eq!(
        names(rounded),
        vec!["Id", "Kind", "Name", "Side", "CornerRadius"]
    );
}

#[test]
fn unknown_base() {
    let err = build_err(vec![circle()]);
    assert_eq!(
        err.to_string(),
        "invalid mapping: type `Circle` derives from `Shape`, which is not mapped"
    );
}

#[test]
fn inheritance_cycle() {
    let err = build_err(vec![
        TypeDef::new("A").base("B"),
        TypeDef::new("B").base("A"),
    ]);
    assert!(err.to_string().contains("inheritance cycle"), "{err}");
}

#[test]
fn derived_type_cannot_declare_a_table() {
    let err = build_err(vec![shape(), circle().table("circles")]);
    assert!(
        err.to_string().contains("cannot declare its own table"),
        "{err}"
    );
}

#[test]
fn derived_type_cannot_redeclare_an_inherited_member() {
    let err = build_err(vec![
        shape(),
        circle().member(column("Name", stmt::Type::String)),
    ]);
    assert_eq!(
        err.to_string(),
        "invalid mapping: member `Circle::Name` is mapped more than once"
    );
}

#[test]
fn discriminator_belongs_to_the_root() {
    let err = build_err(vec![
        shape(),
        circle().member(column("SubKind", stmt::Type::I32).discriminator()),
    ]);
    assert!(
        err.to_string()
            .contains("must be declared by the inheritance root"),
        "{err}"
    );
}

#[test]
fn hierarchy_needs_a_discriminator() {
    let err = build_err(vec![
        TypeDef::new("Shape").member(column("Id", stmt::Type::I32).primary_key()),
        TypeDef::new("Circle").base("Shape"),
    ]);
    assert_eq!(
        err.to_string(),
        "invalid mapping: inheritance root `Shape` has no discriminator member"
    );

    let err = build_err(vec![
        TypeDef::new("Shape").member(column("Id", stmt::Type::I32).primary_key()),
        TypeDef::new("Circle").base("Shape").inheritance_code(1),
    ]);
    assert!(err.to_string().contains("has no discriminator"), "{err}");
}

#[test]
fn inheritance_codes_are_unique() {
    let err = build_err(vec![shape(), circle(), square().inheritance_code(1)]);
    assert!(err.to_string().contains("share inheritance code"), "{err}");
}

#[test]
fn inheritance_code_matches_the_discriminator_type() {
    let err = build_err(vec![shape(), circle().inheritance_code("circle")]);
    let message = err.to_string();

    assert!(
        message.starts_with(
            "invalid mapping: inheritance code of `Circle` does not match discriminator `Kind`"
        ),
        "{message}"
    );
    assert!(message.contains("cannot convert"), "{message}");
}

#[test]
fn single_inheritance_default() {
    let err = build_err(vec![shape(), circle().inheritance_default(), square()]);
    assert!(
        err.to_string().contains("more than one inheritance default"),
        "{err}"
    );
}
