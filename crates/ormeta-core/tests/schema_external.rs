use ormeta_core::schema::*;
use ormeta_core::stmt::{self, Value};

use pretty_assertions::assert_eq;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Row {
    values: HashMap<String, Value>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
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

fn bind(bindings: Bindings, ty: &str, members: &[&str]) -> Bindings {
    members.iter().fold(bindings, |bindings, member| {
        bindings.bind(ty, *member, MemberHandles::new(accessor(member)))
    })
}

const PEOPLE: &str = r#"{
    "types": [
        {
            "name": "Person",
            "table": "people",
            "members": [
                { "name": "Id", "type": "i32", "primary_key": true, "db_generated": true },
                { "name": "Name", "type": "string", "column": "full_name", "kind": "field" },
                { "name": "ReportsTo", "type": "i32", "can_be_null": true, "update_check": "when_changed" },
                {
                    "name": "Manager",
                    "association": {
                        "other_type": "Person",
                        "this_key": ["ReportsTo"],
                        "foreign_key": true,
                        "delete_rule": "SET NULL"
                    }
                },
                {
                    "name": "Reports",
                    "association": { "other_type": "Person", "other_key": ["ReportsTo"], "many": true }
                }
            ]
        }
    ]
}"#;

fn people_bindings() -> Bindings {
    bind(Bindings::new(), "Person", &["Id", "Name", "ReportsTo"])
}

#[test]
fn build_from_document() {
    init_tracing();

    let source = MappingSource::from_json(PEOPLE, people_bindings()).unwrap();
    assert_eq!(source.kind(), MappingSourceKind::External);

    let catalog = Builder::new().build(source).unwrap();
    let person = catalog.ty_by_name("Person").unwrap();

    assert_eq!(person.table_name(), "people");
    assert_eq!(person.members().len(), 5);

    let id = person.member(0).unwrap();
    assert_eq!(id.name(), "Id");
    assert!(id.is_primary_key());
    assert!(!id.can_be_null());
    assert_eq!(id.auto_sync(), AutoSync::OnInsert);
    assert_eq!(id.source(), MappingSourceKind::External);

    let name = person.member(1).unwrap();
    assert_eq!(name.mapped_name(), "full_name");
    assert!(name.member().is_field());
    assert!(name.can_be_null());

    let reports_to = person.member(2).unwrap();
    assert!(reports_to.can_be_null());
    assert_eq!(reports_to.update_check(), UpdateCheck::WhenChanged);

    let manager = person.member(3).unwrap();
    let association = manager.association().unwrap();
    assert!(association.is_foreign_key);
    assert_eq!(association.other_type, person.id());
    assert_eq!(association.delete_rule.as_deref(), Some("SET NULL"));
    assert_eq!(association.other_member, Some(person.id().member(4)));
    assert!(manager.member_accessor().is_none());

    let reports = person.member(4).unwrap();
    assert!(reports.association().unwrap().is_many);
    assert_eq!(reports.ty(), &stmt::Type::list(stmt::Type::Model(person.id())));
}

#[test]
fn bound_accessors_are_attached() {
    let catalog = Builder::new()
        .build(MappingSource::from_json(PEOPLE, people_bindings()).unwrap())
        .unwrap();
    let name = catalog.ty_by_name("Person").unwrap().member_by_name("Name").unwrap();

    let mut row = Row::default();
    name.member_accessor()
        .unwrap()
        .set(&mut row, Value::from("Ada"))
        .unwrap();

    assert_eq!(row.values["Name"], Value::from("Ada"));
    assert_eq!(
        name.storage_accessor().unwrap().get(&row).unwrap(),
        Value::from("Ada")
    );
}

#[test]
fn document_and_code_agree() {
    let external = Builder::new()
        .build(MappingSource::from_json(PEOPLE, people_bindings()).unwrap())
        .unwrap();

    let attribute = Builder::new()
        .build(vec![TypeDef::new("Person")
            .table("people")
            .member(
                MemberDef::column("Id", stmt::Type::I32)
                    .primary_key()
                    .db_generated()
                    .accessor(accessor("Id")),
            )
            .member(
                MemberDef::column("Name", stmt::Type::String)
                    .field()
                    .column_name("full_name")
                    .accessor(accessor("Name")),
            )
            .member(
                MemberDef::column("ReportsTo", stmt::Type::I32)
                    .nullable()
                    .update_check(UpdateCheck::WhenChanged)
                    .accessor(accessor("ReportsTo")),
            )
            .member(MemberDef::association(
                "Manager",
                AssociationDef::foreign_key("Person", &["ReportsTo"]).delete_rule("SET NULL"),
            ))
            .member(MemberDef::association(
                "Reports",
                AssociationDef::many("Person", &["ReportsTo"]),
            ))])
        .unwrap();

    let external = external.ty_by_name("Person").unwrap();
    let attribute = attribute.ty_by_name("Person").unwrap();

    for (a, b) in external.members().zip(attribute.members()) {
        assert_eq!(a.name(), b.name());
        assert_eq!(a.ordinal(), b.ordinal());
        assert_eq!(a.mapped_name(), b.mapped_name());
        assert_eq!(a.db_type(), b.db_type());
        assert_eq!(a.can_be_null(), b.can_be_null());
        assert_eq!(a.auto_sync(), b.auto_sync());
        assert_eq!(a.update_check(), b.update_check());
        assert_eq!(a.association(), b.association());
        assert_ne!(a.source(), b.source());
    }
}

#[test]
fn inheritance_codes_from_json() {
    let json = r#"{
        "types": [
            {
                "name": "Shape",
                "inheritance_code": 0,
                "is_inheritance_default": true,
                "members": [
                    { "name": "Id", "type": "i64", "primary_key": true },
                    { "name": "Kind", "type": "string", "discriminator": true }
                ]
            },
            { "name": "Circle", "base": "Shape", "inheritance_code": "circle" }
        ]
    }"#;

    let bindings = bind(Bindings::new(), "Shape", &["Id", "Kind"]);
    let err = Builder::new()
        .build(MappingSource::from_json(json, bindings).unwrap())
        .unwrap_err();

    // `0` cannot be stored in a string discriminator.
    assert!(err.is_invalid_mapping(), "{err}");
    assert!(
        err.to_string()
            .contains("inheritance code of `Shape` does not match discriminator `Kind`"),
        "{err}"
    );

    let json = json.replace(r#""inheritance_code": 0"#, r#""inheritance_code": "shape""#);
    let bindings = bind(Bindings::new(), "Shape", &["Id", "Kind"]);
    let catalog = Builder::new()
        .build(MappingSource::from_json(&json, bindings).unwrap())
        .unwrap();

    let shape = catalog.ty_by_name("Shape").unwrap();
    let circle = catalog
        .type_for_discriminator(shape, &Value::from("circle"))
        .unwrap();
    assert_eq!(circle.name(), "Circle");
    assert_eq!(shape.table_name(), "shape");
    assert_eq!(circle.table_name(), "shape");
}

#[test]
fn unmapped_member_from_json() {
    let json = r#"{
        "types": [
            {
                "name": "Session",
                "members": [
                    { "name": "Id", "type": "i64", "primary_key": true },
                    { "name": "Scratch", "type": "string", "persistent": false }
                ]
            }
        ]
    }"#;

    let catalog = Builder::new()
        .build(MappingSource::from_json(json, bind(Bindings::new(), "Session", &["Id"])).unwrap())
        .unwrap();
    let session = catalog.ty_by_name("Session").unwrap();

    let scratch = session.member_by_name("Scratch").unwrap();
    assert!(!scratch.is_persistent());
    assert!(!scratch.is_column());
    assert_eq!(scratch.db_type(), None);
    assert!(scratch.member_accessor().is_none());
    assert_eq!(
        session.column_members().map(Member::name).collect::<Vec<_>>(),
        ["Id"]
    );
}

#[test]
fn unmatched_binding() {
    let bindings = people_bindings().bind("Person", "Email", MemberHandles::new(accessor("Email")));
    let err = Builder::new()
        .build(MappingSource::from_json(PEOPLE, bindings).unwrap())
        .unwrap_err();

    assert!(err.is_invalid_mapping(), "{err}");
    assert_eq!(
        err.to_string(),
        "invalid mapping: binding for `Person::Email` does not match any mapped member"
    );
}

#[test]
fn missing_binding() {
    let bindings = bind(Bindings::new(), "Person", &["Id", "Name"]);
    let err = Builder::new()
        .build(MappingSource::from_json(PEOPLE, bindings).unwrap())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid mapping: persistent member `Person::ReportsTo` has no accessor"
    );
}

#[test]
fn member_types() {
    let missing = r#"{ "types": [ { "name": "Tag", "members": [ { "name": "Label" } ] } ] }"#;
    let err = Builder::new()
        .build(MappingSource::from_json(missing, Bindings::new()).unwrap())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid mapping: member `Tag::Label` has no type"
    );

    let unknown = r#"{ "types": [ { "name": "Tag", "members": [ { "name": "Label", "type": "decimal" } ] } ] }"#;
    let err = Builder::new()
        .build(MappingSource::from_json(unknown, Bindings::new()).unwrap())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid mapping: member `Tag::Label` has unknown type `decimal`"
    );
}

#[test]
fn deferred_member_needs_bound_handles() {
    let json = r#"{
        "types": [
            {
                "name": "Document",
                "members": [
                    { "name": "Id", "type": "i32", "primary_key": true },
                    { "name": "Body", "type": "string", "deferred": true }
                ]
            }
        ]
    }"#;

    let bindings = bind(Bindings::new(), "Document", &["Id", "Body"]);
    let err = Builder::new()
        .build(MappingSource::from_json(json, bindings).unwrap())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid mapping: deferred member `Document::Body` needs source and value accessors and a load method"
    );

    let bindings = bind(Bindings::new(), "Document", &["Id"]).bind(
        "Document",
        "Body",
        MemberHandles::new(accessor("Body")).deferred(
            accessor("BodySource"),
            accessor("BodyValue"),
            LoadMethod::new("load_body", |_| Ok(Value::from("loaded"))),
        ),
    );
    let catalog = Builder::new()
        .build(MappingSource::from_json(json, bindings).unwrap())
        .unwrap();

    let body = catalog.ty_by_name("Document").unwrap().member_by_name("Body").unwrap();
    assert!(body.is_deferred());
    assert_eq!(
        body.load_method().unwrap().invoke(&Row::default()).unwrap(),
        Value::from("loaded")
    );
}

#[test]
fn malformed_documents() {
    let err = MappingSource::from_json("{ \"types\": [", Bindings::new()).unwrap_err();
    assert!(!err.is_invalid_mapping());

    let unknown_field = r#"{ "types": [ { "name": "Tag", "tabel": "tags" } ] }"#;
    let err = MappingSource::from_json(unknown_field, Bindings::new()).unwrap_err();
    assert!(err.to_string().contains("unknown field `tabel`"), "{err}");

    let document = Document::from_json(r#"{ "types": [] }"#).unwrap();
    assert!(document.types.is_empty());
}
