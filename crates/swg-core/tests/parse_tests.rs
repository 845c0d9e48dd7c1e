use swg_core::error::ParseError;
use swg_core::ir::{HttpMethod, Parameter, Schema, StatusCode};
use swg_core::parse;

const PETSTORE: &str = include_str!("fixtures/petstore.json");
const PET_SHOP: &str = include_str!("fixtures/pet-shop.json");
const INVENTORY: &str = include_str!("fixtures/inventory.json");
const DANGLING: &str = include_str!("fixtures/dangling-ref.json");
const UNSUPPORTED: &str = include_str!("fixtures/unsupported-version.json");

#[test]
fn parse_petstore_raw() {
    let doc = parse::from_json(PETSTORE).expect("should parse petstore.json");
    assert_eq!(doc.swagger.as_deref(), Some("2.0"));
    let paths = doc.paths.as_ref().expect("should have paths");
    assert_eq!(paths.len(), 2);

    let pets = paths.get("/pets").expect("should have /pets");
    let get = pets.get.as_ref().expect("should have GET");
    assert_eq!(get.operation_id.as_deref(), Some("listPets"));
    assert_eq!(get.parameters.len(), 2);
    assert_eq!(doc.definitions.keys().collect::<Vec<_>>(), vec!["Pet", "Error"]);
}

#[test]
fn parse_petstore_specification() {
    let spec = parse::parse_specification("petstore.json", PETSTORE).unwrap();
    assert_eq!(spec.info.title, "Swagger Petstore");
    assert_eq!(spec.base_url(), "https://petstore.example.com/v1");
    assert_eq!(spec.operations().count(), 4);

    let (item, show) = spec
        .operations()
        .find(|(_, op)| op.operation_id.as_deref() == Some("showPetById"))
        .expect("should have showPetById");
    let params = item.effective_parameters(show);
    assert_eq!(params.len(), 1);
    assert!(matches!(params[0], Parameter::Path(p) if p.name == "petId" && p.required));

    let statuses: Vec<StatusCode> = show.responses.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![StatusCode::Code(200), StatusCode::Code(404), StatusCode::Default]
    );
}

#[test]
fn petstore_success_types() {
    let spec = parse::parse_specification("petstore.json", PETSTORE).unwrap();
    let pets = &spec.paths[0];

    let list = pets.operation(HttpMethod::Get).unwrap();
    let success = list.canonical_success().unwrap();
    assert_eq!(success.schema.as_ref().unwrap().shape(), "[&Pet]");

    let add = pets.operation(HttpMethod::Post).unwrap();
    assert_eq!(add.canonical_success().unwrap().status, StatusCode::Code(201));
    assert!(add.oauth_secured);
    assert!(!list.oauth_secured);
}

#[test]
fn petstore_pet_status_enum() {
    let spec = parse::parse_specification("petstore.json", PETSTORE).unwrap();
    let Some(Schema::Object(pet)) = spec.definition("Pet") else {
        panic!("Pet should be an object");
    };
    let status = pet.property("status").expect("should have status");
    let Schema::Primitive(p) = &status.schema else {
        panic!("status should be primitive");
    };
    assert_eq!(p.enum_values, vec!["available", "pending", "sold"]);
    assert!(pet.property("id").unwrap().required);
    assert!(!pet.property("tag").unwrap().required);
}

#[test]
fn parse_inventory_edge_cases() {
    let spec = parse::parse_specification("inventory.json", INVENTORY).unwrap();
    assert_eq!(spec.base_url(), "http://inventory.local/api");

    let update = spec
        .operations()
        .map(|(_, op)| op)
        .find(|op| op.operation_id.as_deref() == Some("updateItem"))
        .unwrap();
    assert_eq!(update.success_ambiguity(), vec![202]);

    assert!(spec.definition("Page[Item]").is_some());
    assert!(spec.definition("Sku").unwrap().shape().starts_with("string"));
    assert_eq!(spec.definition("Labels").unwrap().shape(), "[string]");

    let (_, stock) = spec
        .operations()
        .find(|(_, op)| op.operation_id.as_deref() == Some("getStock"))
        .unwrap();
    let schema = stock.canonical_success().unwrap().schema.as_ref().unwrap();
    assert_eq!(schema.shape(), "{;*:integer/int32}");
}

#[test]
fn dangling_reference_parses() {
    // Definitions resolve lazily, so a missing target is not a parse error.
    let spec = parse::parse_specification("dangling-ref.json", DANGLING).unwrap();
    assert!(spec.definition("Missing").is_none());
}

#[test]
fn parse_unsupported_version() {
    let err = parse::from_json(UNSUPPORTED).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "1.2"));
}

#[test]
fn batch_keeps_going_after_failure() {
    let results = parse::parse_batch([
        ("petstore.json", PETSTORE),
        ("unsupported-version.json", UNSUPPORTED),
        ("pet-shop.json", PET_SHOP),
    ]);
    assert_eq!(results.len(), 3);
    assert!(!results[0].is_errored());
    assert!(results[1].is_errored());
    assert_eq!(results[1].source_id, "unsupported-version.json");
    assert_eq!(
        results[2].specification().map(|s| s.info.title.as_str()),
        Some("Pet Shop")
    );
}
