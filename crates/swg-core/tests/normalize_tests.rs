use swg_core::transform::NameNormalizer;
use swg_core::transform::name_normalizer::{class_operation_name, route_operation_name};

const NORMALIZERS: [NameNormalizer; 2] = [NameNormalizer::new("object"), NameNormalizer::new("any")];

fn printable_ascii() -> impl Iterator<Item = char> {
    (0x20u8..=0x7e).map(char::from)
}

#[test]
fn normalize_is_idempotent_for_single_chars() {
    for normalizer in NORMALIZERS {
        for c in printable_ascii() {
            let once = normalizer.normalize(&c.to_string());
            assert_eq!(normalizer.normalize(&once), once, "input {c:?}");
        }
    }
}

#[test]
fn normalize_is_idempotent_for_char_pairs() {
    for normalizer in NORMALIZERS {
        for a in printable_ascii() {
            for b in printable_ascii() {
                let input: String = [a, b].iter().collect();
                let once = normalizer.normalize(&input);
                assert_eq!(normalizer.normalize(&once), once, "input {input:?}");
            }
        }
    }
}

#[test]
fn normalize_is_idempotent_for_tricky_names() {
    let inputs = [
        "",
        " ",
        "object",
        "OBJECT",
        "Foo[Bar]",
        "Foo[Bar[Baz]]",
        "]Foo[",
        "[[]]",
        "Map[string,Pet]",
        "Page[Item]Result",
        "9lives",
        "_private",
        "pet store",
        "a-b_c.d/e",
        "List[object]",
        "#/definitions/Pet",
    ];
    for normalizer in NORMALIZERS {
        for input in inputs {
            let once = normalizer.normalize(input);
            assert_eq!(normalizer.normalize(&once), once, "input {input:?}");
            assert!(!once.is_empty());
            assert!(
                once.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
                "{once:?} is not an identifier"
            );
            assert!(!once.starts_with(|c: char| c.is_ascii_digit()));
        }
    }
}

#[test]
fn normalize_generic_names() {
    let normalizer = NameNormalizer::new("any");
    assert_eq!(normalizer.normalize("Page[Item]"), "PageOfItem");
    assert_eq!(normalizer.normalize("Map[string,Pet]"), "MapOfstringPet");
    assert_eq!(normalizer.normalize("List[object]"), "ListOfobject");
}

#[test]
fn synthesized_operation_names() {
    assert_eq!(class_operation_name("GET", "/orders/{orderId}"), "GetOrders");
    assert_eq!(route_operation_name("GET", "/orders/{orderId}"), "getOrdersByOrderId");
}
