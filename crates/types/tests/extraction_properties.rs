//! Laws of path traversal and field extraction, checked against realistic
//! response trees.

use pretty_assertions::assert_eq;
use types::codec::{self, Codec, LONG};
use types::{record, Field, FieldError, Path, Segment, Value};

fn instance() -> Value {
    Value::parse(
        r#"{
            "ref": {"@ref": "classes/characters/181388642114077184"},
            "class": {"@ref": "classes/characters"},
            "ts": {"@ts": "2017-01-05T12:00:00.123Z"},
            "data": {
                "name": "Taran",
                "born": {"@date": "1970-03-14"},
                "spells": [
                    {"@ref": "classes/spells/181388642046968320"},
                    {"@ref": "classes/spells/181388642071085568"}
                ],
                "stats": {"hp": [10, 12, 15], "level": 3}
            }
        }"#,
    )
    .unwrap()
}

/// Every path that can be built from existing segments of `value`.
fn all_paths(value: &Value) -> Vec<Path> {
    let mut paths = vec![Path::empty()];
    let mut i = 0;
    while i < paths.len() {
        let path = paths[i].clone();
        let node = path.get(value).unwrap();
        let children: Vec<Segment> = match node {
            Value::Object(members) => members.keys().cloned().map(Segment::Key).collect(),
            Value::Array(items) => (0..items.len()).map(Segment::Index).collect(),
            _ => Vec::new(),
        };
        for child in children {
            paths.push(path.sub_path(&Path::from_segments([child])));
        }
        i += 1;
    }
    paths
}

#[test]
fn existing_paths_always_resolve_to_the_navigated_sub_value() {
    let root = instance();
    for path in all_paths(&root) {
        let mut expected = &root;
        for segment in path.segments() {
            expected = match (segment, expected) {
                (Segment::Key(k), Value::Object(members)) => &members[k],
                (Segment::Index(i), Value::Array(items)) => &items[*i],
                _ => unreachable!("all_paths only builds valid paths"),
            };
        }
        assert_eq!(path.get(&root), Ok(expected), "path {path}");
    }
}

#[test]
fn traversal_is_associative_over_sub_path() {
    let root = instance();
    let paths = all_paths(&root);
    for p1 in &paths {
        let Ok(inner) = p1.get(&root) else { continue };
        for p2 in all_paths(inner) {
            assert_eq!(p1.sub_path(&p2).get(&root), p2.get(inner));
        }
    }
}

#[test]
fn empty_path_is_identity() {
    for value in [instance(), Value::Null, Value::Long(3), Value::array([])] {
        assert_eq!(Path::empty().get(&value), Ok(&value));
    }
}

#[test]
fn composed_field_equals_flat_field() {
    let root = Value::parse(r#"{"a": {"b": 42}}"#).unwrap();
    let composed = Field::keys(["a"]).at(&Field::keys(["b"]));
    let flat = Field::keys(["a", "b"]);

    assert_eq!(composed.get(&root), Ok(Value::Long(42)));
    assert_eq!(composed.get(&root), flat.get(&root));
    assert_eq!(composed, flat);
}

#[test]
fn collect_decodes_all_elements_or_reports_failing_index() {
    let ints = Field::of(LONG).collect(&Field::of(LONG));

    let good = Value::parse("[1, 2, 3]").unwrap();
    assert_eq!(ints.get(&good), Ok(vec![1, 2, 3]));

    let bad = Value::parse(r#"[1, "x", 3]"#).unwrap();
    let err = ints.get(&bad).unwrap_err();
    let FieldError::Collect { failures } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Path::from_indexes([1]));
    assert!(err.to_string().contains("\"1\""));
}

#[test]
fn missing_key_failure_names_the_key() {
    let root = Value::parse(r#"{"a": 1}"#).unwrap();
    let err = Field::keys(["missing"]).get(&root).unwrap_err().to_string();
    assert!(err.contains("missing"));
    assert!(err.contains("not found"));
}

#[test]
fn domain_values_extract_through_typed_codecs() {
    let root = instance();

    let ts = Field::keys(["ts"]).to(codec::TIMESTAMP).get(&root).unwrap();
    assert_eq!(ts.to_string(), "2017-01-05T12:00:00.123Z");

    let born = Field::keys(["data", "born"]).to(codec::DATE).get(&root).unwrap();
    assert_eq!(born.to_string(), "1970-03-14");

    let spells = Field::keys(["data", "spells"]).collect(&Field::of(codec::REF)).get(&root).unwrap();
    assert_eq!(spells.len(), 2);
    assert!(spells.iter().all(|r| r.as_str().starts_with("classes/spells/")));

    let max_hp = Field::keys(["data", "stats", "hp"])
        .at(&Field::indexes([2]).to(LONG))
        .get(&root);
    assert_eq!(max_hp, Ok(15));
}

#[derive(Debug, PartialEq)]
struct Character {
    name: String,
    level: i64,
    hp: Vec<i64>,
}

record! { Character { name, level, hp } }

#[test]
fn records_decode_from_nested_objects() {
    let root = Value::parse(r#"{"data": {"name": "Eilonwy", "level": 4, "hp": [8, 9]}}"#).unwrap();
    let character = Field::keys(["data"]).to_type::<Character>().get(&root);
    assert_eq!(
        character,
        Ok(Character { name: "Eilonwy".to_string(), level: 4, hp: vec![8, 9] })
    );
}

#[test]
fn builtin_codecs_round_trip_values_from_the_wire() {
    let root = instance();
    let timestamp = Field::keys(["ts"]).to(codec::TIMESTAMP).get(&root).unwrap();
    assert_eq!(codec::TIMESTAMP.decode(&codec::TIMESTAMP.encode(&timestamp).unwrap()), Ok(timestamp));

    let reference = Field::keys(["ref"]).to(codec::REF).get(&root).unwrap();
    assert_eq!(codec::REF.decode(&codec::REF.encode(&reference).unwrap()), Ok(reference));
}
