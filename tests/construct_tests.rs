//! Construction from hand-written event streams.

use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use yaml_bind::{
    construct, construct_all, notation, Error, Event, EventStream, OrderedMap, TagLibrary,
};

fn load<T: yaml_bind::Construct>(text: &str) -> yaml_bind::Result<T> {
    let mut tags = TagLibrary::core();
    let mut stream = notation::parse(text, &mut tags)?;
    construct(&mut stream, &mut tags)
}

fn doc(body: &str) -> String {
    format!("+DOC\n{}\n-DOC", body)
}

fn scalar(content: &str) -> String {
    doc(&format!("=VAL :{}", content))
}

fn construction_message(err: Error) -> String {
    match err {
        Error::Construction { msg, .. } => msg,
        other => panic!("expected a construction error, got {:?}", other),
    }
}

#[test]
fn test_booleans_accept_every_spelling() {
    for word in ["y", "Y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON"] {
        assert!(load::<bool>(&scalar(word)).unwrap(), "{}", word);
    }
    for word in ["n", "no", "No", "false", "FALSE", "off", "OFF"] {
        assert!(!load::<bool>(&scalar(word)).unwrap(), "{}", word);
    }
    assert!(load::<bool>(&scalar("maybe")).is_err());
    assert!(load::<bool>(&scalar("1")).is_err());
}

#[test]
fn test_floats_and_specials() {
    assert_eq!(load::<f64>(&scalar("1.5")).unwrap(), 1.5);
    assert_eq!(load::<f64>(&scalar("-2e3")).unwrap(), -2000.0);
    assert_eq!(load::<f64>(&scalar("1_000.25")).unwrap(), 1000.25);
    assert_eq!(load::<f64>(&scalar("7")).unwrap(), 7.0);
    assert_eq!(load::<f64>(&scalar(".inf")).unwrap(), f64::INFINITY);
    assert_eq!(load::<f64>(&scalar("-.inf")).unwrap(), f64::NEG_INFINITY);
    assert!(load::<f64>(&scalar(".nan")).unwrap().is_nan());
    assert_eq!(load::<f32>(&scalar(".Inf")).unwrap(), f32::INFINITY);
    assert!(load::<f64>(&scalar("one")).is_err());
}

#[test]
fn test_integer_width_is_checked() {
    assert_eq!(load::<i8>(&scalar("-128")).unwrap(), -128);
    assert!(load::<i8>(&scalar("128")).is_err());
    assert!(load::<u32>(&scalar("-1")).is_err());
    assert_eq!(
        load::<u128>(&scalar("340282366920938463463374607431768211455")).unwrap(),
        u128::MAX
    );
    assert!(load::<i64>(&scalar("12abc")).is_err());
}

#[test]
fn test_construction_error_names_type_and_position() {
    let err = load::<u16>("+DOC\n+SEQ\n=VAL :1\n=VAL :lots\n-SEQ\n-DOC").unwrap_err();
    match &err {
        Error::Construction {
            expected, msg, mark, ..
        } => {
            assert_eq!(expected, "u16");
            assert!(msg.contains("lots"));
            let mark = mark.as_ref().unwrap();
            assert_eq!(mark.line, 4);
            assert_eq!(mark.line_text, "=VAL :lots");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(err.to_string().contains("line 4"));
}

#[test]
fn test_sets_collapse_duplicates() {
    let text = doc("+SEQ\n=VAL :b\n=VAL :a\n=VAL :b\n-SEQ");
    let set: BTreeSet<String> = load(&text).unwrap();
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);

    let set: HashSet<String> = load(&text).unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_fixed_arrays_check_arity() {
    let three: [u8; 3] = load(&doc("+SEQ\n=VAL :1\n=VAL :2\n=VAL :3\n-SEQ")).unwrap();
    assert_eq!(three, [1, 2, 3]);

    let err = load::<[u8; 3]>(&doc("+SEQ\n=VAL :1\n=VAL :2\n-SEQ")).unwrap_err();
    assert_eq!(construction_message(err), "too few values");

    let err = load::<[u8; 3]>(&doc("+SEQ\n=VAL :1\n=VAL :2\n=VAL :3\n=VAL :4\n-SEQ")).unwrap_err();
    assert_eq!(construction_message(err), "too many values");
}

#[test]
fn test_maps_reject_duplicate_keys() {
    let text = doc("+MAP\n=VAL :a\n=VAL :1\n=VAL :a\n=VAL :2\n-MAP");
    assert_eq!(
        construction_message(load::<HashMap<String, u8>>(&text).unwrap_err()),
        "duplicate key"
    );
    assert_eq!(
        construction_message(load::<BTreeMap<String, u8>>(&text).unwrap_err()),
        "duplicate key"
    );
    assert_eq!(
        construction_message(load::<IndexMap<String, u8>>(&text).unwrap_err()),
        "duplicate key"
    );
}

#[test]
fn test_index_map_keeps_document_order() {
    let map: IndexMap<String, u8> =
        load(&doc("+MAP\n=VAL :z\n=VAL :1\n=VAL :a\n=VAL :2\n-MAP")).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a"]);
}

#[test]
fn test_ordered_map_from_pairs() {
    let map: OrderedMap<String, i32> = load(&doc(
        "+SEQ\n+MAP\n=VAL :second\n=VAL :2\n-MAP\n+MAP\n=VAL :first\n=VAL :1\n-MAP\n-SEQ",
    ))
    .unwrap();
    let entries: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(entries, vec![("second", 2), ("first", 1)]);

    let tagged = "+SEQ <tag:yaml-bind.rs,2024:omap(tag:yaml.org,2002:str;tag:yaml.org,2002:int)>\n\
                  +MAP\n=VAL :k\n=VAL :0\n-MAP\n-SEQ";
    let map: OrderedMap<String, i32> = load(&doc(tagged)).unwrap();
    assert_eq!(map.get("k"), Some(&0));
}

#[test]
fn test_null_handling() {
    assert_eq!(load::<Option<u8>>(&scalar("~")).unwrap(), None);
    assert_eq!(load::<Option<u8>>(&scalar("null")).unwrap(), None);
    assert_eq!(load::<Option<u8>>(&scalar("")).unwrap(), None);
    assert_eq!(
        load::<Option<u8>>(&doc("=VAL <tag:yaml.org,2002:null> :")).unwrap(),
        None
    );
    assert_eq!(load::<Option<u8>>(&scalar("3")).unwrap(), Some(3));
    assert_eq!(
        load::<Option<String>>(&doc("=VAL <!> :null")).unwrap(),
        Some("null".to_string())
    );
    assert_eq!(
        load::<Option<Vec<u8>>>(&doc("+SEQ\n-SEQ")).unwrap(),
        Some(Vec::new())
    );
}

#[test]
fn test_shape_mismatch() {
    let err = load::<Vec<u8>>(&scalar("1")).unwrap_err();
    assert_eq!(
        construction_message(err),
        "expected sequence start, found scalar"
    );
    let err = load::<String>(&doc("+MAP\n-MAP")).unwrap_err();
    assert_eq!(construction_message(err), "expected scalar, found mapping start");
}

#[test]
fn test_composite_tags_are_checked() {
    let mut tags = TagLibrary::core();
    let seq_of_int = "tag:yaml-bind.rs,2024:seq(tag:yaml.org,2002:int)";
    let text = format!("+DOC\n+SEQ <{}>\n=VAL :1\n-SEQ\n-DOC", seq_of_int);
    let mut stream = notation::parse(&text, &mut tags).unwrap();
    assert_eq!(construct::<Vec<i64>>(&mut stream, &mut tags).unwrap(), vec![1]);

    let mut stream = notation::parse(&text, &mut tags).unwrap();
    let err = construct::<Vec<String>>(&mut stream, &mut tags).unwrap_err();
    assert!(construction_message(err).starts_with("wrong tag"));
}

#[test]
fn test_several_documents() {
    let text = "+STR\n+DOC\n+SEQ\n=VAL :a\n-SEQ\n-DOC\n+DOC\n+SEQ\n-SEQ\n-DOC\n-STR";
    let mut tags = TagLibrary::core();
    let mut stream = notation::parse(text, &mut tags).unwrap();
    let docs: Vec<Vec<String>> = construct_all(&mut stream, &mut tags).unwrap();
    assert_eq!(docs, vec![vec!["a".to_string()], vec![]]);
}

#[test]
fn test_truncated_stream_is_a_stream_error() {
    let err = load::<Vec<u8>>("+DOC\n+SEQ\n=VAL :1").unwrap_err();
    assert!(matches!(err, Error::Stream { .. }));
}

#[test]
fn test_backend_failure_keeps_its_cause() {
    use std::error::Error as _;

    let items: Vec<Result<Event, std::fmt::Error>> = vec![
        Ok(Event::StartDocument),
        Ok(Event::start_sequence()),
        Err(std::fmt::Error),
    ];
    let mut tags = TagLibrary::core();
    let mut stream = EventStream::from_results(items.into_iter());
    let err = construct::<Vec<u8>>(&mut stream, &mut tags).unwrap_err();
    assert!(matches!(err, Error::Stream { .. }));
    assert!(err.source().is_some());
}

#[test]
fn test_missing_document_start() {
    let err = load::<u8>("=VAL :1").unwrap_err();
    assert_eq!(
        construction_message(err),
        "expected document start, found scalar"
    );
}
