//! Shared and cyclic references through anchors and aliases.

use std::cell::RefCell;
use std::rc::Rc;
use yaml_bind::{
    construct, construct_all, notation, represent, represent_all, yaml_object, AnchorStyle,
    Error, Event, EventStream, RepresentOptions, TagLibrary,
};

yaml_object! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Leaf {
        pub label: String,
    }
}

yaml_object! {
    #[derive(Default)]
    pub struct Pair {
        pub left: Rc<RefCell<Leaf>>,
        pub right: Rc<RefCell<Leaf>>,
    }
}

yaml_object! {
    #[derive(Default)]
    pub struct Node {
        pub name: String,
        pub next: Option<Rc<RefCell<Node>>>,
    }
}

fn leaf(label: &str) -> Rc<RefCell<Leaf>> {
    Rc::new(RefCell::new(Leaf {
        label: label.to_string(),
    }))
}

fn node(name: &str) -> Rc<RefCell<Node>> {
    Rc::new(RefCell::new(Node {
        name: name.to_string(),
        next: None,
    }))
}

fn events_of<T: yaml_bind::Represent>(value: &T, style: AnchorStyle) -> Vec<Event> {
    let mut tags = TagLibrary::core();
    represent(value, &mut tags, &RepresentOptions::new().with_anchor_style(style))
        .unwrap()
        .collect::<yaml_bind::Result<_>>()
        .unwrap()
}

fn round_trip<T>(value: &T, style: AnchorStyle) -> T
where
    T: yaml_bind::Represent + yaml_bind::Construct,
{
    let mut tags = TagLibrary::core();
    let options = RepresentOptions::new().with_anchor_style(style);
    let mut stream = represent(value, &mut tags, &options).unwrap();
    construct(&mut stream, &mut tags).unwrap()
}

fn count(events: &[Event]) -> (usize, usize) {
    let anchors = events.iter().filter(|e| e.anchor().is_some()).count();
    let aliases = events
        .iter()
        .filter(|e| matches!(e, Event::Alias { .. }))
        .count();
    (anchors, aliases)
}

#[test]
fn test_sharing_survives_round_trip() {
    for style in [AnchorStyle::Tidy, AnchorStyle::Always] {
        let shared = leaf("common");
        let pair = Pair {
            left: shared.clone(),
            right: shared,
        };
        let back = round_trip(&pair, style);
        assert!(Rc::ptr_eq(&back.left, &back.right), "{:?}", style);
        assert_eq!(back.left.borrow().label, "common");
    }
}

#[test]
fn test_distinct_references_stay_distinct() {
    let pair = Pair {
        left: leaf("same"),
        right: leaf("same"),
    };
    let back = round_trip(&pair, AnchorStyle::Tidy);
    assert!(!Rc::ptr_eq(&back.left, &back.right));
    assert_eq!(*back.left.borrow(), *back.right.borrow());
}

#[test]
fn test_tidy_anchors_only_shared_references() {
    let shared = leaf("s");
    let value = vec![shared.clone(), leaf("once"), shared.clone(), shared];
    let events = events_of(&value, AnchorStyle::Tidy);
    assert_eq!(count(&events), (1, 2));

    let lonely = vec![leaf("a"), leaf("b")];
    assert_eq!(count(&events_of(&lonely, AnchorStyle::Tidy)), (0, 0));
}

#[test]
fn test_tidy_renumbers_in_first_occurrence_order() {
    let first = leaf("first");
    let second = leaf("second");
    let value = vec![leaf("x"), first.clone(), second.clone(), second, first];
    let mut tags = TagLibrary::core();
    let events: Vec<Event> = represent(&value, &mut tags, &RepresentOptions::new())
        .unwrap()
        .collect::<yaml_bind::Result<_>>()
        .unwrap();
    let text = notation::render(&events, &tags).unwrap();
    assert_eq!(
        text,
        "+DOC\n+SEQ\n\
         +MAP\n=VAL :label\n=VAL :x\n-MAP\n\
         +MAP &a1\n=VAL :label\n=VAL :first\n-MAP\n\
         +MAP &a2\n=VAL :label\n=VAL :second\n-MAP\n\
         =ALI *a2\n=ALI *a1\n-SEQ\n-DOC\n"
    );
}

#[test]
fn test_always_anchors_every_reference() {
    let shared = leaf("s");
    let value = vec![shared.clone(), leaf("once"), shared];
    let events = events_of(&value, AnchorStyle::Always);
    assert_eq!(count(&events), (2, 1));
    assert_eq!(events[2].anchor().map(|a| a.0), Some(1));
    assert_eq!(
        events
            .iter()
            .filter_map(Event::anchor)
            .map(|a| a.0)
            .collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn test_cycle_round_trips() {
    for style in [AnchorStyle::Tidy, AnchorStyle::Always] {
        let a = node("a");
        let b = node("b");
        a.borrow_mut().next = Some(b.clone());
        b.borrow_mut().next = Some(a.clone());

        let back = round_trip(&a, style);
        let next = back.borrow().next.clone().unwrap();
        assert_eq!(next.borrow().name, "b");
        let again = next.borrow().next.clone().unwrap();
        assert!(Rc::ptr_eq(&again, &back), "{:?}", style);

        a.borrow_mut().next = None;
        back.borrow_mut().next = None;
    }
}

#[test]
fn test_cycle_notation() {
    let a = node("a");
    let b = node("b");
    a.borrow_mut().next = Some(b.clone());
    b.borrow_mut().next = Some(a.clone());

    let mut tags = TagLibrary::core();
    let events: Vec<Event> = represent(&a, &mut tags, &RepresentOptions::new())
        .unwrap()
        .collect::<yaml_bind::Result<_>>()
        .unwrap();
    assert_eq!(
        notation::render(&events, &tags).unwrap(),
        "+DOC\n+MAP &a1\n=VAL :name\n=VAL :a\n=VAL :next\n\
         +MAP\n=VAL :name\n=VAL :b\n=VAL :next\n=ALI *a1\n-MAP\n-MAP\n-DOC\n"
    );
    a.borrow_mut().next = None;
}

#[test]
fn test_self_reference_from_notation() {
    let mut tags = TagLibrary::core();
    let mut stream = notation::parse(
        "+DOC\n+MAP &me\n=VAL :name\n=VAL :loop\n=VAL :next\n=ALI *me\n-MAP\n-DOC",
        &mut tags,
    )
    .unwrap();
    let back: Rc<RefCell<Node>> = construct(&mut stream, &mut tags).unwrap();
    let next = back.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&back, &next));
    back.borrow_mut().next = None;
}

#[test]
fn test_none_style_writes_copies() {
    let shared = leaf("s");
    let pair = Pair {
        left: shared.clone(),
        right: shared,
    };
    let events = events_of(&pair, AnchorStyle::None);
    assert_eq!(count(&events), (0, 0));

    let back = round_trip(&pair, AnchorStyle::None);
    assert!(!Rc::ptr_eq(&back.left, &back.right));
    assert_eq!(*back.left.borrow(), *back.right.borrow());
}

#[test]
fn test_none_style_rejects_cycles() {
    let a = node("a");
    a.borrow_mut().next = Some(a.clone());

    let mut tags = TagLibrary::core();
    let options = RepresentOptions::new().with_anchor_style(AnchorStyle::None);
    let err = represent(&a, &mut tags, &options).err().unwrap();
    match err {
        Error::CyclicReference { type_name } => assert!(type_name.ends_with("Node")),
        other => panic!("expected a cycle error, got {:?}", other),
    }
    a.borrow_mut().next = None;
}

#[test]
fn test_anchors_are_scoped_to_documents() {
    let first = leaf("one");
    let second = leaf("two");
    let docs = vec![
        vec![first.clone(), first],
        vec![second.clone(), second],
    ];

    let mut tags = TagLibrary::core();
    let mut events = Vec::new();
    represent_all(&docs, &mut tags, &RepresentOptions::new(), &mut events).unwrap();
    let anchors: Vec<u32> = events.iter().filter_map(Event::anchor).map(|a| a.0).collect();
    assert_eq!(anchors, vec![1, 1]);

    let mut stream = EventStream::from_events(events);
    let back: Vec<Vec<Rc<RefCell<Leaf>>>> = construct_all(&mut stream, &mut tags).unwrap();
    assert_eq!(back.len(), 2);
    assert!(Rc::ptr_eq(&back[1][0], &back[1][1]));
    assert_eq!(back[1][0].borrow().label, "two");
    assert!(!Rc::ptr_eq(&back[0][0], &back[1][0]));
}

#[test]
fn test_alias_to_previous_document_is_unknown() {
    let mut tags = TagLibrary::core();
    let mut stream = notation::parse(
        "+DOC\n+SEQ\n=VAL &a1 :x\n-SEQ\n-DOC\n+DOC\n+SEQ\n=ALI *a1\n-SEQ\n-DOC",
        &mut tags,
    )
    .unwrap();
    let err = construct_all::<Vec<Rc<RefCell<String>>>>(&mut stream, &mut tags).unwrap_err();
    assert!(matches!(err, Error::UnknownAnchor(_)));
}

type Byte = Rc<RefCell<u8>>;
type Wrapper = Rc<RefCell<Option<Byte>>>;

fn byte(value: u8) -> Byte {
    Rc::new(RefCell::new(value))
}

fn wrapper(inner: &Byte) -> Wrapper {
    Rc::new(RefCell::new(Some(inner.clone())))
}

fn notation_of<T: yaml_bind::Represent>(value: &T, style: AnchorStyle) -> String {
    let tags = TagLibrary::core();
    let events = events_of(value, style);
    assert_aliases_follow_anchors(&events);
    notation::render(&events, &tags).unwrap()
}

fn assert_aliases_follow_anchors(events: &[Event]) {
    let mut defined = Vec::new();
    for event in events {
        match event {
            Event::Alias { target } => {
                assert!(defined.contains(target), "alias *{} precedes its anchor", target)
            }
            other => defined.extend(other.anchor()),
        }
    }
}

fn wrapped(outer: &Wrapper) -> Byte {
    outer.borrow().clone().unwrap()
}

#[test]
fn test_reference_opening_with_new_reference_shares_its_anchor() {
    for style in [AnchorStyle::Tidy, AnchorStyle::Always] {
        let outer = wrapper(&byte(5));
        let value = (outer.clone(), outer);
        assert_eq!(
            notation_of(&value, style),
            "+DOC\n+MAP\n=VAL <!> :0\n=VAL &a1 :5\n=VAL <!> :1\n=ALI *a1\n-MAP\n-DOC\n",
            "{:?}",
            style
        );

        let back = round_trip(&value, style);
        assert!(Rc::ptr_eq(&back.0, &back.1), "{:?}", style);
        assert_eq!(*wrapped(&back.0).borrow(), 5);
    }
}

#[test]
fn test_alias_to_inner_reference_of_anchored_wrapper() {
    for style in [AnchorStyle::Tidy, AnchorStyle::Always] {
        let inner = byte(5);
        let value = (wrapper(&inner), inner);
        assert_eq!(
            notation_of(&value, style),
            "+DOC\n+MAP\n=VAL <!> :0\n=VAL &a1 :5\n=VAL <!> :1\n=ALI *a1\n-MAP\n-DOC\n"
        );

        let back = round_trip(&value, style);
        assert!(Rc::ptr_eq(&wrapped(&back.0), &back.1), "{:?}", style);
    }
}

#[test]
fn test_reference_opening_with_alias_binds_to_that_anchor() {
    let inner = byte(2);
    let outer = wrapper(&inner);
    let value = (inner.clone(), outer.clone(), outer, byte(7));

    assert_eq!(
        notation_of(&value, AnchorStyle::Always),
        "+DOC\n+MAP\n=VAL <!> :0\n=VAL &a1 :2\n=VAL <!> :1\n=ALI *a1\n\
         =VAL <!> :2\n=ALI *a1\n=VAL <!> :3\n=VAL &a2 :7\n-MAP\n-DOC\n"
    );
    assert_eq!(
        notation_of(&value, AnchorStyle::Tidy),
        "+DOC\n+MAP\n=VAL <!> :0\n=VAL &a1 :2\n=VAL <!> :1\n=ALI *a1\n\
         =VAL <!> :2\n=ALI *a1\n=VAL <!> :3\n=VAL :7\n-MAP\n-DOC\n"
    );

    for style in [AnchorStyle::Tidy, AnchorStyle::Always] {
        let back = round_trip(&value, style);
        assert!(Rc::ptr_eq(&back.1, &back.2), "{:?}", style);
        assert!(Rc::ptr_eq(&wrapped(&back.1), &back.0), "{:?}", style);
        assert!(!Rc::ptr_eq(&back.0, &back.3));
        assert_eq!(*back.3.borrow(), 7);
    }
}

#[test]
fn test_wrappers_of_one_reference_cannot_share_an_alias() {
    let inner = byte(2);
    let outer = wrapper(&inner);
    let value = (wrapper(&inner), outer.clone(), outer);

    for style in [AnchorStyle::Tidy, AnchorStyle::Always] {
        let mut tags = TagLibrary::core();
        let options = RepresentOptions::new().with_anchor_style(style);
        match represent(&value, &mut tags, &options).err() {
            Some(Error::UnanchorableReference { type_name }) => {
                assert!(type_name.contains("Option"), "{}", type_name)
            }
            other => panic!("expected an unanchorable reference, got {:?}", other),
        }
    }

    let back = round_trip(&value, AnchorStyle::None);
    assert!(!Rc::ptr_eq(&back.1, &back.2));
    assert_eq!(*wrapped(&back.2).borrow(), 2);
}
