//! Structural properties over generated element trees.

use std::collections::BTreeMap;

use proptest::prelude::*;
use spark_fiber::{
    create_element, flush, mount, text_element, Child, EffectTag, Element, ElementKind, Engine,
    MemoryHost, MemoryNode, Props, Value,
};

/// Plain description of a tree, turned into elements per test case.
#[derive(Debug, Clone)]
enum Shape {
    Empty,
    Text(String),
    Node {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<Shape>,
    },
}

impl Shape {
    fn build(&self) -> Element {
        self.slot().expect("root shapes are never empty")
    }

    fn slot(&self) -> Option<Element> {
        match self {
            Shape::Empty => None,
            Shape::Text(text) => Some(text_element(text.clone())),
            Shape::Node {
                tag,
                attributes,
                children,
            } => {
                let props = attributes
                    .iter()
                    .fold(Props::new(), |props, (k, v)| props.with(k.clone(), v.clone()));
                let children = children.iter().map(|c| Child::from(c.slot())).collect();
                Some(create_element(tag.clone(), props, children))
            }
        }
    }
}

fn shape() -> impl Strategy<Value = Shape> {
    let tag = prop::sample::select(vec!["div", "span", "p", "ul", "li"]).prop_map(String::from);
    let attributes = prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..3);

    let leaf = prop_oneof![
        1 => Just(Shape::Empty),
        3 => "[a-z ]{0,8}".prop_map(Shape::Text),
        3 => (tag.clone(), attributes.clone()).prop_map(|(tag, attributes)| Shape::Node {
            tag,
            attributes,
            children: Vec::new(),
        }),
    ];

    leaf.prop_recursive(4, 48, 5, move |inner| {
        (tag.clone(), attributes.clone(), prop::collection::vec(inner, 0..5)).prop_map(
            |(tag, attributes, children)| Shape::Node {
                tag,
                attributes,
                children,
            },
        )
    })
}

/// Root element is always a host node so the container has one child.
fn root_shape() -> impl Strategy<Value = Shape> {
    prop::collection::vec(shape(), 0..6).prop_map(|children| Shape::Node {
        tag: "main".to_string(),
        attributes: BTreeMap::new(),
        children,
    })
}

fn assert_isomorphic(host: &MemoryHost, node: MemoryNode, element: &Element) {
    match element.kind() {
        ElementKind::Text => {
            assert!(host.is_text(node));
            let expected = element.text().map(Value::from);
            assert_eq!(host.attribute(node, "value"), expected.as_ref());
        }
        ElementKind::Host(tag) => {
            assert_eq!(host.tag(node), Some(tag.as_str()));

            let expected: Vec<(String, Value)> = element
                .props()
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            assert_eq!(host.attributes(node), expected.as_slice());

            let slots: Vec<&Element> = element.children().iter().flatten().collect();
            let children = host.children(node);
            assert_eq!(children.len(), slots.len(), "child count of {}", host.describe(node));
            for (&child, slot) in children.iter().zip(slots) {
                assert_eq!(host.parent(child), Some(node));
                assert_isomorphic(host, child, slot);
            }
        }
        ElementKind::Component(_) => unreachable!("generated trees have no components"),
    }
}

fn render(element: Element) -> (Engine<MemoryHost>, MemoryNode) {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut engine = mount(host, element, container);
    flush(&mut engine).unwrap();
    (engine, container)
}

proptest! {
    #[test]
    fn test_commit_mirrors_element_tree(shape in root_shape()) {
        let element = shape.build();
        let (engine, container) = render(element.clone());
        let host = engine.host();

        let children = host.children(container);
        prop_assert_eq!(children.len(), 1);
        assert_isomorphic(host, children[0], &element);
    }

    #[test]
    fn test_identical_rerender_mutates_nothing(shape in root_shape()) {
        let (mut engine, container) = render(shape.build());
        let nodes_before = engine.host().node_count();

        engine.host_mut().clear_mutations();
        engine.render(shape.build(), container);
        flush(&mut engine).unwrap();

        prop_assert!(!engine.host().has_mutations());
        prop_assert_eq!(engine.host().node_count(), nodes_before);

        let root = engine.current_root().unwrap();
        for id in engine.arena().descendants(root) {
            prop_assert_eq!(engine.fiber(id).unwrap().effect, EffectTag::Update);
        }
    }

    #[test]
    fn test_sweep_keeps_one_generation(first in root_shape(), second in root_shape()) {
        let (mut engine, container) = render(first.build());
        engine.render(second.build(), container);
        flush(&mut engine).unwrap();

        let root = engine.current_root().unwrap();
        prop_assert_eq!(engine.arena().len(), engine.arena().descendants(root).len() + 1);
    }
}
