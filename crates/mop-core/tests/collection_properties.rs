//! Property tests: collections keep their ordering and uniqueness
//! discipline, and opposite pairs stay symmetric under arbitrary edits.

use mop_core::{FeatureDefinition, ObjectId, Runtime, Value};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Edit {
    Add(i64),
    Remove(i64),
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0i64..6).prop_map(Edit::Add),
        (0i64..6).prop_map(Edit::Remove),
    ]
}

/// Apply `edits` to a fresh collection and to a plain `Vec` model
fn run_edits(unique: bool, edits: &[Edit]) -> (Vec<Value>, Vec<Value>) {
    let mut rt = Runtime::new();
    let int = rt.meta().e_int;
    let bag = rt.create_class("Bag").unwrap();
    rt.define_feature(
        bag,
        FeatureDefinition::attribute("items", int).many().unique(unique),
    )
    .unwrap();
    let b = rt.instantiate(bag).unwrap();

    let mut model: Vec<Value> = Vec::new();
    for edit in edits {
        let mut items = rt.many(b, "items").unwrap();
        match edit {
            Edit::Add(n) => {
                let value = Value::Int(*n);
                let added = items.add(value.clone()).unwrap();
                let expected = !unique || !model.contains(&value);
                assert_eq!(added, expected);
                if expected {
                    model.push(value);
                }
            }
            Edit::Remove(n) => {
                let value = Value::Int(*n);
                let removed = items.remove(value.clone()).unwrap();
                let position = model.iter().position(|v| *v == value);
                assert_eq!(removed, position.is_some());
                if let Some(position) = position {
                    model.remove(position);
                }
            }
        }
    }
    let actual = rt.many(b, "items").unwrap().items().to_vec();
    (actual, model)
}

#[derive(Debug, Clone)]
enum Link {
    Befriend(usize, usize),
    Unfriend(usize, usize),
}

fn arb_link(people: usize) -> impl Strategy<Value = Link> {
    prop_oneof![
        (0..people, 0..people).prop_map(|(a, b)| Link::Befriend(a, b)),
        (0..people, 0..people).prop_map(|(a, b)| Link::Unfriend(a, b)),
    ]
}

fn friends(rt: &mut Runtime, person: ObjectId) -> Vec<ObjectId> {
    rt.many(person, "friends").unwrap().objects()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_unique_collection_matches_set_model(edits in prop::collection::vec(arb_edit(), 0..40)) {
        let (actual, model) = run_edits(true, &edits);
        prop_assert_eq!(actual, model);
    }

    #[test]
    fn prop_list_collection_matches_vec_model(edits in prop::collection::vec(arb_edit(), 0..40)) {
        let (actual, model) = run_edits(false, &edits);
        prop_assert_eq!(actual, model);
    }

    #[test]
    fn prop_self_opposite_stays_symmetric(links in prop::collection::vec(arb_link(4), 0..30)) {
        let mut rt = Runtime::new();
        let person = rt.create_class("Person").unwrap();
        let feature = rt
            .define_feature(person, FeatureDefinition::reference("friends", person).many())
            .unwrap();
        rt.set(feature, "eOpposite", feature).unwrap();
        let people: Vec<ObjectId> = (0..4).map(|_| rt.instantiate(person).unwrap()).collect();

        for link in &links {
            match *link {
                Link::Befriend(a, b) => {
                    rt.many(people[a], "friends").unwrap().add(people[b]).unwrap();
                }
                Link::Unfriend(a, b) => {
                    rt.many(people[a], "friends").unwrap().remove(people[b]).unwrap();
                }
            }
            for &x in &people {
                for y in friends(&mut rt, x) {
                    prop_assert!(friends(&mut rt, y).contains(&x));
                }
            }
        }
    }

    #[test]
    fn prop_containment_has_single_parent(moves in prop::collection::vec((0usize..3, 0usize..4), 0..30)) {
        let mut rt = Runtime::new();
        let folder = rt.create_class("Folder").unwrap();
        let file = rt.create_class("File").unwrap();
        rt.define_feature(folder, FeatureDefinition::containment("files", file).many())
            .unwrap();
        let folders: Vec<ObjectId> = (0..3).map(|_| rt.instantiate(folder).unwrap()).collect();
        let files: Vec<ObjectId> = (0..4).map(|_| rt.instantiate(file).unwrap()).collect();

        for &(target, child) in &moves {
            rt.many(folders[target], "files").unwrap().add(files[child]).unwrap();
            let holders: Vec<ObjectId> = folders
                .iter()
                .copied()
                .filter(|f| rt.contents(*f).unwrap().contains(&files[child]))
                .collect();
            prop_assert_eq!(holders, vec![folders[target]]);
            prop_assert_eq!(rt.container(files[child]).unwrap(), Some(folders[target]));
        }
    }
}
