//! Fluent mutation surface tests.
//!
//! Operations return new layouts, fail early with specific errors, and
//! never leave a document half-modified.

use zmk_layout::{ComboBehavior, HoldTapBehavior, Layout, LayoutBinding, LayoutError};

fn base_layout() -> Layout {
    let layout = Layout::create_empty("corne", "Test");
    let layout = layout.layers().add("base").unwrap();
    layout.layers().add("nav").unwrap()
}

#[test]
fn test_create_empty_defaults_title() {
    let layout = Layout::create_empty("corne", "");
    assert_eq!(layout.document().title, "New corne Layout");
    assert_eq!(layout.document().keyboard, "corne");
}

#[test]
fn test_add_and_names() {
    let layout = base_layout();
    assert_eq!(layout.layers().names(), ["base", "nav"]);
    assert_eq!(layout.layers().count(), 2);
    assert!(layout.layers().contains("base"));
}

#[test]
fn test_add_duplicate_fails() {
    let layout = base_layout();
    let err = layout.layers().add("base").unwrap_err();
    assert!(matches!(err, LayoutError::LayerAlreadyExists { name } if name == "base"));
}

#[test]
fn test_add_invalid_identifier_fails() {
    let layout = Layout::create_empty("kb", "t");
    assert!(matches!(
        layout.layers().add("bad-name"),
        Err(LayoutError::InvalidIdentifier { .. })
    ));
}

#[test]
fn test_operations_do_not_mutate_receiver() {
    let layout = base_layout();
    let _bigger = layout.layers().add("sym").unwrap();
    let _smaller = layout.layers().remove("nav").unwrap();
    // the original is untouched by both derived layouts
    assert_eq!(layout.layers().names(), ["base", "nav"]);
}

#[test]
fn test_remove_missing_fails() {
    let layout = base_layout();
    let err = layout.layers().remove("missing").unwrap_err();
    assert!(matches!(err, LayoutError::LayerNotFound { name } if name == "missing"));
}

#[test]
fn test_move_and_reorder() {
    let layout = base_layout().layers().add("sym").unwrap();
    let moved = layout.layers().move_to("sym", 0).unwrap();
    assert_eq!(moved.layers().names(), ["sym", "base", "nav"]);

    let reordered = layout.layers().reorder(&["nav", "sym", "base"]).unwrap();
    assert_eq!(reordered.layers().names(), ["nav", "sym", "base"]);

    assert!(matches!(
        layout.layers().reorder(&["nav", "base"]),
        Err(LayoutError::ReorderMismatch)
    ));
    assert!(matches!(
        layout.layers().reorder(&["nav", "nav", "base"]),
        Err(LayoutError::ReorderMismatch)
    ));
}

#[test]
fn test_rename_keeps_bindings() {
    let layout = base_layout()
        .layer("base")
        .unwrap()
        .append("&kp A".parse().unwrap())
        .finish();
    let renamed = layout.layers().rename("base", "main").unwrap();
    assert_eq!(renamed.layers().names(), ["main", "nav"]);
    assert_eq!(renamed.document().layers[0][0].to_string(), "&kp A");
}

#[test]
fn test_copy_layer() {
    let layout = base_layout()
        .layer("base")
        .unwrap()
        .append("&kp Q".parse().unwrap())
        .finish();
    let copied = layout.layers().copy("base", "gaming").unwrap();
    assert_eq!(copied.layers().names(), ["base", "nav", "gaming"]);
    assert_eq!(copied.document().layers[2], copied.document().layers[0]);
}

#[test]
fn test_set_pads_with_transparent() {
    let layout = base_layout()
        .layer("base")
        .unwrap()
        .append("&kp A".parse().unwrap())
        .finish();
    // index == len + 3: positions [1, 4) become &trans, position 4 is set
    let layout = layout
        .layer("base")
        .unwrap()
        .set(4, "&kp Z".parse().unwrap())
        .finish();
    let bindings = &layout.document().layers[0];
    assert_eq!(bindings.len(), 5);
    assert_eq!(bindings[0].to_string(), "&kp A");
    for i in 1..4 {
        assert_eq!(bindings[i], LayoutBinding::transparent());
    }
    assert_eq!(bindings[4].to_string(), "&kp Z");
}

#[test]
fn test_set_range() {
    let layout = base_layout()
        .layer("base")
        .unwrap()
        .fill("&trans".parse().unwrap(), 4)
        .set_range(
            1,
            3,
            vec!["&kp A".parse().unwrap(), "&kp B".parse().unwrap()],
        )
        .unwrap()
        .finish();
    let bindings = &layout.document().layers[0];
    assert_eq!(bindings[1].to_string(), "&kp A");
    assert_eq!(bindings[2].to_string(), "&kp B");

    let err = layout
        .layer("base")
        .unwrap()
        .set_range(0, 2, vec!["&kp A".parse().unwrap()])
        .unwrap_err();
    assert!(matches!(err, LayoutError::Invalid { .. }));
}

#[test]
fn test_insert_remove_get() {
    let editor = base_layout()
        .layer("base")
        .unwrap()
        .append("&kp A".parse().unwrap())
        .append("&kp C".parse().unwrap())
        .insert(1, "&kp B".parse().unwrap())
        .unwrap();
    assert_eq!(editor.len(), 3);
    assert_eq!(editor.get(1).unwrap().to_string(), "&kp B");
    assert!(matches!(
        editor.get(9),
        Err(LayoutError::IndexOutOfRange { index: 9, len: 3 })
    ));

    let editor = editor.remove(0).unwrap();
    assert_eq!(editor.get(0).unwrap().to_string(), "&kp B");
    assert!(editor.remove(5).is_err());
}

#[test]
fn test_fill_pad_clear() {
    let editor = base_layout()
        .layer("base")
        .unwrap()
        .fill("&kp X".parse().unwrap(), 3)
        .pad_to(6);
    assert_eq!(editor.len(), 6);
    let layout = editor.clear().finish();
    assert!(layout.document().layers[0].is_empty());
}

#[test]
fn test_copy_from_other_layer() {
    let layout = base_layout()
        .layer("nav")
        .unwrap()
        .append("&mo 1".parse().unwrap())
        .finish();
    let layout = layout.layer("base").unwrap().copy_from("nav").unwrap().finish();
    assert_eq!(layout.document().layers[0][0].to_string(), "&mo 1");
    assert!(layout.layer("base").unwrap().copy_from("missing").is_err());
}

#[test]
fn test_behavior_add_remove_has() {
    let layout = base_layout();
    let layout = layout
        .behaviors()
        .add_hold_tap(HoldTapBehavior::new("hm"))
        .unwrap();
    assert!(layout.behaviors().has_hold_tap("hm"));

    let err = layout
        .behaviors()
        .add_hold_tap(HoldTapBehavior::new("hm"))
        .unwrap_err();
    assert!(matches!(err, LayoutError::DuplicateBehavior { .. }));

    let layout = layout
        .behaviors()
        .add_combo(ComboBehavior::new(
            "combo_esc",
            vec![0, 1],
            "&kp ESC".parse().unwrap(),
        ))
        .unwrap();
    assert!(layout.behaviors().has_combo("combo_esc"));

    let layout = layout.behaviors().remove_hold_tap("hm").unwrap();
    assert!(!layout.behaviors().has_hold_tap("hm"));
    assert!(layout.behaviors().remove_hold_tap("hm").is_err());

    let cleared = layout.behaviors().clear_all();
    assert!(!cleared.behaviors().has_combo("combo_esc"));
}

#[test]
fn test_behavior_names_share_namespace() {
    let layout = base_layout()
        .behaviors()
        .add_hold_tap(HoldTapBehavior::new("thing"))
        .unwrap();
    let err = layout
        .behaviors()
        .add_macro(zmk_layout::MacroBehavior::new("thing"))
        .unwrap_err();
    assert!(matches!(err, LayoutError::DuplicateBehavior { .. }));
}

#[test]
fn test_validate_through_layout() {
    let layout = base_layout();
    assert!(layout.validate(&Default::default()).is_ok());

    let mut doc = layout.document().clone();
    doc.layers.pop();
    let broken = Layout::new(doc);
    assert!(broken.validate(&Default::default()).is_err());
}
