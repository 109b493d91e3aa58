//! Document → keymap text → document round-trips.
//!
//! Generating a keymap from a document and parsing it back must preserve
//! the layers, layer names and behavior records.

use zmk_layout_extract::{KeymapProcessor, ParseOptions, ParsingMode};
use zmk_layout_gen::{generate_keymap, FormatContext};
use zmk_layout_models::{
    CapsWordBehavior, ComboBehavior, HoldTapBehavior, LayoutDocument, MacroBehavior,
    ModMorphBehavior, StickyKeyBehavior, TapDanceBehavior,
};

fn reparse(doc: &LayoutDocument, text: &str) -> LayoutDocument {
    let processor = KeymapProcessor::new(ParseOptions {
        keyboard: doc.keyboard.clone(),
        title: doc.title.clone(),
        ..Default::default()
    });
    let result = processor.parse(text, ParsingMode::Full);
    assert!(result.success, "reparse failed: {:?}", result.errors);
    result.layout.expect("layout")
}

fn sample_document() -> LayoutDocument {
    let mut doc = LayoutDocument::new("test_board", "Round Trip");
    doc.layer_names = vec!["base".into(), "nav".into()];
    doc.layers = vec![
        vec![
            "&kp Q".parse().unwrap(),
            "&mt LCTRL ESC".parse().unwrap(),
            "&kp LC(LS(TAB))".parse().unwrap(),
            "&mo 1".parse().unwrap(),
        ],
        vec![
            "&trans".parse().unwrap(),
            "&kp N1".parse().unwrap(),
            "&hm LGUI B".parse().unwrap(),
            "&trans".parse().unwrap(),
        ],
    ];

    let mut hm = HoldTapBehavior::new("hm").with_flavor("balanced");
    hm.label = Some("HM".into());
    hm.quick_tap_ms = Some(125);
    doc.hold_taps = vec![hm];

    doc.combos = vec![ComboBehavior::new(
        "combo_esc",
        vec![0, 1],
        "&kp ESC".parse().unwrap(),
    )
    .with_timeout_ms(30)
    .with_layers(vec![0, 1])];

    let mut mac = MacroBehavior::new("greet")
        .with_wait_ms(40)
        .with_tap_ms(40)
        .with_bindings(vec!["&kp H".parse().unwrap(), "&kp I".parse().unwrap()]);
    mac.label = Some("GREET".into());
    doc.macros = vec![mac];

    doc
}

#[test]
fn test_layers_and_behaviors_roundtrip() {
    let doc = sample_document();
    let text = generate_keymap(&doc, &FormatContext::default()).unwrap();
    let back = reparse(&doc, &text);

    assert_eq!(back.layer_names, doc.layer_names);
    assert_eq!(back.layers, doc.layers);
    assert_eq!(back.hold_taps, doc.hold_taps);
    assert_eq!(back.combos, doc.combos);
    assert_eq!(back.macros, doc.macros);
}

#[test]
fn test_minimal_document_roundtrip() {
    let mut doc = LayoutDocument::new("kb", "minimal");
    doc.layer_names = vec!["default_layer".into()];
    doc.layers = vec![vec!["&kp A".parse().unwrap(), "&kp B".parse().unwrap()]];

    let text = generate_keymap(&doc, &FormatContext::default()).unwrap();
    let back = reparse(&doc, &text);
    assert_eq!(back.layer_names, doc.layer_names);
    assert_eq!(back.layers, doc.layers);

    // a second generate → parse cycle is a fixed point
    let text2 = generate_keymap(&back, &FormatContext::default()).unwrap();
    assert_eq!(text, text2);
}

#[test]
fn test_optional_behaviors_roundtrip() {
    let mut doc = LayoutDocument::new("kb", "opt");
    doc.layer_names = vec!["base".into()];
    doc.layers = vec![vec!["&kp A".parse().unwrap()]];

    let mut td = TapDanceBehavior::new(
        "td0",
        vec!["&kp A".parse().unwrap(), "&kp B".parse().unwrap()],
    );
    td.label = Some("TD0".into());
    doc.tap_dances = vec![td];

    let mut sk = StickyKeyBehavior::new("sk", "&kp".parse().unwrap());
    sk.label = Some("SK".into());
    sk.release_after_ms = Some(1000);
    doc.sticky_keys = vec![sk];

    let mut cw = CapsWordBehavior::new("cw");
    cw.label = Some("CW".into());
    cw.continue_list = vec!["UNDERSCORE".into(), "MINUS".into()];
    doc.caps_words = vec![cw];

    let mut mm = ModMorphBehavior::new(
        "gqt",
        "&kp GRAVE".parse().unwrap(),
        "&kp QMARK".parse().unwrap(),
        12,
    );
    mm.label = Some("GQT".into());
    doc.mod_morphs = vec![mm];

    let text = generate_keymap(&doc, &FormatContext::default()).unwrap();
    let back = reparse(&doc, &text);
    assert_eq!(back.tap_dances, doc.tap_dances);
    assert_eq!(back.sticky_keys, doc.sticky_keys);
    assert_eq!(back.caps_words, doc.caps_words);
    assert_eq!(back.mod_morphs, doc.mod_morphs);
}
