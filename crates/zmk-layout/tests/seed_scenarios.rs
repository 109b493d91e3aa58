//! End-to-end scenarios across the parse and generate pipelines.

use zmk_layout::{
    DefaultConfigurationProvider, DiagnosticKind, Layout, LayoutBinding, LayoutParam, ParsingMode,
};

fn parse_full(source: &str) -> zmk_layout::ParseResult {
    Layout::from_keymap(
        source,
        ParsingMode::Full,
        &DefaultConfigurationProvider,
        "test_board",
        "Test",
    )
}

#[test]
fn test_minimal_keymap_roundtrip() {
    let source = r#"/ { keymap { compatible = "zmk,keymap"; default_layer { bindings = <&kp A &kp B>; }; }; };"#;
    let result = parse_full(source);
    assert!(result.success, "errors: {:?}", result.errors);

    let layout = Layout::new(result.layout.unwrap());
    assert_eq!(layout.document().layer_names, vec!["default_layer"]);
    assert_eq!(
        layout.document().layers[0],
        vec![
            LayoutBinding::with_params("&kp", vec![LayoutParam::keyword("A")]),
            LayoutBinding::with_params("&kp", vec![LayoutParam::keyword("B")]),
        ]
    );

    let text = layout
        .export_keymap(&DefaultConfigurationProvider)
        .generate()
        .unwrap();
    let reparsed = parse_full(&text);
    assert!(reparsed.success, "errors: {:?}", reparsed.errors);
    let back = reparsed.layout.unwrap();
    assert_eq!(back.layer_names, layout.document().layer_names);
    assert_eq!(back.layers, layout.document().layers);
}

#[test]
fn test_nested_parameter_binding() {
    let binding: LayoutBinding = "&kp LC(LA(DEL))".parse().unwrap();
    assert_eq!(
        binding,
        LayoutBinding::with_params(
            "&kp",
            vec![LayoutParam::nested(
                "LC",
                vec![LayoutParam::nested(
                    "LA",
                    vec![LayoutParam::keyword("DEL")]
                )]
            )]
        )
    );
    assert_eq!(binding.to_string(), "&kp LC(LA(DEL))");
}

#[test]
fn test_hold_tap_extraction_scenario() {
    let source = r#"
/ {
    behaviors {
        hm: homerow_mods {
            compatible = "zmk,behavior-hold-tap";
            tapping-term-ms = <200>;
            flavor = "tap-preferred";
            bindings = <&kp>, <&kp>;
            #binding-cells = <2>;
        };
    };
    keymap {
        compatible = "zmk,keymap";
        base { bindings = <&hm LCTRL A>; };
    };
};
"#;
    let result = parse_full(source);
    assert!(result.success);
    let layout = result.layout.unwrap();
    let ht = &layout.hold_taps[0];
    assert_eq!(ht.name, "hm");
    assert_eq!(ht.tapping_term_ms, Some(200));
    assert_eq!(ht.flavor.as_deref(), Some("tap-preferred"));
    assert_eq!(ht.bindings.len(), 2);
    assert!(ht.bindings.iter().all(|b| b.value == "&kp" && b.params.is_empty()));
    assert_eq!(result.extracted_sections["hold_taps"], 1);
}

#[test]
fn test_combo_scenario() {
    let source = r#"
/ {
    keymap {
        compatible = "zmk,keymap";
        base { bindings = <&kp A &kp B>; };
        nav { bindings = <&trans &trans>; };
    };
    combos {
        compatible = "zmk,combos";
        combo_esc {
            timeout-ms = <30>;
            key-positions = <0 1>;
            bindings = <&kp ESC>;
            layers = <0 1>;
        };
    };
};
"#;
    let result = parse_full(source);
    assert!(result.success);
    let layout = result.layout.unwrap();
    let combo = &layout.combos[0];
    assert_eq!(combo.name, "combo_esc");
    assert_eq!(combo.key_positions, vec![0, 1]);
    assert_eq!(combo.timeout_ms, Some(30));
    assert_eq!(combo.bindings.to_string(), "&kp ESC");
    assert_eq!(combo.layers, vec![0, 1]);

    // generation emits the same four properties
    let text = Layout::new(layout)
        .export_keymap(&DefaultConfigurationProvider)
        .generate()
        .unwrap();
    assert!(text.contains("timeout-ms = <30>;"));
    assert!(text.contains("key-positions = <0 1>;"));
    assert!(text.contains("bindings = <&kp ESC>;"));
    assert!(text.contains("layers = <0 1>;"));
}

#[test]
fn test_error_recovery_scenario() {
    let result = parse_full(
        r#"/ { a = ; b = <1>; keymap { compatible = "zmk,keymap"; base { bindings = <&kp A>; }; }; };"#,
    );
    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, DiagnosticKind::Parse);
    // the partial tree still yields the keymap
    let layout = result.layout.unwrap();
    assert_eq!(layout.layer_names, vec!["base"]);
}

#[test]
fn test_define_substitution_scenario() {
    let source = r#"
#define BASE 0
/ {
    keymap {
        compatible = "zmk,keymap";
        base { bindings = <&kp A>; };
    };
    combos {
        c { key-positions = <0 1>; bindings = <&mo BASE>; };
    };
};
"#;
    let result = parse_full(source);
    assert!(result.success, "errors: {:?}", result.errors);
    let layout = result.layout.unwrap();
    assert_eq!(layout.combos[0].bindings.to_string(), "&mo 0");
}

#[test]
fn test_layout_dict_roundtrip() {
    let source = r#"
/ {
    behaviors {
        hm: hm {
            compatible = "zmk,behavior-hold-tap";
            bindings = <&kp>, <&kp>;
        };
    };
    keymap {
        compatible = "zmk,keymap";
        base { bindings = <&hm LCTRL A &kp LC(TAB)>; };
    };
};
"#;
    let layout = Layout::new(parse_full(source).layout.unwrap());
    let dict = layout.to_dict().unwrap();
    let back = Layout::from_dict(dict.clone()).unwrap();
    assert_eq!(back, layout);
    assert_eq!(back.to_dict().unwrap(), dict);
}

#[test]
fn test_dict_accepts_both_casings() {
    let camel = serde_json::json!({
        "keyboard": "kb",
        "title": "t",
        "layerNames": ["base"],
        "layers": [[{"value": "&kp", "params": [{"value": "A"}]}]],
        "holdTaps": [{"name": "hm", "tappingTermMs": 150}]
    });
    let snake = serde_json::json!({
        "keyboard": "kb",
        "title": "t",
        "layer_names": ["base"],
        "layers": [[{"value": "&kp", "params": [{"value": "A"}]}]],
        "hold_taps": [{"name": "hm", "tapping_term_ms": 150}]
    });
    let a = Layout::from_dict(camel).unwrap();
    let b = Layout::from_dict(snake).unwrap();
    assert_eq!(a, b);
    // output uses the camelCase aliases
    let out = a.to_dict().unwrap();
    assert!(out.get("layerNames").is_some());
    assert!(out.get("holdTaps").is_some());
}

#[test]
fn test_config_export() {
    let mut layout = Layout::create_empty("kb", "t");
    let mut doc = layout.document().clone();
    doc.config_parameters.push(zmk_layout::ConfigParameter::new(
        "ZMK_SLEEP",
        serde_json::json!(true),
    ));
    layout = Layout::new(doc);

    let (text, settings) = layout
        .export_config(&DefaultConfigurationProvider)
        .with_option("CONFIG_ZMK_IDLE_TIMEOUT", zmk_layout::KconfigValue::Int(30000))
        .generate()
        .unwrap();
    assert!(text.contains("CONFIG_ZMK_SLEEP=y"));
    assert!(text.contains("CONFIG_ZMK_IDLE_TIMEOUT=30000"));
    assert_eq!(settings.len(), 2);
}

#[test]
fn test_template_export() {
    let source = r#"/ { keymap { compatible = "zmk,keymap"; base { bindings = <&kp A>; }; }; };"#;
    let layout = Layout::new(parse_full(source).layout.unwrap());
    let template_provider = zmk_layout::PassthroughTemplateProvider;
    let rendered = layout
        .export_keymap(&DefaultConfigurationProvider)
        .with_template(&template_provider, "// {{keyboard}}\n{{layer_defines}}\n")
        .generate()
        .unwrap();
    assert_eq!(rendered, "// test_board\n#define BASE 0\n");
}
