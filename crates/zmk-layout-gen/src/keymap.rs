//! DTSI emission from a layout document.
//!
//! Output is deterministic for a given document and format context: fixed
//! indentation, properties in a fixed order per node kind, layers and
//! behaviors in document order.

use crate::error::GenerateError;
use crate::format::FormatContext;
use tracing::debug;
use zmk_layout_models::{
    is_c_identifier, CapsWordBehavior, ComboBehavior, HoldTapBehavior, LayoutBinding,
    LayoutDocument, MacroBehavior, ModMorphBehavior, StickyKeyBehavior, TapDanceBehavior,
};

/// Convert a name to the UPPER_SNAKE form used for `#define`s.
pub fn upper_snake(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn check_identifier(name: &str) -> Result<(), GenerateError> {
    if is_c_identifier(name) {
        Ok(())
    } else {
        Err(GenerateError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Emit one `#define <UPPER_SNAKE(name)> <index>` line per layer.
pub fn generate_layer_defines(doc: &LayoutDocument) -> Result<String, GenerateError> {
    let mut lines = Vec::with_capacity(doc.layer_names.len());
    for (index, name) in doc.layer_names.iter().enumerate() {
        check_identifier(name)?;
        lines.push(format!("#define {} {}", upper_snake(name), index));
    }
    Ok(lines.join("\n"))
}

/// Line-oriented node writer tracking indentation.
struct NodeWriter<'a> {
    ctx: &'a FormatContext,
    out: String,
    level: usize,
}

impl<'a> NodeWriter<'a> {
    fn new(ctx: &'a FormatContext) -> Self {
        Self {
            ctx,
            out: String::new(),
            level: 0,
        }
    }

    fn open(&mut self, header: &str) {
        self.out.push_str(&self.ctx.indent(self.level));
        self.out.push_str(header);
        self.out.push_str(" {\n");
        self.level += 1;
    }

    fn close(&mut self) {
        self.level -= 1;
        self.out.push_str(&self.ctx.indent(self.level));
        self.out.push_str("};\n");
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(&self.ctx.indent(self.level));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn prop(&mut self, name: &str, value: impl AsRef<str>) {
        self.line(&format!("{} = {};", name, value.as_ref()));
    }

    fn opt_int(&mut self, name: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.prop(name, format!("<{v}>"));
        }
    }

    fn flag(&mut self, name: &str, present: bool) {
        if present {
            self.line(&format!("{name};"));
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}

/// `<b1>, <b2>, ...` for a binding list.
fn binding_cells(bindings: &[LayoutBinding]) -> String {
    bindings
        .iter()
        .map(|b| format!("<{b}>"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `<v1 v2 ...>` for an integer list.
fn int_cells<I: IntoIterator<Item = i64>>(values: I) -> String {
    let parts: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    format!("<{}>", parts.join(" "))
}

/// Emit the `behaviors { ... }` node for hold-taps, sticky-keys,
/// caps-words and mod-morphs. Empty when there are none.
pub fn generate_behaviors_dtsi(
    doc: &LayoutDocument,
    ctx: &FormatContext,
) -> Result<String, GenerateError> {
    if doc.hold_taps.is_empty()
        && doc.sticky_keys.is_empty()
        && doc.caps_words.is_empty()
        && doc.mod_morphs.is_empty()
    {
        return Ok(String::new());
    }
    let mut w = NodeWriter::new(ctx);
    w.open("behaviors");
    for ht in &doc.hold_taps {
        write_hold_tap(&mut w, ht, ctx)?;
    }
    for sk in &doc.sticky_keys {
        write_sticky_key(&mut w, sk, ctx)?;
    }
    for cw in &doc.caps_words {
        write_caps_word(&mut w, cw, ctx)?;
    }
    for mm in &doc.mod_morphs {
        write_mod_morph(&mut w, mm, ctx)?;
    }
    w.close();
    Ok(w.finish())
}

fn write_hold_tap(
    w: &mut NodeWriter<'_>,
    ht: &HoldTapBehavior,
    ctx: &FormatContext,
) -> Result<(), GenerateError> {
    check_identifier(&ht.name)?;
    w.open(&format!("{0}: {0}", ht.name));
    w.prop("compatible", quoted(&ctx.compatible.hold_tap));
    let label = ht.label.clone().unwrap_or_else(|| upper_snake(&ht.name));
    w.prop("label", quoted(&label));
    w.prop("#binding-cells", format!("<{}>", ht.binding_cells.unwrap_or(2)));
    w.opt_int("tapping-term-ms", ht.tapping_term_ms);
    w.opt_int("quick-tap-ms", ht.quick_tap_ms);
    w.opt_int("require-prior-idle-ms", ht.require_prior_idle_ms);
    if let Some(flavor) = &ht.flavor {
        w.prop("flavor", quoted(flavor));
    }
    if ht.bindings.is_empty() {
        w.prop("bindings", "<&kp>, <&kp>");
    } else {
        w.prop("bindings", binding_cells(&ht.bindings));
    }
    if let Some(positions) = &ht.hold_trigger_key_positions {
        w.prop(
            "hold-trigger-key-positions",
            int_cells(positions.iter().map(|&p| i64::from(p))),
        );
    }
    w.flag("hold-trigger-on-release", ht.hold_trigger_on_release);
    w.flag("retro-tap", ht.retro_tap);
    w.close();
    Ok(())
}

fn write_sticky_key(
    w: &mut NodeWriter<'_>,
    sk: &StickyKeyBehavior,
    ctx: &FormatContext,
) -> Result<(), GenerateError> {
    check_identifier(&sk.name)?;
    w.open(&format!("{0}: {0}", sk.name));
    w.prop("compatible", quoted(&ctx.compatible.sticky_key));
    w.prop("label", quoted(&sk.label.clone().unwrap_or_else(|| upper_snake(&sk.name))));
    w.prop("#binding-cells", "<1>");
    w.opt_int("release-after-ms", sk.release_after_ms);
    w.prop("bindings", binding_cells(&sk.bindings));
    w.flag("quick-release", sk.quick_release);
    w.flag("lazy", sk.lazy);
    w.flag("ignore-modifiers", sk.ignore_modifiers);
    w.close();
    Ok(())
}

fn write_caps_word(
    w: &mut NodeWriter<'_>,
    cw: &CapsWordBehavior,
    ctx: &FormatContext,
) -> Result<(), GenerateError> {
    check_identifier(&cw.name)?;
    w.open(&format!("{0}: {0}", cw.name));
    w.prop("compatible", quoted(&ctx.compatible.caps_word));
    w.prop("label", quoted(&cw.label.clone().unwrap_or_else(|| upper_snake(&cw.name))));
    w.prop("#binding-cells", "<0>");
    if !cw.continue_list.is_empty() {
        w.prop("continue-list", format!("<{}>", cw.continue_list.join(" ")));
    }
    w.opt_int("mods", cw.mods);
    w.close();
    Ok(())
}

fn write_mod_morph(
    w: &mut NodeWriter<'_>,
    mm: &ModMorphBehavior,
    ctx: &FormatContext,
) -> Result<(), GenerateError> {
    check_identifier(&mm.name)?;
    w.open(&format!("{0}: {0}", mm.name));
    w.prop("compatible", quoted(&ctx.compatible.mod_morph));
    w.prop("label", quoted(&mm.label.clone().unwrap_or_else(|| upper_snake(&mm.name))));
    w.prop("#binding-cells", "<0>");
    w.prop("bindings", binding_cells(&mm.bindings));
    w.prop("mods", format!("<{}>", mm.mods));
    w.opt_int("keep-mods", mm.keep_mods);
    w.close();
    Ok(())
}

/// Emit a `behaviors { ... }` node holding the tap-dances. Empty when
/// there are none.
pub fn generate_tap_dances_dtsi(
    doc: &LayoutDocument,
    ctx: &FormatContext,
) -> Result<String, GenerateError> {
    if doc.tap_dances.is_empty() {
        return Ok(String::new());
    }
    let mut w = NodeWriter::new(ctx);
    w.open("behaviors");
    for td in &doc.tap_dances {
        write_tap_dance(&mut w, td, ctx)?;
    }
    w.close();
    Ok(w.finish())
}

fn write_tap_dance(
    w: &mut NodeWriter<'_>,
    td: &TapDanceBehavior,
    ctx: &FormatContext,
) -> Result<(), GenerateError> {
    check_identifier(&td.name)?;
    w.open(&format!("{0}: {0}", td.name));
    w.prop("compatible", quoted(&ctx.compatible.tap_dance));
    w.prop("label", quoted(&td.label.clone().unwrap_or_else(|| upper_snake(&td.name))));
    w.prop("#binding-cells", "<0>");
    w.opt_int("tapping-term-ms", td.tapping_term_ms);
    w.prop("bindings", binding_cells(&td.bindings));
    w.close();
    Ok(())
}

/// Emit the `combos { ... }` node. Empty when there are no combos.
pub fn generate_combos_dtsi(
    doc: &LayoutDocument,
    ctx: &FormatContext,
) -> Result<String, GenerateError> {
    if doc.combos.is_empty() {
        return Ok(String::new());
    }
    let mut w = NodeWriter::new(ctx);
    w.open("combos");
    w.prop("compatible", quoted(&ctx.compatible.combos));
    for combo in &doc.combos {
        write_combo(&mut w, combo)?;
    }
    w.close();
    Ok(w.finish())
}

fn write_combo(w: &mut NodeWriter<'_>, combo: &ComboBehavior) -> Result<(), GenerateError> {
    check_identifier(&combo.name)?;
    w.open(&combo.name);
    w.opt_int("timeout-ms", combo.timeout_ms);
    w.prop(
        "key-positions",
        int_cells(combo.key_positions.iter().map(|&p| i64::from(p))),
    );
    w.prop("bindings", format!("<{}>", combo.bindings));
    if !combo.layers.is_empty() {
        w.prop("layers", int_cells(combo.layers.iter().map(|&l| l as i64)));
    }
    w.opt_int("require-prior-idle-ms", combo.require_prior_idle_ms);
    w.close();
    Ok(())
}

/// Emit the `macros { ... }` node. Empty when there are no macros.
pub fn generate_macros_dtsi(
    doc: &LayoutDocument,
    ctx: &FormatContext,
) -> Result<String, GenerateError> {
    if doc.macros.is_empty() {
        return Ok(String::new());
    }
    let mut w = NodeWriter::new(ctx);
    w.open("macros");
    for mac in &doc.macros {
        write_macro(&mut w, mac)?;
    }
    w.close();
    Ok(w.finish())
}

fn write_macro(w: &mut NodeWriter<'_>, mac: &MacroBehavior) -> Result<(), GenerateError> {
    check_identifier(&mac.name)?;
    w.open(&format!("{0}: {0}", mac.name));
    w.prop("compatible", quoted(mac.compatible()));
    w.prop("label", quoted(&mac.label.clone().unwrap_or_else(|| upper_snake(&mac.name))));
    w.prop(
        "#binding-cells",
        format!("<{}>", mac.binding_cells.unwrap_or(i64::from(mac.params))),
    );
    w.opt_int("wait-ms", mac.wait_ms);
    w.opt_int("tap-ms", mac.tap_ms);
    if mac.bindings.is_empty() {
        w.prop("bindings", "<>");
    } else {
        w.prop("bindings", binding_cells(&mac.bindings));
    }
    w.close();
    Ok(())
}

/// Emit the `keymap { ... }` node with one child per layer and a
/// row-formatted binding grid.
pub fn generate_keymap_node(
    doc: &LayoutDocument,
    ctx: &FormatContext,
) -> Result<String, GenerateError> {
    let mut w = NodeWriter::new(ctx);
    w.open("keymap");
    w.prop("compatible", quoted(&ctx.compatible.keymap));
    for (name, layer) in doc.layer_names.iter().zip(&doc.layers) {
        check_identifier(name)?;
        w.open(name);
        if layer.is_empty() {
            w.prop("bindings", "<>");
        } else {
            w.line("bindings = <");
            w.level += 1;
            for row_text in format_binding_grid(layer, ctx) {
                w.line(&row_text);
            }
            w.level -= 1;
            w.line(">;");
        }
        w.close();
    }
    w.close();
    debug!(layers = doc.layer_names.len(), "generated keymap node");
    Ok(w.finish())
}

/// Format a layer's bindings as grid rows.
///
/// Rows follow the context's row partition; within a row every cell is
/// padded to the row's widest binding and separated by the key gap, so
/// columns stay aligned per row.
fn format_binding_grid(layer: &[LayoutBinding], ctx: &FormatContext) -> Vec<String> {
    let cells: Vec<String> = layer.iter().map(|b| b.to_string()).collect();
    let mut rows_text = Vec::new();
    for row in ctx.row_partition(cells.len()) {
        let width = row.iter().map(|&i| cells[i].len()).max().unwrap_or(0);
        let padded: Vec<String> = row.iter().map(|&i| pad_right(&cells[i], width)).collect();
        rows_text.push(padded.join(&ctx.key_gap).trim_end().to_string());
    }
    rows_text
}

fn pad_right(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    out.push_str(text);
    while out.len() < width {
        out.push(' ');
    }
    out
}

/// Indent every non-empty line of a block.
fn indent_block(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if !line.is_empty() {
            out.push_str(prefix);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn wrap_root(text: &str, ctx: &FormatContext) -> String {
    format!("/ {{\n{}}};", indent_block(text, &ctx.indent(1)))
}

/// Emit a complete keymap file.
///
/// Part order: includes, layer defines, custom defined behaviors,
/// behaviors, tap-dances, combos, macros, custom devicetree, keymap node.
pub fn generate_keymap(doc: &LayoutDocument, ctx: &FormatContext) -> Result<String, GenerateError> {
    let mut parts: Vec<String> = Vec::new();

    if !ctx.include_files.is_empty() {
        let includes: Vec<String> = ctx
            .include_files
            .iter()
            .map(|f| format!("#include <{f}>"))
            .collect();
        parts.push(includes.join("\n"));
    }

    let defines = generate_layer_defines(doc)?;
    if !defines.is_empty() {
        parts.push(defines);
    }

    if let Some(custom) = &doc.custom_defined_behaviors {
        if !custom.trim().is_empty() {
            parts.push(custom.trim_end().to_string());
        }
    }

    // behavior nodes sit under a root wrapper; combos and macros are
    // emitted as standalone nodes
    for section in [
        generate_behaviors_dtsi(doc, ctx)?,
        generate_tap_dances_dtsi(doc, ctx)?,
    ] {
        if !section.is_empty() {
            parts.push(wrap_root(&section, ctx));
        }
    }
    for section in [
        generate_combos_dtsi(doc, ctx)?,
        generate_macros_dtsi(doc, ctx)?,
    ] {
        if !section.is_empty() {
            parts.push(section.trim_end().to_string());
        }
    }

    if let Some(custom) = &doc.custom_devicetree {
        if !custom.trim().is_empty() {
            parts.push(custom.trim_end().to_string());
        }
    }

    parts.push(wrap_root(&generate_keymap_node(doc, ctx)?, ctx));

    let mut out = parts.join("\n\n");
    out.push('\n');
    Ok(out)
}
