//! Behavior operations of the fluent mutation surface.

use crate::layout::Layout;
use zmk_layout_models::{
    is_c_identifier, CapsWordBehavior, ComboBehavior, HoldTapBehavior, LayoutError, MacroBehavior,
    ModMorphBehavior, StickyKeyBehavior, TapDanceBehavior,
};

/// Behavior collection operations (`layout.behaviors()`).
///
/// Adding a behavior fails on a duplicate name; behavior names share one
/// namespace because they all become `&name` references. Combos are
/// checked only against combos, they are not referenced by name.
pub struct BehaviorOps<'a> {
    layout: &'a Layout,
}

impl<'a> BehaviorOps<'a> {
    pub(crate) fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    fn check_new_name(&self, name: &str) -> Result<(), LayoutError> {
        if !is_c_identifier(name) {
            return Err(LayoutError::InvalidIdentifier {
                name: name.to_string(),
            });
        }
        if self.layout.document().behavior_names().contains(name) {
            return Err(LayoutError::DuplicateBehavior {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Add a hold-tap.
    pub fn add_hold_tap(&self, behavior: HoldTapBehavior) -> Result<Layout, LayoutError> {
        self.check_new_name(&behavior.name)?;
        let mut doc = self.layout.document().clone();
        doc.hold_taps.push(behavior);
        Ok(Layout::new(doc))
    }

    /// Add a combo.
    pub fn add_combo(&self, combo: ComboBehavior) -> Result<Layout, LayoutError> {
        if !is_c_identifier(&combo.name) {
            return Err(LayoutError::InvalidIdentifier {
                name: combo.name.clone(),
            });
        }
        let doc = self.layout.document();
        if doc.combos.iter().any(|c| c.name == combo.name) {
            return Err(LayoutError::DuplicateBehavior {
                name: combo.name.clone(),
            });
        }
        let mut doc = doc.clone();
        doc.combos.push(combo);
        Ok(Layout::new(doc))
    }

    /// Add a macro.
    pub fn add_macro(&self, behavior: MacroBehavior) -> Result<Layout, LayoutError> {
        self.check_new_name(&behavior.name)?;
        let mut doc = self.layout.document().clone();
        doc.macros.push(behavior);
        Ok(Layout::new(doc))
    }

    /// Add a tap-dance.
    pub fn add_tap_dance(&self, behavior: TapDanceBehavior) -> Result<Layout, LayoutError> {
        self.check_new_name(&behavior.name)?;
        let mut doc = self.layout.document().clone();
        doc.tap_dances.push(behavior);
        Ok(Layout::new(doc))
    }

    /// Add a sticky key.
    pub fn add_sticky_key(&self, behavior: StickyKeyBehavior) -> Result<Layout, LayoutError> {
        self.check_new_name(&behavior.name)?;
        let mut doc = self.layout.document().clone();
        doc.sticky_keys.push(behavior);
        Ok(Layout::new(doc))
    }

    /// Add a caps word.
    pub fn add_caps_word(&self, behavior: CapsWordBehavior) -> Result<Layout, LayoutError> {
        self.check_new_name(&behavior.name)?;
        let mut doc = self.layout.document().clone();
        doc.caps_words.push(behavior);
        Ok(Layout::new(doc))
    }

    /// Add a mod-morph.
    pub fn add_mod_morph(&self, behavior: ModMorphBehavior) -> Result<Layout, LayoutError> {
        self.check_new_name(&behavior.name)?;
        let mut doc = self.layout.document().clone();
        doc.mod_morphs.push(behavior);
        Ok(Layout::new(doc))
    }

    fn remove_named<T, F>(
        &self,
        name: &str,
        kind: &str,
        select: F,
    ) -> Result<Layout, LayoutError>
    where
        T: Named,
        F: Fn(&mut zmk_layout_models::LayoutDocument) -> &mut Vec<T>,
    {
        let mut doc = self.layout.document().clone();
        let records = select(&mut doc);
        let before = records.len();
        records.retain(|r| r.name() != name);
        if records.len() == before {
            return Err(LayoutError::Invalid {
                message: format!("{kind} '{name}' not found"),
            });
        }
        Ok(Layout::new(doc))
    }

    /// Remove a hold-tap by name.
    pub fn remove_hold_tap(&self, name: &str) -> Result<Layout, LayoutError> {
        self.remove_named(name, "hold-tap", |d| &mut d.hold_taps)
    }

    /// Remove a combo by name.
    pub fn remove_combo(&self, name: &str) -> Result<Layout, LayoutError> {
        self.remove_named(name, "combo", |d| &mut d.combos)
    }

    /// Remove a macro by name.
    pub fn remove_macro(&self, name: &str) -> Result<Layout, LayoutError> {
        self.remove_named(name, "macro", |d| &mut d.macros)
    }

    /// Remove a tap-dance by name.
    pub fn remove_tap_dance(&self, name: &str) -> Result<Layout, LayoutError> {
        self.remove_named(name, "tap-dance", |d| &mut d.tap_dances)
    }

    /// Remove a sticky key by name.
    pub fn remove_sticky_key(&self, name: &str) -> Result<Layout, LayoutError> {
        self.remove_named(name, "sticky-key", |d| &mut d.sticky_keys)
    }

    /// Remove a caps word by name.
    pub fn remove_caps_word(&self, name: &str) -> Result<Layout, LayoutError> {
        self.remove_named(name, "caps-word", |d| &mut d.caps_words)
    }

    /// Remove a mod-morph by name.
    pub fn remove_mod_morph(&self, name: &str) -> Result<Layout, LayoutError> {
        self.remove_named(name, "mod-morph", |d| &mut d.mod_morphs)
    }

    /// Whether a hold-tap with this name exists.
    pub fn has_hold_tap(&self, name: &str) -> bool {
        self.layout
            .document()
            .hold_taps
            .iter()
            .any(|b| b.name == name)
    }

    /// Whether a combo with this name exists.
    pub fn has_combo(&self, name: &str) -> bool {
        self.layout.document().combos.iter().any(|b| b.name == name)
    }

    /// Whether a macro with this name exists.
    pub fn has_macro(&self, name: &str) -> bool {
        self.layout.document().macros.iter().any(|b| b.name == name)
    }

    /// Whether a tap-dance with this name exists.
    pub fn has_tap_dance(&self, name: &str) -> bool {
        self.layout
            .document()
            .tap_dances
            .iter()
            .any(|b| b.name == name)
    }

    /// Whether a sticky key with this name exists.
    pub fn has_sticky_key(&self, name: &str) -> bool {
        self.layout
            .document()
            .sticky_keys
            .iter()
            .any(|b| b.name == name)
    }

    /// Whether a caps word with this name exists.
    pub fn has_caps_word(&self, name: &str) -> bool {
        self.layout
            .document()
            .caps_words
            .iter()
            .any(|b| b.name == name)
    }

    /// Whether a mod-morph with this name exists.
    pub fn has_mod_morph(&self, name: &str) -> bool {
        self.layout
            .document()
            .mod_morphs
            .iter()
            .any(|b| b.name == name)
    }

    /// Drop every behavior of every kind.
    pub fn clear_all(&self) -> Layout {
        let mut doc = self.layout.document().clone();
        doc.hold_taps.clear();
        doc.combos.clear();
        doc.macros.clear();
        doc.tap_dances.clear();
        doc.sticky_keys.clear();
        doc.caps_words.clear();
        doc.mod_morphs.clear();
        doc.input_listeners.clear();
        Layout::new(doc)
    }
}

/// Name accessor shared by the behavior records.
trait Named {
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),*) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(
    HoldTapBehavior,
    ComboBehavior,
    MacroBehavior,
    TapDanceBehavior,
    StickyKeyBehavior,
    CapsWordBehavior,
    ModMorphBehavior
);
