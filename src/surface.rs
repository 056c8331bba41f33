use crate::reveal::TextPhase;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextId(pub usize);

/// Decorative element classes whose display is toggled by the theme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Decoration {
    Birds,
    Planes,
    ShootingStars,
    Rain,
    Lightning,
}

impl Decoration {
    pub const ALL: [Decoration; 5] = [
        Decoration::Birds,
        Decoration::Planes,
        Decoration::ShootingStars,
        Decoration::Rain,
        Decoration::Lightning,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            Decoration::Birds => "bird",
            Decoration::Planes => "plane",
            Decoration::ShootingStars => "shooting-star",
            Decoration::Rain => "rain-drop",
            Decoration::Lightning => "lightning",
        }
    }
}

/// Everything the page logic needs from the document it draws on.
///
/// Lookups of ids the document does not have must be silent no-ops.
pub trait Surface {
    fn set_style_var(&mut self, name: &'static str, value: &str);
    fn set_decoration_visible(&mut self, decoration: Decoration, visible: bool);
    fn set_block_visible(&mut self, block: BlockId, visible: bool);
    fn has_text(&self, text: TextId) -> bool;
    fn set_text(&mut self, text: TextId, content: &str);
    fn set_text_phase(&mut self, text: TextId, phase: TextPhase);
    fn block_in_viewport(&self, block: BlockId) -> bool;
    fn observe(&mut self, block: BlockId);
    fn unobserve(&mut self, block: BlockId);
}

#[cfg(test)]
pub mod fake {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        BlockVisible(BlockId, bool),
        Text(TextId, String),
        Phase(TextId, TextPhase),
    }

    /// Records what the page logic did, for assertions.
    #[derive(Debug, Default)]
    pub struct FakeSurface {
        pub text_slots: usize,
        pub in_viewport: BTreeSet<BlockId>,
        pub style_vars: BTreeMap<&'static str, String>,
        pub decorations: BTreeMap<Decoration, bool>,
        pub observed: BTreeSet<BlockId>,
        pub calls: Vec<Call>,
    }

    impl FakeSurface {
        pub fn with_text_slots(text_slots: usize) -> Self {
            Self {
                text_slots,
                ..Self::default()
            }
        }

        pub fn text(&self, id: TextId) -> Option<&str> {
            self.calls.iter().rev().find_map(|call| match call {
                Call::Text(text, content) if *text == id => Some(content.as_str()),
                _ => None,
            })
        }

        pub fn phase(&self, id: TextId) -> Option<TextPhase> {
            self.calls.iter().rev().find_map(|call| match call {
                Call::Phase(text, phase) if *text == id => Some(*phase),
                _ => None,
            })
        }

        pub fn phases(&self, id: TextId) -> Vec<TextPhase> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    Call::Phase(text, phase) if *text == id => Some(*phase),
                    _ => None,
                })
                .collect()
        }

        pub fn texts_set(&self, id: TextId) -> usize {
            self.calls
                .iter()
                .filter(|call| matches!(call, Call::Text(text, _) if *text == id))
                .count()
        }

        pub fn block_visible(&self, id: BlockId) -> Option<bool> {
            self.calls.iter().rev().find_map(|call| match call {
                Call::BlockVisible(block, visible) if *block == id => Some(*visible),
                _ => None,
            })
        }
    }

    impl Surface for FakeSurface {
        fn set_style_var(&mut self, name: &'static str, value: &str) {
            self.style_vars.insert(name, value.to_string());
        }

        fn set_decoration_visible(&mut self, decoration: Decoration, visible: bool) {
            self.decorations.insert(decoration, visible);
        }

        fn set_block_visible(&mut self, block: BlockId, visible: bool) {
            self.calls.push(Call::BlockVisible(block, visible));
        }

        fn has_text(&self, text: TextId) -> bool {
            text.0 < self.text_slots
        }

        fn set_text(&mut self, text: TextId, content: &str) {
            if self.has_text(text) {
                self.calls.push(Call::Text(text, content.to_string()));
            }
        }

        fn set_text_phase(&mut self, text: TextId, phase: TextPhase) {
            if self.has_text(text) {
                self.calls.push(Call::Phase(text, phase));
            }
        }

        fn block_in_viewport(&self, block: BlockId) -> bool {
            self.in_viewport.contains(&block)
        }

        fn observe(&mut self, block: BlockId) {
            self.observed.insert(block);
        }

        fn unobserve(&mut self, block: BlockId) {
            self.observed.remove(&block);
        }
    }
}
