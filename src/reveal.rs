use crate::surface::TextId;

pub const CARD_CHAR_MS: u32 = 40;
pub const HEADING_CHAR_MS: u32 = 60;
pub const ARRIVED_CHAR_MS: u32 = 50;
pub const FADE_SCALE_MS: u32 = 800;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealEffect {
    /// Character-by-character reveal. The caret only blinks while typing.
    Typewriter { char_ms: u32, caret: bool },
    FadeScale { duration_ms: u32 },
}

impl RevealEffect {
    pub fn card_text() -> Self {
        RevealEffect::Typewriter {
            char_ms: CARD_CHAR_MS,
            caret: false,
        }
    }

    pub fn heading() -> Self {
        RevealEffect::Typewriter {
            char_ms: HEADING_CHAR_MS,
            caret: true,
        }
    }

    pub fn fade_scale() -> Self {
        RevealEffect::FadeScale {
            duration_ms: FADE_SCALE_MS,
        }
    }

    pub fn arrived() -> Self {
        RevealEffect::Typewriter {
            char_ms: ARRIVED_CHAR_MS,
            caret: false,
        }
    }

    pub fn duration_ms(&self, text: &str) -> u32 {
        match *self {
            RevealEffect::Typewriter { char_ms, .. } => {
                let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
                chars.saturating_mul(char_ms)
            }
            RevealEffect::FadeScale { duration_ms } => duration_ms,
        }
    }
}

/// Where a text element is in its reveal. `Settled` is the stable end state:
/// fully opaque, natural width, no caret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextPhase {
    Hidden,
    Pending,
    Animating {
        effect: RevealEffect,
        duration_ms: u32,
        steps: u32,
    },
    Settled,
}

impl TextPhase {
    pub fn animating(effect: RevealEffect, text: &str) -> Self {
        TextPhase::Animating {
            effect,
            duration_ms: effect.duration_ms(text),
            steps: u32::try_from(text.chars().count()).unwrap_or(u32::MAX).max(1),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            TextPhase::Hidden => "reveal-text hidden",
            TextPhase::Pending => "reveal-text pending",
            TextPhase::Animating {
                effect: RevealEffect::Typewriter { caret: true, .. },
                ..
            } => "reveal-text typing caret",
            TextPhase::Animating {
                effect: RevealEffect::Typewriter { .. },
                ..
            } => "reveal-text typing",
            TextPhase::Animating {
                effect: RevealEffect::FadeScale { .. },
                ..
            } => "reveal-text fading",
            TextPhase::Settled => "reveal-text settled",
        }
    }

    pub fn inline_style(&self) -> String {
        match self {
            TextPhase::Animating {
                duration_ms, steps, ..
            } => format!("--reveal-duration: {duration_ms}ms; --reveal-steps: {steps};"),
            _ => String::new(),
        }
    }
}

/// Per-text generation counters. A delayed callback carries the generation it
/// was scheduled under and is dropped if the text was revealed again or the
/// page went away in the meantime.
#[derive(Debug, Default)]
pub struct RevealTracker {
    generations: Vec<u32>,
}

impl RevealTracker {
    pub fn begin(&mut self, text: TextId) -> u32 {
        if self.generations.len() <= text.0 {
            self.generations.resize(text.0 + 1, 0);
        }
        let generation = &mut self.generations[text.0];
        *generation = generation.wrapping_add(1);
        *generation
    }

    pub fn is_current(&self, text: TextId, generation: u32) -> bool {
        self.generations.get(text.0) == Some(&generation)
    }

    pub fn invalidate_all(&mut self) {
        for generation in &mut self.generations {
            *generation = generation.wrapping_add(1);
        }
    }
}
