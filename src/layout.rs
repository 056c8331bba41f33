use chrono::{DateTime, FixedOffset, Timelike};

use crate::daily::{daily_item, greeting_for_hour, MESSAGES, QUESTIONS};
use crate::reveal::RevealEffect;
use crate::surface::{BlockId, TextId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockRole {
    Greeting,
    Question,
    Countdown,
    Message,
}

impl BlockRole {
    pub fn class_name(self) -> &'static str {
        match self {
            BlockRole::Greeting => "greeting-card",
            BlockRole::Question => "question-card",
            BlockRole::Countdown => "countdown-card",
            BlockRole::Message => "message-card",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Label,
    Body,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub id: TextId,
    pub kind: LineKind,
    pub original: String,
    pub effect: RevealEffect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContentBlock {
    pub id: BlockId,
    pub role: BlockRole,
    pub lines: Vec<TextLine>,
    pub revealed: bool,
}

/// The card stack, with every text captured once at load.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub blocks: Vec<ContentBlock>,
    pub greeting: BlockId,
    pub countdown_text: TextId,
    text_count: usize,
}

impl Layout {
    /// `card_effect` applies to every line except the greeting heading.
    pub fn build(name: &str, now: DateTime<FixedOffset>, card_effect: RevealEffect) -> Self {
        let mut builder = LayoutBuilder::default();
        let greeting = builder.block(
            BlockRole::Greeting,
            vec![(
                LineKind::Heading,
                greeting_for_hour(now.hour(), name),
                RevealEffect::heading(),
            )],
        );
        let today = now.date_naive();
        if let Some(question) = daily_item(QUESTIONS, today) {
            builder.block(
                BlockRole::Question,
                vec![
                    (LineKind::Label, "Question of the day".to_string(), card_effect),
                    (LineKind::Body, question.to_string(), card_effect),
                ],
            );
        }
        builder.block(
            BlockRole::Countdown,
            vec![(LineKind::Label, "Countdown".to_string(), card_effect)],
        );
        let countdown_text = builder.text_id();
        if let Some(message) = daily_item(MESSAGES, today) {
            builder.block(
                BlockRole::Message,
                vec![
                    (LineKind::Label, "A little note".to_string(), card_effect),
                    (LineKind::Body, message.to_string(), card_effect),
                ],
            );
        }
        Self {
            blocks: builder.blocks,
            greeting,
            countdown_text,
            text_count: builder.next_text,
        }
    }

    pub fn text_count(&self) -> usize {
        self.text_count
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut ContentBlock> {
        self.blocks.get_mut(id.0)
    }

    #[cfg(test)]
    pub fn block_by_role(&self, role: BlockRole) -> Option<&ContentBlock> {
        self.blocks.iter().find(|block| block.role == role)
    }
}

#[derive(Default)]
struct LayoutBuilder {
    blocks: Vec<ContentBlock>,
    next_text: usize,
}

impl LayoutBuilder {
    fn text_id(&mut self) -> TextId {
        let id = TextId(self.next_text);
        self.next_text += 1;
        id
    }

    fn block(&mut self, role: BlockRole, lines: Vec<(LineKind, String, RevealEffect)>) -> BlockId {
        let id = BlockId(self.blocks.len());
        let lines = lines
            .into_iter()
            .map(|(kind, original, effect)| TextLine {
                id: self.text_id(),
                kind,
                original,
                effect,
            })
            .collect();
        self.blocks.push(ContentBlock {
            id,
            role,
            lines,
            revealed: false,
        });
        id
    }
}
