//! Folds a "Kill Screen" section into a single callout block.
//!
//! Only bullets opening with one of the bolded labels ("The Threat",
//! "The White Space", "The Leak") survive; every other line of the section
//! is dropped so the callout stays clean.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::block::{Block, CalloutItem, CalloutKind};
use crate::inline::plain_text;

/// The rest of a bolded label: closing stars with a colon on either side,
/// then at most one dash separator. A dash glued to the text (`-20%`) is kept.
static LABEL_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*)?:?(?:\*\*)?\s*(?:[:\x{2013}\x{2014}]|-\s)?\s*").expect("label tail pattern")
});

/// Replace each kill-screen heading and its content with a
/// [`Block::KillScreenCallout`]. Other blocks pass through in order.
pub fn extract_kill_screen(blocks: Vec<Block>) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    let mut blocks = blocks.into_iter().peekable();

    while let Some(block) = blocks.next() {
        if !is_kill_screen_heading(&block) {
            out.push(block);
            continue;
        }

        let mut items = Vec::new();
        let mut dropped = 0;
        while let Some(next) = blocks.next_if(|b| !matches!(b, Block::Heading { .. })) {
            match next {
                Block::BulletList { items: bullets } => {
                    for bullet in bullets {
                        match callout_item(&bullet) {
                            Some(item) => items.push(item),
                            None => dropped += 1,
                        }
                    }
                }
                _ => dropped += 1,
            }
        }

        debug!(items = items.len(), dropped, "extracted kill screen");
        out.push(Block::KillScreenCallout { items });
    }

    out
}

/// A section heading reading "Kill Screen", ignoring case, spacing and markup.
/// Trailing words ("Kill Screen: Top Three") are allowed.
pub fn is_kill_screen_heading(block: &Block) -> bool {
    let Block::Heading { level: 1 | 2, text } = block else {
        return false;
    };
    let normalized: String = plain_text(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    normalized.starts_with("KILLSCREEN")
}

fn callout_item(bullet: &str) -> Option<CalloutItem> {
    CalloutKind::ALL.into_iter().find_map(|kind| {
        let prefix = format!("**{}", kind.label());
        let head = bullet.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(&prefix) {
            return None;
        }
        let rest = &bullet[prefix.len()..];
        Some(CalloutItem {
            kind,
            text: LABEL_TAIL.replace(rest, "").into_owned(),
        })
    })
}
