//! Prompt assembly for the daily brief.
//!
//! The system text fixes the author persona, the Telegram-flavoured markup
//! (single `*` for bold), the character budget and the section layout. The
//! user text carries the day's date, concept and case-study company.

use crate::catalog::DailySelection;

/// Upper bound on the length of the brief the model is asked to write.
pub const MAX_BRIEFING_CHARS: usize = 1500;

/// Hard cap on the output-length parameter sent to any provider.
pub const MAX_OUTPUT_TOKENS_LIMIT: u32 = 1024;

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━";

/// A system/user pair ready to hand to a [`TextGenerator`](crate::generator::TextGenerator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefingPrompt {
    pub system: String,
    pub user: String,
}

impl BriefingPrompt {
    pub fn build(selection: &DailySelection) -> Self {
        Self {
            system: system_prompt(),
            user: user_prompt(selection),
        }
    }

    /// Single-string form for providers without a separate system slot.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

fn system_prompt() -> String {
    format!(
        "You are the Chief Intelligence Officer of DNR Capital.\n\
         Prepare a daily briefing for a 20-year-old CA Intermediate student building DNR Capital\n\
         — a firm offering investment banking, private equity, and financial & compliance services.\n\
         \n\
         Format for Telegram using *bold* for headers (single asterisk). Keep under {max} characters.\n\
         \n\
         Use this exact structure:\n\
         \n\
         🏦 *DNR CAPITAL — DAILY BRIEF*\n\
         📅 [date]\n\
         \n\
         {sep}\n\
         📊 *MARKET PULSE*\n\
         • [key India market development]\n\
         • [key global macro point]\n\
         • [one sector or deal news]\n\
         \n\
         {sep}\n\
         🧠 *CONCEPT: [topic title]*\n\
         [3-4 sentences: what it is, how it works, why it matters for IB/PE]\n\
         \n\
         {sep}\n\
         🏢 *CASE STUDY: [company]*\n\
         [2-3 sentences: what they did right + 1 lesson for DNR Capital]\n\
         \n\
         {sep}\n\
         💡 *FOUNDER'S NOTE*\n\
         [1 sharp, motivational line for the journey ahead]\n\
         \n\
         — DNR Capital Intelligence",
        max = MAX_BRIEFING_CHARS,
        sep = SEPARATOR,
    )
}

fn user_prompt(selection: &DailySelection) -> String {
    format!(
        "Today is {}.\n\
         Today's concept to teach: {}\n\
         Today's case study company: {}\n\
         \n\
         Generate the daily briefing. Use real knowledge about Indian financial \
         markets and the company. Be concise, educational, and sharp.",
        selection.display_date(),
        selection.topic,
        selection.company,
    )
}

/// Truncate `s` to at most `max_chars` characters, appending "..." when cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let byte_end = s
        .char_indices()
        .nth(keep)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    format!("{}...", &s[..byte_end])
}
