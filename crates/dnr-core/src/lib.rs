pub mod catalog;
pub mod delivery;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod rotation;

pub use catalog::{Catalog, DailySelection, COMPANIES, TOPICS};
pub use delivery::{dispatch, Dispatcher, TelegramDispatcher, TelegramSettings};
pub use error::{BriefingError, Result};
pub use generator::{build_generator, GenerationSettings, ProviderKind, TextGenerator};
pub use pipeline::{BriefingRun, RunOutcome};
pub use prompt::{BriefingPrompt, MAX_BRIEFING_CHARS, MAX_OUTPUT_TOKENS_LIMIT};
pub use rotation::{rotation_index, EPOCH};
