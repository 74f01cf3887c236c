//! One run of the daily brief: select, generate, deliver.
//!
//! The run never loops back. A generation failure ends the run before any
//! delivery attempt; a delivery failure is reported by the dispatcher and
//! only changes the exit code.

use crate::catalog::Catalog;
use crate::delivery::{self, Dispatcher};
use crate::error::BriefingError;
use crate::generator::TextGenerator;
use crate::prompt::{preview, BriefingPrompt, MAX_BRIEFING_CHARS};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::sync::Arc;

/// Characters of the generated brief echoed to the log.
pub const PREVIEW_CHARS: usize = 4096;

#[derive(Debug)]
pub enum RunOutcome {
    Delivered,
    DeliveryFailed,
    SelectionFailed(BriefingError),
    GenerationFailed(BriefingError),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Delivered => 0,
            RunOutcome::DeliveryFailed
            | RunOutcome::SelectionFailed(_)
            | RunOutcome::GenerationFailed(_) => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Delivered)
    }
}

pub struct BriefingRun {
    catalog: Catalog<'static>,
    generator: Arc<dyn TextGenerator>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl BriefingRun {
    pub fn new(generator: Arc<dyn TextGenerator>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            catalog: Catalog::builtin(),
            generator,
            dispatcher,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog<'static>) -> Self {
        self.catalog = catalog;
        self
    }

    pub async fn execute(&self, date: NaiveDate) -> RunOutcome {
        let selection = match self.catalog.select(date) {
            Ok(s) => s,
            Err(e) => {
                error!("❌ Could not select today's topic: {}", e);
                return RunOutcome::SelectionFailed(e);
            }
        };

        info!("📊 Generating DNR Capital Daily Report — {}", selection.display_date());
        info!("🧠 Topic:   {}", selection.topic);
        info!("🏢 Company: {}", selection.company);

        let prompt = BriefingPrompt::build(&selection);
        let report = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("❌ {}", e);
                return RunOutcome::GenerationFailed(e);
            }
        };

        let chars = report.chars().count();
        if chars > MAX_BRIEFING_CHARS {
            warn!(
                "{} returned {} characters, over the {} character budget",
                self.generator.name(),
                chars,
                MAX_BRIEFING_CHARS
            );
        }
        info!(
            "--- REPORT PREVIEW ---\n{}\n----------------------",
            preview(&report, PREVIEW_CHARS)
        );

        if delivery::dispatch(self.dispatcher.as_ref(), &report).await {
            RunOutcome::Delivered
        } else {
            RunOutcome::DeliveryFailed
        }
    }
}
