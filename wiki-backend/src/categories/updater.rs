//! Background category graph updater
//!
//! Runs two phases back to back, forever, each followed by a fixed sleep:
//!   A. direct links: page bodies -> (category, page) edges
//!   B. subcategory links: category bodies -> (parent, subcategory) edges
//!
//! Phases never overlap and a failed phase is logged, never fatal. The loop
//! stops when its cancellation token fires; cancellation is only observed
//! between phases, so a phase always finishes its transactions.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::markers::extract_categories;
use crate::db::{Database, StoreError};
use crate::models::MemberKind;

/// Outcome of one phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    /// Pages or categories whose edge sets were rewritten
    pub sources: usize,
    /// Edges written across all sources
    pub links: usize,
}

pub struct CategoryGraphUpdater {
    db: Arc<Database>,
    interval: Duration,
}

impl CategoryGraphUpdater {
    pub fn new(db: Arc<Database>, interval: Duration) -> Self {
        Self { db, interval }
    }

    /// Phase A: recompute `(category, page)` edges from every page body.
    pub fn update_category_links(&self) -> Result<PhaseReport, StoreError> {
        let pages = self.db.list_pages()?;
        let mut report = PhaseReport::default();
        for page in &pages {
            let categories = extract_categories(&page.body);
            report.links += self
                .db
                .replace_member_links(&page.title, MemberKind::Page, &categories)?;
            report.sources += 1;
        }
        self.db.prune_orphan_links()?;
        Ok(report)
    }

    /// Phase B: recompute `(parent, subcategory)` edges from every category body.
    /// Cycles through chains of subcategories are not detected.
    pub fn update_subcategory_links(&self) -> Result<PhaseReport, StoreError> {
        let categories = self.db.list_categories()?;
        let mut report = PhaseReport::default();
        for category in &categories {
            let parents = extract_categories(&category.body);
            report.links += self
                .db
                .replace_member_links(&category.title, MemberKind::Category, &parents)?;
            report.sources += 1;
        }
        Ok(report)
    }

    /// Run the phase loop until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        log::info!(
            "[CATEGORIES] Updater started (interval {}s)",
            self.interval.as_secs_f64()
        );
        loop {
            match self.update_category_links() {
                Ok(report) => log::debug!(
                    "[CATEGORIES] Direct links: {} pages, {} links",
                    report.sources,
                    report.links
                ),
                Err(e) => log::error!("[CATEGORIES] Error updating categories: {}", e),
            }
            if !self.pause(&cancel).await {
                break;
            }

            match self.update_subcategory_links() {
                Ok(report) => log::debug!(
                    "[CATEGORIES] Subcategory links: {} categories, {} links",
                    report.sources,
                    report.links
                ),
                Err(e) => log::error!("[CATEGORIES] Error updating subcategories: {}", e),
            }
            if !self.pause(&cancel).await {
                break;
            }
        }
        log::info!("[CATEGORIES] Updater stopped");
    }

    /// Sleep one interval. Returns false if cancelled first.
    async fn pause(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.interval) => true,
        }
    }

    /// Spawn the single updater task for this process.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
