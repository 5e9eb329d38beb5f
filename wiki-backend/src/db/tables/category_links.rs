//! Database operations for the category_links table
//! Directed membership edges of the category graph (pages and subcategories)

use rusqlite::params;
use std::str::FromStr;

use super::super::sqlite::StoreError;
use super::super::Database;
use crate::models::{CategoryLink, MemberKind};

fn row_to_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<CategoryLink> {
    let kind: String = row.get(2)?;
    let member_kind = MemberKind::from_str(&kind).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(CategoryLink {
        category: row.get(0)?,
        member: row.get(1)?,
        member_kind,
    })
}

impl Database {
    /// Replace every edge whose member end is `member` with one edge per entry
    /// of `categories`. Runs in a single transaction; repeated calls with the
    /// same input leave the table unchanged. Self-references are skipped.
    pub fn replace_member_links(
        &self,
        member: &str,
        member_kind: MemberKind,
        categories: &[String],
    ) -> Result<usize, StoreError> {
        let kind = member_kind.to_string();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM category_links WHERE member = ?1 AND member_kind = ?2",
            params![member, kind],
        )?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO category_links (category, member, member_kind) VALUES (?1, ?2, ?3)",
            )?;
            for category in categories {
                if category == member {
                    log::debug!("[CATEGORIES] Skipping self-link on {}", member);
                    continue;
                }
                inserted += stmt.execute(params![category, member, kind])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Members of a category: pages first, then subcategories, each alphabetical
    pub fn list_category_members(&self, category: &str) -> Result<Vec<CategoryLink>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, member, member_kind FROM category_links
             WHERE category = ?1
             ORDER BY member_kind DESC, member",
        )?;
        let links = stmt
            .query_map([category], row_to_link)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    /// The raw edge set, for graph consumers (e.g. cycle checks)
    pub fn list_category_links(&self) -> Result<Vec<CategoryLink>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, member, member_kind FROM category_links
             ORDER BY category, member_kind DESC, member",
        )?;
        let links = stmt
            .query_map([], row_to_link)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    /// Drop edges whose member no longer exists as a page or category
    pub fn prune_orphan_links(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM category_links
             WHERE (member_kind = ?1 AND member NOT IN (SELECT title FROM pages))
                OR (member_kind = ?2 AND member NOT IN (SELECT title FROM categories))",
            params![MemberKind::Page.to_string(), MemberKind::Category.to_string()],
        )?;
        Ok(removed)
    }
}
