//! Page database operations

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::super::sqlite::{parse_timestamp, StoreError};
use super::super::Database;
use crate::models::{MemberKind, Page};

fn row_to_page(row: &rusqlite::Row<'_>) -> rusqlite::Result<Page> {
    let updated_at: String = row.get(2)?;
    Ok(Page {
        title: row.get(0)?,
        body: row.get(1)?,
        updated_at: parse_timestamp(2, &updated_at)?,
    })
}

impl Database {
    /// Load a page by exact title
    pub fn get_page(&self, title: &str) -> Result<Page, StoreError> {
        let conn = self.conn()?;
        let page = conn.query_row(
            "SELECT title, body, updated_at FROM pages WHERE title = ?1",
            [title],
            row_to_page,
        )?;
        Ok(page)
    }

    /// Create or replace a page body, bumping its timestamp
    pub fn save_page(&self, title: &str, body: &str) -> Result<Page, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO pages (title, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(title) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![title, body, now.to_rfc3339()],
        )?;
        Ok(Page {
            title: title.to_string(),
            body: body.to_string(),
            updated_at: now,
        })
    }

    /// Delete a page together with the edges placing it in categories.
    /// Returns false when there was no such page.
    pub fn delete_page(&self, title: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM pages WHERE title = ?1", [title])?;
        tx.execute(
            "DELETE FROM category_links WHERE member = ?1 AND member_kind = ?2",
            params![title, MemberKind::Page.to_string()],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// All pages, ordered by title
    pub fn list_pages(&self) -> Result<Vec<Page>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT title, body, updated_at FROM pages ORDER BY title")?;
        let pages = stmt
            .query_map([], row_to_page)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pages)
    }

    /// All page titles, ordered
    pub fn list_page_titles(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT title FROM pages ORDER BY title")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(titles)
    }

    /// One uniformly chosen page title, or None on an empty store. Evaluated fresh every call.
    pub fn random_page_title(&self) -> Result<Option<String>, StoreError> {
        let conn = self.conn()?;
        let title = conn
            .query_row("SELECT title FROM pages ORDER BY RANDOM() LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(title)
    }
}
