//! Category database operations

use chrono::Utc;
use rusqlite::params;

use super::super::sqlite::{parse_timestamp, StoreError};
use super::super::Database;
use crate::models::{Category, MemberKind};

fn row_to_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    let updated_at: String = row.get(2)?;
    Ok(Category {
        title: row.get(0)?,
        body: row.get(1)?,
        updated_at: parse_timestamp(2, &updated_at)?,
    })
}

impl Database {
    pub fn get_category(&self, title: &str) -> Result<Category, StoreError> {
        let conn = self.conn()?;
        let category = conn.query_row(
            "SELECT title, body, updated_at FROM categories WHERE title = ?1",
            [title],
            row_to_category,
        )?;
        Ok(category)
    }

    /// Create or replace a category body
    pub fn save_category(&self, title: &str, body: &str) -> Result<Category, StoreError> {
        let conn = self.conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO categories (title, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(title) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at",
            params![title, body, now.to_rfc3339()],
        )?;
        Ok(Category {
            title: title.to_string(),
            body: body.to_string(),
            updated_at: now,
        })
    }

    /// Delete a category, its member edges, and the edges placing it under parents.
    pub fn delete_category(&self, title: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM categories WHERE title = ?1", [title])?;
        tx.execute(
            "DELETE FROM category_links
             WHERE category = ?1 OR (member = ?1 AND member_kind = ?2)",
            params![title, MemberKind::Category.to_string()],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT title, body, updated_at FROM categories ORDER BY title")?;
        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    pub fn list_category_titles(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT title FROM categories ORDER BY title")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(titles)
    }
}
