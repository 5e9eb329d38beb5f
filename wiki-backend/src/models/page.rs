use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

/// A wiki page. The title is the unique key and shares a namespace with categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// A category. Addressable as `Category:<title>` and owner of member edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// What sits on the member end of a category link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MemberKind {
    Page,
    Category,
}

/// Directed edge `category -> member`. Never a self-loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryLink {
    pub category: String,
    pub member: String,
    pub member_kind: MemberKind,
}

/// Display form of a title: underscores become spaces.
pub fn display_title(title: &str) -> String {
    title.replace('_', " ")
}
