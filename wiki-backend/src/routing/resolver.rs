//! Page resolution
//!
//! Turns a classified route into a renderable `PageView`, a redirect, or a
//! silent no-op. Misses that have a sensible fallback become redirects;
//! misses that don't become `ResolveError::NotFound`; an unreachable store is
//! always `ResolveError::Store` so the HTTP layer can answer 500.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::classifier::{RouteKind, MAIN_PAGE};
use crate::config::Config;
use crate::db::{Database, StoreError};
use crate::device::DeviceClass;
use crate::models::{page::display_title, MemberKind};

/// Prefix under which help pages are stored
pub const HELP_TITLE_PREFIX: &str = "Help-";

/// Functional pages addressed as `Special:<name>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
pub enum SpecialPage {
    Categories,
    AllPages,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Article {
        body: String,
    },
    Category {
        name: String,
        body: String,
        pages: Vec<String>,
        subcategories: Vec<String>,
    },
    Listing {
        entries: Vec<ListingEntry>,
    },
    Error,
}

/// Everything the renderer needs for one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub nav_title: String,
    pub title: String,
    pub heading: String,
    pub content: PageContent,
    pub updated_at: Option<DateTime<Utc>>,
    pub device: DeviceClass,
    /// Category titles for the navigation menu
    pub menu: Vec<String>,
}

impl PageView {
    /// Where the edit button points, if this page is editable.
    pub fn edit_href(&self) -> Option<String> {
        match &self.content {
            PageContent::Article { .. } => Some(format!("/edit/{}", encode_title(&self.title))),
            PageContent::Category { name, .. } => {
                Some(format!("/edit/Category:{}", encode_title(name)))
            }
            PageContent::Listing { .. } | PageContent::Error => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Render(PageView),
    Redirect(String),
    /// Nothing to show; the caller answers without a body
    NoOp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    NotFound(String),
    Store(StoreError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound(what) => write!(f, "{} not found", what),
            ResolveError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<StoreError> for ResolveError {
    fn from(e: StoreError) -> Self {
        ResolveError::Store(e)
    }
}

/// Percent-encode a title for use in a path segment.
pub fn encode_title(title: &str) -> String {
    urlencoding::encode(title).into_owned()
}

pub fn title_href(title: &str) -> String {
    format!("/title/{}", encode_title(title))
}

pub fn category_href(name: &str) -> String {
    format!("/title/Category:{}", encode_title(name))
}

pub struct PageResolver<'a> {
    db: &'a Database,
    config: &'a Config,
}

impl<'a> PageResolver<'a> {
    pub fn new(db: &'a Database, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Dispatch a classified route. `title` is the route identifier from the URL.
    pub fn resolve(
        &self,
        route: &RouteKind,
        title: &str,
        device: DeviceClass,
    ) -> Result<Resolution, ResolveError> {
        match route {
            RouteKind::HelpPage(name) => self.resolve_help(name, device),
            RouteKind::RandomPage => Ok(self.resolve_random()),
            RouteKind::SpecialPage(name) => self.resolve_special(title, name, device),
            RouteKind::CategoryPage(name) => self.resolve_category(title, name, device),
            RouteKind::DefaultPage(page) => self.resolve_default(page, device),
        }
    }

    /// `Help:<name>` reads page `Help-<name>`; a miss sends the reader home.
    pub fn resolve_help(&self, name: &str, device: DeviceClass) -> Result<Resolution, ResolveError> {
        log::info!("[ROUTE] Help page accessed: {}", name);
        let stored_title = format!("{}{}", HELP_TITLE_PREFIX, name);
        match self.db.get_page(&stored_title) {
            Ok(page) => Ok(Resolution::Render(self.view(
                &page.title,
                display_title(name),
                PageContent::Article { body: page.body },
                Some(page.updated_at),
                device,
            )?)),
            Err(StoreError::NotFound) => {
                log::info!("[ROUTE] Help page {} missing, redirecting home", stored_title);
                Ok(Resolution::Redirect("/".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Redirect to a uniformly chosen page. Empty store and store errors are
    /// both a silent no-op.
    pub fn resolve_random(&self) -> Resolution {
        match self.db.random_page_title() {
            Ok(Some(title)) => {
                log::info!("[ROUTE] Random page: {}", title);
                Resolution::Redirect(title_href(&title))
            }
            Ok(None) => {
                log::info!("[ROUTE] Random page requested but no pages exist");
                Resolution::NoOp
            }
            Err(e) => {
                log::error!("[ROUTE] Error occurred in Random Page: {}", e);
                Resolution::NoOp
            }
        }
    }

    pub fn resolve_special(
        &self,
        title: &str,
        name: &str,
        device: DeviceClass,
    ) -> Result<Resolution, ResolveError> {
        log::info!("[ROUTE] Special page accessed: {}", name);
        let Ok(special) = SpecialPage::from_str(name) else {
            return Err(ResolveError::NotFound(format!("special page {}", name)));
        };

        let content = match special {
            SpecialPage::Categories => PageContent::Listing {
                entries: self
                    .db
                    .list_category_titles()?
                    .into_iter()
                    .map(|t| ListingEntry {
                        href: category_href(&t),
                        label: display_title(&t),
                    })
                    .collect(),
            },
            SpecialPage::AllPages => PageContent::Listing {
                entries: self
                    .db
                    .list_page_titles()?
                    .into_iter()
                    .map(|t| ListingEntry {
                        href: title_href(&t),
                        label: display_title(&t),
                    })
                    .collect(),
            },
            SpecialPage::Error => PageContent::Error,
        };

        let heading = match special {
            SpecialPage::AllPages => "All pages".to_string(),
            other => <&'static str>::from(other).to_string(),
        };
        Ok(Resolution::Render(self.view(title, heading, content, None, device)?))
    }

    /// A category page: its own body plus the member list maintained by the
    /// background updater. Unknown only when there is neither a body nor members.
    pub fn resolve_category(
        &self,
        title: &str,
        category_name: &str,
        device: DeviceClass,
    ) -> Result<Resolution, ResolveError> {
        log::info!("[ROUTE] Category: {} (via {})", category_name, title);
        let category = match self.db.get_category(category_name) {
            Ok(c) => Some(c),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        let members = self.db.list_category_members(category_name)?;
        if category.is_none() && members.is_empty() {
            return Err(ResolveError::NotFound(format!("category {}", category_name)));
        }

        let (pages, subcategories): (Vec<_>, Vec<_>) = members
            .into_iter()
            .partition(|l| l.member_kind == MemberKind::Page);
        let updated_at = category.as_ref().map(|c| c.updated_at);

        Ok(Resolution::Render(self.view(
            title,
            format!("Category: {}", display_title(category_name)),
            PageContent::Category {
                name: category_name.to_string(),
                body: category.map(|c| c.body).unwrap_or_default(),
                pages: pages.into_iter().map(|l| l.member).collect(),
                subcategories: subcategories.into_iter().map(|l| l.member).collect(),
            },
            updated_at,
            device,
        )?))
    }

    /// An ordinary page; a miss redirects to the main page. A missing main
    /// page renders empty rather than redirecting to itself.
    pub fn resolve_default(&self, title: &str, device: DeviceClass) -> Result<Resolution, ResolveError> {
        match self.db.get_page(title) {
            Ok(page) => Ok(Resolution::Render(self.view(
                &page.title,
                display_title(&page.title),
                PageContent::Article { body: page.body },
                Some(page.updated_at),
                device,
            )?)),
            Err(StoreError::NotFound) if title == MAIN_PAGE => {
                log::warn!("[ROUTE] {} does not exist yet, rendering placeholder", MAIN_PAGE);
                Ok(Resolution::Render(self.view(
                    MAIN_PAGE,
                    display_title(MAIN_PAGE),
                    PageContent::Article { body: String::new() },
                    None,
                    device,
                )?))
            }
            Err(StoreError::NotFound) => {
                log::debug!("[ROUTE] Page {} missing, redirecting to {}", title, MAIN_PAGE);
                Ok(Resolution::Redirect(title_href(MAIN_PAGE)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn view(
        &self,
        title: &str,
        heading: String,
        content: PageContent,
        updated_at: Option<DateTime<Utc>>,
        device: DeviceClass,
    ) -> Result<PageView, StoreError> {
        Ok(PageView {
            nav_title: self.config.site_title.clone(),
            title: title.to_string(),
            heading,
            content,
            updated_at,
            device,
            menu: self.db.list_category_titles()?,
        })
    }
}

/// Names of all special pages, for the admin dashboard
pub fn special_page_names() -> Vec<&'static str> {
    SpecialPage::iter().map(<&'static str>::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::classify;

    fn setup() -> (Database, Config) {
        (Database::new(":memory:").unwrap(), Config::for_tests("TestWiki"))
    }

    fn rendered(res: Resolution) -> PageView {
        match res {
            Resolution::Render(view) => view,
            other => panic!("expected render, got {:?}", other),
        }
    }

    #[test]
    fn test_help_page_renders_stored_help_prefix() {
        let (db, config) = setup();
        db.save_page("Help-Intro", "Welcome!").unwrap();
        let resolver = PageResolver::new(&db, &config);

        let view = rendered(resolver.resolve_help("Intro", DeviceClass::Desktop).unwrap());
        assert_eq!(view.title, "Help-Intro");
        assert_eq!(view.nav_title, "TestWiki");
        assert_eq!(view.content, PageContent::Article { body: "Welcome!".to_string() });
    }

    #[test]
    fn test_missing_help_page_redirects_home() {
        let (db, config) = setup();
        let resolver = PageResolver::new(&db, &config);
        assert_eq!(
            resolver.resolve_help("Intro", DeviceClass::Mobile).unwrap(),
            Resolution::Redirect("/".to_string())
        );
    }

    #[test]
    fn test_random_over_titles() {
        let (db, config) = setup();
        let resolver = PageResolver::new(&db, &config);
        assert_eq!(resolver.resolve_random(), Resolution::NoOp);

        for t in ["A", "B", "C"] {
            db.save_page(t, "").unwrap();
        }
        for _ in 0..20 {
            match resolver.resolve_random() {
                Resolution::Redirect(loc) => {
                    assert!(["/title/A", "/title/B", "/title/C"].contains(&loc.as_str()))
                }
                other => panic!("expected redirect, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_special_pages() {
        let (db, config) = setup();
        db.save_category("Animals", "").unwrap();
        db.save_page("Dog", "").unwrap();
        let resolver = PageResolver::new(&db, &config);

        let view = rendered(
            resolver
                .resolve_special("Special", "Categories", DeviceClass::Desktop)
                .unwrap(),
        );
        assert_eq!(
            view.content,
            PageContent::Listing {
                entries: vec![ListingEntry {
                    label: "Animals".to_string(),
                    href: "/title/Category:Animals".to_string(),
                }]
            }
        );
        assert_eq!(view.menu, vec!["Animals".to_string()]);
        assert_eq!(view.edit_href(), None);

        let view = rendered(
            resolver
                .resolve_special("Special", "AllPages", DeviceClass::Desktop)
                .unwrap(),
        );
        assert!(matches!(view.content, PageContent::Listing { ref entries } if entries.len() == 1));

        let view = rendered(resolver.resolve_special("Error", "Error", DeviceClass::Desktop).unwrap());
        assert_eq!(view.content, PageContent::Error);
    }

    #[test]
    fn test_unknown_special_page_is_not_found() {
        let (db, config) = setup();
        let resolver = PageResolver::new(&db, &config);
        assert!(matches!(
            resolver.resolve_special("Special", "Nope", DeviceClass::Desktop),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_category_page_lists_members() {
        let (db, config) = setup();
        db.save_category("Mammals", "Warm blooded.").unwrap();
        db.replace_member_links("Dog", MemberKind::Page, &["Mammals".to_string()]).unwrap();
        db.replace_member_links("Primates", MemberKind::Category, &["Mammals".to_string()])
            .unwrap();
        let resolver = PageResolver::new(&db, &config);

        let view = rendered(
            resolver
                .resolve_category("Category", "Mammals", DeviceClass::Desktop)
                .unwrap(),
        );
        assert_eq!(
            view.content,
            PageContent::Category {
                name: "Mammals".to_string(),
                body: "Warm blooded.".to_string(),
                pages: vec!["Dog".to_string()],
                subcategories: vec!["Primates".to_string()],
            }
        );
        assert_eq!(view.edit_href().as_deref(), Some("/edit/Category:Mammals"));
    }

    #[test]
    fn test_category_with_members_but_no_body_still_renders() {
        let (db, config) = setup();
        db.replace_member_links("Dog", MemberKind::Page, &["Pets".to_string()]).unwrap();
        let resolver = PageResolver::new(&db, &config);

        assert!(matches!(
            resolver.resolve_category("Category", "Pets", DeviceClass::Desktop),
            Ok(Resolution::Render(_))
        ));
        assert!(matches!(
            resolver.resolve_category("Category", "Nothing", DeviceClass::Desktop),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[test]
    fn test_default_page_and_fallbacks() {
        let (db, config) = setup();
        let resolver = PageResolver::new(&db, &config);

        assert_eq!(
            resolver.resolve_default("Missing", DeviceClass::Desktop).unwrap(),
            Resolution::Redirect("/title/Main_page".to_string())
        );
        let placeholder = rendered(resolver.resolve_default(MAIN_PAGE, DeviceClass::Desktop).unwrap());
        assert_eq!(placeholder.heading, "Main page");
        assert_eq!(placeholder.updated_at, None);

        db.save_page("Rust_lang", "Fast.").unwrap();
        let view = rendered(resolver.resolve_default("Rust_lang", DeviceClass::Desktop).unwrap());
        assert_eq!(view.heading, "Rust lang");
        assert_eq!(view.edit_href().as_deref(), Some("/edit/Rust_lang"));
    }

    #[test]
    fn test_resolve_dispatches_on_classification() {
        let (db, config) = setup();
        db.save_page("Help-Foo:Bar", "nested").unwrap();
        let resolver = PageResolver::new(&db, &config);

        let view = rendered(
            resolver
                .resolve(&classify("Help:Foo:Bar"), "Help", DeviceClass::Desktop)
                .unwrap(),
        );
        assert_eq!(view.title, "Help-Foo:Bar");
    }

    #[test]
    fn test_special_page_names() {
        assert_eq!(special_page_names(), vec!["Categories", "AllPages", "Error"]);
    }
}
