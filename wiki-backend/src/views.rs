//! Server-side HTML rendering.
//!
//! Titles and other user-supplied strings are escaped; stored page bodies are
//! admin-authored and emitted as-is.

use chrono::{DateTime, Utc};

use crate::device::DeviceClass;
use crate::models::page::display_title;
use crate::routing::resolver::{category_href, encode_title, title_href, PageContent, PageView};

/// Shown instead of a timestamp for content that was never saved
pub const UPDATED_NOT_AVAILABLE: &str = "Not Available";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn format_updated(updated_at: Option<DateTime<Utc>>) -> String {
    updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| UPDATED_NOT_AVAILABLE.to_string())
}

fn layout(nav_title: &str, heading: &str, menu: &[String], device: DeviceClass, inner: &str) -> String {
    let menu_items: String = menu
        .iter()
        .map(|c| {
            format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&category_href(c)),
                escape_html(&display_title(c))
            )
        })
        .collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{heading} - {nav}</title>\n\
         <link rel=\"stylesheet\" href=\"/images/lector.css\">\n</head>\n<body>\n\
         <nav><a href=\"/\">{nav}</a> | <a href=\"/title/Special:Random\">Random page</a> | \
         <a href=\"/title/Special:Categories\">Categories</a></nav>\n\
         <ul class=\"menu\">{menu_items}</ul>\n\
         <div class=\"{size}\">\n<h1>{heading}</h1>\n{inner}\n</div>\n</body>\n</html>\n",
        heading = escape_html(heading),
        nav = escape_html(nav_title),
        size = device.size_class(),
        menu_items = menu_items,
        inner = inner,
    )
}

fn link_list<'a>(items: impl Iterator<Item = (String, &'a str)>) -> String {
    let lis: String = items
        .map(|(href, label)| {
            format!(
                "<li><a href=\"{}\">{}</a></li>",
                escape_html(&href),
                escape_html(&display_title(label))
            )
        })
        .collect();
    format!("<ul>{}</ul>", lis)
}

/// Render a resolved page
pub fn render_page(view: &PageView) -> String {
    let mut inner = match &view.content {
        PageContent::Article { body } => format!("<article>{}</article>", body),
        PageContent::Category {
            body,
            pages,
            subcategories,
            ..
        } => {
            let mut html = format!("<article>{}</article>", body);
            if !subcategories.is_empty() {
                html.push_str("<h2>Subcategories</h2>");
                html.push_str(&link_list(
                    subcategories.iter().map(|s| (category_href(s), s.as_str())),
                ));
            }
            html.push_str("<h2>Pages</h2>");
            html.push_str(&link_list(pages.iter().map(|p| (title_href(p), p.as_str()))));
            html
        }
        PageContent::Listing { entries } => {
            let lis: String = entries
                .iter()
                .map(|e| {
                    format!(
                        "<li><a href=\"{}\">{}</a></li>",
                        escape_html(&e.href),
                        escape_html(&e.label)
                    )
                })
                .collect();
            format!("<ul>{}</ul>", lis)
        }
        PageContent::Error => "<p>Something went wrong, or you are not allowed to do that.</p>\
             <p><a href=\"/\">Back to the main page</a> or <a href=\"/login\">log in</a>.</p>"
            .to_string(),
    };

    if let Some(edit) = view.edit_href() {
        inner.push_str(&format!(
            "\n<footer>Last updated: {} | <a href=\"{}\">Edit</a></footer>",
            escape_html(&format_updated(view.updated_at)),
            escape_html(&edit)
        ));
    }

    layout(&view.nav_title, &view.heading, &view.menu, view.device, &inner)
}

/// Which store an edit form saves into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Page,
    Category,
}

#[derive(Debug, Clone)]
pub struct EditForm {
    pub nav_title: String,
    pub title: String,
    pub body: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub target: EditTarget,
    pub device: DeviceClass,
    pub menu: Vec<String>,
}

pub fn render_edit(form: &EditForm) -> String {
    let action = match form.target {
        EditTarget::Page => format!("/save/{}", encode_title(&form.title)),
        EditTarget::Category => format!("/savecat/{}", encode_title(&form.title)),
    };
    let heading = match form.target {
        EditTarget::Page => format!("Editing {}", display_title(&form.title)),
        EditTarget::Category => format!("Editing Category: {}", display_title(&form.title)),
    };
    let inner = format!(
        "<form action=\"{action}\" method=\"POST\">\n\
         <textarea name=\"body\" rows=\"20\" cols=\"80\">{body}</textarea>\n\
         <p>Last updated: {updated}</p>\n\
         <input type=\"submit\" value=\"Save\">\n</form>",
        action = escape_html(&action),
        body = escape_html(&form.body),
        updated = escape_html(&format_updated(form.updated_at)),
    );
    layout(&form.nav_title, &heading, &form.menu, form.device, &inner)
}

pub fn render_add(nav_title: &str, menu: &[String], device: DeviceClass) -> String {
    let inner = "<form action=\"/addpage\" method=\"POST\">\n\
                 <input type=\"text\" name=\"title\" placeholder=\"Title\" pattern=\"[A-Za-z0-9'_-]+\" required>\n\
                 <textarea name=\"body\" rows=\"20\" cols=\"80\"></textarea>\n\
                 <input type=\"submit\" value=\"Create page\">\n</form>\n\
                 <h2>Add category</h2>\n\
                 <form action=\"/category/\" method=\"POST\">\n\
                 <input type=\"text\" name=\"title\" placeholder=\"Category\" pattern=\"[A-Za-z0-9'_-]+\" required>\n\
                 <textarea name=\"body\" rows=\"5\" cols=\"80\"></textarea>\n\
                 <input type=\"submit\" value=\"Create category\">\n</form>";
    layout(nav_title, "Add Page", menu, device, inner)
}

pub fn render_admin(
    nav_title: &str,
    pages: &[String],
    categories: &[String],
    special_pages: &[&str],
    device: DeviceClass,
) -> String {
    let rows = |kind: &str, titles: &[String], href: fn(&str) -> String| -> String {
        titles
            .iter()
            .map(|t| {
                format!(
                    "<tr><td><a href=\"{}\">{}</a></td><td><a href=\"/delete/{}/{}\">Delete</a></td></tr>",
                    escape_html(&href(t)),
                    escape_html(&display_title(t)),
                    kind,
                    escape_html(&encode_title(t))
                )
            })
            .collect()
    };
    let specials: String = special_pages
        .iter()
        .map(|s| {
            format!(
                "<li><a href=\"/title/Special:{}\">{}</a></li>",
                escape_html(s),
                escape_html(s)
            )
        })
        .collect();
    let inner = format!(
        "<p><a href=\"/add\">Add page</a> | <a href=\"/logout\">Log out</a></p>\n\
         <h2>Pages</h2>\n<table>{}</table>\n\
         <h2>Categories</h2>\n<table>{}</table>\n\
         <h2>Special pages</h2>\n<ul>{}</ul>",
        rows("page", pages, title_href),
        rows("category", categories, category_href),
        specials,
    );
    layout(nav_title, "Admin", categories, device, &inner)
}

pub fn render_login(nav_title: &str, failed: bool, device: DeviceClass) -> String {
    let notice = if failed {
        "<p class=\"error\">Invalid username or password.</p>\n"
    } else {
        ""
    };
    let inner = format!(
        "{}<form action=\"/loginPost\" method=\"POST\">\n\
         <input type=\"text\" name=\"username\" placeholder=\"Username\" required>\n\
         <input type=\"password\" name=\"password\" placeholder=\"Password\" required>\n\
         <input type=\"submit\" value=\"Log in\">\n</form>",
        notice
    );
    layout(nav_title, "Log in", &[], device, &inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_article_with_edit_link() {
        let view = PageView {
            nav_title: "ArcWiki".to_string(),
            title: "Rust_lang".to_string(),
            heading: "Rust lang".to_string(),
            content: PageContent::Article {
                body: "<p>Fast.</p>".to_string(),
            },
            updated_at: None,
            device: DeviceClass::Mobile,
            menu: vec!["Languages".to_string()],
        };
        let html = render_page(&view);

        assert!(html.contains("<p>Fast.</p>"));
        assert!(html.contains("/edit/Rust_lang"));
        assert!(html.contains(UPDATED_NOT_AVAILABLE));
        assert!(html.contains(DeviceClass::Mobile.size_class()));
        assert!(html.contains("/title/Category:Languages"));
    }

    #[test]
    fn test_render_category_members() {
        let view = PageView {
            nav_title: "ArcWiki".to_string(),
            title: "Category".to_string(),
            heading: "Category: Mammals".to_string(),
            content: PageContent::Category {
                name: "Mammals".to_string(),
                body: String::new(),
                pages: vec!["Dog".to_string()],
                subcategories: vec!["Big_Cats".to_string()],
            },
            updated_at: None,
            device: DeviceClass::Desktop,
            menu: vec![],
        };
        let html = render_page(&view);

        assert!(html.contains("/title/Dog"));
        assert!(html.contains("/title/Category:Big_Cats"));
        assert!(html.contains("Big Cats"));
        assert!(html.contains("/edit/Category:Mammals"));
    }

    #[test]
    fn test_render_edit_form_targets() {
        let mut form = EditForm {
            nav_title: "ArcWiki".to_string(),
            title: "Dog".to_string(),
            body: "</textarea><script>".to_string(),
            updated_at: None,
            target: EditTarget::Page,
            device: DeviceClass::Desktop,
            menu: vec![],
        };
        let html = render_edit(&form);
        assert!(html.contains("action=\"/save/Dog\""));
        assert!(html.contains("&lt;/textarea&gt;"));

        form.target = EditTarget::Category;
        assert!(render_edit(&form).contains("action=\"/savecat/Dog\""));
    }
}
