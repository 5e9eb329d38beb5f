pub mod page;
pub mod session;

pub use page::{Category, CategoryLink, MemberKind, Page};
pub use session::Session;
