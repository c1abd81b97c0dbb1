//! Navigation-driven page loading for portal pages.
//!
//! A [`Route`] names the page being viewed. [`PageLoader`] keeps one
//! [`KeyedProxy`](crate::domain::async_proxy::KeyedProxy) per page kind so
//! revisiting the same entity reuses the request already made, while moving
//! to another entity supersedes it. [`render`] turns a page state into the
//! text a view displays.

mod page_loader;
mod render;
mod route;

pub use page_loader::{PageLoader, PageProxy, PageState};
pub use render::{LOADING, SOMETHING_WENT_WRONG, render};
pub use route::{PageKind, Route, RouteError};
