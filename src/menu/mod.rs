//! Paginated selection menus sized to the terminal.
//!
//! A [`MenuEngine`] owns the buffered items and the cursor into them, renders one
//! screenful at a time, asks its [`MenuFeed`] for more rows when the buffer runs low,
//! and classifies each line the user types into a [`Selection`].

mod engine;
mod error;
mod feed;
mod item;

pub use engine::{MenuEngine, MenuPhase, PassThrough, Selection, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use error::MenuError;
pub use feed::{MenuFeed, PageLimits, PagedFeed, ResultProvider, UPSTREAM_PAGE_CAP};
pub use item::{DisplayItem, MenuState, MenuText};
