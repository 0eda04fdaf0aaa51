//! Reusable UI components.

mod footer;
mod header;

pub use footer::{draw_footer, quit_hint, FooterInfo};
pub use header::{draw_title, header_row};
