mod date_windows;
mod phone;
mod review_link;

pub use date_windows::{split_range, DateWindow, MAX_WINDOW_DAYS};
pub use phone::normalize_phone;
pub use review_link::{order_code_from_id, review_link, DEFAULT_RATING, REVIEW_LINK_PLACEHOLDER};
