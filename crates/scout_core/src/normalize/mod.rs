pub mod dates;
pub mod text;

pub use dates::parse_published_date;
pub use text::collapse_whitespace;
