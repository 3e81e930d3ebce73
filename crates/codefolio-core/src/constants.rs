/// Default number of projects per feed page.
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// The backend rejects identifier-membership queries with more ids than this.
pub const AUTHOR_BATCH_SIZE: usize = 10;

/// Highest code point the backend orders after every printable string.
/// Appending it to a lowercased search term turns a prefix match into a
/// half-open range: `title >= term && title < term + SENTINEL`.
pub const TITLE_RANGE_SENTINEL: char = '\u{f8ff}';
