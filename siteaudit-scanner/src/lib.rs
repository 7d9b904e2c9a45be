pub mod error;
pub mod loader;
pub mod page;
pub mod parser;
pub mod redirects;
pub mod sitemap;

pub use error::ScanError;
pub use loader::{Corpus, Loader, canonical_url};
pub use page::{Page, RawLink};
pub use parser::{PageExtractor, TagSink, parse_page};
pub use redirects::RedirectTable;
