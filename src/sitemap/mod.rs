//! Sitemap bootstrap
//!
//! A crawl can be seeded from a sitemap in addition to its explicit seed
//! URLs; the entries are pushed in document order before the seeds.

mod reader;

pub use reader::get;
