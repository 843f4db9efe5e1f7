pub mod sitemap;

pub use sitemap::{SitemapError, build_sitemap};
