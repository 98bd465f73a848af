// src/wiki/mod.rs
// =============================================================================
// Talking to a MediaWiki site.
//
// Submodules:
// - api: fetches the rendered HTML of an article through api.php
// - links: picks the important links out of that HTML
// =============================================================================

mod api;
mod links;

pub use api::fetch_article;
pub use links::{extract_links, is_file_link, ArticleLink};
