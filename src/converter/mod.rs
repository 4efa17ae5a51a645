// Conversion pipeline modules: parse → render → normalize for content,
// hierarchy → sanitize for placement, readers/writers/fetchers at the edges.
pub mod archive_reader;
pub mod archive_writer;
pub mod errors;
pub mod hierarchy;
pub mod html_parser;
pub mod images;
pub mod markdown;
pub mod normalize;
pub mod page_fetcher;
pub mod pipeline;
pub mod sanitize;
pub mod stats;
