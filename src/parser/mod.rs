// Parser module: price text normalization and the CSV export importer.

pub mod price;
pub mod serp_csv;

pub use price::PriceParser;
pub use serp_csv::SerpCsvImporter;
