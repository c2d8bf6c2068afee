pub mod artifact;
pub mod download;
pub mod exporter;
pub mod locator;

pub use artifact::Artifact;
pub use download::{DirectoryDownloads, DownloadLink, DownloadReceipt, DownloadSink};
pub use exporter::{ExportOutcome, Exporter};
pub use locator::{Locator, LocatorRegistry};
