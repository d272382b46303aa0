pub mod csv_export;
pub mod snapshot;

pub use csv_export::export_csv;
pub use snapshot::{load_snapshot, save_snapshot};
