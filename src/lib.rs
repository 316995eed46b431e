pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod metrics;
pub mod rankings;
pub mod record;
pub mod summary;

pub use dataset::{LoadReport, LoadWarning, RawTable, load_csv, load_table, normalize};
pub use error::{LoadError, SchemaError, UnknownStat};
pub use filter::{EmptyResultNotice, FilterOutcome, FilterSpec, filter};
pub use metrics::{DerivedMetrics, Numeric, derive};
pub use rankings::{Comparison, RankedEntry, StatKey, compare, top_n};
pub use record::{PlayerRecord, PlayerRow, PlayerTable, Position, View};
