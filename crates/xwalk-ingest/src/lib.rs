//! Schema-validated loading of the crosswalk inputs.
//!
//! Every loader reads its file completely and validates each row into typed
//! records before returning; malformed input fails the load instead of being
//! coerced.

pub mod delimited;
pub mod error;
pub mod fingerprint;
pub mod occupation;
pub mod reference;
pub mod taxonomy;
pub mod usage;
pub mod wages;

pub use delimited::{DelimitedTable, delimiter_for, read_delimited};
pub use error::{IngestError, Result};
pub use fingerprint::{InputFingerprint, fingerprint_file, sha256_hex};
pub use occupation::{load_education, load_job_zones, load_occupations};
pub use reference::{ReferenceSources, load_reference_data};
pub use taxonomy::{load_task_importance, load_task_statements};
pub use usage::{ColumnFilter, UsageLayout, UsageLoad, load_usage};
pub use wages::load_wages;
