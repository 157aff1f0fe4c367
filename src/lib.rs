mod checker;
mod error;
mod measurements;
mod request;
mod stations;
mod types;
mod utils;
mod verdict;

pub use checker::*;
pub use error::WindCheckError;
pub use request::*;
pub use utils::get_data_dir;

pub use types::date_window::DateWindow;
pub use types::location::Location;
pub use types::observation::{MeasurementKind, Observation};
pub use types::station::{ElevationCheck, RankedStation, Station};

pub use stations::catalog::{StationCatalog, Town};
pub use stations::error::StationError;
pub use stations::geo_filter::*;

pub use measurements::aggregator::{aggregate, dedup_observations, Aggregation, StationSummary};
pub use measurements::error::MeasurementError;
pub use measurements::filtering::WindFrameFilterExt;
pub use measurements::frame_store::FrameStore;
pub use measurements::store::{MeasurementSession, MeasurementStore, MemoryStore};

pub use verdict::engine::{closest_with_data, evaluate, Evidence, Outcome, Reason, Verdict};
pub use verdict::error::VerdictError;
pub use verdict::thresholds::*;
