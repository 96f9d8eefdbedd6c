pub mod types;
pub mod models;
pub mod error;
pub mod config;
pub mod power;
pub mod baseline;
pub mod insights;
pub mod deviation;
pub mod fatigue;
pub mod profile_check;
pub mod alerts;
pub mod engine;
pub mod scoring;
pub mod archive;
pub mod metrics;
pub mod payload;

#[cfg(feature = "python")]
mod py;

pub use alerts::{Alert, AlertKind};
pub use archive::{
    build_archive, ArchiveInputs, ArchiveOutcome, ArchivePolicy, EventRecord, MinDaysAfterSeasonEnd,
    RaterKind, RatingRecord, SeasonArchive, SeasonArchiver,
};
pub use baseline::{compute_baselines, compute_baselines_for_year, BaselineSet, GroupAverages};
pub use config::{load_config, save_config, EngineConfig};
pub use deviation::{detect_deviations, detect_profile_highlight, detect_scout_matches};
pub use engine::{run_engine, EngineReport};
pub use error::{EngineError, EngineResult};
pub use fatigue::{detect_fatigue_regression, regression_ratio};
pub use insights::{Insight, InsightKind, Severity};
pub use models::{Athlete, FatigueProfiles, PowerSubject, ScoutCandidate, SubjectKind};
pub use payload::{build_archive_json, run_engine_json};
pub use power::{get_power, DEFAULT_MASS_KG};
pub use profile_check::detect_profile_mismatch;
pub use types::{AgeCategory, Duration, FatigueState, PowerMode, PowerProfile, Role, Sex};
