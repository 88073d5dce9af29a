pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    empty, hazard_flags, header, identifier, info, recommendation, record_failures, section,
    status, success, summary_row, warn,
};
pub use progress::{ProgressManager, Spinner};
pub use progress_message::ProgressMessage;
pub use table::{chemicals_table, exposure_limits_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
