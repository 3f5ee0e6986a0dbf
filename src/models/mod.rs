pub mod prayer;
pub mod records;
pub mod stats;
pub mod task;

pub use prayer::{PrayerTimes, PrayerType};
pub use records::{AthkarRecord, AthkarType, PrayerRecord, QuranRecord, Surah, FULLY_READ_PAGES};
pub use stats::{DailyProgress, Tally, WeeklyDay};
pub use task::{CompletionKey, Task, TaskId, TaskKind};
