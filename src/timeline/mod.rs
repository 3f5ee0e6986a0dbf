pub mod catalog;
pub mod classify;
pub mod day;
pub mod dispatch;
pub mod error;
pub mod gesture;
pub mod notify;
pub mod reconcile;
pub mod ticker;
pub mod window;

pub use catalog::{baqarah_target_page, build_catalog, PrayerMinutes};
pub use classify::{classify, TaskStatus, TaskView};
pub use day::{Day, Timeline};
pub use dispatch::{CompletionEffects, Dispatcher, Outcome, ReaderRequest};
pub use error::{CatalogError, StoreError, TimeFormatError};
pub use gesture::{ClickRecognizer, Gesture, Point, SwipeRule};
pub use notify::ChangeBus;
pub use reconcile::{CompletionMap, CompletionStore, QuranProgress, Reconciler};
pub use ticker::{minute_of_day, Clock, SystemClock};
