use chrono::Datelike;

use crate::models::{AthkarType, CompletionKey, Surah, Task, TaskId, TaskKind};
use crate::timeline::catalog::baqarah_target_page;
use crate::timeline::day::Day;
use crate::timeline::gesture::Gesture;
use crate::timeline::reconcile::Reconciler;

/// Hook for the cosmetic side of finishing a task (vibration, confetti).
pub trait CompletionEffects {
    fn haptic(&mut self) {}
    fn celebrate(&mut self, _task: &Task) {}
}

/// Request for an external reader to open. Readers report back only
/// through the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderRequest {
    Quran { surah: Surah, page: Option<u32> },
    Athkar(AthkarType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Set(bool),
    OpenReader,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Changed { task: TaskId, completed: bool },
    OpenReader(ReaderRequest),
    Ignored,
    Failed(TaskId),
}

/// What a gesture means for a task of `kind` that is or isn't done yet.
pub fn decide(kind: TaskKind, completed: bool, gesture: Gesture) -> Action {
    let readable = matches!(kind, TaskKind::Quran | TaskKind::Athkar);
    match gesture {
        Gesture::SingleClick if readable && !completed => Action::OpenReader,
        Gesture::SingleClick => Action::Set(!completed),
        Gesture::DoubleClick if readable && !completed => Action::Set(true),
        Gesture::DoubleClick => Action::Set(!completed),
        Gesture::SwipeLeft if !completed => Action::Set(true),
        Gesture::SwipeLeft => Action::Nothing,
    }
}

pub fn reader_request(day: &Day, id: TaskId) -> Option<ReaderRequest> {
    match id.key() {
        CompletionKey::Quran(surah) => Some(ReaderRequest::Quran {
            surah,
            page: (surah == Surah::Baqarah).then(|| baqarah_target_page(day.date.weekday())),
        }),
        CompletionKey::Athkar(athkar) => Some(ReaderRequest::Athkar(athkar)),
        CompletionKey::Prayer(_) => None,
    }
}

pub struct Dispatcher<'a> {
    reconciler: &'a Reconciler,
    user: &'a str,
    effects: &'a mut dyn CompletionEffects,
}

impl<'a> Dispatcher<'a> {
    pub fn new(reconciler: &'a Reconciler, user: &'a str, effects: &'a mut dyn CompletionEffects) -> Self {
        Self {
            reconciler,
            user,
            effects,
        }
    }

    pub fn dispatch(&mut self, day: &mut Day, id: TaskId, gesture: Gesture) -> Outcome {
        let Some(task) = day.task(id).cloned() else {
            log::debug!("{:?} on {} ignored: no timeline for {}", gesture, id, day.date);
            return Outcome::Ignored;
        };
        let completed = day.is_completed(id);

        match decide(task.kind, completed, gesture) {
            Action::Set(value) => self.apply(day, &task, value),
            Action::OpenReader => match reader_request(day, id) {
                Some(request) => Outcome::OpenReader(request),
                None => Outcome::Ignored,
            },
            Action::Nothing => Outcome::Ignored,
        }
    }

    /// Local state only changes once the store accepted the write.
    fn apply(&mut self, day: &mut Day, task: &Task, value: bool) -> Outcome {
        if let Err(e) = self.reconciler.set_completion(self.user, day.date, task, value) {
            log::error!("could not set {} to {}: {}", task.id, value, e);
            return Outcome::Failed(task.id);
        }
        day.completion.insert(task.id, value);
        if value {
            self.effects.haptic();
            self.effects.celebrate(task);
        }
        Outcome::Changed {
            task: task.id,
            completed: value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrayerTimes, FULLY_READ_PAGES};
    use crate::timeline::reconcile::tests::{date, reconciler, BrokenStore};
    use crate::timeline::reconcile::CompletionStore;
    use crate::timeline::notify::ChangeBus;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        haptics: usize,
        celebrated: Vec<TaskId>,
    }

    impl CompletionEffects for Recorder {
        fn haptic(&mut self) {
            self.haptics += 1;
        }
        fn celebrate(&mut self, task: &Task) {
            self.celebrated.push(task.id);
        }
    }

    fn day(reconciler: &Reconciler) -> Day {
        let mut day = Day::build(date(), &PrayerTimes::fallback());
        day.reload(reconciler, "u1");
        day
    }

    #[test]
    fn decision_table() {
        use Gesture::*;
        assert_eq!(decide(TaskKind::Prayer, false, SingleClick), Action::Set(true));
        assert_eq!(decide(TaskKind::Prayer, true, SingleClick), Action::Set(false));
        assert_eq!(decide(TaskKind::Quran, false, SingleClick), Action::OpenReader);
        assert_eq!(decide(TaskKind::Athkar, true, SingleClick), Action::Set(false));
        assert_eq!(decide(TaskKind::Athkar, false, DoubleClick), Action::Set(true));
        assert_eq!(decide(TaskKind::Quran, true, DoubleClick), Action::Set(false));
        assert_eq!(decide(TaskKind::Prayer, true, DoubleClick), Action::Set(false));
        assert_eq!(decide(TaskKind::Prayer, false, SwipeLeft), Action::Set(true));
        assert_eq!(decide(TaskKind::Quran, true, SwipeLeft), Action::Nothing);
    }

    #[test]
    fn single_click_on_unread_quran_opens_reader_with_todays_page() {
        let (reconciler, _) = reconciler();
        let mut day = day(&reconciler);
        let mut fx = Recorder::default();
        let outcome = Dispatcher::new(&reconciler, "u1", &mut fx).dispatch(&mut day, TaskId::Baqarah, Gesture::SingleClick);
        assert_eq!(
            outcome,
            Outcome::OpenReader(ReaderRequest::Quran { surah: Surah::Baqarah, page: Some(4) })
        );
        assert!(!day.is_completed(TaskId::Baqarah));
    }

    #[test]
    fn double_click_completes_quran_without_opening_reader() {
        let (reconciler, store) = reconciler();
        let mut day = day(&reconciler);
        let mut fx = Recorder::default();
        let outcome = Dispatcher::new(&reconciler, "u1", &mut fx).dispatch(&mut day, TaskId::Mulk, Gesture::DoubleClick);

        assert_eq!(outcome, Outcome::Changed { task: TaskId::Mulk, completed: true });
        assert!(day.is_completed(TaskId::Mulk));
        let stored = store.quran("u1", date()).unwrap();
        assert_eq!(stored[0].pages_read, FULLY_READ_PAGES);
        assert_eq!(fx.haptics, 1);
        assert_eq!(fx.celebrated, vec![TaskId::Mulk]);
    }

    #[test]
    fn single_click_toggles_prayers_both_ways() {
        let (reconciler, _) = reconciler();
        let mut day = day(&reconciler);
        let mut fx = Recorder::default();
        let mut dispatcher = Dispatcher::new(&reconciler, "u1", &mut fx);

        dispatcher.dispatch(&mut day, TaskId::Maghrib, Gesture::SingleClick);
        assert!(day.is_completed(TaskId::Maghrib));
        dispatcher.dispatch(&mut day, TaskId::Maghrib, Gesture::SingleClick);
        assert!(!day.is_completed(TaskId::Maghrib));
        drop(dispatcher);
        assert_eq!(fx.celebrated, vec![TaskId::Maghrib]);
    }

    #[test]
    fn swipe_on_completed_task_does_nothing() {
        let (reconciler, _) = reconciler();
        let mut day = day(&reconciler);
        let mut fx = Recorder::default();
        let mut dispatcher = Dispatcher::new(&reconciler, "u1", &mut fx);

        let first = dispatcher.dispatch(&mut day, TaskId::EveningAthkar, Gesture::SwipeLeft);
        assert_eq!(first, Outcome::Changed { task: TaskId::EveningAthkar, completed: true });
        let second = dispatcher.dispatch(&mut day, TaskId::EveningAthkar, Gesture::SwipeLeft);
        assert_eq!(second, Outcome::Ignored);
        assert!(day.is_completed(TaskId::EveningAthkar));
        drop(dispatcher);
        assert_eq!(fx.haptics, 1);
    }

    #[test]
    fn failed_write_leaves_local_state_alone() {
        let reconciler = Reconciler::new(Arc::new(BrokenStore), Arc::new(ChangeBus::new()));
        let mut day = day(&reconciler);
        let mut fx = Recorder::default();
        let outcome = Dispatcher::new(&reconciler, "u1", &mut fx).dispatch(&mut day, TaskId::Fajr, Gesture::SwipeLeft);

        assert_eq!(outcome, Outcome::Failed(TaskId::Fajr));
        assert!(!day.is_completed(TaskId::Fajr));
        assert_eq!(fx.haptics, 0);
    }

    #[test]
    fn gestures_without_a_timeline_are_ignored() {
        let (reconciler, _) = reconciler();
        let mut day = Day::build(date(), &PrayerTimes::new("bad", "12:30", "15:45", "18:20", "19:45"));
        let mut fx = Recorder::default();
        let outcome = Dispatcher::new(&reconciler, "u1", &mut fx).dispatch(&mut day, TaskId::Fajr, Gesture::SingleClick);
        assert_eq!(outcome, Outcome::Ignored);
    }
}
