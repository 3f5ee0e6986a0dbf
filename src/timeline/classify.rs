use serde::Serialize;
use std::collections::HashMap;

use crate::models::{PrayerType, Task, TaskId, TaskKind};
use crate::timeline::catalog::PrayerMinutes;
use crate::timeline::reconcile::CompletionMap;
use crate::timeline::window::{
    evening_athkar_window, grace_window, BAQARAH_HOURS, MISSED_LOOKAHEAD,
    MORNING_ATHKAR_HOURS, MULK_HOURS,
};

/// Where a task sits relative to now. Completion is tracked separately and
/// rendered on top of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Past,
    Missed,
    Active,
    Upcoming,
}

/// Assign a status to every task for the given minute of the day.
///
/// The active task is the last one whose slot has started, even when it is
/// already completed. Earlier unfinished tasks become missed from two
/// minutes before the following slot starts. That lookahead can flag a
/// prayer as missed while it is still inside its own grace window when the
/// next slot follows closely; this is kept as is.
pub fn classify(
    catalog: &[Task],
    completion: &CompletionMap,
    now_minute: u32,
) -> HashMap<TaskId, TaskStatus> {
    let last_eligible = catalog
        .iter()
        .rposition(|task| task.scheduled_minute <= now_minute);

    catalog
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let status = match last_eligible {
                Some(active) if i == active => TaskStatus::Active,
                Some(active) if i < active => {
                    let done = completion.get(&task.id).copied().unwrap_or(false);
                    let next_start = catalog[i + 1].scheduled_minute;
                    if !done && now_minute + MISSED_LOOKAHEAD >= next_start {
                        TaskStatus::Missed
                    } else {
                        TaskStatus::Past
                    }
                }
                _ => TaskStatus::Upcoming,
            };
            (task.id, status)
        })
        .collect()
}

/// A task joined with its status and completion flag, in timeline order.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub status: TaskStatus,
    pub completed: bool,
}

pub fn timeline_view(catalog: &[Task], completion: &CompletionMap, now_minute: u32) -> Vec<TaskView> {
    let statuses = classify(catalog, completion, now_minute);
    catalog
        .iter()
        .map(|task| TaskView {
            task: task.clone(),
            status: statuses.get(&task.id).copied().unwrap_or(TaskStatus::Upcoming),
            completed: completion.get(&task.id).copied().unwrap_or(false),
        })
        .collect()
}

/// The single most pressing unfinished obligation for the header badge:
/// a prayer inside its grace window first, then athkar, then Quran.
pub fn current_obligation(
    times: &PrayerMinutes,
    completion: &CompletionMap,
    now_minute: u32,
) -> Option<TaskId> {
    let done = |id: TaskId| completion.get(&id).copied().unwrap_or(false);

    let prayers = [
        (PrayerType::Fajr, TaskId::Fajr),
        (PrayerType::Dhuhr, TaskId::Dhuhr),
        (PrayerType::Asr, TaskId::Asr),
        (PrayerType::Maghrib, TaskId::Maghrib),
        (PrayerType::Isha, TaskId::Isha),
    ];
    // Only the first window that contains now is considered; a finished
    // prayer there lets athkar and Quran through.
    if let Some((_, id)) = prayers
        .iter()
        .find(|(p, _)| grace_window(*p, times.get(*p)).contains(now_minute))
    {
        if !done(*id) {
            return Some(*id);
        }
    }

    if MORNING_ATHKAR_HOURS.contains(now_minute) {
        if !done(TaskId::MorningAthkar) {
            return Some(TaskId::MorningAthkar);
        }
    } else if evening_athkar_window(times.asr, times.maghrib).contains(now_minute)
        && !done(TaskId::EveningAthkar)
    {
        return Some(TaskId::EveningAthkar);
    }

    if BAQARAH_HOURS.contains(now_minute) {
        if !done(TaskId::Baqarah) {
            return Some(TaskId::Baqarah);
        }
    } else if MULK_HOURS.contains(now_minute) && !done(TaskId::Mulk) {
        return Some(TaskId::Mulk);
    }

    None
}

/// Next unfinished prayer still ahead today, with minutes until it starts.
pub fn next_prayer(catalog: &[Task], completion: &CompletionMap, now_minute: u32) -> Option<(TaskId, u32)> {
    catalog
        .iter()
        .filter(|t| t.kind == TaskKind::Prayer)
        .filter(|t| !completion.get(&t.id).copied().unwrap_or(false))
        .find(|t| t.scheduled_minute > now_minute)
        .map(|t| (t.id, t.scheduled_minute - now_minute))
}
