//! Patient Domain
//!
//! Daily check-ins, habits, goals and the protocols a provider assigned.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::container::Dependencies;
use crate::services::SyncOutbox;
use crate::store::middleware::Validators;
use crate::store::Action;

/// Store name of the patient domain.
pub const PATIENT_STORE: &str = "patient";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub date: NaiveDate,
    /// 1 (low) to 5 (high)
    pub mood: u8,
    pub energy: u8,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed_on: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub target: u32,
    #[serde(default)]
    pub progress: u32,
}

impl Goal {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }
}

// == State ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientState {
    pub check_ins: Vec<CheckIn>,
    pub habits: Vec<Habit>,
    pub goals: Vec<Goal>,
    pub protocol_ids: Vec<String>,
}

impl PatientState {
    pub fn latest_check_in(&self) -> Option<&CheckIn> {
        self.check_ins.iter().max_by_key(|c| c.date)
    }
}

// == Actions ==
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PatientAction {
    RecordCheckIn(CheckIn),
    AddHabit(Habit),
    CompleteHabit { habit_id: String, date: NaiveDate },
    RemoveHabit(String),
    SetGoal(Goal),
    UpdateGoalProgress { goal_id: String, progress: u32 },
    SetProtocols(Vec<String>),
}

impl Action for PatientAction {
    fn kind(&self) -> &'static str {
        match self {
            PatientAction::RecordCheckIn(_) => "record_check_in",
            PatientAction::AddHabit(_) => "add_habit",
            PatientAction::CompleteHabit { .. } => "complete_habit",
            PatientAction::RemoveHabit(_) => "remove_habit",
            PatientAction::SetGoal(_) => "set_goal",
            PatientAction::UpdateGoalProgress { .. } => "update_goal_progress",
            PatientAction::SetProtocols(_) => "set_protocols",
        }
    }
}

// == Reducer ==
pub fn reduce(
    state: &Arc<PatientState>,
    action: &PatientAction,
) -> anyhow::Result<Arc<PatientState>> {
    let mut next = (**state).clone();
    match action {
        PatientAction::RecordCheckIn(check_in) => {
            // One check-in per day; a second one replaces the first
            next.check_ins.retain(|c| c.date != check_in.date);
            next.check_ins.push(check_in.clone());
            next.check_ins.sort_by_key(|c| c.date);
        }
        PatientAction::AddHabit(habit) => {
            if state.habits.iter().any(|h| h.id == habit.id) {
                anyhow::bail!("habit {} already exists", habit.id);
            }
            next.habits.push(habit.clone());
        }
        PatientAction::CompleteHabit { habit_id, date } => {
            let habit = next
                .habits
                .iter_mut()
                .find(|h| &h.id == habit_id)
                .ok_or_else(|| anyhow::anyhow!("unknown habit {}", habit_id))?;
            if habit.completed_on.contains(date) {
                return Ok(Arc::clone(state));
            }
            habit.completed_on.push(*date);
            habit.completed_on.sort();
        }
        PatientAction::RemoveHabit(id) => {
            if !state.habits.iter().any(|h| &h.id == id) {
                return Ok(Arc::clone(state));
            }
            next.habits.retain(|h| &h.id != id);
        }
        PatientAction::SetGoal(goal) => {
            match next.goals.iter_mut().find(|g| g.id == goal.id) {
                Some(existing) => *existing = goal.clone(),
                None => next.goals.push(goal.clone()),
            }
        }
        PatientAction::UpdateGoalProgress { goal_id, progress } => {
            let goal = next
                .goals
                .iter_mut()
                .find(|g| &g.id == goal_id)
                .ok_or_else(|| anyhow::anyhow!("unknown goal {}", goal_id))?;
            if goal.progress == *progress {
                return Ok(Arc::clone(state));
            }
            goal.progress = *progress;
        }
        PatientAction::SetProtocols(ids) => {
            if &state.protocol_ids == ids {
                return Ok(Arc::clone(state));
            }
            next.protocol_ids = ids.clone();
        }
    }
    Ok(Arc::new(next))
}

// == Validation ==
pub fn validators() -> Validators<PatientAction> {
    Validators::new()
        .rule("record_check_in", |action: &PatientAction| {
            matches!(
                action,
                PatientAction::RecordCheckIn(c)
                    if (1..=5).contains(&c.mood) && (1..=5).contains(&c.energy) && !c.id.is_empty()
            )
        })
        .rule("add_habit", |action: &PatientAction| {
            matches!(action, PatientAction::AddHabit(h) if !h.id.is_empty() && !h.name.trim().is_empty())
        })
        .rule("set_goal", |action: &PatientAction| {
            matches!(action, PatientAction::SetGoal(g) if g.target > 0 && !g.title.trim().is_empty())
        })
}

// == Effects ==
/// Queues a recorded check-in for sync. Expects the outbox as dependency 0.
pub async fn sync_check_in(action: PatientAction, deps: Dependencies) -> anyhow::Result<()> {
    let PatientAction::RecordCheckIn(check_in) = action else {
        return Ok(());
    };
    let outbox = deps.get::<SyncOutbox>(0)?;
    outbox.enqueue("check_in", serde_json::to_value(&check_in)?);
    Ok(())
}
