//! Provider Domain
//!
//! The provider's patient roster, current selection, protocol assignments and
//! unread chat counts.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::container::Dependencies;
use crate::services::SyncOutbox;
use crate::store::middleware::Validators;
use crate::store::Action;

/// Store name of the provider domain.
pub const PROVIDER_STORE: &str = "provider";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub last_check_in: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAssignment {
    pub patient_id: String,
    pub protocol_id: String,
    pub assigned_on: NaiveDate,
}

// == State ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderState {
    pub roster: Vec<PatientSummary>,
    pub selected_patient: Option<String>,
    pub assignments: Vec<ProtocolAssignment>,
    /// Unread message count per patient id
    pub unread: BTreeMap<String, u32>,
}

impl ProviderState {
    pub fn total_unread(&self) -> u32 {
        self.unread.values().sum()
    }

    pub fn assignments_for<'a>(
        &'a self,
        patient_id: &'a str,
    ) -> impl Iterator<Item = &'a ProtocolAssignment> + 'a {
        self.assignments
            .iter()
            .filter(move |a| a.patient_id == patient_id)
    }
}

// == Actions ==
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ProviderAction {
    SetRoster(Vec<PatientSummary>),
    SelectPatient(Option<String>),
    AssignProtocol(ProtocolAssignment),
    MessageReceived { patient_id: String },
    MarkRead { patient_id: String },
}

impl Action for ProviderAction {
    fn kind(&self) -> &'static str {
        match self {
            ProviderAction::SetRoster(_) => "set_roster",
            ProviderAction::SelectPatient(_) => "select_patient",
            ProviderAction::AssignProtocol(_) => "assign_protocol",
            ProviderAction::MessageReceived { .. } => "message_received",
            ProviderAction::MarkRead { .. } => "mark_read",
        }
    }
}

// == Reducer ==
pub fn reduce(
    state: &Arc<ProviderState>,
    action: &ProviderAction,
) -> anyhow::Result<Arc<ProviderState>> {
    let mut next = (**state).clone();
    match action {
        ProviderAction::SetRoster(roster) => {
            next.roster = roster.clone();
            // Drop a selection that is no longer on the roster
            if let Some(selected) = &state.selected_patient {
                if !roster.iter().any(|p| &p.id == selected) {
                    next.selected_patient = None;
                }
            }
        }
        ProviderAction::SelectPatient(selection) => {
            if &state.selected_patient == selection {
                return Ok(Arc::clone(state));
            }
            if let Some(id) = selection {
                if !state.roster.iter().any(|p| &p.id == id) {
                    anyhow::bail!("patient {} is not on the roster", id);
                }
            }
            next.selected_patient = selection.clone();
        }
        ProviderAction::AssignProtocol(assignment) => {
            let duplicate = state.assignments.iter().any(|a| {
                a.patient_id == assignment.patient_id && a.protocol_id == assignment.protocol_id
            });
            if duplicate {
                return Ok(Arc::clone(state));
            }
            next.assignments.push(assignment.clone());
        }
        ProviderAction::MessageReceived { patient_id } => {
            *next.unread.entry(patient_id.clone()).or_insert(0) += 1;
        }
        ProviderAction::MarkRead { patient_id } => {
            if next.unread.remove(patient_id).is_none() {
                return Ok(Arc::clone(state));
            }
        }
    }
    Ok(Arc::new(next))
}

// == Validation ==
pub fn validators() -> Validators<ProviderAction> {
    Validators::new().rule("assign_protocol", |action: &ProviderAction| {
        matches!(
            action,
            ProviderAction::AssignProtocol(a) if !a.patient_id.is_empty() && !a.protocol_id.is_empty()
        )
    })
}

// == Effects ==
/// Queues a new assignment for sync. Expects the outbox as dependency 0.
pub async fn sync_assignment(action: ProviderAction, deps: Dependencies) -> anyhow::Result<()> {
    let ProviderAction::AssignProtocol(assignment) = action else {
        return Ok(());
    };
    let outbox = deps.get::<SyncOutbox>(0)?;
    outbox.enqueue("protocol_assignment", serde_json::to_value(&assignment)?);
    Ok(())
}
