//! Tracks the Service 1 verification chain for a population of outstanding
//! telecommands (ECSS-E-ST-70-41C §8, source `pus_verificator.py`).

use crate::ecss::req_id::RequestId;
use crate::ecss::tc::PusTc;
use crate::ecss::verification::{Service1Tm, Subservice};
use std::collections::HashMap;

/// A verification field's three-valued state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusField {
    Unset,
    Success,
    Failure,
}

impl Default for StatusField {
    fn default() -> Self {
        Self::Unset
    }
}

/// Verification state accumulated for one tracked `RequestId`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct VerificationStatus {
    pub accepted: StatusField,
    pub started: StatusField,
    pub step: StatusField,
    pub completed: StatusField,
    pub step_list: Vec<u64>,
    pub all_verifs_recvd: bool,
}

/// The outcome of feeding one [`Service1Tm`] into [`PusVerificator::add_tm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TmCheckResult {
    pub status: VerificationStatus,
    pub completed: bool,
}

/// Maps outstanding telecommand `RequestId`s to their accumulated
/// verification status. Performs only map insert/lookup/remove; callers
/// sharing one across threads must synchronize externally.
#[derive(Clone, Debug, Default)]
pub struct PusVerificator {
    entries: HashMap<u32, VerificationStatus>,
}

impl PusVerificator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tc` for verification tracking. Returns `false` if its
    /// request ID was already tracked (the existing entry is left alone).
    pub fn add_tc(&mut self, tc: &PusTc) -> bool {
        let req_id = RequestId::from_sp_header(&tc.sp_header).as_u32();
        if self.entries.contains_key(&req_id) {
            return false;
        }
        self.entries.insert(req_id, VerificationStatus::default());
        true
    }

    /// Applies `tm` to its tracked request's status. Returns `None` if the
    /// request ID is not tracked.
    pub fn add_tm(&mut self, tm: &Service1Tm) -> Option<TmCheckResult> {
        let req_id = tm.params.req_id.as_u32();
        let entry = self.entries.get_mut(&req_id)?;
        let completed = apply_subservice(entry, tm);
        Some(TmCheckResult {
            status: entry.clone(),
            completed,
        })
    }

    /// Drops every entry whose verification chain has fully concluded.
    pub fn remove_completed_entries(&mut self) {
        self.entries.retain(|_, status| !status.all_verifs_recvd);
    }

    /// Removes a specific tracked request. Returns `false` if it was not
    /// present.
    pub fn remove_entry(&mut self, req_id: RequestId) -> bool {
        self.entries.remove(&req_id.as_u32()).is_some()
    }

    pub fn get(&self, req_id: RequestId) -> Option<&VerificationStatus> {
        self.entries.get(&req_id.as_u32())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn apply_subservice(entry: &mut VerificationStatus, tm: &Service1Tm) -> bool {
    let accepted_seen = entry.accepted != StatusField::Unset;
    let started_seen = entry.started != StatusField::Unset;
    match tm.subservice {
        Subservice::AcceptanceSuccess => {
            entry.accepted = StatusField::Success;
            false
        }
        Subservice::AcceptanceFailure => {
            entry.accepted = StatusField::Failure;
            entry.all_verifs_recvd = true;
            true
        }
        Subservice::StartSuccess => {
            entry.started = StatusField::Success;
            false
        }
        Subservice::StartFailure => {
            entry.started = StatusField::Failure;
            if accepted_seen {
                entry.all_verifs_recvd = true;
            }
            true
        }
        Subservice::StepSuccess => {
            if entry.step != StatusField::Failure {
                entry.step = StatusField::Success;
            }
            if let Some(step_id) = &tm.params.step_id {
                entry.step_list.push(step_id.value());
            }
            false
        }
        Subservice::StepFailure => {
            entry.step = StatusField::Failure;
            if let Some(step_id) = &tm.params.step_id {
                entry.step_list.push(step_id.value());
            }
            if accepted_seen && started_seen {
                entry.all_verifs_recvd = true;
            }
            true
        }
        Subservice::CompletionSuccess => {
            entry.completed = StatusField::Success;
            if accepted_seen && started_seen {
                entry.all_verifs_recvd = true;
            }
            true
        }
        Subservice::CompletionFailure => {
            entry.completed = StatusField::Failure;
            if accepted_seen && started_seen {
                entry.all_verifs_recvd = true;
            }
            true
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ecss::fields::{PacketFieldEnum, PfcWidth};
    use crate::ecss::verification::{
        create_acceptance_failure_tm, create_acceptance_success_tm, create_completion_success_tm,
        create_start_success_tm, create_step_success_tm, FailureNotice,
    };

    fn sample_tc() -> PusTc {
        PusTc::new(17, 1, 0x42, 7, vec![], 0, 0, true).unwrap()
    }

    #[test]
    fn full_chain_marks_all_verifs_received_on_completion() {
        let tc = sample_tc();
        let mut verificator = PusVerificator::new();
        assert!(verificator.add_tc(&tc));
        assert!(!verificator.add_tc(&tc));

        let accepted = verificator.add_tm(&create_acceptance_success_tm(&tc)).unwrap();
        assert!(!accepted.completed);

        let started = verificator.add_tm(&create_start_success_tm(&tc)).unwrap();
        assert!(!started.completed);

        let step_id = PacketFieldEnum::new(PfcWidth::OneByte, 1).unwrap();
        let step = verificator.add_tm(&create_step_success_tm(&tc, step_id)).unwrap();
        assert!(!step.completed);
        assert_eq!(step.status.step_list, vec![1]);

        let completed = verificator.add_tm(&create_completion_success_tm(&tc)).unwrap();
        assert!(completed.completed);
        assert!(completed.status.all_verifs_recvd);
    }

    #[test]
    fn acceptance_failure_short_circuits_the_chain() {
        let tc = sample_tc();
        let mut verificator = PusVerificator::new();
        verificator.add_tc(&tc);
        let code = PacketFieldEnum::new(PfcWidth::OneByte, 4).unwrap();
        let result = verificator
            .add_tm(&create_acceptance_failure_tm(&tc, FailureNotice::new(code, vec![])))
            .unwrap();
        assert!(result.completed);
        assert!(result.status.all_verifs_recvd);
    }

    #[test]
    fn unknown_request_id_returns_none() {
        let tc = sample_tc();
        let mut verificator = PusVerificator::new();
        assert!(verificator.add_tm(&create_acceptance_success_tm(&tc)).is_none());
    }

    #[test]
    fn remove_completed_entries_drops_only_finished_chains() {
        let tc = sample_tc();
        let mut verificator = PusVerificator::new();
        verificator.add_tc(&tc);
        verificator.add_tm(&create_acceptance_success_tm(&tc));
        verificator.remove_completed_entries();
        assert_eq!(verificator.len(), 1);

        let code = PacketFieldEnum::new(PfcWidth::OneByte, 1).unwrap();
        verificator.add_tm(&create_acceptance_failure_tm(&tc, FailureNotice::new(code, vec![])));
        verificator.remove_completed_entries();
        assert!(verificator.is_empty());
    }
}
