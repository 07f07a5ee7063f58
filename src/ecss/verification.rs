//! Service 1 (request verification) telemetry reports (ECSS-E-ST-70-41C §8).

use crate::ecss::fields::{PacketFieldEnum, PfcWidth};
use crate::ecss::req_id::RequestId;
use crate::ecss::tc::PusTc;
use crate::ecss::tm::PusTm;
use crate::error::{CodecError, Result};

/// Service 1 subservice, one per stage of the verification chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Subservice {
    AcceptanceSuccess = 1,
    AcceptanceFailure = 2,
    StartSuccess = 3,
    StartFailure = 4,
    StepSuccess = 5,
    StepFailure = 6,
    CompletionSuccess = 7,
    CompletionFailure = 8,
}

impl Subservice {
    pub fn try_from_u8(value: u8) -> Result<Self> {
        Ok(match value {
            1 => Self::AcceptanceSuccess,
            2 => Self::AcceptanceFailure,
            3 => Self::StartSuccess,
            4 => Self::StartFailure,
            5 => Self::StepSuccess,
            6 => Self::StepFailure,
            7 => Self::CompletionSuccess,
            8 => Self::CompletionFailure,
            other => {
                return Err(CodecError::InvalidFieldValue {
                    field: "verification_subservice",
                    value: other as u64,
                })
            }
        })
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::AcceptanceFailure | Self::StartFailure | Self::StepFailure | Self::CompletionFailure)
    }

    fn requires_step_id(self) -> bool {
        matches!(self, Self::StepSuccess | Self::StepFailure)
    }
}

/// A failure code plus any additional opaque diagnostic data, carried by the
/// `*Failure` subservices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureNotice {
    pub code: PacketFieldEnum,
    pub data: Vec<u8>,
}

impl FailureNotice {
    pub fn new(code: PacketFieldEnum, data: Vec<u8>) -> Self {
        Self { code, data }
    }

    fn packet_len(&self) -> usize {
        self.code.packet_len() + self.data.len()
    }

    fn pack(&self) -> Vec<u8> {
        let mut buf = self.code.pack();
        buf.extend_from_slice(&self.data);
        buf
    }
}

/// The verification-report parameters following the request ID: an optional
/// step ID (subservices 5/6 only) and an optional failure notice (any
/// `*Failure` subservice).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationParams {
    pub req_id: RequestId,
    pub step_id: Option<PacketFieldEnum>,
    pub failure_notice: Option<FailureNotice>,
}

impl VerificationParams {
    pub fn new(
        subservice: Subservice,
        req_id: RequestId,
        step_id: Option<PacketFieldEnum>,
        failure_notice: Option<FailureNotice>,
    ) -> Result<Self> {
        if subservice.requires_step_id() && step_id.is_none() {
            return Err(CodecError::InvalidVerifParams {
                reason: "step subservice requires a step ID",
            });
        }
        if !subservice.requires_step_id() && step_id.is_some() {
            return Err(CodecError::InvalidVerifParams {
                reason: "only the step subservices carry a step ID",
            });
        }
        if subservice.is_failure() && failure_notice.is_none() {
            return Err(CodecError::InvalidVerifParams {
                reason: "failure subservice requires a failure notice",
            });
        }
        if !subservice.is_failure() && failure_notice.is_some() {
            return Err(CodecError::InvalidVerifParams {
                reason: "success subservices never carry a failure notice",
            });
        }
        Ok(Self {
            req_id,
            step_id,
            failure_notice,
        })
    }
}

/// A complete Service 1 report: the subservice and its verification
/// parameters, ready to be embedded as a [`PusTm`]'s source data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service1Tm {
    pub subservice: Subservice,
    pub params: VerificationParams,
}

const PUS_SERVICE_ID: u8 = 1;

impl Service1Tm {
    pub fn new(subservice: Subservice, params: VerificationParams) -> Self {
        Self { subservice, params }
    }

    pub fn pack_source_data(&self) -> Vec<u8> {
        let mut buf = self.params.req_id.as_u32().to_be_bytes().to_vec();
        if let Some(step_id) = &self.params.step_id {
            buf.extend(step_id.pack());
        }
        if let Some(failure_notice) = &self.params.failure_notice {
            buf.extend(failure_notice.pack());
        }
        buf
    }

    pub fn unpack_source_data(subservice: Subservice, data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(CodecError::SrcDataTooShort {
                expected: 4,
                actual: data.len(),
            });
        }
        let req_id = RequestId::from_u32(u32::from_be_bytes(data[0..4].try_into().unwrap()));
        let mut idx = 4;
        let step_id = if subservice.requires_step_id() {
            let field = PacketFieldEnum::unpack(&data[idx..], PfcWidth::OneByte)?;
            idx += field.packet_len();
            Some(field)
        } else {
            None
        };
        let failure_notice = if subservice.is_failure() {
            let code = PacketFieldEnum::unpack(&data[idx..], PfcWidth::OneByte)?;
            idx += code.packet_len();
            Some(FailureNotice::new(code, data[idx..].to_vec()))
        } else {
            None
        };
        let params = VerificationParams::new(subservice, req_id, step_id, failure_notice)?;
        Ok(Self { subservice, params })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn to_pus_tm(
        &self,
        apid: u16,
        seq_count: u16,
        msg_counter: u16,
        dest_id: u16,
        timestamp: Vec<u8>,
        has_crc: bool,
    ) -> Result<PusTm> {
        PusTm::new(
            PUS_SERVICE_ID,
            self.subservice as u8,
            apid,
            seq_count,
            msg_counter,
            dest_id,
            timestamp,
            self.pack_source_data(),
            has_crc,
        )
    }
}

fn simple(subservice: Subservice, tc: &PusTc) -> Service1Tm {
    let req_id = RequestId::from_sp_header(&tc.sp_header);
    Service1Tm::new(subservice, VerificationParams::new(subservice, req_id, None, None).expect("no params required"))
}

fn with_failure(subservice: Subservice, tc: &PusTc, failure_notice: FailureNotice) -> Service1Tm {
    let req_id = RequestId::from_sp_header(&tc.sp_header);
    Service1Tm::new(
        subservice,
        VerificationParams::new(subservice, req_id, None, Some(failure_notice)).expect("failure notice provided"),
    )
}

/// Builds an acceptance-success report for `tc`.
pub fn create_acceptance_success_tm(tc: &PusTc) -> Service1Tm {
    simple(Subservice::AcceptanceSuccess, tc)
}

/// Builds an acceptance-failure report for `tc`.
pub fn create_acceptance_failure_tm(tc: &PusTc, failure_notice: FailureNotice) -> Service1Tm {
    with_failure(Subservice::AcceptanceFailure, tc, failure_notice)
}

/// Builds a start-success report for `tc`.
pub fn create_start_success_tm(tc: &PusTc) -> Service1Tm {
    simple(Subservice::StartSuccess, tc)
}

/// Builds a start-failure report for `tc`.
pub fn create_start_failure_tm(tc: &PusTc, failure_notice: FailureNotice) -> Service1Tm {
    with_failure(Subservice::StartFailure, tc, failure_notice)
}

/// Builds a step-success report for `tc` at the given step ID.
pub fn create_step_success_tm(tc: &PusTc, step_id: PacketFieldEnum) -> Service1Tm {
    let req_id = RequestId::from_sp_header(&tc.sp_header);
    Service1Tm::new(
        Subservice::StepSuccess,
        VerificationParams::new(Subservice::StepSuccess, req_id, Some(step_id), None)
            .expect("step ID provided for step subservice"),
    )
}

/// Builds a step-failure report for `tc` at the given step ID.
pub fn create_step_failure_tm(tc: &PusTc, step_id: PacketFieldEnum, failure_notice: FailureNotice) -> Service1Tm {
    let req_id = RequestId::from_sp_header(&tc.sp_header);
    Service1Tm::new(
        Subservice::StepFailure,
        VerificationParams::new(Subservice::StepFailure, req_id, Some(step_id), Some(failure_notice))
            .expect("step ID and failure notice provided for step subservice"),
    )
}

/// Builds a completion-success report for `tc`.
pub fn create_completion_success_tm(tc: &PusTc) -> Service1Tm {
    simple(Subservice::CompletionSuccess, tc)
}

/// Builds a completion-failure report for `tc`.
pub fn create_completion_failure_tm(tc: &PusTc, failure_notice: FailureNotice) -> Service1Tm {
    with_failure(Subservice::CompletionFailure, tc, failure_notice)
}
