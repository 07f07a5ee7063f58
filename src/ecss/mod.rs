//! ECSS Packet Utilization Standard (PUS) codecs: TC/TM secondary headers,
//! request identification, and the Service 1 (verification) report chain.

pub mod fields;
pub mod pus_a;
pub mod req_id;
pub mod tc;
pub mod tm;
pub mod verification;
pub mod verificator;

pub use fields::{PacketFieldEnum, PfcWidth};
pub use pus_a::{PusATc, PusATcSecondaryHeader, PusATm, PusATmSecondaryHeader, PUS_A_VERSION};
pub use req_id::RequestId;
pub use tc::{PusTc, PusTcSecondaryHeader};
pub use tm::{PusTm, PusTmSecondaryHeader};
pub use verification::{FailureNotice, Service1Tm, Subservice, VerificationParams};
pub use verificator::{PusVerificator, TmCheckResult, VerificationStatus};
