use std::fmt;

use serde::Serialize;

/// The steps a run goes through, in order.
///
/// LICENSE_CHECK → [LICENSE_UPLOAD → LICENSE_CHECK] → SUBMIT → POLL → RESULT → DONE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    LicenseCheck,
    LicenseUpload,
    Submit,
    Poll,
    Result,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::LicenseCheck => write!(f, "LICENSE_CHECK"),
            Stage::LicenseUpload => write!(f, "LICENSE_UPLOAD"),
            Stage::Submit => write!(f, "SUBMIT"),
            Stage::Poll => write!(f, "POLL"),
            Stage::Result => write!(f, "RESULT"),
            Stage::Done => write!(f, "DONE"),
        }
    }
}
