mod report;
mod stage;
mod status;

pub use report::{RunReport, RunTrace};
pub use stage::Stage;
pub use status::JobStatus;
