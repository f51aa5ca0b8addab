//! Tool groups. Each module contributes one router to
//! [`FinReportServer`](crate::FinReportServer); disabled groups are left out.

pub mod ai;
pub mod analysis;
pub mod market;
pub mod reports;
