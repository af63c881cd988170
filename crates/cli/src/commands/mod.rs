pub mod analyze;
pub mod audits;
pub mod project;
pub mod selectors;
pub mod util;

pub use analyze::*;
pub use audits::*;
pub use project::*;
pub use selectors::*;
pub use util::*;
