//! Thinking-Tool Pipeline: structured reasoning passes an agent response
//! can be routed through before being returned or acted on.

pub mod council;
pub mod first_principles;
pub mod red_team;

pub use council::{run_council, CouncilResult};
pub use first_principles::{run_first_principles, FirstPrinciplesResult};
pub use red_team::{run_red_team, RedTeamResult, Severity};
