mod agents;
mod dashboard;
mod filter;
mod graph;
mod kpis;
mod licenses;
mod options;
mod parse;
mod prompt;
mod rank;
mod timeline;
pub mod util;

pub use agents::Agents;
pub use dashboard::Dashboard;
pub use filter::Filter;
pub use graph::Graph;
pub use kpis::Kpis;
pub use licenses::Licenses;
pub use options::Options;
pub use parse::Parse;
pub use prompt::Prompt;
pub use rank::Rank;
pub use timeline::Timeline;
