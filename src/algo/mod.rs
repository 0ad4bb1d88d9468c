pub mod aggregate;
pub mod filter;
pub mod graph;
pub mod parser;
pub mod record;
pub mod session;
