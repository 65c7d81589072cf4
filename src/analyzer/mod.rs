// Analyzer module: aggregates submodules for different aspects of analysis.

pub mod identity;
pub mod ranking;
pub mod recommendations;

pub use identity::IdentityResolver;
pub use ranking::Analyzer;
