pub mod store;

pub use store::AnalysisStore;
