pub mod stub;

pub use stub::StubRetriever;
