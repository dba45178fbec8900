pub mod http;
pub mod mock;
pub mod registry;

pub use http::HttpLmAdapter;
pub use mock::MockLmAdapter;
pub use registry::LmAdapterRegistry;
