pub mod backend;
pub mod clock;
pub mod newsapi;
pub mod storage;

pub use backend::HttpNewsBackend;
pub use clock::SystemClock;
pub use newsapi::NewsApiAdapter;
pub use storage::FileStore;
