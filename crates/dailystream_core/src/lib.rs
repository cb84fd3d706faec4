pub mod domain;
pub mod feed;
pub mod fetcher;
pub mod ports;
pub mod resolver;

pub use domain::{
    Article, ArticleSource, Category, Feed, NewsPayload, NewsRequest, QueryParameters, QueryTarget,
    ResourceKey, ResponseEnvelope,
};
pub use feed::{Applied, FeedController, FeedPager, FeedState, LastItemObserver, PageTicket};
pub use fetcher::{CacheEntry, FetchError, PaginatedCacheFetcher};
pub use ports::{Clock, KeyValueStore, NewsBackend, NewsProvider, PortError, PortResult};
pub use resolver::{QueryResolver, ResolveError, ResolverSettings};
