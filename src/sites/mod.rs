pub mod weibo;

pub use weibo::Weibo;
