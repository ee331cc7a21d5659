pub mod cache;
pub mod decode;
pub mod fetch;

pub use cache::{ImageCache, ImageCacheOpts, ImageInfo, ImageLoad, ImageState};
pub use decode::{DecodedImage, decode_image};
pub use fetch::{DefaultFetcher, ImageFetcher};
