pub mod asset;
pub mod filter;
pub mod similarity;

pub use asset::{AssetPayload, AssetRecord, Segment, asset_id};
pub use filter::FilterExpr;
pub use similarity::cosine_similarity;
