//! Codecs between mapped types and store records
//!
//! [`RecordCodec`] converts whole values field by field; [`AssetCodec`] stages
//! byte blobs as files the store can carry.

mod asset;
mod record;

pub use asset::{AssetCodec, AssetError, AssetResult};
pub use record::{EncodedRecord, RecordCodec};
