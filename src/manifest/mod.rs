//! manifest
//!
//! The persisted form of a gallery.
//!
//! # Modules
//!
//! - [`schema`] - Wire records (camelCase JSON, legacy aliases)
//! - [`codec`] - Collection <-> record conversion and the load fallback
//!
//! # Example
//!
//! ```
//! use gallerist::core::collection::Collection;
//! use gallerist::manifest::{deserialize, parse, to_json};
//!
//! let collection = Collection::new();
//! let json = to_json(&collection).unwrap();
//! let back = deserialize(parse(&json).unwrap(), &[]).unwrap();
//! assert_eq!(back, collection);
//! ```

pub mod codec;
pub mod schema;

pub use codec::{
    deserialize, fresh_collection, load_or_default, parse, serialize, to_json, ManifestError,
};
pub use schema::{GroupRecord, ImageRecord, ManifestRecord};
