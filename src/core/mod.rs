//! core
//!
//! The ordered group collection and the types around it.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ImageId, GroupId, Position, GroupTarget
//! - [`model`] - Image and Group records
//! - [`collection`] - The collection and its entity operations
//! - [`order`] - Dense order maintenance and verification
//! - [`reorder`] - Drag-and-drop moves for images and groups
//! - [`access`] - Password hashing for protected galleries
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Every mutation is a synchronous method on an explicit collection
//! - A failed mutation leaves the collection unchanged
//! - Order values are always dense after a mutation returns

pub mod access;
pub mod collection;
pub mod config;
pub mod model;
pub mod order;
pub mod reorder;
pub mod types;
