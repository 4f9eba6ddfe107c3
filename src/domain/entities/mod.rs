//! Core domain entities representing the business data model.
//!
//! Entities follow the "New Type" pattern with a separate struct for creation:
//! [`NewShortLink`] carries everything the store needs to insert a
//! [`ShortLink`], which the store then owns.

pub mod short_link;

pub use short_link::{ExpiryPolicy, MAX_EXPIRY_DAYS, NewShortLink, ShortLink};
