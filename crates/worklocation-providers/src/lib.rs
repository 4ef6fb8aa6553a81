//! Working-location fetcher and resolver.
//!
//! This crate holds the two halves of a poll cycle:
//!
//! - [`WorkingLocationFetcher`] - builds the local-day query, issues one GET
//!   through an [`HttpTransport`] and classifies failures into [`ProviderError`]
//! - [`resolve`] - selects the governing event and derives a [`ResolvedStatus`]
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   ┌────────────────────┐
//! │ CredentialProvider │   │   HttpTransport    │
//! └─────────┬──────────┘   └─────────┬──────────┘
//!           │                        │
//!           └───────────┬────────────┘
//!                       ▼
//!          ┌─────────────────────────┐
//!          │ WorkingLocationFetcher  │
//!          └────────────┬────────────┘
//!                       │ Vec<RawEvent>
//!                       ▼
//!                 ┌───────────┐
//!                 │ resolve() │
//!                 └─────┬─────┘
//!                       ▼
//!               ┌────────────────┐
//!               │ ResolvedStatus │
//!               └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use worklocation_providers::{google, resolve, StaticToken};
//!
//! let fetcher = google::calendar_fetcher(Arc::new(StaticToken::new(token)), timeout)?;
//! let events = fetcher.fetch("primary", now, offset).await?;
//! let status = resolve(&events, now, "primary", false);
//! ```
//!
//! [`ResolvedStatus`]: worklocation_core::ResolvedStatus

pub mod credentials;
pub mod error;
pub mod fetch;
#[cfg(feature = "google")]
pub mod google;
pub mod raw_event;
pub mod resolve;
pub mod transport;

pub use credentials::{CredentialProvider, StaticToken, TokenFile, TokenInfo};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use fetch::{CALENDAR_API_BASE, WorkingLocationFetcher, parse_events_body};
pub use raw_event::{RawEvent, RawEventTime, WORKING_LOCATION_EVENT_TYPE};
pub use resolve::{covers_now, resolve, select_event};
pub use transport::{ApiRequest, ApiResponse, BoxFuture, HttpTransport};
