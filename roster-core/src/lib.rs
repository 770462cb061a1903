//! Core domain logic for the roster contact list
//!
//! This crate provides:
//! - **Records**: `User`, the persisted contact entry
//! - **State**: `Roster` (ordered list + single selection), `FormFlow`
//!   (creation-form state machine with pick-vs-typed suppression)
//! - **Persistence**: `UserStore`, whole-collection JSON file load/save
//! - **Suggestions**: `CompletionService` seam, `SuggestionProvider` worker,
//!   and the `PhotonClient` geocoding backend

pub mod form;
pub mod geocode;
pub mod roster;
pub mod store;
pub mod suggest;
pub mod user;

pub use form::{FormFlow, FormPhase, QueryAction};
pub use geocode::PhotonClient;
pub use roster::Roster;
pub use store::UserStore;
pub use suggest::{CompletionService, Suggestion, SuggestionProvider};
pub use user::{DEFAULT_AVATAR, User};
