//! Data Manager crate for School Dash
//! Handles the student profile, the school directory, and every call to the
//! timetable, menu, geocoding and directions services.

pub mod dates;
pub mod directory;
pub mod generation;
pub mod http;
pub mod identity;
pub mod menu;
pub mod neis;
pub mod route;
pub mod schedule;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod wasm_fetch;

pub use dates::DateCursor;
pub use directory::{SchoolDirectory, SchoolRecord};
pub use generation::{GenerationTicket, RequestGeneration};
pub use http::{HttpClient, HttpRequest};
pub use identity::{IdentityStore, SubscriptionId};
pub use menu::MenuFetcher;
pub use neis::FetchOutcome;
pub use route::{RouteError, RouteOutcome, RoutePipeline, RouteWarning};
pub use schedule::{ScheduleFetcher, ScheduleQuery};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(not(target_arch = "wasm32"))]
pub use http::ReqwestClient;

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;
#[cfg(target_arch = "wasm32")]
pub use wasm_fetch::FetchClient;
