//! Headless page-interaction controller: a document model, event dispatch, a
//! virtual-clock scheduler and the behaviors a static site wires at load time.

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub $inner);
    };
}

pub mod config;
pub mod controller;
pub mod dom;
pub mod events;
pub mod fixture;
pub mod page;
pub mod scheduler;
pub mod search;
pub mod timing;

pub use config::{load_settings, ConfigError, ControllerSettings};
pub use controller::{initialize, Capabilities, Disposer, Services, ValidationError};
pub use dom::{contract, Display, Document, Element, ElementId, ScrollBehavior, Visibility};
pub use events::{DispatchOutcome, DomEvent, Event, EventKind, ListenerId, ListenerTarget};
pub use fixture::{ElementSpec, FixtureError, PageFixture};
pub use page::{IntersectionEntry, ObserverId, Page};
pub use scheduler::{Scheduler, TimerId, TokioScheduler, VirtualScheduler, FRAME_INTERVAL};
pub use search::{
    sample_results, HttpSearchService, MissingSearchService, MockSearchService, SearchError,
    SearchService,
};
pub use timing::{debounce, fade_in, fade_out, throttle, Debounced, Throttled, DEFAULT_FADE};
