//! Engine behind the driftnet entity-network explorer: document loading,
//! neighborhood sampling, force layout, selection state, risk scoring and
//! the projection scatter view. Nothing in here knows about a window.

pub mod explorer;
pub mod filter;
pub mod highlight;
pub mod info;
pub mod layout;
pub mod load;
pub mod model;
pub mod projection;
pub mod risk;
pub mod sampler;
pub mod stats;
pub mod store;
pub mod style;

pub use explorer::{
    DragPhase, EdgeSegment, EngineConfig, Explorer, NodeSprite, RenderFrame, SearchOutcome,
    ViewEvent,
};
pub use filter::{FilterState, VisibleSet};
pub use highlight::{HighlightState, Phase};
pub use layout::{ForceLayout, LayoutConfig, SimNode};
pub use load::{load_graph, load_projection, parse_graph, parse_projection, LoadError};
pub use model::{Entity, EntityId, EntityKind};
pub use projection::{ProjectionMap, ProjectionRender, ProjectionView};
pub use risk::{RiskBreakdown, RiskCategory, RiskConfig};
pub use sampler::{sample, SamplerConfig, WorkingSubgraph};
pub use store::{EntityIx, EntityStore, RelIx, StoreBuilder};

pub use glam::Vec2;
