//! Matchdex core
//!
//! Frame-synchronous match detection for recorded fighting game footage.
//! Nothing in here touches pixels: per-frame template hits come in as
//! booleans through [`indexer::FrameAnalyzer`], and completed matches go out
//! through [`indexer::Reporter`].

pub mod error;
pub mod indexer;
pub mod layout;
pub mod roster;
pub mod session;
pub mod settings;
pub mod timecode;
pub mod tracker;

pub use error::ConfigError;
pub use indexer::{
    Flow, FrameAnalyzer, FrameSource, IndexSummary, Indexer, Reporter, RunEnd, SampleStatus,
    Sampler, VideoInfo,
};
pub use layout::{Layout, Region};
pub use roster::{CharacterId, Roster, Side, UsageRow, UsageTable};
pub use session::{MatchRecord, MatchSession, Presence, SessionController, SessionEvent};
pub use settings::{FlushPolicy, RunSettings, Thresholds};
pub use tracker::{ClockEvent, ClockSignal, ClockTracker, Lock, PlayerEvent, PlayerTracker};
