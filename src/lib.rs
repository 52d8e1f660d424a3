//! markstyle - incremental markdown styling
//!
//! Overlays fonts, colors and paragraph layout onto raw markdown text held
//! by a host buffer, without ever changing the text. Small documents are
//! styled in one pass, large ones progressively in line chunks, and edits
//! restyle only the touched paragraphs until a debounced full pass
//! reconciles constructs that span paragraphs.

pub mod attributes;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod coordinator;
pub mod markdown;
pub mod offsets;
pub mod storage;
pub mod style;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use attributes::{Attribute, AttributeKey, Attributes, ParagraphStyle, StyledSpan};
pub use config::EngineConfig;
pub use coordinator::{StyleCoordinator, StyleMsg, StylingState};
pub use markdown::MarkdownStyler;
pub use offsets::OffsetTable;
pub use storage::{AttributedText, TextEdit, TextStorage};
pub use style::StyleConfiguration;
