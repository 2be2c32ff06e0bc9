//! Rendering pipeline: input line layout, screen composition and the two strategies.

pub mod bridge;
pub mod direct;
pub mod frame;
pub mod line_view;
pub mod reconciled;

pub use bridge::{Capabilities, RenderMode, Renderer, TerminalBridge};
pub use direct::{Anchor, DirectRenderer};
pub use frame::View;
pub use line_view::LineView;
pub use reconciled::ReconciledRenderer;
