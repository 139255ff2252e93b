// src/dashboard/mod.rs

pub mod cache;
pub mod pages;
pub mod render;
pub mod server;
pub mod widgets;

pub use cache::DashboardCache;
pub use pages::{build_page, DashboardFilters, PageKind, PageQuery, PageView};
pub use render::{JsonRenderer, OutputFormat, Renderer, TextRenderer};
pub use server::{router, serve, AppState};
pub use widgets::Widget;
