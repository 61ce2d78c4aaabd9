pub mod loaders;
pub mod meta;
pub mod render;
pub mod route;

pub use loaders::load_routes_file;
pub use meta::{DocumentMeta, MetaOverrides};
pub use render::{
    parse_length, Margin, PageSetup, PaperFormat, RenderOptions, Viewport, ViewportOverrides,
    WaitUntil,
};
pub use route::{GeneratedRoute, RouteDescriptor};
