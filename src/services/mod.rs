pub mod artifact_writer;
pub mod config_resolver;
pub mod document_stamper;
pub mod route_source;

pub use artifact_writer::ArtifactWriter;
pub use config_resolver::{resolve_route, EffectiveConfig};
pub use document_stamper::{read_info, DocumentInfo, DocumentStamper, StampedDocument};
pub use route_source::{RouteCallback, RouteList, RouteSource};
