pub mod route_ctx;
pub mod route_flow;

pub use route_ctx::RouteCtx;
pub use route_flow::{RouteFlow, RouteSuccess};
