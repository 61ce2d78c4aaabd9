pub mod route_loader;

pub use route_loader::load_routes_file;
