pub mod app;

pub use app::combined_app;
