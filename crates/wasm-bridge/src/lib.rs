//! WASM Bridge crate for School Dash
//! Composes the profile, timetable, menu and route panels into one page and
//! exposes it to JavaScript.

pub mod map_view;
pub mod panels;
pub mod setup;
pub mod shell;

#[cfg(target_arch = "wasm32")]
mod dashboard;
#[cfg(target_arch = "wasm32")]
pub mod kakao;

#[cfg(target_arch = "wasm32")]
pub use dashboard::Dashboard;

pub use map_view::{Bounds, LoadStep, MapState, MapView, MapWidget, Scene, ScriptHost};
pub use shell::{PageShell, PageView, PanelKind};

/// Install the panic hook and the console logger, once per page
pub fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        #[cfg(target_arch = "wasm32")]
        {
            console_error_panic_hook::set_once();
            // Another module on the page may already own the logger
            let _ = console_log::init_with_level(log::Level::Debug);
        }
    });
}
