//! Application entry point for the 2D agent simulation viewer.
//!
//! This binary installs logging, sets up eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer`
//! module.

mod viewer;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging honors `RUST_LOG` (e.g. `RUST_LOG=sim_core=trace` to watch
/// the grid solver clamp outflows).
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "2D Agent Simulations",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()))),
    )
}
