//! Vitrine Web - Showcase scene on the marketing page canvas
//!
//! The page provides a `#model-canvas` element; the scene fills it and
//! follows its size. `?model=<url>` and `?seed=<n>` override the defaults.

mod app;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    app::run();
}
