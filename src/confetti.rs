//! JavaScript interop for the `canvas-confetti` celebration.
//! Provides Rust bindings to the helpers defined in confetti_helpers.js.

use stallion_raffle::celebration::{CONFETTI_COLORS, CONFETTI_SIDE_BURST_MS};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/confetti_helpers.js")]
extern "C" {
    #[wasm_bindgen(js_name = confettiSideCannons)]
    fn confetti_side_cannons(duration_ms: f64, colors: Vec<JsValue>);

    #[wasm_bindgen(js_name = confettiStarBurst)]
    fn confetti_star_burst(colors: Vec<JsValue>);
}

fn palette() -> Vec<JsValue> {
    CONFETTI_COLORS.iter().map(|c| JsValue::from_str(c)).collect()
}

/// Fire the winner celebration: short side cannons plus a big centered star burst.
/// Does nothing if the page did not load canvas-confetti.
pub fn celebrate() {
    confetti_side_cannons(CONFETTI_SIDE_BURST_MS, palette());
    confetti_star_burst(palette());
}
