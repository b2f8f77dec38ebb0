//! Application-level configuration constants.

// Sound effects
pub const SPIN_SFX_URL: &str =
    "https://raw.githubusercontent.com/daddy-aman/stallion-raffle-2025/main/spinning-roulette-wheel-429832.mp3";
pub const NEIGH_SFX_URL: &str =
    "https://raw.githubusercontent.com/daddy-aman/stallion-raffle-2025/main/horse-neigh-sfx-373051.mp3";
pub const HUB_IMAGE_URL: &str =
    "https://raw.githubusercontent.com/daddy-aman/stallion-raffle-2025/main/Pram%20raffle.jpg";

// UI Behavior
/// Refresh rate of the spin sound fade.
pub const FADE_TICK_MS: u32 = 50;
/// Delay before closing the modal's audio context so the fanfare can ring out.
pub const FANFARE_TAIL_MS: u32 = 3000;
/// Volume restored when un-muting.
pub const UNMUTE_VOLUME: f64 = 0.5;
pub const VOLUME_STEP: f64 = 0.1;

// Min/Max limits for input fields
pub const MIN_NUMBER_LIMIT: i32 = -9999;
pub const MAX_NUMBER_LIMIT: i32 = 9999;
/// How many excluded numbers the summary box lists before collapsing into "+N more".
pub const EXCLUDED_PREVIEW: usize = 10;

// Wheel drawing
pub const WHEEL_SIZE: f64 = 600.0;
pub const LIGHT_COUNT: usize = 32;
/// Segment count above which labels and strokes switch to the compact style.
pub const CROWDED_WHEEL: usize = 100;
