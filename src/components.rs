//! Yew view components for the raffle page.
//!
//! The wheel, modal and history panel are pure renderers of props. The
//! settings form keeps only in-progress field text; committed values go
//! straight back to the session through callbacks.

use crate::config::{
    CROWDED_WHEEL, HUB_IMAGE_URL, LIGHT_COUNT, MAX_NUMBER_LIMIT, MIN_NUMBER_LIMIT, UNMUTE_VOLUME,
    VOLUME_STEP, WHEEL_SIZE,
};
use crate::hooks::use_validated_input;
use crate::utils::{
    format_excluded_list, format_excluded_preview, format_volume_percent, parse_excluded_numbers,
    validate_range_bound,
};
use stallion_raffle::{label_font_size, segment_geometry, RaffleConfig, WheelItem};
use std::collections::BTreeSet;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Render one wedge and its label.
fn render_segment(item: &WheelItem, index: usize, total: usize) -> Html {
    let radius = WHEEL_SIZE / 2.0;
    let geo = segment_geometry(index, total, radius, radius);
    let crowded = total > CROWDED_WHEEL;
    let label_style = if crowded {
        "text-shadow: none"
    } else {
        "text-shadow: 1px 1px 0px rgba(0,0,0,0.5)"
    };

    html! {
        <g key={item.value}>
            <path d={geo.path}
                fill={item.fill()}
                stroke="#F5DEB3"
                stroke-width={if crowded { "1" } else { "2" }}
            />
            <text x={geo.label_x.to_string()}
                y={geo.label_y.to_string()}
                fill={item.text_fill()}
                font-size={label_font_size(total).to_string()}
                font-weight={if crowded { "normal" } else { "bold" }}
                font-family="Rye, serif"
                text-anchor="middle"
                dominant-baseline="middle"
                transform={format!("rotate({}, {}, {})", geo.label_rotation, geo.label_x, geo.label_y)}
                style={label_style}
            >
                { item.value }
            </text>
        </g>
    }
}

#[derive(Properties, PartialEq)]
pub struct WheelProps {
    pub items: Rc<Vec<WheelItem>>,
    /// Cumulative rotation in degrees.
    pub rotation: f64,
    pub spinning: bool,
    /// CSS transition applied while spinning; built from the spin timer duration.
    pub transition: AttrValue,
    pub on_spin: Callback<()>,
}

/// The wheel with its light ring, pointer and clickable hub.
#[function_component(Wheel)]
pub fn wheel(props: &WheelProps) -> Html {
    let total = props.items.len();
    let size = WHEEL_SIZE;
    let wheel_style = format!(
        "width: {size}px; height: {size}px; transform: rotate({}deg); transition: {};",
        props.rotation,
        if props.spinning { props.transition.as_str() } else { "none" }
    );
    let on_hub = {
        let on_spin = props.on_spin.clone();
        Callback::from(move |_: MouseEvent| on_spin.emit(()))
    };

    html! {
        <div class="wheel-frame">
            <div class="wheel-lights"
                style={format!("width: {}px; height: {}px;", size + 48.0, size + 48.0)}>
                { (0..LIGHT_COUNT).map(|i| {
                    let color = if i % 2 == 0 { "#FFD700" } else { "#FF4500" };
                    let angle = i as f64 * 360.0 / LIGHT_COUNT as f64;
                    html! {
                        <div key={i}
                            class={classes!("wheel-light", props.spinning.then_some("pulsing"))}
                            style={format!(
                                "background-color: {}; transform: rotate({}deg) translate({}px); animation-delay: {:.1}s;",
                                color, angle, size / 2.0 + 14.0, i as f64 * 0.1
                            )}
                        />
                    }
                }).collect::<Html>() }
            </div>

            <div class="wheel-disc" style={wheel_style}>
                <svg width={size.to_string()}
                    height={size.to_string()}
                    viewBox={format!("0 0 {} {}", size, size)}>
                    { props.items.iter().enumerate().map(|(index, item)| {
                        render_segment(item, index, total)
                    }).collect::<Html>() }
                </svg>
            </div>

            <button class="wheel-hub" onclick={on_hub} disabled={props.spinning}>
                <img src={HUB_IMAGE_URL} alt="Spin" />
            </button>

            <div class="wheel-pointer">
                <svg width="50" height="60" viewBox="0 0 50 60">
                    <path d="M 0 0 L 50 0 L 50 10 L 0 10 Z" fill="#8B4513" />
                    <path d="M 5 10 L 45 10 L 25 50 Z" fill="#FDB931" stroke="#B8860B" stroke-width="2" />
                </svg>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ControlsProps {
    pub config: RaffleConfig,
    pub spinning: bool,
    pub on_range: Callback<(i32, i32)>,
    pub on_excluded: Callback<BTreeSet<i32>>,
    pub on_volume: Callback<f64>,
    pub on_clear_exclusions: Callback<()>,
}

/// Settings panel: number range, volume and exclusions.
#[function_component(Controls)]
pub fn controls(props: &ControlsProps) -> Html {
    let config = &props.config;

    let min_input = use_validated_input(
        config.min,
        Rc::new(|s: &str| validate_range_bound(s, "Min number")),
        Rc::new(|v: &i32| v.to_string()),
        {
            let on_range = props.on_range.clone();
            let max = config.max;
            Callback::from(move |min: i32| on_range.emit((min, max)))
        },
    );
    let max_input = use_validated_input(
        config.max,
        Rc::new(|s: &str| validate_range_bound(s, "Max number")),
        Rc::new(|v: &i32| v.to_string()),
        {
            let on_range = props.on_range.clone();
            let min = config.min;
            Callback::from(move |max: i32| on_range.emit((min, max)))
        },
    );
    let excluded_input = use_validated_input(
        config.excluded.clone(),
        Rc::new(|s: &str| Ok::<_, String>(parse_excluded_numbers(s))),
        Rc::new(format_excluded_list),
        props.on_excluded.clone(),
    );

    let on_volume_input = {
        let on_volume = props.on_volume.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(v) = input.value().parse::<f64>() {
                on_volume.emit(v);
            }
        })
    };
    let on_mute_toggle = {
        let on_volume = props.on_volume.clone();
        let volume = config.volume;
        Callback::from(move |_: MouseEvent| {
            on_volume.emit(if volume == 0.0 { UNMUTE_VOLUME } else { 0.0 });
        })
    };
    let on_clear = {
        let on_clear = props.on_clear_exclusions.clone();
        Callback::from(move |_: MouseEvent| on_clear.emit(()))
    };

    html! {
        <div class="controls">
            <div class="controls-header">
                <span>{ "🎰" }</span>
                <h2>{ "Raffle Settings" }</h2>
                <span>{ "🎰" }</span>
            </div>

            <div class="form-row">
                <div class="form-group">
                    <label for="min">{ "Min Number" }</label>
                    <input id="min" type="number"
                        min={MIN_NUMBER_LIMIT.to_string()}
                        max={MAX_NUMBER_LIMIT.to_string()}
                        value={min_input.text.clone()}
                        disabled={props.spinning}
                        oninput={min_input.on_text_input.clone()}
                        onblur={min_input.on_commit.clone()}
                        onkeydown={min_input.on_keydown.clone()}
                    />
                    if let Some(err) = &min_input.error {
                        <div class="field-error">{ err }</div>
                    }
                </div>
                <div class="form-group">
                    <label for="max">{ "Max Number" }</label>
                    <input id="max" type="number"
                        min={MIN_NUMBER_LIMIT.to_string()}
                        max={MAX_NUMBER_LIMIT.to_string()}
                        value={max_input.text.clone()}
                        disabled={props.spinning}
                        oninput={max_input.on_text_input.clone()}
                        onblur={max_input.on_commit.clone()}
                        onkeydown={max_input.on_keydown.clone()}
                    />
                    if let Some(err) = &max_input.error {
                        <div class="field-error">{ err }</div>
                    }
                </div>
            </div>

            <div class="form-group">
                <label for="volume">{ "Sound Effects Volume" }</label>
                <div class="slider-with-value">
                    <button class="mute-toggle" onclick={on_mute_toggle}>
                        { if config.volume == 0.0 { "🔇" } else { "🔊" } }
                    </button>
                    <input id="volume" type="range"
                        min="0"
                        max="1"
                        step={VOLUME_STEP.to_string()}
                        value={config.volume.to_string()}
                        oninput={on_volume_input}
                    />
                    <span class="slider-value">{ format_volume_percent(config.volume) }</span>
                </div>
            </div>

            <div class="form-group">
                <label for="excluded">{ "Exclude Numbers (comma-separated)" }</label>
                <input id="excluded" type="text"
                    placeholder="e.g. 3, 7, 12"
                    value={excluded_input.text.clone()}
                    disabled={props.spinning}
                    oninput={excluded_input.on_text_input.clone()}
                    onblur={excluded_input.on_commit.clone()}
                    onkeydown={excluded_input.on_keydown.clone()}
                />
            </div>

            if !config.excluded.is_empty() {
                <div class="excluded-summary">
                    <span class="excluded-title">{ "Excluded:" }</span>
                    <p>{ format_excluded_preview(&config.excluded) }</p>
                    <button class="clear-exclusions" onclick={on_clear} disabled={props.spinning}>
                        { "🗑 Clear all exclusions" }
                    </button>
                </div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct WinnersPanelProps {
    pub history: Rc<Vec<i32>>,
    pub on_clear: Callback<()>,
}

/// Claimed winners in draw order. Hidden while empty.
#[function_component(WinnersPanel)]
pub fn winners_panel(props: &WinnersPanelProps) -> Html {
    if props.history.is_empty() {
        return html! {};
    }
    let on_clear = {
        let on_clear = props.on_clear.clone();
        Callback::from(move |_: MouseEvent| on_clear.emit(()))
    };

    html! {
        <div class="winners-panel">
            <div class="winners-header">
                <h3>{ "🏆 Winners" }</h3>
                <button class="clear-history" onclick={on_clear} title="Clear history">{ "🗑" }</button>
            </div>
            <div class="winners-list">
                { props.history.iter().enumerate().map(|(i, w)| html! {
                    <span key={i} class="winner-chip">{ format!("#{}", w) }</span>
                }).collect::<Html>() }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct WinnerModalProps {
    pub winner: i32,
    pub joke: AttrValue,
    pub on_claim: Callback<()>,
    pub on_reset: Callback<()>,
}

/// Winner announcement. Clicking the backdrop claims, like the main button.
#[function_component(WinnerModal)]
pub fn winner_modal(props: &WinnerModalProps) -> Html {
    let on_claim = {
        let on_claim = props.on_claim.clone();
        Callback::from(move |_: MouseEvent| on_claim.emit(()))
    };
    let on_reset = {
        let on_reset = props.on_reset.clone();
        Callback::from(move |_: MouseEvent| on_reset.emit(()))
    };

    html! {
        <div class="modal-root">
            <div class="modal-backdrop" onclick={on_claim.clone()} />
            <div class="modal-card">
                <h2 class="modal-title">{ "We Have a Winner!" }</h2>
                <div class="modal-winner">{ props.winner }</div>
                <div class="modal-subtitle">{ "Congratulations, Stallion!" }</div>
                <div class="modal-joke">
                    <p>{ format!("\"{}\"", props.joke) }</p>
                </div>
                <div class="modal-actions">
                    <button class="claim-button" onclick={on_claim}>
                        { "Close & Spin Again" }
                    </button>
                    <button class="reset-button" onclick={on_reset}>
                        { "Reset All Winners & Start Over" }
                    </button>
                </div>
            </div>
        </div>
    }
}
