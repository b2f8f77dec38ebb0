//! Main module for the Stallion Raffle wheel using Yew.
//! Wires the raffle session, UI components, the spin timer and audio side effects.

use gloo_timers::callback::{Interval, Timeout};
use log::{debug, info};
use stallion_raffle::celebration::JokeDeck;
use stallion_raffle::session::RaffleSession;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use yew::prelude::*;

mod audio;
mod components;
mod confetti;
mod config;
mod hooks;
mod utils;

use audio::AudioSession;
use components::{Controls, Wheel, WinnerModal, WinnersPanel};
use config::{FADE_TICK_MS, FANFARE_TAIL_MS};

type SharedSession = Rc<RefCell<RaffleSession>>;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Helper to bump the render version and trigger a UI re-render
fn bump_render_version(render_version: &UseStateHandle<usize>) {
    render_version.set(render_version.wrapping_add(1));
}

/// Monotonic page clock in milliseconds. Wall clock only if `performance` is missing.
fn now_ms() -> f64 {
    gloo_utils::window()
        .performance()
        .map(|perf| perf.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Run `mutate` on the session and re-render if it reports a change.
fn mutate_session(
    session: &SharedSession,
    render_version: &UseStateHandle<usize>,
    mutate: impl FnOnce(&mut RaffleSession) -> bool,
) {
    if mutate(&mut session.borrow_mut()) {
        bump_render_version(render_version);
    }
}

/// Timer expiry: stop the spin sound, settle the session and celebrate.
fn finish_spin(
    session: &SharedSession,
    audio: &AudioSession,
    fade_ticker: &Rc<RefCell<Option<Interval>>>,
    render_version: &UseStateHandle<usize>,
) {
    fade_ticker.borrow_mut().take();
    audio.stop_spin();

    let winner = session.borrow_mut().complete_spin();
    if winner.is_some() {
        let volume = session.borrow().config().volume;
        audio.play_fanfare(volume, FANFARE_TAIL_MS);
        confetti::celebrate();
    }
    bump_render_version(render_version);
}

// ──────────────────────────────────────────────────────────────────────────────

/// Raffle page: wheel, settings, winners list and the winner modal.
#[function_component(App)]
fn app() -> Html {
    let session: SharedSession = use_mut_ref(RaffleSession::default);
    let jokes = use_state(|| JokeDeck::shuffled(&mut rand::rng()));
    // Audio handles are created on the first spin, not on mount
    let audio = use_state(AudioSession::default);
    // Render version state triggers UI re-render when the session changes
    let render_version = use_state(|| 0usize);
    // The spin timer always runs to completion; the handle only keeps it alive
    let spin_timer = use_mut_ref(|| None::<Timeout>);
    let fade_ticker = use_mut_ref(|| None::<Interval>);

    let on_spin = {
        let session = session.clone();
        let audio = (*audio).clone();
        let render_version = render_version.clone();
        let spin_timer = spin_timer.clone();
        let fade_ticker = fade_ticker.clone();
        Callback::from(move |_: ()| {
            let now = now_ms();
            let plan = match session.borrow_mut().request_spin(now, &mut rand::rng()) {
                Ok(plan) => plan,
                Err(reason) => {
                    debug!("Spin request ignored: {}", reason);
                    return;
                }
            };

            audio.unlock();
            audio.start_spin(session.borrow().config().volume);

            {
                let session = session.clone();
                let audio = audio.clone();
                let ticker = Interval::new(FADE_TICK_MS, move || {
                    audio.set_spin_gain(session.borrow().spin_gain_at(now_ms()));
                });
                *fade_ticker.borrow_mut() = Some(ticker);
            }

            {
                let session = session.clone();
                let audio = audio.clone();
                let fade_ticker = fade_ticker.clone();
                let render_version = render_version.clone();
                let timer = Timeout::new(plan.duration_ms, move || {
                    finish_spin(&session, &audio, &fade_ticker, &render_version);
                });
                *spin_timer.borrow_mut() = Some(timer);
            }

            bump_render_version(&render_version);
        })
    };

    let on_spin_button = {
        let on_spin = on_spin.clone();
        Callback::from(move |e: PointerEvent| {
            e.prevent_default();
            on_spin.emit(());
        })
    };

    let on_claim = {
        let session = session.clone();
        let render_version = render_version.clone();
        Callback::from(move |_: ()| {
            mutate_session(&session, &render_version, |s| s.claim().is_some());
        })
    };

    let on_reset = {
        let session = session.clone();
        let render_version = render_version.clone();
        Callback::from(move |_: ()| mutate_session(&session, &render_version, |s| s.reset()))
    };

    let on_clear_history = {
        let session = session.clone();
        let render_version = render_version.clone();
        Callback::from(move |_: ()| {
            let confirmed = gloo_utils::window()
                .confirm_with_message(
                    "Clear only the history list? (Excluded numbers will remain excluded)",
                )
                .unwrap_or(false);
            if confirmed {
                mutate_session(&session, &render_version, |s| s.clear_history());
            }
        })
    };

    let on_clear_exclusions = {
        let session = session.clone();
        let render_version = render_version.clone();
        Callback::from(move |_: ()| {
            mutate_session(&session, &render_version, |s| s.clear_exclusions())
        })
    };

    let on_range = {
        let session = session.clone();
        let render_version = render_version.clone();
        Callback::from(move |(min, max): (i32, i32)| {
            mutate_session(&session, &render_version, |s| s.set_range(min, max))
        })
    };

    let on_excluded = {
        let session = session.clone();
        let render_version = render_version.clone();
        Callback::from(move |excluded: BTreeSet<i32>| {
            mutate_session(&session, &render_version, |s| s.set_excluded(excluded))
        })
    };

    let on_volume = {
        let session = session.clone();
        let render_version = render_version.clone();
        Callback::from(move |volume: f64| {
            mutate_session(&session, &render_version, |s| {
                s.set_volume(volume);
                true
            })
        })
    };

    // Ensure re-render on session updates by reading render_version
    let _ = *render_version;
    let s = session.borrow();
    let items = Rc::new(s.items().to_vec());
    let history = Rc::new(s.history().to_vec());
    let spinning = s.is_spinning();

    html! {
        <div class="raffle-page">
            <div class="page-header">
                <h1>{ "🤠 Stallion Holiday Raffle 🎄" }</h1>
                <p>{ "Spin the wheel for a rootin' tootin' good time!" }</p>
            </div>

            <div class="page-main">
                <div class="wheel-area">
                    <Wheel items={items.clone()}
                        rotation={s.rotation()}
                        spinning={spinning}
                        transition={AttrValue::from(s.settings().transition_css())}
                        on_spin={on_spin.clone()}
                    />
                    if items.is_empty() {
                        <div class="empty-wheel-message">
                            <p>{ "No numbers left on the wheel. Adjust the range or clear exclusions." }</p>
                        </div>
                    }
                </div>

                <div class="side-area">
                    <Controls config={s.config().clone()}
                        spinning={spinning}
                        on_range={on_range}
                        on_excluded={on_excluded}
                        on_volume={on_volume}
                        on_clear_exclusions={on_clear_exclusions}
                    />

                    <button class="spin-button"
                        onpointerdown={on_spin_button}
                        disabled={!s.can_spin()}>
                        { "🤠 SPIN THE WHEEL 🤠" }
                    </button>

                    <WinnersPanel history={history} on_clear={on_clear_history} />
                </div>
            </div>

            if let Some(winner) = s.pending_winner() {
                <WinnerModal winner={winner}
                    joke={AttrValue::from(jokes.for_spin(s.spin_count()))}
                    on_claim={on_claim}
                    on_reset={on_reset}
                />
            }
        </div>
    }
}

/// Entry point: installs logging and renders the app.
fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    info!("Stallion Raffle starting");
    yew::Renderer::<App>::new().render();
}
