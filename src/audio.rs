//! Browser audio for the raffle: the looping spin sound, the winner fanfare
//! and the horse neigh.
//!
//! Everything here is best effort. Failures are logged and swallowed; the
//! raffle itself never waits on or depends on sound.

use crate::config::{NEIGH_SFX_URL, SPIN_SFX_URL};
use gloo_timers::callback::Timeout;
use js_sys::ArrayBuffer;
use log::{debug, warn};
use stallion_raffle::celebration::{
    note_envelope, Note, Waveform, FANFARE, FANFARE_LOWPASS_HZ, NEIGH_DELAY_S,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AudioBuffer, AudioBufferSourceNode, AudioContext, AudioContextState, BiquadFilterType,
    GainNode, OscillatorType, Response,
};

/// Fetch a sound file and decode it with `ctx`.
async fn load_buffer(ctx: &AudioContext, url: &str) -> Result<AudioBuffer, JsValue> {
    let response: Response = JsFuture::from(gloo_utils::window().fetch_with_str(url))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP {} for {}",
            response.status(),
            url
        )));
    }
    let bytes: ArrayBuffer = JsFuture::from(response.array_buffer()?).await?.dyn_into()?;
    JsFuture::from(ctx.decode_audio_data(&bytes)?)
        .await?
        .dyn_into()
}

/// Audio handles owned by the raffle page.
///
/// Created lazily on the first spin, since browsers only allow audio to
/// start from a user gesture. Cloning shares the same handles.
#[derive(Clone, Default)]
pub struct AudioSession {
    inner: Rc<RefCell<AudioInner>>,
}

#[derive(Default)]
struct AudioInner {
    ctx: Option<AudioContext>,
    spin_buffer: Option<AudioBuffer>,
    spin_source: Option<AudioBufferSourceNode>,
    spin_gain: Option<GainNode>,
    /// Volume of a spin that started before the sound finished loading.
    pending_spin: Option<f64>,
}

impl AudioSession {
    /// Create the audio context and start loading the spin sound. Later calls only resume.
    pub fn unlock(&self) {
        let mut inner = self.inner.borrow_mut();
        if let Some(ctx) = &inner.ctx {
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            return;
        }

        let ctx = match AudioContext::new() {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("Audio unavailable: {:?}", e);
                return;
            }
        };
        inner.ctx = Some(ctx.clone());
        drop(inner);

        let session = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match load_buffer(&ctx, SPIN_SFX_URL).await {
                Ok(buffer) => {
                    debug!("Spin sound loaded ({:.1}s)", buffer.duration());
                    let pending = {
                        let mut inner = session.inner.borrow_mut();
                        inner.spin_buffer = Some(buffer);
                        inner.pending_spin.take()
                    };
                    // late start; the fade ticker corrects the gain on its next tick
                    if let Some(volume) = pending {
                        session.start_spin(volume);
                    }
                }
                Err(e) => warn!("Error loading wheel sound: {:?}", e),
            }
        });
    }

    /// Start the looping spin sound at `volume`. Silently skipped until the sound has loaded.
    pub fn start_spin(&self, volume: f64) {
        self.stop_spin();
        if let Err(e) = self.try_start_spin(volume) {
            debug!("Spin sound not started: {:?}", e);
        }
    }

    fn try_start_spin(&self, volume: f64) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let Some(ctx) = inner.ctx.clone() else {
            return Ok(());
        };
        let Some(buffer) = inner.spin_buffer.clone() else {
            inner.pending_spin = Some(volume);
            return Ok(());
        };
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume()?;
        }

        let source = ctx.create_buffer_source()?;
        source.set_buffer(Some(&buffer));
        // loop in case the clip is shorter than the spin
        source.set_loop(true);

        let gain = ctx.create_gain()?;
        gain.gain().set_value_at_time(volume as f32, ctx.current_time())?;
        source.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        source.start()?;

        inner.spin_source = Some(source);
        inner.spin_gain = Some(gain);
        Ok(())
    }

    /// Set the spin sound gain. Driven by the fade ticker during a spin.
    pub fn set_spin_gain(&self, gain: f64) {
        if let Some(node) = &self.inner.borrow().spin_gain {
            node.gain().set_value(gain as f32);
        }
    }

    pub fn stop_spin(&self) {
        let mut inner = self.inner.borrow_mut();
        if let Some(source) = inner.spin_source.take() {
            let _ = source.stop_with_when(0.0);
        }
        inner.spin_gain = None;
        inner.pending_spin = None;
    }

    /// Play the winner fanfare followed by the neigh on a fresh context.
    ///
    /// The context is closed after `tail_ms` so the sounds can ring out.
    pub fn play_fanfare(&self, volume: f64, tail_ms: u32) {
        if volume <= 0.0 {
            return;
        }
        let ctx = match AudioContext::new() {
            Ok(ctx) => ctx,
            Err(e) => {
                debug!("Fanfare skipped: {:?}", e);
                return;
            }
        };
        let start = ctx.current_time();
        for note in FANFARE.iter() {
            if let Err(e) = schedule_note(&ctx, note, start, volume) {
                debug!("Fanfare note {} Hz failed: {:?}", note.frequency_hz, e);
            }
        }

        let neigh_ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = play_neigh(&neigh_ctx, start + NEIGH_DELAY_S, volume).await {
                warn!("Failed to play horse sound: {:?}", e);
            }
        });

        Timeout::new(tail_ms, move || {
            if ctx.state() != AudioContextState::Closed {
                let _ = ctx.close();
            }
        })
        .forget();
    }
}

fn schedule_note(
    ctx: &AudioContext,
    note: &Note,
    start: f64,
    volume: f64,
) -> Result<(), JsValue> {
    let osc = ctx.create_oscillator()?;
    osc.set_type(match note.waveform {
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Square => OscillatorType::Square,
    });
    osc.frequency().set_value(note.frequency_hz);

    let filter = ctx.create_biquad_filter()?;
    filter.set_type(BiquadFilterType::Lowpass);
    filter.frequency().set_value(FANFARE_LOWPASS_HZ);

    let gain = ctx.create_gain()?;
    osc.connect_with_audio_node(&filter)?;
    filter.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;

    let [silent, attack, sustain, release] = note_envelope(note, start, volume);
    let param = gain.gain();
    param.set_value_at_time(silent.1 as f32, silent.0)?;
    param.linear_ramp_to_value_at_time(attack.1 as f32, attack.0)?;
    param.set_value_at_time(sustain.1 as f32, sustain.0)?;
    param.linear_ramp_to_value_at_time(release.1 as f32, release.0)?;

    osc.start_with_when(silent.0)?;
    osc.stop_with_when(release.0)?;
    Ok(())
}

async fn play_neigh(ctx: &AudioContext, at: f64, volume: f64) -> Result<(), JsValue> {
    let buffer = load_buffer(ctx, NEIGH_SFX_URL).await?;
    // the modal may have closed the context while we were loading
    if ctx.state() == AudioContextState::Closed {
        return Ok(());
    }
    let source = ctx.create_buffer_source()?;
    source.set_buffer(Some(&buffer));
    let gain = ctx.create_gain()?;
    gain.gain().set_value(volume as f32);
    source.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;
    source.start_with_when(at.max(ctx.current_time()))?;
    Ok(())
}
