//! Winner reveal content: the fanfare score, the joke deck and confetti settings.
//!
//! Everything here is plain data plus a little scheduling math; the browser
//! side plays and draws it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Peak gain of a single fanfare note before the user volume is applied.
pub const NOTE_GAIN: f64 = 0.2;
/// Attack length of each fanfare note, in seconds.
pub const NOTE_ATTACK_S: f64 = 0.05;
/// Release length of each fanfare note, in seconds.
pub const NOTE_RELEASE_S: f64 = 0.1;
/// Cutoff of the lowpass filter that softens the sawtooth voices.
pub const FANFARE_LOWPASS_HZ: f32 = 2000.0;
/// Offset of the horse neigh relative to the fanfare start.
pub const NEIGH_DELAY_S: f64 = 1.0;

pub const CONFETTI_COLORS: [&str; 4] = ["#8B0000", "#228B22", "#FFD700", "#ffffff"];
/// How long the side cannons keep firing after the reveal.
pub const CONFETTI_SIDE_BURST_MS: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sawtooth,
    Square,
}

/// One scheduled fanfare note. Times are relative to the start of the fanfare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub frequency_hz: f32,
    pub offset_s: f64,
    pub duration_s: f64,
    pub waveform: Waveform,
}

const fn note(frequency_hz: f32, offset_s: f64, duration_s: f64, waveform: Waveform) -> Note {
    Note {
        frequency_hz,
        offset_s,
        duration_s,
        waveform,
    }
}

const CHORD_HOLD_S: f64 = 1.5;

/// Ba-da-da-DAAA: a quick G4 C5 E5 run, then a held C major chord over a square-wave bass.
pub const FANFARE: [Note; 8] = [
    note(392.00, 0.0, 0.15, Waveform::Sawtooth),
    note(523.25, 0.15, 0.15, Waveform::Sawtooth),
    note(659.25, 0.30, 0.15, Waveform::Sawtooth),
    note(523.25, 0.5, CHORD_HOLD_S, Waveform::Sawtooth),
    note(659.25, 0.5, CHORD_HOLD_S, Waveform::Sawtooth),
    note(783.99, 0.5, CHORD_HOLD_S, Waveform::Sawtooth),
    note(1046.50, 0.5, CHORD_HOLD_S, Waveform::Sawtooth),
    note(261.63, 0.5, CHORD_HOLD_S, Waveform::Square),
];

/// Gain automation points `(time, gain)` for `note`, absolute to `start_s`.
///
/// Silence, linear attack to peak, hold, linear release back to silence.
pub fn note_envelope(note: &Note, start_s: f64, volume: f64) -> [(f64, f64); 4] {
    let begin = start_s + note.offset_s;
    let end = begin + note.duration_s;
    let peak = NOTE_GAIN * volume;
    [
        (begin, 0.0),
        (begin + NOTE_ATTACK_S, peak),
        (end - NOTE_RELEASE_S, peak),
        (end, 0.0),
    ]
}

pub const JOKES: [&str; 10] = [
    "Why did the bubble wrap lose its job? It just couldn't handle the pressure.",
    "Customer: 'I paid for overnight shipping!' Support: 'Sir, with all due respect, it was a very long night.'",
    "My boss shouted 'Secure the cargo!', so I gave the box a blanket and told it everything will be okay.",
    "Why did the cardboard box go to the gym? It wanted to get ripped.",
    "Why did the shipping container go to therapy? It had way too much emotional baggage.",
    "Customer: 'It says delivered but I don't have it.' Me: 'Have you checked your neighbor's roof?'",
    "Why did the forklift get a promotion? He was really uplifting the team.",
    "Why don't packages play hide and seek? Because good luck finding anything in this warehouse.",
    "Why do logistics managers make terrible comedians? Their delivery is always late.",
    "Customer: 'Where is my package?' Me: 'It's currently on a spiritual journey. It will arrive when it finds itself.'",
];

/// Jokes in a per-session random order. Shuffled once, then walked by spin count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JokeDeck {
    order: Vec<usize>,
}

impl JokeDeck {
    pub fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..JOKES.len()).collect();
        order.shuffle(rng);
        Self { order }
    }

    /// Joke for the `spin_count`-th completed spin (1-based), wrapping around the deck.
    pub fn for_spin(&self, spin_count: u32) -> &'static str {
        let position = (spin_count.saturating_sub(1) as usize) % self.order.len();
        JOKES[self.order[position]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn deck_is_a_permutation() {
        let deck = JokeDeck::shuffled(&mut StdRng::seed_from_u64(3));
        let seen: HashSet<&str> = (1..=JOKES.len() as u32).map(|n| deck.for_spin(n)).collect();
        assert_eq!(seen.len(), JOKES.len());
    }

    #[test]
    fn deck_wraps_after_last_joke() {
        let deck = JokeDeck::shuffled(&mut StdRng::seed_from_u64(11));
        assert_eq!(deck.for_spin(1), deck.for_spin(11));
        assert_eq!(deck.for_spin(3), deck.for_spin(23));
        // before any spin completes the first joke is shown
        assert_eq!(deck.for_spin(0), deck.for_spin(1));
    }

    #[test]
    fn same_seed_same_order() {
        let a = JokeDeck::shuffled(&mut StdRng::seed_from_u64(99));
        let b = JokeDeck::shuffled(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn envelope_scales_with_volume() {
        let env = note_envelope(&FANFARE[0], 10.0, 0.5);
        assert_eq!(env[0], (10.0, 0.0));
        assert!((env[1].0 - 10.05).abs() < 1e-9);
        assert!((env[1].1 - 0.1).abs() < 1e-9);
        assert!((env[2].0 - 10.05).abs() < 1e-9);
        assert!((env[3].0 - 10.15).abs() < 1e-9);
        assert_eq!(env[3].1, 0.0);
    }

    #[test]
    fn chord_lands_after_the_run() {
        let run_end = FANFARE[..3]
            .iter()
            .map(|n| n.offset_s + n.duration_s)
            .fold(0.0, f64::max);
        assert!(FANFARE[3..].iter().all(|n| n.offset_s >= run_end));
        assert_eq!(FANFARE.iter().filter(|n| n.waveform == Waveform::Square).count(), 1);
    }
}
