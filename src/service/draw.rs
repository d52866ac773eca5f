use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Source of uniform samples in `[0, 1)` used for simulated declines.
pub trait DrawSource: Send + Sync {
    fn draw(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDraw;

impl DrawSource for ThreadRngDraw {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Always yields the same sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl DrawSource for FixedDraw {
    fn draw(&self) -> f64 {
        self.0
    }
}

/// Replays a fixed sequence, cycling once exhausted.
pub struct SequenceDraw {
    samples: Mutex<VecDeque<f64>>,
}

impl SequenceDraw {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: Mutex::new(samples.into_iter().collect()),
        }
    }
}

impl DrawSource for SequenceDraw {
    fn draw(&self) -> f64 {
        let Ok(mut samples) = self.samples.lock() else {
            return 0.0;
        };
        match samples.pop_front() {
            Some(sample) => {
                samples.push_back(sample);
                sample
            }
            None => 0.0,
        }
    }
}
