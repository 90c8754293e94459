//! Layered Perlin height field over (longitude, latitude).
//!
//! The field is a fixed sum of three coherent-noise layers at increasing
//! frequency and decreasing amplitude. Generators are built once per process
//! and never mutated, so [`height`] is a pure function of its inputs and sector
//! meshes built from it stay valid for the lifetime of the process.

#[cfg(any(test, feature = "eval-counter"))]
use std::cell::Cell;
use std::sync::LazyLock;

use noise::{NoiseFn, Perlin};

/// One layer of the surface height field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseLayer {
    /// Perlin permutation seed.
    pub seed: u32,
    /// Angular frequency applied to longitude and latitude (radians).
    pub frequency: f64,
    /// Octave multiplier; the sampled coordinate is `angle * frequency * octaves`.
    pub octaves: u32,
    /// Weight of this layer in the final height.
    pub amplitude: f64,
}

impl NoiseLayer {
    /// Coordinate multiplier applied before sampling the generator.
    pub const fn scale(&self) -> f64 {
        self.frequency * self.octaves as f64
    }
}

/// The three layers of the planet surface: broad swells, hills, fine grit.
pub const NOISE_LAYERS: [NoiseLayer; 3] = [
    NoiseLayer {
        seed: 4522,
        frequency: 5.0,
        octaves: 2,
        amplitude: 0.03,
    },
    NoiseLayer {
        seed: 345,
        frequency: 20.0,
        octaves: 3,
        amplitude: 0.03,
    },
    NoiseLayer {
        seed: 235,
        frequency: 80.0,
        octaves: 3,
        amplitude: 0.01,
    },
];

static GENERATORS: LazyLock<[Perlin; 3]> = LazyLock::new(|| {
    tracing::debug!(layers = NOISE_LAYERS.len(), "initializing terrain noise generators");
    NOISE_LAYERS.map(|layer| Perlin::new(layer.seed))
});

#[cfg(any(test, feature = "eval-counter"))]
thread_local! {
    static EVALUATIONS: Cell<u64> = const { Cell::new(0) };
}

/// Terrain height offset at `(longitude, latitude)` in radians.
///
/// Callers add the result to the planet's base radius. The value is bounded by
/// [`max_height`] in absolute terms.
pub fn height(longitude: f64, latitude: f64) -> f64 {
    #[cfg(any(test, feature = "eval-counter"))]
    EVALUATIONS.with(|count| count.set(count.get() + 1));

    NOISE_LAYERS
        .iter()
        .zip(GENERATORS.iter())
        .map(|(layer, generator)| {
            let scale = layer.scale();
            layer.amplitude * generator.get([longitude * scale, latitude * scale])
        })
        .sum()
}

/// Sum of layer amplitudes: the largest offset [`height`] can return.
pub fn max_height() -> f64 {
    NOISE_LAYERS.iter().map(|layer| layer.amplitude).sum()
}

/// Number of [`height`] evaluations performed on the current thread.
///
/// Mesh caching is verified against this counter: reusing a cached sector must
/// not advance it. Only compiled with the `eval-counter` feature.
#[cfg(any(test, feature = "eval-counter"))]
pub fn evaluations() -> u64 {
    EVALUATIONS.with(Cell::get)
}
