use crate::foundation::rng::Rng64;

/// A canvas coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

/// Seeded random ordering of every coordinate of a `width x height` grid.
///
/// Invariant: a bijection onto the grid (each coordinate exactly once).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatePermutation {
    width: u32,
    height: u32,
    coords: Vec<Coord>,
}

impl CoordinatePermutation {
    /// Shuffle the row-major grid with Fisher-Yates, drawing from `rng`.
    ///
    /// Consumes `width * height - 1` bounded draws (more on rejection), so callers sharing `rng`
    /// must keep the call order fixed to stay reproducible.
    #[tracing::instrument(skip(rng))]
    pub fn generate(width: u32, height: u32, rng: &mut Rng64) -> Self {
        let mut coords = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                coords.push(Coord { x, y });
            }
        }

        let mut n = coords.len();
        while n > 1 {
            n -= 1;
            let k = rng.next_below(n as u64 + 1) as usize;
            coords.swap(k, n);
        }

        Self {
            width,
            height,
            coords,
        }
    }

    /// [`generate`](Self::generate) with a fresh generator seeded by `seed`.
    pub fn from_seed(width: u32, height: u32, seed: u64) -> Self {
        Self::generate(width, height, &mut Rng64::new(seed))
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of coordinates (`width * height`).
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// `true` for an empty grid.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinates in reveal order.
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/permutation.rs"]
mod tests;
