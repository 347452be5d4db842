use serde::{Deserialize, Serialize};

/// Axial coordinates for a hex cell (q, r). The implicit cube coordinate is
/// `s = -q - r`, so `q + r + s == 0` holds by construction.
///
/// `Ord` is lexicographic on `(q, r)`; the engine relies on it for
/// deterministic tie-breaks.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const DIRECTIONS: [HexCoord; 6] = [
        HexCoord { q: 1, r: 0 },  // East
        HexCoord { q: 1, r: -1 }, // Northeast
        HexCoord { q: 0, r: -1 }, // Northwest
        HexCoord { q: -1, r: 0 }, // West
        HexCoord { q: -1, r: 1 }, // Southwest
        HexCoord { q: 0, r: 1 },  // Southeast
    ];

    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    pub fn neighbors(self) -> impl Iterator<Item = HexCoord> {
        Self::DIRECTIONS.into_iter().map(move |d| self + d)
    }

    #[inline]
    pub fn distance(self, other: HexCoord) -> i32 {
        ((self.q - other.q).abs() + (self.r - other.r).abs() + (self.s() - other.s()).abs()) / 2
    }

    /// All hexes with distance `<= radius` from `self`, in ascending `(q, r)`
    /// order.
    pub fn disc(self, radius: i32) -> impl Iterator<Item = HexCoord> {
        let radius = radius.max(0);
        (-radius..=radius).flat_map(move |dq| {
            // The third cube delta is ds = -dq - dr; max(|dq|, |dr|, |ds|) <= radius.
            let dr_min = (-radius).max(-dq - radius);
            let dr_max = radius.min(-dq + radius);
            (dr_min..=dr_max).map(move |dr| HexCoord {
                q: self.q + dq,
                r: self.r + dr,
            })
        })
    }
}

impl std::ops::Add for HexCoord {
    type Output = HexCoord;

    fn add(self, other: HexCoord) -> HexCoord {
        HexCoord {
            q: self.q + other.q,
            r: self.r + other.r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_matches_expected() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(3, -1);
        assert_eq!(a.distance(b), 3);
    }

    #[test]
    fn neighbors_has_six_adjacent() {
        let center = HexCoord::new(2, -1);
        let neighbors: Vec<_> = center.neighbors().collect();
        assert_eq!(neighbors.len(), 6);
        assert!(neighbors.iter().all(|n| center.distance(*n) == 1));
    }

    #[test]
    fn disc_counts_match_hexagon_formula() {
        let center = HexCoord::new(0, 0);
        for radius in 0..=4 {
            let count = center.disc(radius).count() as i32;
            assert_eq!(count, 1 + 3 * radius * (radius + 1));
        }
    }

    #[test]
    fn ordering_is_lexicographic_on_q_then_r() {
        assert!(HexCoord::new(-1, 5) < HexCoord::new(0, -5));
        assert!(HexCoord::new(0, -1) < HexCoord::new(0, 0));
    }
}
