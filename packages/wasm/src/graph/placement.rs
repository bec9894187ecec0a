//! Default placement for nodes created without a position.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Vector2;

/// Canvas area new nodes are dropped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Canvas width in graph units (default: 800).
    pub width: f64,
    /// Canvas height in graph units (default: 600).
    pub height: f64,
    /// Inset from every edge of the canvas (default: 100).
    pub border: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            border: 100.0,
        }
    }
}

impl PlacementConfig {
    /// Centre of the canvas.
    pub fn center(&self) -> Vector2 {
        Vector2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Uniform random point inside the border-inset rectangle.
    ///
    /// An inset that leaves no room collapses that axis to the centre.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2 {
        Vector2::new(
            random_in(rng, self.border, self.width - self.border),
            random_in(rng, self.border, self.height - self.border),
        )
    }
}

fn random_in<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        (low + high) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_position_inside_border() {
        let config = PlacementConfig::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let p = config.random_position(&mut rng);
            assert!(p.x >= 100.0 && p.x < 700.0);
            assert!(p.y >= 100.0 && p.y < 500.0);
        }
    }

    #[test]
    fn test_collapsed_area_uses_center() {
        let config = PlacementConfig {
            width: 150.0,
            height: 150.0,
            border: 100.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(config.random_position(&mut rng), Vector2::new(75.0, 75.0));
    }
}
