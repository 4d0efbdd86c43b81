use crate::error::SimError;
use crate::types::{AgentId, Rgb};
use rand::Rng;

/// The stock 20-entry palette used when no custom one is supplied.
const DEFAULT_COLORS: [Rgb; 20] = [
    [0xe6, 0x19, 0x4b],
    [0x3c, 0xb4, 0x4b],
    [0xff, 0xe1, 0x19],
    [0x43, 0x63, 0xd8],
    [0xf5, 0x82, 0x31],
    [0x91, 0x1e, 0xb4],
    [0x46, 0xf0, 0xf0],
    [0xf0, 0x32, 0xe6],
    [0xbc, 0xf6, 0x0c],
    [0xfa, 0xbe, 0xbe],
    [0x00, 0x80, 0x80],
    [0xe6, 0xbe, 0xff],
    [0x9a, 0x63, 0x24],
    [0xff, 0xfa, 0xc8],
    [0x80, 0x00, 0x00],
    [0xaa, 0xff, 0xc3],
    [0x80, 0x80, 0x00],
    [0xff, 0xd8, 0xb1],
    [0x00, 0x00, 0x75],
    [0x80, 0x80, 0x80],
];

/// Color-assignment strategy for agents.
///
/// A palette is injected into every randomized constructor instead of
/// being a global, so tests can supply a deterministic single-color
/// palette and renderers can theme scenes.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self, SimError> {
        if colors.is_empty() {
            return Err(SimError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Deterministic color for an id: entries repeat every `len()` ids.
    pub fn color_for(&self, id: AgentId) -> Rgb {
        self.colors[id % self.colors.len()]
    }

    /// A uniformly drawn palette entry.
    pub fn random_color(&self, rng: &mut impl Rng) -> Rgb {
        self.colors[rng.random_range(0..self.colors.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_palette_has_twenty_entries() {
        assert_eq!(Palette::default().len(), 20);
    }

    #[test]
    fn color_for_wraps_by_palette_length() {
        let p = Palette::default();
        assert_eq!(p.color_for(3), p.color_for(23));
        assert_eq!(p.color_for(0), p.color_for(20));
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert_eq!(Palette::new(vec![]), Err(SimError::EmptyPalette));
    }

    #[test]
    fn random_color_comes_from_the_palette() {
        let p = Palette::new(vec![[1, 2, 3], [4, 5, 6]]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let c = p.random_color(&mut rng);
            assert!(c == [1, 2, 3] || c == [4, 5, 6]);
        }
    }
}
