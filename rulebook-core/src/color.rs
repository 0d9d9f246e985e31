use crate::types::Color;

/// Default palette, in assignment order.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#bfef45",
    "#9a6324", "#469990",
];

/// Hands out color tags from a fixed palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorAssigner {
    palette: Vec<Color>,
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| Color::new(*c)).collect(),
        }
    }
}

impl ColorAssigner {
    /// Build from a custom palette. An empty palette falls back to the default.
    pub fn new(palette: Vec<Color>) -> Self {
        if palette.is_empty() {
            return Self::default();
        }
        Self { palette }
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// First palette color not held by any sibling. Once every color is in
    /// use, cycle by sibling count; collisions are tolerated.
    pub fn assign<'a>(&self, siblings: impl IntoIterator<Item = &'a Color>) -> Color {
        let in_use: Vec<&Color> = siblings.into_iter().collect();
        self.palette
            .iter()
            .find(|color| !in_use.contains(color))
            .cloned()
            .unwrap_or_else(|| self.palette[in_use.len() % self.palette.len()].clone())
    }

    /// Colors for a fresh collection, assigned in order as if each entry
    /// were created one after another.
    pub fn assign_sequence(&self, count: usize) -> Vec<Color> {
        let mut assigned: Vec<Color> = Vec::with_capacity(count);
        for _ in 0..count {
            let color = self.assign(assigned.iter());
            assigned.push(color);
        }
        assigned
    }
}
