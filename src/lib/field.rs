//! Field-side facts that the routine branches on.

/// Alliance the robot plays for this match.
///
/// The field is bilaterally symmetric; paths are authored from the blue side
/// and reflected for red.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Alliance {
    Red,
    #[default]
    Blue,
}

impl Alliance {
    /// `true` for the side whose headings are negated when a step asks for
    /// mirroring.
    pub const fn is_reflected(self) -> bool {
        matches!(self, Alliance::Red)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Alliance::Red => 0,
            Alliance::Blue => 1,
        }
    }
}

/// Spike mark lane reported by the vision classifier before the start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Lane {
    Left,
    #[default]
    Middle,
    Right,
}

impl Lane {
    pub(crate) const fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Middle => 1,
            Lane::Right => 2,
        }
    }
}
