use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// What a cursor visits and what it may do.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CursorFlags(u8);

impl CursorFlags {
    pub const NONE: Self = Self(0);
    pub const ELEMENTS: Self = Self(1);
    pub const ATTRIBUTES: Self = Self(1 << 1);
    pub const MULTIPLE: Self = Self(1 << 2);
    pub const MUTABLE: Self = Self(1 << 3);
    pub const ALL_NODES: Self = Self(Self::ELEMENTS.0 | Self::ATTRIBUTES.0);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn includes_elements(self) -> bool {
        self.contains(Self::ELEMENTS)
    }

    pub const fn includes_attributes(self) -> bool {
        self.contains(Self::ATTRIBUTES)
    }

    pub const fn allows_multiple(self) -> bool {
        self.contains(Self::MULTIPLE)
    }

    pub const fn is_mutable(self) -> bool {
        self.contains(Self::MUTABLE)
    }
}

impl BitOr for CursorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for CursorFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for CursorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::ELEMENTS, "ELEMENTS"),
            (Self::ATTRIBUTES, "ATTRIBUTES"),
            (Self::MULTIPLE, "MULTIPLE"),
            (Self::MUTABLE, "MUTABLE"),
        ];
        let set: Vec<_> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "CursorFlags(NONE)")
        } else {
            write!(f, "CursorFlags({})", set.join(" | "))
        }
    }
}
