//! Compass exit flags shared by grid vertices, edges, and pattern placement.

use std::cmp::Ordering;

use bitflags::bitflags;
use rand_chacha::ChaCha8Rng;

use crate::seed::random_index;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Directions: u8 {
        const NONE  = 0;
        const NORTH = 0b0001;
        const SOUTH = 0b0010;
        const EAST  = 0b0100;
        const WEST  = 0b1000;
        const ALL   = 0b1111;
    }
}

impl Directions {
    pub fn is_single(self) -> bool {
        self.bits().count_ones() == 1
    }

    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }

    /// Maps every member to the opposite compass point.
    pub fn opposite(self) -> Self {
        let mut result = Self::NONE;
        if self.intersects(Self::NORTH) {
            result.insert(Self::SOUTH);
        }
        if self.intersects(Self::SOUTH) {
            result.insert(Self::NORTH);
        }
        if self.intersects(Self::EAST) {
            result.insert(Self::WEST);
        }
        if self.intersects(Self::WEST) {
            result.insert(Self::EAST);
        }
        result
    }

    /// Both directions on the axis orthogonal to each member.
    pub fn perpendicular(self) -> Self {
        let mut result = Self::NONE;
        if self.intersects(Self::NORTH | Self::SOUTH) {
            result.insert(Self::EAST | Self::WEST);
        }
        if self.intersects(Self::EAST | Self::WEST) {
            result.insert(Self::NORTH | Self::SOUTH);
        }
        result
    }

    pub fn is_horizontal(self) -> bool {
        self == Self::EAST || self == Self::WEST
    }

    pub fn is_vertical(self) -> bool {
        self == Self::NORTH || self == Self::SOUTH
    }

    pub fn random_choice(self, rng: &mut ChaCha8Rng) -> Option<Self> {
        let members: Vec<Self> = self.iter().collect();
        if members.is_empty() {
            return None;
        }
        Some(members[random_index(rng, members.len())])
    }

    /// Unit step for a single direction; north is +y, east is +x.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Self::NORTH => (0, 1),
            Self::SOUTH => (0, -1),
            Self::EAST => (1, 0),
            Self::WEST => (-1, 0),
            _ => (0, 0),
        }
    }

    /// Direction of travel from `from` to `to` when they share an axis.
    pub fn between(from: (i64, i64), to: (i64, i64)) -> Option<Self> {
        match (to.0.cmp(&from.0), to.1.cmp(&from.1)) {
            (Ordering::Greater, Ordering::Equal) => Some(Self::EAST),
            (Ordering::Less, Ordering::Equal) => Some(Self::WEST),
            (Ordering::Equal, Ordering::Greater) => Some(Self::NORTH),
            (Ordering::Equal, Ordering::Less) => Some(Self::SOUTH),
            _ => None,
        }
    }

    /// Clockwise rank starting at north, used to order incident edges.
    pub fn compass_rank(self) -> u8 {
        match self {
            Self::NORTH => 0,
            Self::EAST => 1,
            Self::SOUTH => 2,
            Self::WEST => 3,
            _ => 4,
        }
    }
}
