//! Lock and key families, and the placement contract the tiling layer
//! implements to turn them into scene objects.

use serde::Serialize;

use crate::directions::Directions;
use crate::grid::{EdgeId, LockId, VertexId};
use crate::model::DrawPos;

/// Hazard flavour a pattern may pick for the lock gating its branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DangerType {
    None,
    SoundTrap,
    DeathTrap,
    Camera,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Lock {
    Door { guarded: bool },
    SoundTrap,
    DeathTrap,
    Camera,
    LightWall,
    /// Secret passage; found by searching, never unlocked.
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Key {
    Keycard,
    TrapSwitch { lethal: bool },
    CameraTerminal,
    LightSwitch,
}

impl Lock {
    /// Lock flavour for a danger roll. `DangerType::None` yields a door.
    pub fn for_danger(danger: DangerType, guarded: bool) -> Self {
        match danger {
            DangerType::None => Lock::Door { guarded },
            DangerType::SoundTrap => Lock::SoundTrap,
            DangerType::DeathTrap => Lock::DeathTrap,
            DangerType::Camera => Lock::Camera,
        }
    }

    pub fn new_key(&self) -> Option<Key> {
        match self {
            Lock::Door { .. } => Some(Key::Keycard),
            Lock::SoundTrap => Some(Key::TrapSwitch { lethal: false }),
            Lock::DeathTrap => Some(Key::TrapSwitch { lethal: true }),
            Lock::Camera => Some(Key::CameraTerminal),
            Lock::LightWall => Some(Key::LightSwitch),
            Lock::Hidden => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lock::Door { guarded: false } => "door",
            Lock::Door { guarded: true } => "guarded door",
            Lock::SoundTrap => "sound trap",
            Lock::DeathTrap => "death trap",
            Lock::Camera => "camera",
            Lock::LightWall => "light wall",
            Lock::Hidden => "hidden passage",
        }
    }

    pub fn implement(&self, site: &Site, scene: &mut impl Scene) {
        let obstacle = match *self {
            Lock::Door { guarded } => Obstacle::Door { guarded },
            Lock::SoundTrap => Obstacle::SoundTrap,
            Lock::DeathTrap => Obstacle::DeathTrap,
            Lock::Camera => Obstacle::Camera,
            Lock::LightWall => Obstacle::LightWall,
            Lock::Hidden => Obstacle::SecretPassage,
        };
        scene.place_obstacle(obstacle, site);
    }
}

impl Key {
    pub fn name(&self) -> &'static str {
        match self {
            Key::Keycard => "keycard",
            Key::TrapSwitch { lethal: false } => "trap switch",
            Key::TrapSwitch { lethal: true } => "lethal trap switch",
            Key::CameraTerminal => "camera terminal",
            Key::LightSwitch => "light switch",
        }
    }

    pub fn implement(&self, site: &Site, scene: &mut impl Scene) {
        let pickup = match *self {
            Key::Keycard => Pickup::Keycard,
            Key::TrapSwitch { lethal } => Pickup::TrapSwitch { lethal },
            Key::CameraTerminal => Pickup::CameraTerminal,
            Key::LightSwitch => Pickup::LightSwitch,
        };
        scene.place_pickup(pickup, site);
    }
}

/// Physical blocker the tiling layer instantiates for a lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Obstacle {
    Door { guarded: bool },
    SoundTrap,
    DeathTrap,
    Camera,
    LightWall,
    SecretPassage,
}

/// Collectable or switch the tiling layer instantiates for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pickup {
    Keycard,
    TrapSwitch { lethal: bool },
    CameraTerminal,
    LightSwitch,
}

/// Where an obstacle or pickup goes, resolved from a finished drawing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
    pub vertex: VertexId,
    pub position: DrawPos,
    /// Exits of the vertex that lead into gated edges; empty for pickups.
    pub doorways: Directions,
    pub hallway: bool,
}

pub trait Scene {
    fn place_obstacle(&mut self, obstacle: Obstacle, site: &Site);
    fn place_pickup(&mut self, pickup: Pickup, site: &Site);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedLock {
    pub lock: Lock,
    pub vertex: VertexId,
    /// Edges that cannot be crossed until the lock is opened.
    pub gated: Vec<EdgeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedKey {
    pub key: Key,
    pub vertex: VertexId,
    pub locks: Vec<LockId>,
}

#[cfg(test)]
mod tests {
    use slotmap::KeyData;

    use super::*;

    #[derive(Default)]
    struct RecordingScene {
        obstacles: Vec<Obstacle>,
        pickups: Vec<Pickup>,
    }

    impl Scene for RecordingScene {
        fn place_obstacle(&mut self, obstacle: Obstacle, _site: &Site) {
            self.obstacles.push(obstacle);
        }

        fn place_pickup(&mut self, pickup: Pickup, _site: &Site) {
            self.pickups.push(pickup);
        }
    }

    fn site() -> Site {
        Site {
            vertex: VertexId::from(KeyData::from_ffi(1)),
            position: DrawPos { x: 0, y: 0, z: 0 },
            doorways: Directions::NORTH,
            hallway: false,
        }
    }

    #[test]
    fn every_lock_except_hidden_has_a_matching_key() {
        let locks = [
            Lock::Door { guarded: true },
            Lock::SoundTrap,
            Lock::DeathTrap,
            Lock::Camera,
            Lock::LightWall,
        ];
        for lock in locks {
            assert!(lock.new_key().is_some(), "{} should have a key", lock.name());
        }
        assert_eq!(Lock::Hidden.new_key(), None);
        assert_eq!(Lock::DeathTrap.new_key(), Some(Key::TrapSwitch { lethal: true }));
    }

    #[test]
    fn danger_none_falls_back_to_a_door() {
        assert_eq!(Lock::for_danger(DangerType::None, true), Lock::Door { guarded: true });
        assert_eq!(Lock::for_danger(DangerType::Camera, true), Lock::Camera);
    }

    #[test]
    fn implement_forwards_to_the_scene() {
        let mut scene = RecordingScene::default();
        Lock::Door { guarded: false }.implement(&site(), &mut scene);
        Lock::Hidden.implement(&site(), &mut scene);
        Key::TrapSwitch { lethal: false }.implement(&site(), &mut scene);
        assert_eq!(
            scene.obstacles,
            vec![Obstacle::Door { guarded: false }, Obstacle::SecretPassage]
        );
        assert_eq!(scene.pickups, vec![Pickup::TrapSwitch { lethal: false }]);
    }
}
