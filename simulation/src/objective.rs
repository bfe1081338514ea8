use bastion_core::Objective;
use glam::Vec2;

/// Objective kept by the simulation when the host supplies none of its own.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerCore {
    position: Vec2,
    health: u32,
    max_health: u32,
}

impl PlayerCore {
    /// Creates a core at full health.
    #[must_use]
    pub const fn new(position: Vec2, max_health: u32) -> Self {
        Self {
            position,
            health: max_health,
            max_health,
        }
    }
}

impl Objective for PlayerCore {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn health(&self) -> u32 {
        self.health
    }

    fn max_health(&self) -> u32 {
        self.max_health
    }

    fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    fn fortify(&mut self, amount: u32) {
        self.max_health = self.max_health.saturating_add(amount);
        self.heal(amount);
    }
}
