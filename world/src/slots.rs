//! Diamond-shaped placement layout around the objective.

use bastion_core::{PlacementError, SlotId, SlotSnapshot, TowerId};
use glam::Vec2;

/// Cells per row of the diamond, top to bottom.
const ROW_WIDTHS: [i32; 7] = [1, 3, 5, 7, 5, 3, 1];

#[derive(Clone, Debug)]
pub(crate) struct SlotState {
    pub(crate) id: SlotId,
    pub(crate) position: Vec2,
    pub(crate) unlocked: bool,
    pub(crate) central: bool,
    pub(crate) occupant: Option<TowerId>,
}

impl SlotState {
    pub(crate) fn check_placement(&self) -> Result<(), PlacementError> {
        if self.central {
            Err(PlacementError::CentralSlot)
        } else if !self.unlocked {
            Err(PlacementError::Locked)
        } else if self.occupant.is_some() {
            Err(PlacementError::Occupied)
        } else {
            Ok(())
        }
    }

    fn accepts_highlight(&self) -> bool {
        self.unlocked && !self.central && self.occupant.is_none()
    }

    pub(crate) fn snapshot(&self, highlight_active: bool) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id,
            position: self.position,
            unlocked: self.unlocked,
            central: self.central,
            occupant: self.occupant,
            highlighted: highlight_active && self.accepts_highlight(),
        }
    }
}

/// Builds the diamond layout in row-major order, unlocking the first `unlocked` slots.
///
/// The central cell is always unlocked because it hosts the starting tower.
pub(crate) fn diamond(centre: Vec2, cell_size: f32, unlocked: u32) -> Vec<SlotState> {
    let half_height = (ROW_WIDTHS.len() / 2) as i32;
    let mut slots = Vec::new();
    for (row, width) in ROW_WIDTHS.iter().enumerate() {
        let y = row as i32 - half_height;
        let half_width = width / 2;
        for x in -half_width..=half_width {
            let index = slots.len() as u32;
            let central = x == 0 && y == 0;
            slots.push(SlotState {
                id: SlotId::new(index),
                position: centre + Vec2::new(x as f32, y as f32) * cell_size,
                unlocked: central || index < unlocked,
                central,
                occupant: None,
            });
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_has_twenty_five_slots_with_centre_at_twelve() {
        let slots = diamond(Vec2::ZERO, 80.0, 25);
        assert_eq!(slots.len(), 25);
        let central: Vec<_> = slots.iter().filter(|slot| slot.central).collect();
        assert_eq!(central.len(), 1);
        assert_eq!(central[0].id, SlotId::new(12));
        assert_eq!(central[0].position, Vec2::ZERO);
    }

    #[test]
    fn diamond_spans_three_cells_each_way() {
        let slots = diamond(Vec2::new(10.0, 10.0), 80.0, 25);
        assert_eq!(slots[0].position, Vec2::new(10.0, -230.0));
        assert_eq!(slots[24].position, Vec2::new(10.0, 250.0));
        assert_eq!(slots[9].position, Vec2::new(-230.0, 10.0));
    }

    #[test]
    fn partial_unlock_follows_layout_order() {
        let slots = diamond(Vec2::ZERO, 80.0, 4);
        let unlocked: Vec<u32> = slots
            .iter()
            .filter(|slot| slot.unlocked)
            .map(|slot| slot.id.get())
            .collect();
        assert_eq!(unlocked, vec![0, 1, 2, 3, 12]);
    }

    #[test]
    fn central_slot_rejects_placement_before_other_checks() {
        let slots = diamond(Vec2::ZERO, 80.0, 0);
        assert_eq!(slots[12].check_placement(), Err(PlacementError::CentralSlot));
        assert_eq!(slots[0].check_placement(), Err(PlacementError::Locked));
    }

    #[test]
    fn highlight_skips_occupied_and_central_slots() {
        let mut slots = diamond(Vec2::ZERO, 80.0, 25);
        slots[3].occupant = Some(TowerId::new(4));
        assert!(slots[0].snapshot(true).highlighted);
        assert!(!slots[3].snapshot(true).highlighted);
        assert!(!slots[12].snapshot(true).highlighted);
        assert!(!slots[0].snapshot(false).highlighted);
    }
}
