//! Targets currently within the agent's cleaning reach
//!
//! Fed by enter/exit signals from the spatial layer. A target can be destroyed
//! while still inside the set without ever getting an exit signal, so callers
//! prune before dereferencing members. Removal only happens in `remove` and
//! `prune_destroyed`, never while a pass is iterating.

use glam::Vec3;

use super::dirt::{DirtId, Targets};

#[derive(Debug, Clone, Default)]
pub struct ProximitySet {
    members: Vec<DirtId>,
}

impl ProximitySet {
    /// Enter-range signal. No-op if already present.
    pub fn add(&mut self, target: DirtId) {
        if !self.members.contains(&target) {
            self.members.push(target);
        }
    }

    /// Exit-range signal. No-op if absent.
    pub fn remove(&mut self, target: DirtId) {
        self.members.retain(|&id| id != target);
    }

    pub fn contains(&self, target: DirtId) -> bool {
        self.members.contains(&target)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DirtId> + '_ {
        self.members.iter().copied()
    }

    /// Forget entries whose target is destroyed or no longer stored.
    /// Returns how many were dropped.
    pub fn prune_destroyed(&mut self, targets: &Targets) -> usize {
        let before = self.members.len();
        self.members.retain(|&id| targets.is_live(id));
        let pruned = before - self.members.len();
        if pruned > 0 {
            log::debug!("pruned {pruned} stale proximity entries");
        }
        pruned
    }

    /// Nearest member to `point`. Ties go to the first found at the minimum
    /// distance, scanning in membership order.
    pub fn closest_to(&self, point: Vec3, targets: &Targets) -> Option<DirtId> {
        let mut best: Option<(DirtId, f32)> = None;
        for id in self.ids() {
            let Some(target) = targets.get(id) else {
                continue;
            };
            if target.is_destroyed() {
                continue;
            }
            let dist_sq = target.position.distance_squared(point);
            match best {
                Some((_, best_sq)) if dist_sq >= best_sq => {}
                _ => best = Some((id, dist_sq)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Members whose required-tool filter accepts `tool_kind`. Lazy; the set
    /// is not touched.
    pub fn compatible_with<'a>(
        &'a self,
        tool_kind: &'a str,
        targets: &'a Targets,
    ) -> impl Iterator<Item = DirtId> + 'a {
        self.ids().filter(move |&id| {
            targets
                .get(id)
                .is_some_and(|t| !t.is_destroyed() && t.accepts(tool_kind))
        })
    }

    /// Enter/exit signals for a radius sensor centred on `origin`.
    ///
    /// Stands in for trigger-volume overlap events when the host has no
    /// physics engine of its own. Only live targets can enter.
    pub fn sense(&self, origin: Vec3, radius: f32, targets: &Targets) -> (Vec<DirtId>, Vec<DirtId>) {
        let radius_sq = radius * radius;
        let entered = targets
            .live()
            .filter(|t| t.position.distance_squared(origin) <= radius_sq)
            .map(|t| t.id)
            .filter(|id| !self.contains(*id))
            .collect();
        let exited = self
            .ids()
            .filter(|&id| {
                targets
                    .get(id)
                    .is_some_and(|t| t.position.distance_squared(origin) > radius_sq)
            })
            .collect();
        (entered, exited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::dirt::DirtTarget;
    use crate::sim::events::EventBus;
    use crate::sim::progress::ProgressAggregator;

    fn targets_at(positions: &[(u32, Vec3, Option<&str>)]) -> Targets {
        let mut targets = Targets::default();
        for &(id, pos, required) in positions {
            targets.insert(DirtTarget::new(DirtId(id), pos, 10.0, required.map(String::from)));
        }
        targets
    }

    #[test]
    fn test_add_remove_are_idempotent() {
        let mut set = ProximitySet::default();
        set.add(DirtId(1));
        set.add(DirtId(1));
        set.add(DirtId(2));
        assert_eq!(set.len(), 2);

        set.remove(DirtId(3));
        assert_eq!(set.len(), 2);
        set.remove(DirtId(1));
        set.remove(DirtId(1));
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![DirtId(2)]);
    }

    #[test]
    fn test_prune_destroyed_and_missing() {
        let mut targets = targets_at(&[(1, Vec3::ZERO, None), (2, Vec3::X, None)]);
        let mut set = ProximitySet::default();
        set.add(DirtId(1));
        set.add(DirtId(2));
        set.add(DirtId(99)); // never stored

        let mut progress = ProgressAggregator::default();
        progress.register_target();
        progress.register_target();
        let mut events = EventBus::default();
        targets
            .get_mut(DirtId(1))
            .unwrap()
            .apply_damage(100.0, &mut progress, &mut events);

        assert_eq!(set.prune_destroyed(&targets), 2);
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![DirtId(2)]);
    }

    #[test]
    fn test_closest_to_first_found_on_tie() {
        let targets = targets_at(&[
            (1, Vec3::new(2.0, 0.0, 0.0), None),
            (2, Vec3::new(-1.0, 0.0, 0.0), None),
            (3, Vec3::new(1.0, 0.0, 0.0), None),
        ]);
        let mut set = ProximitySet::default();
        set.add(DirtId(1));
        set.add(DirtId(2));
        set.add(DirtId(3));

        // 2 and 3 are equidistant; 2 was added first
        assert_eq!(set.closest_to(Vec3::ZERO, &targets), Some(DirtId(2)));
        // Repeated calls agree
        for _ in 0..10 {
            assert_eq!(set.closest_to(Vec3::ZERO, &targets), Some(DirtId(2)));
        }
        assert_eq!(set.closest_to(Vec3::new(2.0, 0.0, 0.0), &targets), Some(DirtId(1)));
    }

    #[test]
    fn test_closest_to_empty() {
        let set = ProximitySet::default();
        assert_eq!(set.closest_to(Vec3::ZERO, &Targets::default()), None);
    }

    #[test]
    fn test_compatible_with_does_not_mutate() {
        let targets = targets_at(&[
            (1, Vec3::ZERO, Some("Vacuum")),
            (2, Vec3::ZERO, Some("Mop")),
            (3, Vec3::ZERO, None),
        ]);
        let mut set = ProximitySet::default();
        for id in 1..=3 {
            set.add(DirtId(id));
        }

        let compatible: Vec<_> = set.compatible_with("Vacuum", &targets).collect();
        assert_eq!(compatible, vec![DirtId(1), DirtId(3)]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_sense_enter_and_exit() {
        let targets = targets_at(&[
            (1, Vec3::new(1.0, 0.0, 0.0), None),
            (2, Vec3::new(5.0, 0.0, 0.0), None),
        ]);
        let mut set = ProximitySet::default();
        set.add(DirtId(2));

        let (entered, exited) = set.sense(Vec3::ZERO, 2.0, &targets);
        assert_eq!(entered, vec![DirtId(1)]);
        assert_eq!(exited, vec![DirtId(2)]);
    }
}
