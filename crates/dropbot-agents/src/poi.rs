//! Weighted point-of-interest spawn selection.
//!
//! POIs are drawn with weight `tier * weight_per_tier + strategic_bonus`, only among POIs with
//! free capacity. When every POI is full the pool reseeds (all occupancy back to zero) and
//! draws once more.

use dropbot_core::{DeterministicRng, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PoiConfig;
use crate::error::PoiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiSpawnPoint {
    pub name: String,
    pub anchor: Vec3,
    pub tier: u8,
    pub capacity: u32,
    pub occupancy: u32,
    pub strategic: bool,
}

impl PoiSpawnPoint {
    pub fn has_room(&self) -> bool {
        self.occupancy < self.capacity
    }
}

/// Where a selected bot should spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiPlacement {
    pub poi: String,
    pub location: Vec3,
}

#[derive(Debug, Clone, Default)]
pub struct PoiPool {
    config: PoiConfig,
    points: Vec<PoiSpawnPoint>,
    reseeds: u32,
}

impl PoiPool {
    pub fn new(config: PoiConfig) -> Self {
        Self {
            config,
            points: Vec::new(),
            reseeds: 0,
        }
    }

    /// Register a POI. Capacity is clamped into the configured bounds.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        anchor: Vec3,
        tier: u8,
        capacity: u32,
        strategic: bool,
    ) -> Result<(), PoiError> {
        let name = name.into();
        if !(1..=3).contains(&tier) {
            return Err(PoiError::InvalidTier { name, tier });
        }
        if self.points.iter().any(|p| p.name == name) {
            return Err(PoiError::DuplicateName(name));
        }
        let capacity = capacity.clamp(
            self.config.min_capacity,
            self.config.max_capacity.max(self.config.min_capacity),
        );
        self.points.push(PoiSpawnPoint {
            name,
            anchor,
            tier,
            capacity,
            occupancy: 0,
            strategic,
        });
        Ok(())
    }

    /// Build a pool from named map anchors.
    ///
    /// Anchors are grouped by the name prefix before the first `_`, in order of first
    /// appearance. A group with at least two anchors becomes a POI at its first anchor, with
    /// capacity `min(len / 2, 10)` and a tier that grows with group size. When no group
    /// qualifies, every `fallback_stride`-th anchor becomes a generic `POI_<n>`.
    pub fn from_named_anchors<S: AsRef<str>>(
        anchors: impl IntoIterator<Item = (S, Vec3)>,
        config: PoiConfig,
    ) -> Result<Self, PoiError> {
        let anchors: Vec<(String, Vec3)> = anchors
            .into_iter()
            .map(|(name, at)| (name.as_ref().to_owned(), at))
            .collect();

        let mut groups: Vec<(String, Vec<Vec3>)> = Vec::new();
        for (name, at) in &anchors {
            let prefix = name.split('_').next().unwrap_or(name.as_str());
            match groups.iter_mut().find(|(p, _)| p == prefix) {
                Some((_, members)) => members.push(*at),
                None => groups.push((prefix.to_owned(), vec![*at])),
            }
        }

        let mut pool = Self::new(config);
        for (prefix, members) in groups.iter().filter(|(_, m)| m.len() >= 2) {
            let capacity = (members.len() / 2).min(10) as u32;
            let tier = match members.len() {
                n if n >= 8 => 3,
                n if n >= 4 => 2,
                _ => 1,
            };
            pool.add(prefix.clone(), members[0], tier, capacity, false)?;
        }

        if pool.points.is_empty() {
            let stride = pool.config.fallback_stride.max(1);
            let capacity = pool.config.fallback_capacity;
            let max = pool.config.fallback_max_pois;
            for (n, (_, at)) in anchors.iter().step_by(stride).take(max).enumerate() {
                pool.add(format!("POI_{n}"), *at, 1, capacity, false)?;
            }
        }
        Ok(pool)
    }

    pub fn points(&self) -> &[PoiSpawnPoint] {
        &self.points
    }

    pub fn get(&self, name: &str) -> Option<&PoiSpawnPoint> {
        self.points.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Times the pool has been reseeded after running out of room.
    pub fn reseeds(&self) -> u32 {
        self.reseeds
    }

    pub fn weight(&self, point: &PoiSpawnPoint) -> u64 {
        let bonus = if point.strategic {
            self.config.strategic_bonus
        } else {
            0
        };
        u64::from(point.tier) * u64::from(self.config.weight_per_tier) + u64::from(bonus)
    }

    /// Sum of weights over POIs with free capacity.
    pub fn available_weight(&self) -> u64 {
        self.points
            .iter()
            .filter(|p| p.has_room())
            .map(|p| self.weight(p))
            .sum()
    }

    /// Draw a POI, take one slot in it, and compute a placement around its anchor.
    ///
    /// Returns `None` only when the pool is empty or every POI has zero weight.
    pub fn select(&mut self, rng: &mut impl DeterministicRng) -> Option<PoiPlacement> {
        let index = match self.draw(rng) {
            Some(index) => index,
            None => {
                self.reseed();
                self.draw(rng)?
            }
        };

        let spread = self.config.spread_per_tier;
        let jitter = self.config.vertical_jitter;
        let point = &mut self.points[index];
        point.occupancy += 1;

        let reach = spread * f32::from(point.tier);
        let offset = Vec3::new(
            rng.range_f32(-reach, reach),
            rng.range_f32(-reach, reach),
            rng.range_f32(-jitter, jitter),
        );
        Some(PoiPlacement {
            poi: point.name.clone(),
            location: point.anchor + offset,
        })
    }

    /// Give back a slot taken by [`PoiPool::select`]. Returns whether a slot was freed.
    pub fn release(&mut self, name: &str) -> bool {
        match self.points.iter_mut().find(|p| p.name == name) {
            Some(point) if point.occupancy > 0 => {
                point.occupancy -= 1;
                true
            }
            _ => false,
        }
    }

    /// Reset every POI's occupancy to zero.
    pub fn reseed(&mut self) {
        for point in &mut self.points {
            point.occupancy = 0;
        }
        self.reseeds += 1;
        debug!(pois = self.points.len(), reseeds = self.reseeds, "poi pool reseeded");
    }

    fn draw(&self, rng: &mut impl DeterministicRng) -> Option<usize> {
        let total = self.available_weight();
        if total == 0 {
            return None;
        }
        let roll = rng.below(total);
        let mut cumulative = 0;
        for (i, point) in self.points.iter().enumerate() {
            if !point.has_room() {
                continue;
            }
            cumulative += self.weight(point);
            if cumulative > roll {
                return Some(i);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropbot_core::SplitMix64;

    #[test]
    fn weights_follow_tier_and_strategic_flag() {
        let mut pool = PoiPool::new(PoiConfig::default());
        pool.add("Town", Vec3::ZERO, 2, 5, false).unwrap();
        pool.add("Tower", Vec3::ZERO, 1, 5, true).unwrap();
        assert_eq!(pool.weight(&pool.points()[0]), 20);
        assert_eq!(pool.weight(&pool.points()[1]), 15);
        assert_eq!(pool.available_weight(), 35);
    }

    #[test]
    fn add_rejects_bad_tier_and_duplicates() {
        let mut pool = PoiPool::new(PoiConfig::default());
        assert_eq!(
            pool.add("Nowhere", Vec3::ZERO, 4, 5, false),
            Err(PoiError::InvalidTier {
                name: "Nowhere".into(),
                tier: 4
            })
        );
        pool.add("Dock", Vec3::ZERO, 1, 5, false).unwrap();
        assert_eq!(
            pool.add("Dock", Vec3::ZERO, 2, 5, false),
            Err(PoiError::DuplicateName("Dock".into()))
        );
    }

    #[test]
    fn capacity_is_clamped() {
        let mut pool = PoiPool::new(PoiConfig::default());
        pool.add("Huge", Vec3::ZERO, 3, 500, false).unwrap();
        pool.add("Tiny", Vec3::ZERO, 1, 0, false).unwrap();
        assert_eq!(pool.get("Huge").unwrap().capacity, 10);
        assert_eq!(pool.get("Tiny").unwrap().capacity, 1);
    }

    #[test]
    fn release_frees_one_slot() {
        let mut pool = PoiPool::new(PoiConfig::default());
        pool.add("Only", Vec3::ZERO, 1, 2, false).unwrap();
        let mut rng = SplitMix64::new(3);
        let placement = pool.select(&mut rng).unwrap();
        assert_eq!(placement.poi, "Only");
        assert!(pool.release("Only"));
        assert!(!pool.release("Only"));
        assert!(!pool.release("Missing"));
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let mut pool = PoiPool::new(PoiConfig::default());
        assert_eq!(pool.select(&mut SplitMix64::new(1)), None);
    }
}
