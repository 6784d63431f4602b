//! Hostile encounters and lingering poison.

use rand_chacha::rand_core::Rng;
use tracing::debug;

use super::*;

impl Simulation {
    /// Fights the live hostile standing on `pos`, if any. `from` is the cell the agent left.
    pub(super) fn resolve_encounter(&mut self, from: Pos, pos: Pos) {
        let Some((id, strength, on_hit)) = self
            .level
            .live_hostile_at(pos)
            .map(|hostile| (hostile.id, hostile.strength, hostile.on_hit))
        else {
            return;
        };

        if let OnHit::Teleport { hits: 0 } = on_hit
            && let Some(to) = self.teleport_destination(from)
        {
            let hostile = &mut self.level.hostiles[id];
            hostile.pos = to;
            hostile.on_hit = OnHit::Teleport { hits: 1 };
            debug!(?id, ?to, "hostile teleported");
            self.log.push(LogEvent::HostileTeleported { hostile: id, to });
            return;
        }

        if self.agent.health - strength <= 0.0 {
            self.agent.health = 0.0;
            return;
        }
        self.agent.health -= strength;
        let hostile = &mut self.level.hostiles[id];
        hostile.defeated = true;
        if let OnHit::Teleport { hits } = &mut hostile.on_hit {
            *hits = hits.saturating_add(1);
        }
        self.log.push(LogEvent::HostileDefeated { hostile: id });

        if let OnHit::Poison { level } = on_hit {
            let cloud = PoisonCloud { source: id, center: pos, level };
            self.clouds.push(cloud);
            self.poison(cloud);
        }
    }

    /// Decays every cloud by one move and poisons the agent where they still reach.
    pub(super) fn settle_clouds(&mut self) {
        for cloud in &mut self.clouds {
            cloud.level -= POISON_DECAY_PER_MOVE;
        }
        self.clouds.retain(|cloud| cloud.level > 0.0);
        let clouds = self.clouds.clone();
        for cloud in clouds {
            self.poison(cloud);
        }
    }

    fn poison(&mut self, cloud: PoisonCloud) {
        if self.agent.health <= 0.0 || !cloud.covers(self.agent.pos) {
            return;
        }
        let damage = self.config.poison_damage;
        self.damage(damage);
        self.log.push(LogEvent::PoisonApplied { hostile: cloud.source, damage });
    }

    /// A random passable cell with nothing on it, drawn from the seeded stream.
    /// Neither the agent's cell nor the one it just left qualifies.
    fn teleport_destination(&mut self, from: Pos) -> Option<Pos> {
        let free: Vec<Pos> = self
            .level
            .grid
            .passable_cells()
            .filter(|&cell| {
                cell != self.agent.pos
                    && cell != from
                    && self.level.live_hostile_at(cell).is_none()
                    && self.level.recovery_at(cell).is_none()
                    && !self.level.is_exit(cell)
            })
            .collect();
        if free.is_empty() {
            return None;
        }
        let pick = self.rng.next_u64() as usize % free.len();
        Some(free[pick])
    }
}
