//! Health, mana and energy regeneration.
//!
//! Energy accrues on every full update and keeps its fractional remainder
//! between updates. Health and mana accrue in coarse steps whenever the regen
//! timer crosses [`RegenConfig::interval_ms`].

use crate::config::RegenConfig;
use crate::state::{Companion, PowerKind};

/// Per-call facts the regenerator cannot read off the companion itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegenContext {
    pub autonomous: bool,
    pub engaged: bool,
}

/// Amounts actually applied by one [`Regenerator::regenerate`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegenTick {
    pub energy: u32,
    pub health: u32,
    pub mana: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Regenerator {
    regen_timer_ms: u32,
    energy_fraction: f32,
}

impl Regenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regen_timer_ms(&self) -> u32 {
        self.regen_timer_ms
    }

    /// Fractional energy carried into the next update, in `[0, 1)`.
    pub fn energy_fraction(&self) -> f32 {
        self.energy_fraction
    }

    pub fn regenerate(
        &mut self,
        companion: &mut Companion,
        elapsed_ms: u32,
        ctx: RegenContext,
        config: &RegenConfig,
    ) -> RegenTick {
        let mut tick = RegenTick::default();
        self.regen_timer_ms = self.regen_timer_ms.saturating_add(elapsed_ms);

        if companion.power_type == PowerKind::Energy {
            tick.energy = self.regenerate_energy(companion, elapsed_ms, config);
        }

        if self.regen_timer_ms >= config.interval_ms {
            self.regen_timer_ms -= config.interval_ms;
            tick.health = regenerate_health(companion, ctx, config);
            tick.mana = regenerate_mana(companion, config);
        }
        tick
    }

    fn regenerate_energy(
        &mut self,
        companion: &mut Companion,
        elapsed_ms: u32,
        config: &RegenConfig,
    ) -> u32 {
        let meter = companion.power(PowerKind::Energy);
        if meter.current >= meter.maximum {
            return 0;
        }

        let mut add = config.energy_per_ms * elapsed_ms as f32 * config.energy_rate;
        for &(_, pct) in companion
            .regen_modifiers
            .power_regen_pct
            .iter()
            .filter(|(kind, _)| *kind == PowerKind::Energy)
        {
            add += add * pct as f32 / 100.0;
        }
        add += self.energy_fraction;
        if add == 0.0 {
            return 0;
        }

        let whole = add.abs() as u32;
        let mut value = meter.current.saturating_add(whole);
        if value > meter.maximum {
            value = meter.maximum;
            self.energy_fraction = 0.0;
        } else {
            self.energy_fraction = add - whole as f32;
        }

        if value == meter.maximum || self.regen_timer_ms >= config.interval_ms {
            companion.set_power(PowerKind::Energy, value);
        } else {
            companion.update_power_value(PowerKind::Energy, value);
        }
        value - meter.current
    }
}

fn regenerate_health(companion: &mut Companion, ctx: RegenContext, config: &RegenConfig) -> u32 {
    let mods = &companion.regen_modifiers;
    let health = companion.health;
    if ctx.engaged && !mods.polymorphed && mods.base_regen <= 0 && !mods.allows_combat_regen() {
        return 0;
    }
    if health.is_full() {
        return 0;
    }

    let mut add: i64 = if ctx.engaged {
        0
    } else if ctx.autonomous && companion.victim.is_none() {
        i64::from(health.maximum / 32)
    } else {
        5 + i64::from(companion.create_health / 256)
    };

    if mods.base_regen > 0 {
        add += i64::from((mods.base_regen / 5).max(1));
    }

    if mods.polymorphed {
        add += i64::from(health.maximum / 6);
    } else if !ctx.engaged {
        for &pct in &mods.health_regen_pct {
            add += add * i64::from(pct) / 100;
        }
        add += i64::from(mods.mod_regen) * i64::from(config.interval_ms) / 5000;
    } else if let Some(pct) = mods.regen_during_combat_pct {
        add = add * i64::from(pct) / 100;
    }

    add += i64::from(mods.health_regen_in_combat.unwrap_or(0));

    let add = u32::try_from(add.max(0)).unwrap_or(u32::MAX);
    companion.modify_health(add)
}

fn regenerate_mana(companion: &mut Companion, config: &RegenConfig) -> u32 {
    let meter = companion.power(PowerKind::Mana);
    if meter.maximum <= 1 || meter.current >= meter.maximum {
        return 0;
    }

    let rates = companion.mana_regen;
    let per_second = if rates.recently_spent {
        rates.interrupted_flat
    } else {
        rates.flat
    };
    let add = (per_second * config.mana_rate * config.interval_ms as f32 * 0.001).max(0.0);
    companion.modify_power(PowerKind::Mana, add as u32)
}
