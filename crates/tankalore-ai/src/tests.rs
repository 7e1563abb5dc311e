#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use tankalore_core::constants::*;
    use tankalore_core::definitions::*;
    use tankalore_core::enums::*;
    use tankalore_core::events::{AiState, CombatEvent};
    use tankalore_core::types::CombatantId;

    use crate::boss::{evaluate_transition as boss_transition, Boss, BossContext, SpecialAttack};
    use crate::combatant::{Combatant, DamageOutcome};
    use crate::enemy::{evaluate_transition, Enemy, EnemyContext};
    use crate::profiles::{default_boss, default_roster, get_definition};
    use crate::sequences::{BurstSequence, PulseSequence};

    fn make_enemy(position: Vec2) -> Enemy {
        Enemy::new(
            CombatantId(1),
            Arc::new(CombatantDefinition::default()),
            position,
        )
    }

    fn make_boss(cooldown: f32, heavy: Option<HeavyAttack>) -> Boss {
        let def = BossDefinition {
            combatant: CombatantDefinition {
                name: "Test Boss".into(),
                max_health: 1000.0,
                fire_rate: 1.0,
                ..CombatantDefinition::default()
            },
            tuning: BossTuning {
                special_cooldown_secs: cooldown,
                heavy_attack: heavy,
                ..BossTuning::default()
            },
        };
        Boss::new(CombatantId(99), &def, Vec2::ZERO)
    }

    fn make_context(
        state: CombatantState,
        distance: f32,
        health_fraction: f32,
        elapsed: f32,
        def: &CombatantDefinition,
    ) -> EnemyContext<'_> {
        EnemyContext {
            state,
            distance_to_target: distance,
            health_fraction,
            elapsed_in_state_secs: elapsed,
            definition: def,
        }
    }

    /// Run one tick at tick index `tick` and return what it emitted.
    fn step(
        c: &mut impl Combatant,
        tick: u64,
        target: Option<Vec2>,
        rng: &mut ChaCha8Rng,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        c.update(DT, tick as f32 * DT, target, rng, &mut events);
        events
    }

    fn projectile_damages(events: &[CombatEvent]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::ProjectileSpawned { request, .. } => Some(request.damage),
                _ => None,
            })
            .collect()
    }

    fn count_deaths(events: &[CombatEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, CombatEvent::Died { .. }))
            .count()
    }

    // --- Transition table ---

    #[test]
    fn test_patrol_detects_target() {
        let def = CombatantDefinition::default();
        let ctx = make_context(CombatantState::Patrol, def.detection_range, 1.0, 0.0, &def);
        assert_eq!(evaluate_transition(&ctx), Some(CombatantState::Pursue));

        let ctx = make_context(CombatantState::Patrol, def.detection_range + 0.1, 1.0, 0.0, &def);
        assert_eq!(evaluate_transition(&ctx), None);
    }

    #[test]
    fn test_pursue_gives_up_beyond_aggro_range() {
        let def = CombatantDefinition::default();
        let ctx = make_context(CombatantState::Pursue, def.aggro_range + 0.5, 1.0, 0.0, &def);
        assert_eq!(evaluate_transition(&ctx), Some(CombatantState::Patrol));
    }

    #[test]
    fn test_pursue_to_attack_and_back() {
        let def = CombatantDefinition::default();
        let ctx = make_context(CombatantState::Pursue, def.attack_range, 1.0, 0.0, &def);
        assert_eq!(evaluate_transition(&ctx), Some(CombatantState::Attack));

        let ctx = make_context(CombatantState::Attack, def.attack_range + 0.01, 1.0, 0.0, &def);
        assert_eq!(evaluate_transition(&ctx), Some(CombatantState::Pursue));
    }

    #[test]
    fn test_attack_retreats_when_hurt() {
        let def = CombatantDefinition::default();
        let ctx = make_context(CombatantState::Attack, 2.0, 0.2, 0.0, &def);
        assert_eq!(evaluate_transition(&ctx), Some(CombatantState::Retreat));

        let ctx = make_context(CombatantState::Attack, 2.0, 0.21, 0.0, &def);
        assert_eq!(evaluate_transition(&ctx), None);
    }

    #[test]
    fn test_retreat_lasts_three_seconds() {
        let def = CombatantDefinition::default();
        let ctx = make_context(CombatantState::Retreat, 2.0, 0.1, 3.0, &def);
        assert_eq!(evaluate_transition(&ctx), None);
        let ctx = make_context(CombatantState::Retreat, 2.0, 0.1, 3.01, &def);
        assert_eq!(evaluate_transition(&ctx), Some(CombatantState::Pursue));
    }

    #[test]
    fn test_dead_is_terminal() {
        let def = CombatantDefinition::default();
        let ctx = make_context(CombatantState::Dead, 0.0, 0.0, 100.0, &def);
        assert_eq!(evaluate_transition(&ctx), None);
    }

    // --- Enemy runtime ---

    #[test]
    fn test_overkill_leaves_health_at_zero() {
        let mut enemy = make_enemy(Vec2::ZERO);
        let mut events = Vec::new();
        let outcome = enemy.take_damage(500.0, &mut events);
        assert_eq!(outcome, DamageOutcome::Killed);
        assert_eq!(enemy.core().current_health(), 0.0);
        assert_eq!(enemy.state(), CombatantState::Dead);
    }

    #[test]
    fn test_death_fires_exactly_once() {
        let mut enemy = make_enemy(Vec2::ZERO);
        let mut events = Vec::new();
        enemy.take_damage(50.0, &mut events);
        assert_eq!(enemy.take_damage(0.0, &mut events), DamageOutcome::Ignored);
        assert_eq!(enemy.take_damage(10.0, &mut events), DamageOutcome::Ignored);
        assert_eq!(count_deaths(&events), 1);

        let notice = events
            .iter()
            .find_map(|e| match e {
                CombatEvent::Died { notice } => Some(*notice),
                _ => None,
            })
            .unwrap();
        assert_eq!(notice.xp_reward, 10);
        assert_eq!(notice.currency_reward, 5);
        assert_eq!(notice.tier, SpawnTier::Regular);
    }

    #[test]
    fn test_dead_enemy_is_inert() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut enemy = make_enemy(Vec2::ZERO);
        let mut events = Vec::new();
        enemy.take_damage(1000.0, &mut events);
        let events = step(&mut enemy, 1, Some(Vec2::new(0.0, 2.0)), &mut rng);
        assert!(events.is_empty());
        assert_eq!(enemy.core().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_surviving_damage_in_patrol_aggroes() {
        let mut enemy = make_enemy(Vec2::ZERO);
        let mut events = Vec::new();
        assert_eq!(enemy.take_damage(5.0, &mut events), DamageOutcome::Survived);
        assert_eq!(enemy.state(), CombatantState::Pursue);
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::Flash {
                kind: FlashKind::Hit,
                on: true,
                ..
            }
        )));
    }

    #[test]
    fn test_hit_flash_switches_off() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut enemy = make_enemy(Vec2::ZERO);
        let mut events = Vec::new();
        enemy.take_damage(1.0, &mut events);
        let mut off = 0;
        for tick in 1..=12 {
            let events = step(&mut enemy, tick, Some(Vec2::new(50.0, 0.0)), &mut rng);
            off += events
                .iter()
                .filter(|e| matches!(e, CombatEvent::Flash { on: false, .. }))
                .count();
        }
        assert_eq!(off, 1, "hit flash should end within 0.1 s");
    }

    #[test]
    fn test_missing_target_suspends_behavior() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut enemy = make_enemy(Vec2::ZERO);
        for tick in 0..120 {
            let events = step(&mut enemy, tick, None, &mut rng);
            assert!(events.is_empty());
            assert_eq!(enemy.core().velocity, Vec2::ZERO);
        }
        assert_eq!(enemy.state(), CombatantState::Patrol);
        assert_eq!(enemy.core().state_timer, 0.0);
    }

    #[test]
    fn test_attack_fire_is_rate_limited() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut enemy = make_enemy(Vec2::ZERO);
        let target = Some(Vec2::new(0.0, 3.0));
        let mut shots = 0;
        // 4 seconds at 0.5 shots/s.
        for tick in 0..240 {
            shots += projectile_damages(&step(&mut enemy, tick, target, &mut rng)).len();
        }
        assert_eq!(enemy.state(), CombatantState::Attack);
        assert_eq!(shots, 2, "expected one shot every 2 s, got {shots}");
    }

    #[test]
    fn test_zero_fire_rate_never_fires() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let def = CombatantDefinition {
            fire_rate: 0.0,
            ..CombatantDefinition::default()
        };
        let mut enemy = Enemy::new(CombatantId(7), Arc::new(def), Vec2::ZERO);
        for tick in 0..300 {
            let events = step(&mut enemy, tick, Some(Vec2::new(0.0, 2.0)), &mut rng);
            assert!(projectile_damages(&events).is_empty());
        }
    }

    #[test]
    fn test_projectile_carries_definition_stats() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut enemy = make_enemy(Vec2::ZERO);
        let mut request = None;
        for tick in 0..10 {
            for e in step(&mut enemy, tick, Some(Vec2::new(0.0, 3.0)), &mut rng) {
                if let CombatEvent::ProjectileSpawned { request: r, .. } = e {
                    request = Some(r);
                }
            }
        }
        let request = request.expect("enemy in range should fire");
        let def = CombatantDefinition::default();
        assert_eq!(request.owner, OwnerTag::Enemy);
        assert_eq!(request.damage, def.damage);
        assert_eq!(request.speed, def.projectile_speed);
        assert_eq!(request.max_range, def.attack_range);
    }

    #[test]
    fn test_patrol_waypoints_stay_in_annulus() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let anchor = Vec2::new(4.0, -2.0);
        let mut enemy = make_enemy(anchor);
        let far = Some(Vec2::new(500.0, 500.0));
        for tick in 0..1200 {
            step(&mut enemy, tick, far, &mut rng);
            let d = enemy.patrol_waypoint().distance(anchor);
            if tick > 0 {
                assert!(
                    (PATROL_RADIUS_MIN - 1e-3..=PATROL_RADIUS_MAX + 1e-3).contains(&d),
                    "waypoint at distance {d}"
                );
            }
        }
        assert_eq!(enemy.state(), CombatantState::Patrol);
        assert!(enemy.core().velocity.length() > 0.0);
    }

    #[test]
    fn test_retreat_moves_away_from_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut enemy = make_enemy(Vec2::ZERO);
        let target = Some(Vec2::new(0.0, 3.0));
        step(&mut enemy, 0, target, &mut rng);
        step(&mut enemy, 1, target, &mut rng);
        step(&mut enemy, 2, target, &mut rng);
        assert_eq!(enemy.state(), CombatantState::Attack);

        let mut events = Vec::new();
        enemy.take_damage(41.0, &mut events);
        step(&mut enemy, 3, target, &mut rng);
        assert_eq!(enemy.state(), CombatantState::Retreat);
        assert!(enemy.core().velocity.y < 0.0);

        // Three seconds later it turns back.
        for tick in 4..200 {
            step(&mut enemy, tick, target, &mut rng);
        }
        assert!(matches!(
            enemy.state(),
            CombatantState::Pursue | CombatantState::Attack | CombatantState::Retreat
        ));
    }

    // --- Boss ---

    #[test]
    fn test_boss_transition_table() {
        let base = BossContext {
            state: BossState::Approach,
            distance_to_target: 9.0,
            elapsed_in_state_secs: 0.0,
            now: 0.0,
            next_special_time: 10.0,
            attack_range: 8.0,
            special_pending: false,
            prefer_circle: false,
        };
        assert_eq!(boss_transition(&base), Some(BossState::Attack));

        let far = BossContext {
            distance_to_target: 10.0,
            ..base
        };
        assert_eq!(boss_transition(&far), None);

        let idle = BossContext {
            state: BossState::Idle,
            elapsed_in_state_secs: 60.0,
            ..base
        };
        assert_eq!(boss_transition(&idle), None);

        let special = BossContext {
            state: BossState::Attack,
            now: 10.0,
            ..base
        };
        assert_eq!(boss_transition(&special), Some(BossState::SpecialAttack));

        let pending = BossContext {
            state: BossState::Attack,
            now: 10.0,
            special_pending: true,
            ..base
        };
        assert_eq!(boss_transition(&pending), None);

        let timeout = BossContext {
            state: BossState::Attack,
            elapsed_in_state_secs: 5.1,
            prefer_circle: true,
            ..base
        };
        assert_eq!(boss_transition(&timeout), Some(BossState::Circle));

        let wind_up = BossContext {
            state: BossState::SpecialAttack,
            elapsed_in_state_secs: 0.51,
            ..base
        };
        assert_eq!(boss_transition(&wind_up), Some(BossState::Retreat));

        let retreat = BossContext {
            state: BossState::Retreat,
            elapsed_in_state_secs: 3.01,
            ..base
        };
        assert_eq!(boss_transition(&retreat), Some(BossState::Circle));

        let circle = BossContext {
            state: BossState::Circle,
            elapsed_in_state_secs: 4.01,
            ..base
        };
        assert_eq!(boss_transition(&circle), Some(BossState::Approach));
    }

    #[test]
    fn test_boss_engages_on_first_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut boss = make_boss(10.0, None);
        assert_eq!(boss.state(), BossState::Idle);
        for tick in 0..30 {
            step(&mut boss, tick, None, &mut rng);
        }
        assert_eq!(boss.state(), BossState::Idle);

        step(&mut boss, 30, Some(Vec2::new(0.0, 40.0)), &mut rng);
        assert_eq!(boss.state(), BossState::Approach);
        assert!((boss.next_special_time() - (30.0 * DT + 10.0)).abs() < 1e-4);
        assert!(boss.core().velocity.y > 0.0);
    }

    #[test]
    fn test_boss_spread_special_after_wind_up() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut boss = make_boss(1.0, None);
        let target = Some(Vec2::new(0.0, 5.0));
        let mut in_wind_up = false;
        let mut spread_shots = 0;
        for tick in 0..150 {
            let events = step(&mut boss, tick, target, &mut rng);
            let damages = projectile_damages(&events);
            if in_wind_up && boss.state() == BossState::SpecialAttack {
                assert!(damages.is_empty(), "no regular fire during wind-up");
            }
            if boss.state() == BossState::Retreat && in_wind_up {
                spread_shots = damages.iter().filter(|d| (**d - 12.0).abs() < 1e-3).count();
                in_wind_up = false;
            }
            if boss.state() == BossState::SpecialAttack {
                in_wind_up = true;
            }
        }
        assert_eq!(spread_shots, BOSS_SPREAD_COUNT as usize);
        assert!(boss.next_special_time() > 2.0);
    }

    #[test]
    fn test_boss_phase_never_regresses() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut boss = make_boss(10.0, None);
        let target = Some(Vec2::new(0.0, 50.0));
        let mut events = Vec::new();
        boss.take_damage(500.0, &mut events);
        let events = step(&mut boss, 0, target, &mut rng);
        assert_eq!(boss.current_phase(), 2);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::PhaseChanged { phase: 2, .. })));

        boss.core_mut().heal(1000.0);
        assert_eq!(boss.health_fraction(), 1.0);
        for tick in 1..60 {
            step(&mut boss, tick, target, &mut rng);
        }
        assert_eq!(boss.current_phase(), 2);
        assert!((boss.current_damage() - 15.0 * 1.2).abs() < 1e-4);
        assert!((boss.current_fire_rate() - 1.3).abs() < 1e-4);
        assert!((boss.current_move_speed() - 3.0 * 1.1).abs() < 1e-4);
    }

    #[test]
    fn test_boss_jumps_straight_to_final_phase() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut boss = make_boss(10.0, None);
        let mut events = Vec::new();
        boss.take_damage(900.0, &mut events);
        let events = step(&mut boss, 0, Some(Vec2::new(0.0, 50.0)), &mut rng);
        let phase_events: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::PhaseChanged { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(phase_events, vec![3]);
        assert_eq!(SpecialAttack::for_phase(boss.current_phase()), SpecialAttack::HeavyStrike);
    }

    #[test]
    fn test_phase_flash_pulses_six_times() {
        let mut rng = ChaCha8Rng::seed_from_u64(14);
        let mut boss = make_boss(100.0, None);
        let mut events = Vec::new();
        boss.take_damage(400.0, &mut events);
        let (mut on, mut off) = (0, 0);
        for tick in 0..120 {
            for e in step(&mut boss, tick, Some(Vec2::new(0.0, 50.0)), &mut rng) {
                if let CombatEvent::Flash {
                    kind: FlashKind::PhaseShift,
                    on: lit,
                    ..
                } = e
                {
                    if lit {
                        on += 1;
                    } else {
                        off += 1;
                    }
                }
            }
        }
        assert_eq!((on, off), (6, 6));
        assert!(!boss.phase_flash_active());
    }

    #[test]
    fn test_boss_burst_fires_ten_volleys() {
        let mut rng = ChaCha8Rng::seed_from_u64(15);
        let mut boss = make_boss(1.0, None);
        let mut events = Vec::new();
        boss.take_damage(500.0, &mut events);
        let target = Some(Vec2::new(0.0, 5.0));
        let mut special_at = None;
        let mut burst_projectiles = 0;
        for tick in 0..240 {
            let events = step(&mut boss, tick, target, &mut rng);
            let left_wind_up = events.iter().any(|e| {
                matches!(
                    e,
                    CombatEvent::StateChanged {
                        from: AiState::Boss(BossState::SpecialAttack),
                        ..
                    }
                )
            });
            if left_wind_up {
                special_at = Some(tick);
            }
            if let Some(start) = special_at {
                if tick - start < 90 {
                    burst_projectiles += projectile_damages(&events).len();
                }
            }
        }
        assert!(special_at.is_some());
        // Ten volleys from two fire points.
        assert_eq!(burst_projectiles, 20);
        assert!(!boss.burst_in_progress());
    }

    #[test]
    fn test_boss_heavy_strike_and_fallback() {
        let heavy = HeavyAttack {
            damage_factor: 2.0,
            radius: 3.0,
        };
        for (config, expect_strike) in [(Some(heavy), true), (None, false)] {
            let mut rng = ChaCha8Rng::seed_from_u64(16);
            let mut boss = make_boss(1.0, config);
            let mut events = Vec::new();
            boss.take_damage(800.0, &mut events);
            let target = Vec2::new(0.0, 5.0);
            let mut strikes = Vec::new();
            let mut spread = 0;
            for tick in 0..150 {
                let events = step(&mut boss, tick, Some(target), &mut rng);
                for e in &events {
                    match e {
                        CombatEvent::HeavyStrike { center, damage, .. } => {
                            strikes.push((*center, *damage))
                        }
                        CombatEvent::ProjectileSpawned { request, .. }
                            if (request.damage - 15.0 * 1.5 * 0.8).abs() < 1e-3 =>
                        {
                            spread += 1
                        }
                        _ => {}
                    }
                }
            }
            if expect_strike {
                assert_eq!(strikes.len(), 1);
                assert_eq!(strikes[0].0, target);
                assert!((strikes[0].1 - 15.0 * 1.5 * 2.0).abs() < 1e-3);
            } else {
                assert!(strikes.is_empty());
                assert_eq!(spread, BOSS_SPREAD_COUNT as usize);
            }
        }
    }

    #[test]
    fn test_boss_rewards_are_multiplied() {
        let mut boss = make_boss(10.0, None);
        let mut events = Vec::new();
        assert_eq!(boss.take_damage(5000.0, &mut events), DamageOutcome::Killed);
        boss.take_damage(1.0, &mut events);
        assert_eq!(count_deaths(&events), 1);
        let notice = events
            .iter()
            .find_map(|e| match e {
                CombatEvent::Died { notice } => Some(*notice),
                _ => None,
            })
            .unwrap();
        assert_eq!(notice.tier, SpawnTier::Boss);
        assert_eq!(notice.xp_reward, 10 * BOSS_XP_MULTIPLIER);
        assert_eq!(notice.currency_reward, 5 * BOSS_CURRENCY_MULTIPLIER);
        assert_eq!(boss.state(), BossState::Dead);
    }

    #[test]
    fn test_boss_losing_target_abandons_burst() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut boss = make_boss(1.0, None);
        let mut events = Vec::new();
        boss.take_damage(500.0, &mut events);
        let target = Some(Vec2::new(0.0, 5.0));
        let mut tick = 0;
        while !boss.burst_in_progress() && tick < 200 {
            step(&mut boss, tick, target, &mut rng);
            tick += 1;
        }
        assert!(boss.burst_in_progress());
        let events = step(&mut boss, tick, None, &mut rng);
        assert!(!boss.burst_in_progress());
        assert!(projectile_damages(&events).is_empty());
    }

    // --- Sequences and roster ---

    #[test]
    fn test_pulse_sequence_edges() {
        let mut pulse = PulseSequence::new(2, 0.1);
        let mut edges = Vec::new();
        pulse.advance(0.0, |on| edges.push(on));
        pulse.advance(0.25, |on| edges.push(on));
        pulse.advance(0.25, |on| edges.push(on));
        assert_eq!(edges, vec![true, false, true, false]);
        assert!(pulse.is_finished());
    }

    #[test]
    fn test_burst_sequence_spacing() {
        let mut burst = BurstSequence::new(3, 0.1, 1.0);
        assert_eq!(burst.take_due(1.0), 1);
        assert_eq!(burst.take_due(1.05), 0);
        assert_eq!(burst.take_due(1.25), 2);
        assert!(burst.is_finished());
        assert_eq!(burst.take_due(5.0), 0);
    }

    #[test]
    fn test_roster_definitions_are_sane() {
        for def in default_roster() {
            assert!(def.max_health > 0.0, "{} has no health", def.name);
            assert!(def.detection_range <= def.aggro_range, "{}", def.name);
            assert!(def.attack_range <= def.aggro_range, "{}", def.name);
        }
        assert_eq!(get_definition(CombatantKind::Fast).kind, CombatantKind::Fast);
        let boss = default_boss();
        assert!(boss.tuning.validate().is_ok());
        assert!(boss.tuning.heavy_attack.is_some());
    }
}
