//! Integration tests for bs-sim.

use bs_core::{InitialConditions, ModelParams};

use crate::{Model, ModelBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Five stops 1 km apart, 4 buses, constant 10 m/s traffic and no boarding
/// demand, so bus motion is fully deterministic.
fn quiet_params() -> ModelParams {
    ModelParams {
        dt:               10.0,
        stop_count:       5,
        stop_spacing:     1_000.0,
        end_time:         1_200.0,
        headway:          300.0,
        board_time:       3.0,
        alight_time:      1.0,
        stopping_time:    3.0,
        bus_acceleration: 3.0,
        increase_rate:    0.0,
        min_demand:       0.0,
        max_demand:       0.0,
        ..ModelParams::default()
    }
}

fn quiet_initial(departure_rate: f64) -> InitialConditions {
    InitialConditions::uniform(5, 10.0, 0.0, departure_rate)
}

/// Same corridor with heavy boarding demand (30–60 passengers per minute).
fn busy_params() -> ModelParams {
    ModelParams {
        increase_rate: 10.0,
        min_demand:    30.0,
        max_demand:    60.0,
        ..quiet_params()
    }
}

fn busy_initial() -> InitialConditions {
    InitialConditions::uniform(5, 10.0, 0.5, 0.3)
}

fn build(params: ModelParams, initial: InitialConditions, seed: u64) -> Model {
    ModelBuilder::new(params, initial).seed(seed).build().unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── ModelBuilder validation ───────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use bs_agent::BusStatus;
    use bs_core::{BsError, SimConfig};

    use super::*;
    use crate::SimError;

    #[test]
    fn builds_reference_layout() {
        let model = build(quiet_params(), quiet_initial(0.2), 1);
        assert_eq!(model.buses.len(), 4);
        assert_eq!(model.corridor.len(), 5);
        assert_eq!(model.geofence(), 105.0);
        assert_eq!(model.ticks_simulated(), 0);
        assert!(model.buses.iter().all(|b| b.status == BusStatus::Inactive));
        assert!(model.buses.iter().all(|b| b.position == -100.0));
    }

    #[test]
    fn bus_lookup() {
        let model = build(quiet_params(), quiet_initial(0.2), 1);
        assert_eq!(model.bus(bs_core::BusId(3)).unwrap().dispatch_time, 900.0);
        let err = model.bus(bs_core::BusId(4)).unwrap_err();
        assert!(matches!(err, SimError::Core(BsError::BusNotFound(_))));
        assert_eq!(err.to_string(), "bus BusId(4) not found");
    }

    #[test]
    fn history_buffers_reserved_for_horizon() {
        let model = build(quiet_params(), quiet_initial(0.2), 1);
        let horizon = model.params.total_ticks() as usize;
        assert_eq!(horizon, 120);
        for bus in &model.buses {
            assert!(bus.trajectory.capacity() >= horizon);
            assert!(bus.ground_truth.capacity() >= horizon);
        }
    }

    #[test]
    fn config_and_seed_compose() {
        let model = ModelBuilder::new(quiet_params(), quiet_initial(0.2))
            .config(SimConfig { seed: 5, output_interval_ticks: 3 })
            .seed(9)
            .build()
            .unwrap();
        assert_eq!(model.config.seed, 9);
        assert_eq!(model.config.output_interval_ticks, 3);
    }

    #[test]
    fn invalid_params_rejected() {
        let params = ModelParams { dt: 0.0, ..quiet_params() };
        let err = ModelBuilder::new(params, quiet_initial(0.2)).build().err();
        assert!(matches!(err, Some(SimError::Core(BsError::Config(_)))));

        let params = ModelParams { min_demand: 2.0, max_demand: 1.0, ..quiet_params() };
        assert!(ModelBuilder::new(params, quiet_initial(0.2)).build().is_err());
    }

    #[test]
    fn mismatched_rate_vectors_rejected() {
        let initial = InitialConditions::uniform(4, 10.0, 0.0, 0.2);
        assert!(ModelBuilder::new(quiet_params(), initial).build().is_err());
    }

    #[test]
    fn non_positive_speed_rejected() {
        let initial = InitialConditions::uniform(5, 0.0, 0.0, 0.2);
        assert!(ModelBuilder::new(quiet_params(), initial).build().is_err());
    }
}

// ── Environment ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod environment_tests {
    use bs_core::SimRng;

    use super::*;
    use crate::Environment;

    fn trending() -> (ModelParams, InitialConditions) {
        let params = ModelParams {
            increase_rate: 10.0,
            end_time:      1_000.0,
            min_demand:    0.6,
            max_demand:    1.2,
            ..ModelParams::default()
        };
        (params, InitialConditions::uniform(20, 14.0, 0.01, 0.2))
    }

    #[test]
    fn trend_scales_speed_and_demand() {
        let (params, initial) = trending();
        let mut env = Environment::new(&params, &initial);
        let mut rng = SimRng::new(3);

        // Horizon is (100 / 10) * 1000 = 10 000 s.
        assert!(approx(env.trend_factor(5_000.0), 0.5));
        env.update(5_000.0, &mut rng);
        assert!(approx(env.traffic_speed, 7.0));

        let (lo, hi) = env.demand_bounds(5_000.0);
        assert!(approx(lo, 0.015));
        assert!(approx(hi, 0.03));
        assert_eq!(env.arrival_rates.len(), 20);
        assert!(env.arrival_rates.iter().all(|&r| (lo..=hi).contains(&r)));
    }

    #[test]
    fn speed_never_negative() {
        let (params, initial) = trending();
        let mut env = Environment::new(&params, &initial);
        env.update(25_000.0, &mut SimRng::new(3));
        assert_eq!(env.traffic_speed, 0.0);
    }

    #[test]
    fn zero_increase_rate_disables_trend() {
        let (mut params, initial) = trending();
        params.increase_rate = 0.0;
        let mut env = Environment::new(&params, &initial);
        env.update(1e6, &mut SimRng::new(3));
        assert_eq!(env.trend_factor(1e6), 0.0);
        assert_eq!(env.traffic_speed, 14.0);
        let (lo, hi) = env.demand_bounds(1e6);
        assert!(approx(lo, 0.01));
        assert!(approx(hi, 0.02));
    }

    #[test]
    fn model_speed_follows_pre_advance_time() {
        let mut model = build(busy_params(), busy_initial(), 1);
        // Horizon is (100 / 10) * 1200 = 12 000 s; tick k updates at (k-1)*dt.
        for k in 1..=30_u64 {
            let summary = model.step();
            let f = (k - 1) as f64 * 10.0 / 12_000.0;
            assert!(approx(summary.traffic_speed, 10.0 * (1.0 - f)));
        }
    }
}

// ── Deterministic kinematics ──────────────────────────────────────────────────

#[cfg(test)]
mod kinematics_tests {
    use bs_agent::BusStatus;
    use bs_core::{StopId, Tick};

    use super::*;

    #[test]
    fn first_ticks_of_bus_zero() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        for _ in 0..3 {
            model.step();
        }
        let bus = &model.buses[0];
        // Dispatch and move in the same tick: two acceleration steps.
        let expected = [(-40.0, 6.0), (50.0, 9.0), (150.0, 10.0)];
        for (g, (pos, vel)) in bus.ground_truth.iter().zip(expected) {
            assert_eq!(g.status, BusStatus::Moving);
            assert!(approx(g.position, pos), "{} != {pos}", g.position);
            assert!(approx(g.velocity, vel));
        }
        assert_eq!(model.corridor.stops()[0].arrival_times, vec![10.0]);
        assert_eq!(bus.last_visited_stop, Some(StopId(0)));
    }

    #[test]
    fn dispatch_is_staggered_by_headway() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        model.run(&mut crate::NoopObserver);
        // Bus i (i ≥ 1) is dispatched on the tick where clock = 300i - 10.
        for (i, bus) in model.buses.iter().enumerate().skip(1) {
            let dispatch_tick = 30 * i - 1;
            assert_eq!(bus.ground_truth[dispatch_tick - 2].status, BusStatus::Inactive);
            assert_eq!(bus.ground_truth[dispatch_tick - 1].status, BusStatus::Moving);
        }
    }

    #[test]
    fn headways_recorded_per_stop() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        model.run(&mut crate::NoopObserver);
        let stops = model.corridor.stops();
        assert_eq!(stops[0].arrival_times, vec![10.0, 290.0, 590.0, 890.0]);
        assert_eq!(stops[0].headways, vec![280.0, 300.0, 300.0]);
        assert_eq!(stops[1].arrival_times, vec![110.0, 390.0, 690.0, 990.0]);
        assert_eq!(stops[1].headways, vec![280.0, 300.0, 300.0]);
        assert_eq!(model.stop_headways()[1], stops[1].headways);
    }

    /// Speed cap of every tick, in tick order.
    #[derive(Default)]
    struct SpeedLog(Vec<f64>);

    impl crate::ModelObserver for SpeedLog {
        fn on_tick_end(&mut self, summary: &crate::TickSummary) {
            self.0.push(summary.traffic_speed);
        }
    }

    #[test]
    fn zero_demand_motion_under_decaying_speed() {
        let params = ModelParams { increase_rate: 50.0, ..quiet_params() };
        let dv = params.bus_acceleration;
        let dt = params.dt;
        let mut model = build(params, quiet_initial(0.0), 1);
        let mut speeds = SpeedLog::default();
        model.run(&mut speeds);

        assert_eq!(speeds.0.len(), 120);
        assert!(speeds.0.windows(2).all(|w| w[1] < w[0]));
        assert!(speeds.0[119] < 6.0);

        let mut checked = 0;
        for bus in &model.buses {
            assert!(bus.ground_truth.iter().all(|g| g.status != BusStatus::Dwelling));
            for (t, pair) in bus.ground_truth.windows(2).enumerate() {
                if pair[0].status != BusStatus::Moving || pair[1].status != BusStatus::Moving {
                    continue;
                }
                let v = speeds.0[t + 1].min(pair[0].velocity + dv);
                assert!(approx(pair[1].velocity, v), "bus {} tick {}", bus.id, t + 2);
                assert!(approx(pair[1].position - pair[0].position, v * dt));
                assert!(pair[1].position > pair[0].position);
                checked += 1;
            }
        }
        assert!(checked > 100, "only {checked} moving increments");
    }

    #[test]
    fn bus_finishes_past_corridor_end() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        model.run(&mut crate::NoopObserver);
        let bus = &model.buses[0];
        // 150 m at tick 3 plus 100 m per tick: first beyond 5000 m at tick 52.
        assert_eq!(bus.ground_truth[50].status, BusStatus::Moving);
        assert_eq!(bus.ground_truth[51].status, BusStatus::Finished);
        assert!(approx(bus.ground_truth[51].position, 5_050.0));
        for g in &bus.ground_truth[51..] {
            assert_eq!(g.status, BusStatus::Finished);
            assert_eq!(g.velocity, 0.0);
            assert!(approx(g.position, 5_050.0));
        }
        assert_eq!(model.clock.current_tick, Tick(120));
    }

    #[test]
    fn alighting_dwell_then_leave() {
        let mut model = build(quiet_params(), quiet_initial(0.5), 1);
        model.buses[0].occupancy = 40;

        let mut summaries = Vec::new();
        for _ in 0..24 {
            summaries.push(model.step());
        }
        let gt = &model.buses[0].ground_truth;

        // Reaches stop 2 (2000 m) at tick 21: 20 alight, dwell 20 * 1 + 3 s.
        assert_eq!(summaries[20].alightings, 20);
        assert_eq!(gt[20].status, BusStatus::Dwelling);
        assert_eq!(gt[20].velocity, 0.0);
        assert_eq!(gt[20].occupancy, 20);
        assert!(approx(gt[20].position, 1_950.0));
        assert_eq!(model.buses[0].last_visited_stop, Some(StopId(2)));

        assert_eq!(gt[21].status, BusStatus::Dwelling);

        // Leaves once clock >= 233 - dt, with one acceleration step.
        assert_eq!(gt[22].status, BusStatus::Moving);
        assert!(approx(gt[22].velocity, 3.0));
        assert!(approx(gt[22].position, 1_950.0));

        assert!(approx(gt[23].position, 2_010.0));
        assert_eq!(gt[23].status, BusStatus::Moving);
        assert!(model.buses[0].leave_stop_time.is_none());
    }

    #[test]
    fn short_dwell_ends_in_same_tick() {
        let mut model = build(quiet_params(), quiet_initial(0.5), 1);
        model.buses[0].occupancy = 10;
        for _ in 0..21 {
            model.step();
        }
        // 5 alight, dwell 8 s < dt: arrive, dwell and leave within tick 21.
        let g = model.buses[0].ground_truth[20];
        assert_eq!(g.status, BusStatus::Moving);
        assert_eq!(g.occupancy, 5);
        assert!(approx(g.velocity, 3.0));
    }

    #[test]
    fn terminal_empties_the_bus() {
        let mut model = build(quiet_params(), quiet_initial(0.5), 1);
        model.buses[0].occupancy = 40;
        model.run(&mut crate::NoopObserver);
        let bus = &model.buses[0];
        assert_eq!(bus.status, BusStatus::Finished);
        assert_eq!(bus.occupancy, 0);
    }

    #[test]
    fn empty_fleet_runs() {
        let params = ModelParams { end_time: 200.0, ..quiet_params() };
        let mut model = build(params, quiet_initial(0.2), 1);
        assert!(model.buses.is_empty());
        model.run(&mut crate::NoopObserver);
        assert_eq!(model.ticks_simulated(), 20);
        assert!(model.gps_matrix().is_empty());
    }

    #[test]
    fn single_stop_corridor() {
        let params = ModelParams { stop_count: 1, ..quiet_params() };
        let initial = InitialConditions::uniform(1, 10.0, 0.0, 0.4);
        let mut model = build(params, initial, 1);
        model.run(&mut crate::NoopObserver);
        assert_eq!(model.corridor.stops()[0].departure_rate, 1.0);
        assert!(model.buses.iter().all(|b| b.status == BusStatus::Finished));
    }
}

// ── Stochastic invariants ─────────────────────────────────────────────────────

#[cfg(test)]
mod invariant_tests {
    use bs_agent::BusStatus;

    use super::*;
    use crate::{ModelObserver, NoopObserver, Snapshot, TickSummary};

    #[test]
    fn occupancy_within_capacity() {
        let params = ModelParams { bus_capacity: 5, ..busy_params() };
        let mut model = build(params, busy_initial(), 11);
        model.run(&mut NoopObserver);
        let max = model
            .buses
            .iter()
            .flat_map(|b| &b.ground_truth)
            .map(|g| g.occupancy)
            .max()
            .unwrap();
        assert!(max <= 5);
        // Demand this heavy fills the bus at least once.
        assert_eq!(max, 5);
    }

    #[test]
    fn history_lengths_match_ticks() {
        let mut model = build(busy_params(), busy_initial(), 2);
        model.run(&mut NoopObserver);
        assert_eq!(model.ticks_simulated(), 120);
        assert!(model.clock.now_secs() >= model.params.end_time);
        for bus in &model.buses {
            assert_eq!(bus.trajectory.len(), 120);
            assert_eq!(bus.ground_truth.len(), 120);
        }
    }

    #[test]
    fn status_only_moves_forward() {
        fn rank(s: BusStatus) -> u8 {
            match s {
                BusStatus::Inactive => 0,
                BusStatus::Moving | BusStatus::Dwelling => 1,
                BusStatus::Finished => 2,
            }
        }
        let mut model = build(busy_params(), busy_initial(), 3);
        model.run(&mut NoopObserver);
        for bus in &model.buses {
            for pair in bus.ground_truth.windows(2) {
                assert!(rank(pair[0].status) <= rank(pair[1].status));
            }
        }
    }

    #[test]
    fn dwelling_bus_is_stationary() {
        let mut model = build(busy_params(), busy_initial(), 4);
        model.run(&mut NoopObserver);
        let mut dwelled = false;
        for bus in &model.buses {
            for pair in bus.ground_truth.windows(2) {
                if pair[1].status == BusStatus::Dwelling {
                    dwelled = true;
                    assert_eq!(pair[1].velocity, 0.0);
                    if pair[0].status == BusStatus::Dwelling {
                        assert_eq!(pair[0].position, pair[1].position);
                    }
                }
            }
        }
        assert!(dwelled);
    }

    #[derive(Default)]
    struct Recorder {
        starts:         Vec<u64>,
        times:          Vec<f64>,
        snapshots:      usize,
        ended:          usize,
        boundary_ok:    bool,
        boundary_fails: usize,
    }

    impl ModelObserver for Recorder {
        fn on_tick_start(&mut self, tick: bs_core::Tick) {
            self.starts.push(tick.0);
        }

        fn on_tick_end(&mut self, summary: &TickSummary) {
            self.times.push(summary.time_secs);
            assert_eq!(
                summary.inactive + summary.on_road() + summary.finished,
                4,
            );
        }

        fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
            self.snapshots += 1;
            let stops = snapshot.corridor.stops();
            let last = stops.len() - 1;
            let ok = stops[0].arrival_rate == 0.0
                && stops[last].arrival_rate == 0.0
                && stops[0].departure_rate == 0.0
                && stops[1].departure_rate == 0.0
                && stops[last].departure_rate == 1.0;
            self.boundary_ok = ok;
            if !ok {
                self.boundary_fails += 1;
            }
        }

        fn on_sim_end(&mut self, _final_state: &Snapshot<'_>) {
            self.ended += 1;
        }
    }

    #[test]
    fn observer_hooks_and_clock() {
        let model = ModelBuilder::new(busy_params(), busy_initial()).seed(5).output_interval(6);
        let mut model = model.build().unwrap();
        let mut rec = Recorder::default();
        model.run(&mut rec);

        assert_eq!(rec.starts, (1..=120).collect::<Vec<u64>>());
        for (k, &t) in rec.times.iter().enumerate() {
            assert_eq!(t, (k + 1) as f64 * 10.0);
        }
        assert_eq!(rec.snapshots, 20);
        assert_eq!(rec.ended, 1);
        assert!(rec.boundary_ok);
        assert_eq!(rec.boundary_fails, 0);
    }

    #[test]
    fn run_ticks_ignores_horizon() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        let mut rec = Recorder::default();
        model.run_ticks(5, &mut rec);
        model.run_ticks(3, &mut rec);
        assert_eq!(model.ticks_simulated(), 8);
        assert_eq!(rec.ended, 0);
        model.run_ticks(200, &mut NoopObserver);
        assert_eq!(model.ticks_simulated(), 208);
        assert!(model.is_done());
    }

    #[test]
    fn inactive_stop_skips_first_visit_demand() {
        let mut model = build(busy_params(), busy_initial(), 6);
        // Drop bus 0 onto stop 1 at t = 0; the stop only activates at
        // trunc(1000 / 10) - 60 = 40 s.
        let mut state = model.state_vector();
        state[0] = 1.0;
        state[1] = 1_000.0;
        model.restore_state(&state).unwrap();

        let summary = model.step();
        assert_eq!(summary.stop_visits, 1);
        assert_eq!(summary.boardings, 0);
        assert_eq!(model.buses[0].occupancy, 0);
        assert_eq!(model.buses[0].status, BusStatus::Moving);
        assert_eq!(model.corridor.stops()[1].arrival_times, vec![10.0]);
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = build(busy_params(), busy_initial(), 77);
        let mut b = build(busy_params(), busy_initial(), 77);
        a.run(&mut NoopObserver);
        b.run(&mut NoopObserver);
        assert_eq!(a.ground_truth_matrix(), b.ground_truth_matrix());
        assert_eq!(a.stop_arrivals(), b.stop_arrivals());

        let mut c = build(busy_params(), busy_initial(), 78);
        c.run(&mut NoopObserver);
        assert_ne!(a.ground_truth_matrix(), c.ground_truth_matrix());
    }
}

// ── State vectors ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod state_tests {
    use bs_agent::BusStatus;

    use super::*;
    use crate::{NoopObserver, SimError};

    #[test]
    fn layout_and_lengths() {
        let mut model = build(busy_params(), busy_initial(), 1);
        model.run_ticks(40, &mut NoopObserver);
        // 4 buses * 4 + 5 stops * 2 + 1.
        assert_eq!(model.state_len(), 27);
        let state = model.state_vector();
        assert_eq!(state.len(), 27);
        assert_eq!(model.measurement_vector(), state[..16].to_vec());

        let bus = &model.buses[1];
        assert_eq!(state[4], f64::from(bus.status.code()));
        assert_eq!(state[5], bus.position);
        assert_eq!(state[6], bus.velocity);
        assert_eq!(state[7], f64::from(bus.occupancy));
        assert_eq!(state[16], model.corridor.stops()[0].arrival_rate);
        assert_eq!(state[19], model.corridor.stops()[1].departure_rate);
        assert_eq!(state[26], model.environment.traffic_speed);
    }

    #[test]
    fn restore_round_trips() {
        let mut source = build(busy_params(), busy_initial(), 1);
        source.run_ticks(40, &mut NoopObserver);
        let state = source.state_vector();

        let mut target = build(busy_params(), busy_initial(), 2);
        target.restore_state(&state).unwrap();
        assert_eq!(target.state_vector(), state);
    }

    #[test]
    fn restore_truncates_and_clamps() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        let mut state = model.state_vector();
        state[0] = 1.9; // Moving
        state[3] = 7.8;
        state[7] = -3.0;
        state[11] = 1e6;
        model.restore_state(&state).unwrap();
        assert_eq!(model.buses[0].status, BusStatus::Moving);
        assert_eq!(model.buses[0].occupancy, 7);
        assert_eq!(model.buses[1].occupancy, 0);
        assert_eq!(model.buses[2].occupancy, 100);
    }

    #[test]
    fn restore_reapplies_boundary_rules() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        let mut state = model.state_vector();
        let stops = 16;
        state[stops] = 0.4; // arrival at first stop
        state[stops + 1] = 0.4; // departure at first stop
        state[stops + 4] = 0.05; // arrival at stop 2
        state[stops + 9] = 0.1; // departure at terminal
        model.restore_state(&state).unwrap();
        let s = model.corridor.stops();
        assert_eq!(s[0].arrival_rate, 0.0);
        assert_eq!(s[0].departure_rate, 0.0);
        assert_eq!(s[2].arrival_rate, 0.05);
        assert_eq!(s[4].departure_rate, 1.0);
        assert_eq!(model.environment.arrival_rates[2], 0.05);
    }

    #[test]
    fn wrong_length_rejected() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        let before = model.state_vector();
        let err = model.restore_state(&before[1..]).unwrap_err();
        assert!(matches!(err, SimError::StateLength { expected: 27, got: 26 }));
        assert_eq!(model.state_vector(), before);
    }

    #[test]
    fn invalid_status_rejected_without_side_effects() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        let before = model.state_vector();
        let mut state = before.clone();
        state[1] = 999.0;
        state[8] = 7.0;
        let err = model.restore_state(&state).unwrap_err();
        assert!(matches!(err, SimError::InvalidStatus { index: 8, .. }));
        assert_eq!(model.state_vector(), before);

        state[8] = f64::NAN;
        assert!(model.restore_state(&state).is_err());
    }

    #[test]
    fn restored_dwell_without_end_time_leaves_next_tick() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        model.run_ticks(5, &mut NoopObserver);
        let mut state = model.state_vector();
        state[0] = 2.0;
        model.restore_state(&state).unwrap();
        assert_eq!(model.buses[0].status, BusStatus::Dwelling);
        assert!(model.buses[0].leave_stop_time.is_none());

        model.step();
        assert_eq!(model.buses[0].status, BusStatus::Moving);
    }
}

// ── Matrix export ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod export_tests {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn gps_matrix_shape_and_clamp() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        model.run(&mut NoopObserver);
        let gps = model.gps_matrix();
        assert_eq!(gps.len(), 120);
        assert!(gps.iter().all(|row| row.len() == 4));
        // Bus 0 starts at -40 m; bus 1 waits at -100 m.
        assert_eq!(gps[0][0], 0.0);
        assert_eq!(gps[0][1], 0.0);
        assert!(approx(gps[2][0], 150.0));
        assert!(gps.iter().flatten().all(|&x| x >= 0.0));
    }

    #[test]
    fn ground_truth_matrix_shape() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        model.run_ticks(10, &mut NoopObserver);
        let gt = model.ground_truth_matrix();
        assert_eq!(gt.len(), 10);
        assert!(gt.iter().all(|row| row.len() == 16));
        // Bus 0, tick 2: moving at 50 m, 9 m/s, empty.
        assert_eq!(gt[1][0], 1.0);
        assert!(approx(gt[1][1], 50.0));
        assert!(approx(gt[1][2], 9.0));
        assert_eq!(gt[1][3], 0.0);
        // Bus 1 still inactive.
        assert_eq!(gt[1][4], 0.0);
    }

    #[test]
    fn stop_arrivals_per_stop() {
        let mut model = build(quiet_params(), quiet_initial(0.2), 1);
        model.run(&mut NoopObserver);
        let arrivals = model.stop_arrivals();
        assert_eq!(arrivals.len(), 5);
        assert_eq!(arrivals[0], vec![10.0, 290.0, 590.0, 890.0]);
    }
}

// ── Replications ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod replicate_tests {
    use super::*;
    use crate::replicate::summarize;
    use crate::{replicate, NoopObserver, SimError};

    #[test]
    fn summary_statistics() {
        let a = vec![vec![1.0, 3.0], vec![0.0, 2.0]];
        let b = vec![vec![3.0, 5.0], vec![0.0, 6.0]];
        let s = summarize(&[a, b]);
        assert_eq!(s.runs, 2);
        assert_eq!(s.mean, vec![vec![2.0, 4.0], vec![0.0, 4.0]]);
        assert_eq!(s.std, vec![vec![1.0, 1.0], vec![0.0, 2.0]]);
    }

    #[test]
    fn zero_runs_rejected() {
        let err = replicate(&quiet_params(), &quiet_initial(0.2), 0, 1).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn invalid_inputs_rejected() {
        let params = ModelParams { headway: -1.0, ..quiet_params() };
        assert!(replicate(&params, &quiet_initial(0.2), 3, 1).is_err());
    }

    #[test]
    fn deterministic_runs_have_zero_spread() {
        let s = replicate(&quiet_params(), &quiet_initial(0.2), 3, 1).unwrap();
        let mut single = build(quiet_params(), quiet_initial(0.2), 99);
        single.run(&mut NoopObserver);
        assert_eq!(s.runs, 3);
        assert_eq!(s.mean.len(), 120);
        for (row, expected) in s.mean.iter().zip(single.gps_matrix()) {
            for (&m, e) in row.iter().zip(expected) {
                assert!(approx(m, e));
            }
        }
        assert!(s.std.iter().flatten().all(|&x| x.abs() < 1e-6));
    }

    #[test]
    fn stochastic_runs_reproducible() {
        let a = replicate(&busy_params(), &busy_initial(), 4, 21).unwrap();
        let b = replicate(&busy_params(), &busy_initial(), 4, 21).unwrap();
        assert_eq!(a, b);
        assert!(a.std.iter().flatten().any(|&x| x > 0.0));
    }
}
