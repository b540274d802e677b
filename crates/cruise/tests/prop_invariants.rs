//! Property-based tests (proptest) for the trace invariants.

use cruise::{simulate, IntegratorKind, SetpointSchedule, SimulationConfig, SlopeSchedule};
use proptest::prelude::*;
use simcore::RungeKutta4;

fn schedule_strategy(max_tick: usize, lo: f64, hi: f64) -> impl Strategy<Value = Vec<(usize, f64)>> {
    prop::collection::vec((0..max_tick, lo..hi), 0..6)
}

fn fast(config: SimulationConfig) -> SimulationConfig {
    config.with_integrator(IntegratorKind::Rk4(RungeKutta4::new(8)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every series has floor(tf) + 1 samples, commands are saturated and speed is non-negative.
    #[test]
    fn trace_invariants_hold(
        tf in -10.0f64..150.0,
        load in -100.0f64..1500.0,
        v0 in -5.0f64..40.0,
        ubias in -200.0f64..200.0,
        kc in 0.0f64..20.0,
        tau_i in 0.5f64..100.0,
        set_points in schedule_strategy(200, 0.0, 40.0),
        slopes in schedule_strategy(200, 0.0, 30.0),
    ) {
        let config = fast(
            SimulationConfig::default()
                .with_horizon(tf)
                .with_load(load)
                .with_initial_speed(v0)
                .with_bias(ubias)
                .with_gains(kc, tau_i),
        );
        let set_points: SetpointSchedule = set_points.into_iter().collect();
        let slopes: SlopeSchedule = slopes.into_iter().collect();

        let trace = simulate(&config, Some(&set_points), Some(&slopes)).unwrap();
        let n = tf.max(1.0).floor() as usize + 1;

        prop_assert_eq!(trace.len(), n);
        prop_assert!(trace.is_aligned());
        prop_assert!(trace.step.iter().all(|&u| (-50.0..=100.0).contains(&u)));
        prop_assert!(trace.v.iter().all(|&v| v >= 0.0));
        prop_assert_eq!(trace.error[0], 0.0);
        prop_assert_eq!(trace.integral[0], 0.0);
    }

    /// Out-of-range horizon, load and initial speed behave like their coerced values.
    #[test]
    fn coercion_is_transparent(
        tf in -50.0f64..1.0,
        load in -500.0f64..0.0,
        v0 in -20.0f64..0.0,
        setpoint in 0.0f64..30.0,
    ) {
        let set_points = SetpointSchedule::new().with_setpoint(0, setpoint);
        let base = fast(SimulationConfig::default().with_gains(0.8, 50.0));

        let given = base.clone().with_horizon(tf).with_load(load).with_initial_speed(v0);
        let coerced = base.with_horizon(1.0).with_load(0.0).with_initial_speed(0.0);

        prop_assert_eq!(
            simulate(&given, Some(&set_points), None).unwrap(),
            simulate(&coerced, Some(&set_points), None).unwrap()
        );
    }

    /// A single breakpoint yields a constant slope series.
    #[test]
    fn single_slope_breakpoint_is_constant(angle in -45.0f64..45.0, tf in 1.0f64..80.0) {
        let slopes = SlopeSchedule::new().with_angle(0, angle);
        let trace = simulate(&fast(SimulationConfig::default().with_horizon(tf)), None, Some(&slopes)).unwrap();
        prop_assert!(trace.slope.iter().all(|&a| a == angle));
    }
}
