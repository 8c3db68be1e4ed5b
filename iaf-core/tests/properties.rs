//! Property-based tests for the step kernel

use approx::assert_relative_eq;
use iaf_core::*;
use proptest::prelude::*;

fn params_strategy() -> impl Strategy<Value = NeuronParameters> {
    (
        -80.0f32..-55.0,
        -55.0f32..-40.0,
        -80.0f32..-55.0,
        1.0f32..50.0,
        0.1f32..20.0,
        0.1f32..20.0,
        10.0f32..500.0,
        0.0f32..5.0,
    )
        .prop_map(|(e_l, v_th, v_reset, tau_m, tau_ex, tau_in, c_m, t_ref)| NeuronParameters {
            leak_reversal: e_l,
            threshold: v_th,
            reset_potential: v_reset,
            tau_membrane: tau_m,
            tau_excitatory: tau_ex,
            tau_inhibitory: tau_in,
            membrane_capacitance: c_m,
            refractory_duration: t_ref,
        })
}

fn state_strategy() -> impl Strategy<Value = NeuronState> {
    (-90.0f32..-40.0, 0.0f32..1000.0, 0.0f32..1000.0, 0.0f32..5.0).prop_map(|(v, ex, inh, r)| {
        NeuronState {
            v,
            psc_excitatory: ex,
            psc_inhibitory: inh,
            refractory_remaining: r,
        }
    })
}

fn stim_strategy() -> impl Strategy<Value = Stimulation> {
    (-500.0f32..2000.0, 0.01f32..1.0).prop_map(|(i_e, dt)| Stimulation::new(i_e, dt))
}

proptest! {
    #[test]
    fn identical_inputs_give_identical_outputs(
        state in state_strategy(),
        params in params_strategy(),
        stim in stim_strategy(),
    ) {
        let a = step(state, &params, stim);
        let b = step(state, &params, stim);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn refractory_clamps_and_counts_down(
        state in state_strategy(),
        params in params_strategy(),
        stim in stim_strategy(),
        remaining in 0.001f32..5.0,
    ) {
        let state = NeuronState { refractory_remaining: remaining, ..state };
        let out = step(state, &params, stim);
        prop_assert!(!out.spiked);
        prop_assert_eq!(out.state.v, params.reset_potential);
        prop_assert_eq!(out.state.refractory_remaining, (remaining - stim.dt).max(0.0));
    }

    #[test]
    fn refractory_time_never_negative(
        state in state_strategy(),
        params in params_strategy(),
        stim in stim_strategy(),
    ) {
        let out = step(state, &params, stim);
        prop_assert!(out.state.refractory_remaining >= 0.0);
    }

    #[test]
    fn decay_ignores_refractory_state(
        state in state_strategy(),
        params in params_strategy(),
        stim in stim_strategy(),
    ) {
        let integrating = NeuronState { refractory_remaining: 0.0, ..state };
        let refractory = NeuronState { refractory_remaining: 1.0, ..state };
        let a = step(integrating, &params, stim);
        let b = step(refractory, &params, stim);
        prop_assert_eq!(a.state.psc_excitatory, b.state.psc_excitatory);
        prop_assert_eq!(a.state.psc_inhibitory, b.state.psc_inhibitory);
    }

    #[test]
    fn non_positive_tau_zeroes_the_trace(
        state in state_strategy(),
        params in params_strategy(),
        stim in stim_strategy(),
        tau in -10.0f32..=0.0,
        magnitude in -1.0e6f32..1.0e6,
    ) {
        let params = NeuronParameters { tau_excitatory: tau, ..params };
        let state = NeuronState { psc_excitatory: magnitude, ..state };
        prop_assert_eq!(step(state, &params, stim).state.psc_excitatory, 0.0);
    }

    #[test]
    fn threshold_crossing_matches_euler_update(
        state in state_strategy(),
        params in params_strategy(),
        stim in stim_strategy(),
    ) {
        let state = NeuronState { refractory_remaining: 0.0, ..state };
        let out = step(state, &params, stim);

        let ex = decay(state.psc_excitatory, stim.dt, params.tau_excitatory);
        let inh = decay(state.psc_inhibitory, stim.dt, params.tau_inhibitory);
        let euler = state.v
            + stim.dt * membrane_derivative(state.v, ex - inh, &params, stim.injected_current);

        if euler >= params.threshold {
            prop_assert!(out.spiked);
            prop_assert_eq!(out.state.v, params.reset_potential);
            prop_assert_eq!(out.state.refractory_remaining, params.refractory_duration);
        } else {
            prop_assert!(!out.spiked);
            prop_assert_eq!(out.state.v, euler);
            prop_assert_eq!(out.state.refractory_remaining, 0.0);
        }
    }
}

#[test]
fn traces_relax_towards_zero_over_many_steps() {
    let params = NeuronParameters::default();
    let mut state = NeuronState {
        psc_excitatory: 200.0,
        psc_inhibitory: 150.0,
        ..NeuronState::at_rest(&params)
    };
    let stim = Stimulation::default();
    // 20 ms is ten time constants at tau = 2 ms
    for _ in 0..200 {
        state = step(state, &params, stim).state;
    }
    assert_relative_eq!(state.psc_excitatory, 200.0 * (-10.0f32).exp(), max_relative = 1e-3);
    assert_relative_eq!(state.psc_inhibitory, 150.0 * (-10.0f32).exp(), max_relative = 1e-3);
}
