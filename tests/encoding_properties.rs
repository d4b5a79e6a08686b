//! Behavioral and property tests of the encoding pipeline.
//!
//! Run with: `cargo test --test encoding_properties`

use proptest::prelude::*;
use resin::coding::ThresholdLadder;
use resin::pattern::signal;
use resin::prelude::*;

fn spike_code(params: SpikeCodeParams) -> SpikeCode {
    SpikeCode::new(&params).unwrap()
}

fn real_filter(range: Interval, values: &[Real]) -> FeatureFilter {
    let mut filter = FeatureFilter::new(range, &FeatureFilterParams::default()).unwrap();
    for &v in values {
        filter.update(v).unwrap();
    }
    filter
}

// =============================================================================
// SCENARIOS
// =============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_top_value_fires_positive_half_only() {
        let mut code = spike_code(SpikeCodeParams {
            component_half_code_length: 4,
            signal_component: true,
            ..Default::default()
        });
        let bits = code.encode(1.0).to_vec();

        assert_eq!(bits.len(), 8);
        assert_eq!(bits[0], 1, "top threshold of the positive half");
        assert!(bits[4..].iter().all(|&b| b == 0), "negative half stays silent");
    }

    #[test]
    fn test_enum_category_out_of_range() {
        let params = FeatureFilterParams::Enum(EnumFilterParams { num_categories: 3 });
        let filter = FeatureFilter::new(Interval::SYMMETRIC_UNIT, &params).unwrap();
        let err = filter.apply(4.0).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn test_ten_point_pattern_with_two_slices() {
        let params = InputEncoderParams {
            feeding: FeedingParams::Patterned(PatternedFeedingParams {
                slices: 2,
                ..Default::default()
            }),
            fields: vec![FieldParams::external("x")],
            ..Default::default()
        };
        let pattern: Vec<Real> = (0..10).map(|t| (t as Real * 0.7).sin()).collect();

        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[pattern.clone()]).unwrap();
        encoder.store_new_data(&pattern).unwrap();

        let mut calls = 0;
        while encoder.encode_next_input_data(true).unwrap() {
            calls += 1;
        }
        assert_eq!(calls, 10);
    }

    #[test]
    fn test_second_reverse_mode_fails() {
        let params = InputEncoderParams {
            feeding: FeedingParams::Patterned(PatternedFeedingParams {
                bidir: true,
                ..Default::default()
            }),
            fields: vec![FieldParams::external("x")],
            ..Default::default()
        };
        let pattern = vec![0.0, 0.5, 1.0, 0.5];

        let mut encoder = InputEncoder::new(&params).unwrap();
        assert!(encoder.is_bidirectional());
        encoder.initialize(&[pattern.clone()]).unwrap();
        encoder.store_new_data(&pattern).unwrap();

        encoder.set_reverse_mode().unwrap();
        assert!(encoder.set_reverse_mode().unwrap_err().is_state());
    }

    #[test]
    fn test_continuous_vectors_of_varying_length() {
        let params = InputEncoderParams {
            fields: (0..5).map(|i| FieldParams::external(format!("f{i}"))).collect(),
            ..Default::default()
        };
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&[vec![0.0; 5], vec![1.0; 5]]).unwrap();

        for len in [5, 5, 6] {
            encoder.store_new_data(&vec![0.25; len]).unwrap();
            assert!(encoder.encode_next_input_data(true).unwrap());
            assert!(!encoder.encode_next_input_data(true).unwrap());
        }
    }
}

// =============================================================================
// END TO END
// =============================================================================

mod pipeline {
    use super::*;

    #[test]
    fn test_bidirectional_cycle_with_routing() {
        let params = InputEncoderParams {
            feeding: FeedingParams::Patterned(PatternedFeedingParams {
                slices: 3,
                bidir: true,
                var_schema: VariablesSchema::VarSequence,
                unification: UnificationParams {
                    detrend: false,
                    unify_amplitudes: true,
                    resampling: Some(ResamplingParams {
                        target_time_points: 6,
                        ..Default::default()
                    }),
                },
                steady_fields: vec![SteadyFieldParams::new("label")],
            }),
            fields: vec![
                FieldParams::external("a").routed(),
                FieldParams::external("b"),
                FieldParams::transformed(
                    "sum",
                    TransformerParams::Linear {
                        x_field: "a".to_string(),
                        y_field: "b".to_string(),
                        x_coeff: 1.0,
                        y_coeff: 1.0,
                    },
                ),
            ],
            ..Default::default()
        };

        // label, then (a, b) pairs for 4 time points
        let samples = vec![
            vec![1.0, 0.0, 1.0, 1.0, 0.0, 2.0, -1.0, 3.0, -2.0],
            vec![2.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0],
        ];
        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&samples).unwrap();
        assert_eq!(encoder.fixed_ext_vector_length(), Some(9));
        assert_eq!(encoder.num_routed_values(), 1 + 6);

        encoder.store_new_data(&samples[1]).unwrap();
        let mut forward = 0;
        let mut slice_ends = 0;
        while encoder.encode_next_input_data(true).unwrap() {
            forward += 1;
            if encoder.is_slice_end() {
                slice_ends += 1;
            }
        }
        assert_eq!((forward, slice_ends), (6, 3));

        encoder.set_reverse_mode().unwrap();
        let mut backward = 0;
        while encoder.encode_next_input_data(true).unwrap() {
            backward += 1;
        }
        assert_eq!(backward, 6);

        let mut routed = vec![0.0; encoder.num_routed_values()];
        encoder.copy_routed_input_data_to(&mut routed, 0).unwrap();
        assert_eq!(routed[0], 2.0);
        // Amplitude unified: the last time point of `a` is its peak
        assert!((routed[6] - 1.0).abs() < 1e-9);

        let descriptors = encoder.routed_values_descriptors();
        assert!(descriptors[0].steady);
        assert_eq!(descriptors[6].time_point, Some(5));
    }

    #[test]
    fn test_custom_neurons() {
        #[derive(Debug)]
        struct Counting {
            handle: NeuronHandle,
            stimulations: usize,
        }

        impl InputNeuron for Counting {
            fn handle(&self) -> NeuronHandle {
                self.handle
            }
            fn kind(&self) -> resin::input::NeuronKind {
                resin::input::NeuronKind::Analog
            }
            fn new_stimulation(&mut self, _input: Real, _bias: Real) {
                self.stimulations += 1;
            }
            fn recompute(&mut self, _collect_statistics: bool) {}
            fn output(&self) -> Real {
                0.0
            }
            fn reset(&mut self, _reset_statistics: bool) {
                self.stimulations = 0;
            }
        }

        let params = InputEncoderParams {
            fields: vec![FieldParams::external("x")],
            spiking_coding: SpikingCoding::Forbidden,
            ..Default::default()
        };
        let mut encoder = InputEncoder::with_neurons(&params, |placement| Counting {
            handle: placement.handle,
            stimulations: 0,
        })
        .unwrap();
        encoder.initialize(&[vec![0.0], vec![1.0]]).unwrap();
        for v in [0.1, 0.2, 0.3] {
            encoder.store_new_data(&[v]).unwrap();
            encoder.encode_next_input_data(true).unwrap();
        }
        let neurons: Vec<&Counting> = encoder.neurons().collect();
        assert_eq!(neurons.len(), 1);
        assert_eq!(neurons[0].stimulations, 3);
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

mod properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_real_filter_maps_extremes(
            values in proptest::collection::vec(-1e6f64..1e6, 2..50),
            low in -10.0f64..10.0,
            span in 0.1f64..10.0,
        ) {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assume!(max - min > 1e-6);

            let range = Interval::new(low, low + span).unwrap();
            let filter = real_filter(range, &values);
            prop_assert!((filter.apply(min).unwrap() - range.min()).abs() < 1e-9);
            prop_assert!((filter.apply(max).unwrap() - range.max()).abs() < 1e-9);
        }

        #[test]
        fn prop_code_length_constant_and_binary(
            half in 1usize..=32,
            signal_on in any::<bool>(),
            delta_on in any::<bool>(),
            binary_on in any::<bool>(),
            full in any::<bool>(),
            values in proptest::collection::vec(-2.0f64..2.0, 1..40),
        ) {
            prop_assume!(signal_on || delta_on || binary_on);
            let mut code = spike_code(SpikeCodeParams {
                component_half_code_length: half,
                signal_component: signal_on,
                delta_component: delta_on,
                binary_component: binary_on,
                full_spike_set: full,
                ..Default::default()
            });
            let components = [signal_on, delta_on, binary_on].iter().filter(|&&c| c).count();
            let expected = code.code_len();
            prop_assert_eq!(expected, components * 2 * half);

            for v in values {
                let bits = code.encode(v);
                prop_assert_eq!(bits.len(), expected);
                prop_assert!(bits.iter().all(|&b| b <= 1));
            }
        }

        #[test]
        fn prop_reset_restores_fresh_state(
            values in proptest::collection::vec(-1.0f64..1.0, 1..20),
            value in -1.0f64..1.0,
        ) {
            let params = SpikeCodeParams { delta_component: true, ..Default::default() };
            let mut used = spike_code(params.clone());
            for &v in &values {
                used.encode(v);
            }
            used.reset();
            let mut fresh = spike_code(params);
            prop_assert_eq!(used.code(), fresh.code());
            prop_assert_eq!(used.encode(value).to_vec(), fresh.encode(value).to_vec());

            let mut filter = real_filter(Interval::SYMMETRIC_UNIT, &values);
            filter.reset();
            let fresh_filter = real_filter(Interval::SYMMETRIC_UNIT, &[]);
            prop_assert_eq!(filter.apply(value).unwrap(), fresh_filter.apply(value).unwrap());
            prop_assert_eq!(filter.num_samples(), 0);
        }

        #[test]
        fn prop_threshold_classification_is_exclusive(
            len in 2usize..=32,
            low in 1e-4f64..0.5,
        ) {
            let ladder = ThresholdLadder::new(len, low).unwrap();
            let mut code = spike_code(SpikeCodeParams {
                component_half_code_length: len,
                low_threshold: low,
                ..Default::default()
            });
            let eps = 1e-12;
            for (i, &t) in ladder.thresholds().iter().enumerate() {
                prop_assert_eq!(ladder.classify(t + eps), Some(i));
                prop_assert_ne!(ladder.classify(t), Some(i));

                let above = code.encode(t + eps).to_vec();
                prop_assert_eq!(above[i], 1);
                let at = code.encode(t).to_vec();
                prop_assert_eq!(at[i], 0);
            }
        }

        #[test]
        fn prop_resampling_round_trip(
            len in 16usize..64,
            factor in 0.5f64..4.0,
        ) {
            let series: Vec<Real> = (0..len)
                .map(|t| (std::f64::consts::TAU * t as Real / (len - 1) as Real).sin())
                .collect();
            let target = ((len as Real * factor) as usize).max(8);

            let there = signal::resample(&series, target, ResamplingMethod::Linear).unwrap();
            prop_assert_eq!(there.len(), target);
            let back = signal::resample(&there, len, ResamplingMethod::Linear).unwrap();

            let max_err = series
                .iter()
                .zip(&back)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            prop_assert!(max_err < 0.2, "max error {}", max_err);
        }

        #[test]
        fn prop_encode_calls_match_time_points(
            len in 1usize..40,
            slices in 1usize..8,
        ) {
            let params = InputEncoderParams {
                feeding: FeedingParams::Patterned(PatternedFeedingParams {
                    slices,
                    ..Default::default()
                }),
                fields: vec![FieldParams::external("x")],
                ..Default::default()
            };
            let pattern: Vec<Real> = (0..len).map(|t| t as Real).collect();
            let mut encoder = InputEncoder::new(&params).unwrap();
            encoder.initialize(&[pattern.clone()]).unwrap();
            encoder.store_new_data(&pattern).unwrap();

            let mut calls = 0;
            let mut slice_ends = 0;
            while encoder.encode_next_input_data(false).unwrap() {
                calls += 1;
                if encoder.is_slice_end() {
                    slice_ends += 1;
                }
            }
            prop_assert_eq!(calls, len);
            prop_assert_eq!(slice_ends, slices.min(len));
        }
    }
}
