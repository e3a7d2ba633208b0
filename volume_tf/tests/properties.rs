use nalgebra::vector;
use proptest::prelude::*;
use volume_tf::{
    derivative::{BoundaryPolicy, DerivativeFields},
    histogram::{HistogramStats, JointHistogram},
    transfer::{norm, HuePolicy, TransferConfig, TransferFunctionBuilder},
    volumetric::{linear_index, Samples, VolumeGrid},
};

fn grid_strategy() -> impl Strategy<Value = VolumeGrid> {
    (1usize..6, 1usize..6, 1usize..6).prop_flat_map(|(x, y, z)| {
        prop::collection::vec(any::<u8>(), x * y * z)
            .prop_map(move |data| VolumeGrid::new(vector![x, y, z], Samples::U8(data)).unwrap())
    })
}

proptest! {
    #[test]
    fn index_is_bijection(x in 1usize..8, y in 1usize..8, z in 1usize..8) {
        let size = vector![x, y, z];
        let mut seen = vec![false; x * y * z];
        for k in 0..z {
            for j in 0..y {
                for i in 0..x {
                    let index = linear_index(size, i, j, k);
                    prop_assert!(index < seen.len());
                    prop_assert!(!seen[index]);
                    seen[index] = true;
                }
            }
        }
        prop_assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn sample_reads_raw_offset(grid in grid_strategy()) {
        let bytes = grid.to_texture_bytes();
        let size = grid.size();
        for k in 0..size.z {
            for j in 0..size.y {
                for i in 0..size.x {
                    let raw = bytes[linear_index(size, i, j, k)] as u32;
                    prop_assert_eq!(grid.sample(i, j, k), raw);
                    prop_assert_eq!(grid.coords(grid.index(i, j, k)), (i, j, k));
                }
            }
        }
    }

    #[test]
    fn norm_stays_in_unit_interval(
        min in -1000.0f64..1000.0,
        span in 0.001f64..1000.0,
        t in 0.0f64..=1.0,
    ) {
        let max = min + span;
        let x = min + t * span;
        let n = norm(min, max, x);
        prop_assert!((-1e-9..=1.0 + 1e-9).contains(&n));
    }

    #[test]
    fn histogram_counts_every_voxel(grid in grid_strategy()) {
        let stats = HistogramStats::build(&grid).unwrap();
        let sum: u64 = stats.histogram().iter().map(|&h| h as u64).sum();
        prop_assert_eq!(sum, grid.count() as u64);
        prop_assert!((stats.cdf()[255] - 1.0).abs() < 1e-9);
        prop_assert!(stats.cdf().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn transparent_below_gradient_threshold(grid in grid_strategy(), discrete in any::<bool>()) {
        let derivatives =
            DerivativeFields::compute(&grid, BoundaryPolicy::FirstFace, true).unwrap();
        let stats = HistogramStats::build(&grid).unwrap();
        let joint = JointHistogram::build(&grid, &stats, &derivatives.gradient);
        let config = if discrete {
            TransferConfig { rare_bucket_limit: None, ..TransferConfig::discrete() }
        } else {
            TransferConfig::continuous()
        };
        prop_assert_eq!(config.hue == HuePolicy::Discrete, discrete);

        let tf = TransferFunctionBuilder::new(&grid, &derivatives, &stats, &joint)
            .build(&config)
            .unwrap();
        for (index, &g) in derivatives.gradient.values().iter().enumerate() {
            if g < config.thresholds.gradient {
                prop_assert_eq!(tf.as_bytes()[4 * index + 3], 0);
            }
        }
    }

    #[test]
    fn sweeps_are_deterministic(grid in grid_strategy()) {
        let a = DerivativeFields::compute(&grid, BoundaryPolicy::AllAxes, true).unwrap();
        let b = DerivativeFields::compute(&grid, BoundaryPolicy::AllAxes, true).unwrap();
        prop_assert_eq!(a.gradient, b.gradient);
        prop_assert_eq!(a.second, b.second);
        prop_assert_eq!(a.third, b.third);
    }
}
