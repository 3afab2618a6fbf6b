pub mod metrics;
#[cfg(any(feature = "testing", test))]
pub mod test_utils;

/// Declares a set of metric constants grouped by [`metrics::MetricScope`].
///
/// ```ignore
/// define_metrics!(
///     LogServer => {
///         MetricCounter { QUEUED_LEAVES_NEW, "queued_leaves_new", "Leaves newly queued", init = 0 },
///         MetricGauge { HEAD_TREE_SIZE, "head_tree_size", "Size of the latest signed tree head" },
///         MetricHistogram { PROOF_BUILD_SECONDS, "proof_build_seconds", "Time spent assembling a proof" },
///         LabeledMetricHistogram { RPC_LATENCY, "rpc_latency_seconds", "Per-RPC latency", labels = RPC_LABELS },
///     },
/// );
/// ```
#[macro_export]
macro_rules! define_metrics {
    () => {};

    ( $scope:ident => {} $(, $($rest:tt)*)? ) => {
        $crate::define_metrics!( $($($rest)*)? );
    };

    (
        $scope:ident => {
            MetricCounter { $name:ident, $metric_name:literal, $description:literal, init = $init:expr }
            $(, $($more:tt)*)?
        }
        $(, $($rest:tt)*)?
    ) => {
        pub const $name: $crate::metrics::MetricCounter = $crate::metrics::MetricCounter::new(
            $crate::metrics::MetricScope::$scope,
            $metric_name,
            $description,
            $init,
        );
        $crate::define_metrics!( $scope => { $($($more)*)? } $(, $($rest)*)? );
    };

    (
        $scope:ident => {
            MetricGauge { $name:ident, $metric_name:literal, $description:literal }
            $(, $($more:tt)*)?
        }
        $(, $($rest:tt)*)?
    ) => {
        pub const $name: $crate::metrics::MetricGauge = $crate::metrics::MetricGauge::new(
            $crate::metrics::MetricScope::$scope,
            $metric_name,
            $description,
        );
        $crate::define_metrics!( $scope => { $($($more)*)? } $(, $($rest)*)? );
    };

    (
        $scope:ident => {
            MetricHistogram { $name:ident, $metric_name:literal, $description:literal }
            $(, $($more:tt)*)?
        }
        $(, $($rest:tt)*)?
    ) => {
        pub const $name: $crate::metrics::MetricHistogram = $crate::metrics::MetricHistogram::new(
            $crate::metrics::MetricScope::$scope,
            $metric_name,
            $description,
        );
        $crate::define_metrics!( $scope => { $($($more)*)? } $(, $($rest)*)? );
    };

    (
        $scope:ident => {
            LabeledMetricHistogram { $name:ident, $metric_name:literal, $description:literal, labels = $labels:expr }
            $(, $($more:tt)*)?
        }
        $(, $($rest:tt)*)?
    ) => {
        pub const $name: $crate::metrics::LabeledMetricHistogram =
            $crate::metrics::LabeledMetricHistogram::new(
                $crate::metrics::MetricScope::$scope,
                $metric_name,
                $description,
                $labels,
            );
        $crate::define_metrics!( $scope => { $($($more)*)? } $(, $($rest)*)? );
    };
}
