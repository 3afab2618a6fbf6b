#[cfg(any(feature = "testing", test))]
use std::str::FromStr;

#[cfg(any(feature = "testing", test))]
use num_traits::Num;
use num_traits::ToPrimitive;
use strum_macros::AsRefStr;

#[cfg(any(feature = "testing", test))]
use crate::test_utils::parse_numeric_metric as parse_numeric_metric_impl;

/// The subsystem a metric belongs to; becomes the metric's namespace prefix convention and its
/// `scope` label when dashboards group series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MetricScope {
    Infra,
    LogServer,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricCounter {
    scope: MetricScope,
    name: &'static str,
    description: &'static str,
    init_value: u64,
}

impl MetricCounter {
    pub const fn new(
        scope: MetricScope,
        name: &'static str,
        description: &'static str,
        init_value: u64,
    ) -> Self {
        Self { scope, name, description, init_value }
    }

    pub fn get_name(&self) -> &'static str {
        self.name
    }

    pub fn get_scope(&self) -> MetricScope {
        self.scope
    }

    pub fn register(&self) {
        metrics::describe_counter!(self.name, self.description);
        metrics::counter!(self.name).absolute(self.init_value);
    }

    pub fn increment(&self, value: u64) {
        metrics::counter!(self.name).increment(value);
    }

    #[cfg(any(feature = "testing", test))]
    pub fn parse_numeric_metric<T: Num + FromStr>(&self, metrics_as_string: &str) -> Option<T> {
        parse_numeric_metric_impl(metrics_as_string, self.name, None)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricGauge {
    scope: MetricScope,
    name: &'static str,
    description: &'static str,
}

impl MetricGauge {
    pub const fn new(scope: MetricScope, name: &'static str, description: &'static str) -> Self {
        Self { scope, name, description }
    }

    pub fn get_name(&self) -> &'static str {
        self.name
    }

    pub fn get_scope(&self) -> MetricScope {
        self.scope
    }

    pub fn register(&self) {
        metrics::describe_gauge!(self.name, self.description);
    }

    /// Sets the gauge from any numeric type, lossily converting to `f64`.
    pub fn set_lossy<T: ToPrimitive>(&self, value: T) {
        metrics::gauge!(self.name).set(value.to_f64().unwrap_or(0.0));
    }

    pub fn increment(&self, value: f64) {
        metrics::gauge!(self.name).increment(value);
    }

    pub fn decrement(&self, value: f64) {
        metrics::gauge!(self.name).decrement(value);
    }

    #[cfg(any(feature = "testing", test))]
    pub fn parse_numeric_metric<T: Num + FromStr>(&self, metrics_as_string: &str) -> Option<T> {
        parse_numeric_metric_impl(metrics_as_string, self.name, None)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricHistogram {
    scope: MetricScope,
    name: &'static str,
    description: &'static str,
}

impl MetricHistogram {
    pub const fn new(scope: MetricScope, name: &'static str, description: &'static str) -> Self {
        Self { scope, name, description }
    }

    pub fn get_name(&self) -> &'static str {
        self.name
    }

    pub fn get_scope(&self) -> MetricScope {
        self.scope
    }

    pub fn register(&self) {
        metrics::describe_histogram!(self.name, self.description);
    }

    pub fn record(&self, value: f64) {
        metrics::histogram!(self.name).record(value);
    }

    pub fn record_lossy<T: ToPrimitive>(&self, value: T) {
        metrics::histogram!(self.name).record(value.to_f64().unwrap_or(0.0));
    }
}

/// A histogram additionally broken down by a label (e.g. the RPC variant that produced the
/// sample), so `labels` documents the set of label names the metric is expected to carry.
#[derive(Debug, Clone, Copy)]
pub struct LabeledMetricHistogram {
    scope: MetricScope,
    name: &'static str,
    description: &'static str,
    labels: &'static [&'static str],
}

impl LabeledMetricHistogram {
    pub const fn new(
        scope: MetricScope,
        name: &'static str,
        description: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self { scope, name, description, labels }
    }

    pub fn get_name(&self) -> &'static str {
        self.name
    }

    pub fn get_scope(&self) -> MetricScope {
        self.scope
    }

    pub fn get_labels(&self) -> &'static [&'static str] {
        self.labels
    }

    pub fn register(&self) {
        metrics::describe_histogram!(self.name, self.description);
    }

    pub fn record(&self, value: f64, label_pairs: &[(&'static str, &'static str)]) {
        metrics::histogram!(self.name, label_pairs.to_vec()).record(value);
    }

    #[cfg(any(feature = "testing", test))]
    pub fn parse_numeric_metric<T: Num + FromStr>(
        &self,
        metrics_as_string: &str,
        label_pairs: &[(&'static str, &'static str)],
    ) -> Option<T> {
        parse_numeric_metric_impl(metrics_as_string, self.name, Some(label_pairs))
    }
}
