use apollo_metrics::define_metrics;
use apollo_metrics::metrics::{MetricCounter, MetricGauge, MetricHistogram};

define_metrics!(
    LogServer => {
        MetricCounter { QUEUED_LEAVES_NEW, "queued_leaves_new", "Counter of leaves queued for the first time", init = 0 },
        MetricCounter { QUEUED_LEAVES_EXISTING, "queued_leaves_existing", "Counter of queue requests that deduplicated against an already-queued leaf", init = 0 },
        MetricGauge { HEAD_TREE_SIZE, "head_tree_size", "The tree_size of the most recently stored signed root" },
        MetricHistogram { PROOF_BUILD_SECONDS, "proof_build_seconds", "Time spent resolving a proof's node addresses to hashes" },
    },
);

pub fn register_metrics() {
    QUEUED_LEAVES_NEW.register();
    QUEUED_LEAVES_EXISTING.register();
    HEAD_TREE_SIZE.register();
    PROOF_BUILD_SECONDS.register();
}
