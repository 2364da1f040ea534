use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Ingest request duration in seconds. Tagged with status.",
};

pub const RECORDS_STORED: MetricDef = MetricDef {
    name: "records.stored",
    metric_type: MetricType::Counter,
    description: "Number of records durably written",
};

pub const PIPELINE_ERRORS: MetricDef = MetricDef {
    name: "pipeline.errors",
    metric_type: MetricType::Counter,
    description: "Failed pipeline runs. Tagged with kind.",
};

pub const NOTIFICATIONS_FAILED: MetricDef = MetricDef {
    name: "notifications.failed",
    metric_type: MetricType::Counter,
    description: "Operator notifications that could not be delivered. Tagged with category.",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    RECORDS_STORED,
    PIPELINE_ERRORS,
    NOTIFICATIONS_FAILED,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique() {
        let names: HashSet<&str> = ALL_METRICS.iter().map(|def| def.name).collect();
        assert_eq!(names.len(), ALL_METRICS.len());

        // No recorder installed, so this only has to not panic
        shared::metrics_defs::describe_all(ALL_METRICS);
    }
}
