use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("vet_clinic_statds")
        .with_description("Vet clinic app statistics")
        .with_unit("attempt")
        .build()
});

fn incr_statds(metric: &'static str, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_user_action_statds(action: &str) {
    incr_statds("user_action", action.into())
}

pub fn incr_appointment_action_statds(action: &str) {
    incr_statds("appointment_action", action.into())
}

pub fn incr_prescription_action_statds(action: &str) {
    incr_statds("prescription_action", action.into())
}

pub fn incr_inventory_action_statds(action: &str) {
    incr_statds("inventory_action", action.into())
}
