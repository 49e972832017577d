//! Schema-driven planning.
//!
//! Both resources plan the same way, so the diff is computed from schema
//! flags alone: computed attributes the user did not set carry over from
//! prior state, and a change to a `force_new` attribute turns the update
//! into a replacement.

use serde_json::{Map, Value};

use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};

/// Plan the transition from `prior` to `proposed`.
///
/// `prior == None` plans a create; `proposed == Value::Null` plans a destroy.
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, proposed: &Value) -> PlanResult {
    match prior {
        None => plan_create(proposed),
        Some(prior) if proposed.is_null() => plan_destroy(prior),
        Some(prior) => plan_update(schema, prior, proposed),
    }
}

fn plan_create(proposed: &Value) -> PlanResult {
    let changes = object(proposed)
        .map(|obj| {
            obj.iter()
                .filter(|(_, v)| !is_unset(v))
                .map(|(k, v)| AttributeChange::added(k.as_str(), v.clone()))
                .collect()
        })
        .unwrap_or_default();
    PlanResult::with_changes(proposed.clone(), changes, false)
}

fn plan_destroy(prior: &Value) -> PlanResult {
    let changes = object(prior)
        .map(|obj| {
            obj.iter()
                .filter(|(_, v)| !is_unset(v))
                .map(|(k, v)| AttributeChange::removed(k.as_str(), v.clone()))
                .collect()
        })
        .unwrap_or_default();
    PlanResult::with_changes(Value::Null, changes, false)
}

fn plan_update(schema: &Schema, prior: &Value, proposed: &Value) -> PlanResult {
    let empty = Map::new();
    let prior_obj = object(prior).unwrap_or(&empty);
    let mut planned = object(proposed).cloned().unwrap_or_default();

    let requires_replace = schema.block.attributes.iter().any(|(name, attr)| {
        attr.force_new
            && planned.get(name).is_some_and(|v| !is_unset(v))
            && differs(prior_obj.get(name), planned.get(name))
    });

    let mut changes = Vec::new();

    for (name, attr) in &schema.block.attributes {
        let before = prior_obj.get(name);
        let after = planned.get(name);

        if after.map_or(true, is_unset) && attr.flags.computed {
            if requires_replace {
                planned.insert(name.clone(), Value::Null);
            } else if let Some(value) = before.filter(|v| !is_unset(v)) {
                planned.insert(name.clone(), value.clone());
            }
            continue;
        }

        if differs(before, after) {
            changes.push(change(name, before, after));
        }
    }

    for name in schema.block.blocks.keys() {
        let before = prior_obj.get(name);
        let after = planned.get(name);
        if differs(before, after) {
            changes.push(change(name, before, after));
        }
    }

    PlanResult::with_changes(Value::Object(planned), changes, requires_replace)
}

fn object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

/// Null, absent and empty lists all mean "not set".
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn differs(before: Option<&Value>, after: Option<&Value>) -> bool {
    match (before.filter(|v| !is_unset(v)), after.filter(|v| !is_unset(v))) {
        (None, None) => false,
        (Some(b), Some(a)) => a != b,
        _ => true,
    }
}

fn change(name: &str, before: Option<&Value>, after: Option<&Value>) -> AttributeChange {
    let set = |v: Option<&Value>| v.filter(|v| !is_unset(v)).cloned();
    AttributeChange::new(name, set(before), set(after))
}
