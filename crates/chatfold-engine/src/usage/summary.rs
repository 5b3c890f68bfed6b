use chatfold_types::{UsageComponent, UsageSnapshot};

/// Sum a usage history into session totals.
///
/// Token counts always add up. Costs add up only where known; any unknown
/// component cost (in any snapshot) sets `has_unknown_costs` on the result.
/// `None` for an empty history.
pub fn sum_usage_history(history: &[UsageSnapshot]) -> Option<UsageSnapshot> {
    let (first, rest) = history.split_first()?;

    let mut total = UsageSnapshot {
        model: first.model.clone(),
        ..Default::default()
    };
    let mut has_unknown_costs = false;

    for snapshot in std::iter::once(first).chain(rest) {
        has_unknown_costs |= snapshot.has_unknown_costs;

        let pairs = [
            (&mut total.input, &snapshot.input),
            (&mut total.cached, &snapshot.cached),
            (&mut total.cache_create, &snapshot.cache_create),
            (&mut total.output, &snapshot.output),
            (&mut total.reasoning, &snapshot.reasoning),
        ];
        for (acc, component) in pairs {
            has_unknown_costs |= add_component(acc, component);
        }

        if total.model != snapshot.model {
            total.model = None;
        }
    }

    total.has_unknown_costs = has_unknown_costs;
    Some(total)
}

/// Returns true when the component's cost was unknown.
fn add_component(acc: &mut UsageComponent, component: &UsageComponent) -> bool {
    acc.tokens += component.tokens;
    match component.cost_usd {
        Some(cost) => {
            acc.cost_usd = Some(acc.cost_usd.unwrap_or(0.0) + cost);
            false
        }
        None => true,
    }
}

/// Total display cost of a snapshot.
///
/// `None` only when no component has a cost at all; a partial sum is still returned
/// and should be read together with `has_unknown_costs`.
pub fn get_total_cost(snapshot: &UsageSnapshot) -> Option<f64> {
    snapshot
        .components()
        .iter()
        .filter_map(|component| component.cost_usd)
        .fold(None, |acc, cost| Some(acc.unwrap_or(0.0) + cost))
}
