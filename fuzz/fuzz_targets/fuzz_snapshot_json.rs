// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use mealgraph::aggregate::{build_flow_graph, prep_list, pull_lists, resolve_storage, shopping_list};
use mealgraph::store::Snapshot;
use mealgraph::week::prepare_plan;

fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = serde_json::from_slice::<Snapshot>(data) else {
        return;
    };

    for plan in &snapshot.weekly_plans {
        // Malformed graphs must be rejected, never loop or panic
        let Ok(week) = prepare_plan(&snapshot, &plan.id) else {
            continue;
        };
        let _ = shopping_list(&week.meals);
        let _ = prep_list(&week.meals);
        let _ = resolve_storage(&week.meals);
        let _ = pull_lists(&week.meals);
        let _ = build_flow_graph(&week.meals);
    }
});
