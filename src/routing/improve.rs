//! Local-search improvement for constructed routes.
//!
//! # Algorithm
//!
//! Two first-improvement operators applied until convergence or deadline:
//!
//! * intra-route 2-opt: reverse the segment between two edges when
//!   `d(prev_i, r[j]) + d(r[i], next_j) < d(prev_i, r[i]) + d(r[j], next_j)`
//! * inter-route relocate: move one stop to its cheapest feasible insertion
//!   position on another vehicle's route.
//!
//! Routes hold 0-based stop indices; the distance matrix puts the depot at
//! node 0 and stop `i` at node `i + 1`.
//!
//! # Complexity
//!
//! O(n²) per 2-opt pass, O(n² × R) per relocate pass for R routes.

use std::time::Instant;

use crate::distance::DistanceMatrix;

fn node(idx: usize) -> usize {
    idx + 1
}

/// Applies 2-opt to a single route until no improving move remains or the
/// deadline passes. The route is modified in place.
pub fn two_opt(route: &mut [usize], distances: &DistanceMatrix, deadline: Instant) {
    if route.len() < 2 {
        return;
    }

    let mut improved = true;
    while improved && Instant::now() < deadline {
        improved = false;
        let n = route.len();

        for i in 0..n - 1 {
            for j in i + 1..n {
                let prev_i = if i == 0 { 0 } else { node(route[i - 1]) };
                let next_j = if j == n - 1 { 0 } else { node(route[j + 1]) };

                let old_cost = distances.get(prev_i, node(route[i]))
                    + distances.get(node(route[j]), next_j);
                let new_cost = distances.get(prev_i, node(route[j]))
                    + distances.get(node(route[i]), next_j);

                if new_cost - old_cost < -1e-10 {
                    route[i..=j].reverse();
                    improved = true;
                }
            }
        }
    }
}

/// A relocate move: move a stop from one route to another.
#[derive(Debug, Clone)]
struct RelocateMove {
    from_route: usize,
    from_pos: usize,
    to_route: usize,
    to_pos: usize,
    delta: f64,
}

/// Applies inter-route relocate until no improving move remains or the
/// deadline passes.
///
/// `amounts[idx]` is the cash delivered at stop `idx`; `capacities[r]` is
/// the capacity of the vehicle assigned to `routes[r]`. Moves that would
/// overload the receiving vehicle are never taken.
pub fn relocate(
    routes: &mut [Vec<usize>],
    amounts: &[f64],
    capacities: &[f64],
    distances: &DistanceMatrix,
    deadline: Instant,
) {
    if routes.len() < 2 {
        return;
    }

    let mut loads: Vec<f64> = routes
        .iter()
        .map(|r| r.iter().map(|&idx| amounts[idx]).sum())
        .collect();

    while Instant::now() < deadline {
        let Some(mv) = find_best_relocate(routes, amounts, capacities, &loads, distances) else {
            break;
        };
        let idx = routes[mv.from_route].remove(mv.from_pos);
        routes[mv.to_route].insert(mv.to_pos, idx);
        loads[mv.from_route] -= amounts[idx];
        loads[mv.to_route] += amounts[idx];
    }
}

fn find_best_relocate(
    routes: &[Vec<usize>],
    amounts: &[f64],
    capacities: &[f64],
    loads: &[f64],
    distances: &DistanceMatrix,
) -> Option<RelocateMove> {
    let mut best: Option<RelocateMove> = None;

    for from_r in 0..routes.len() {
        for from_pos in 0..routes[from_r].len() {
            let idx = routes[from_r][from_pos];
            let removal_delta = removal_cost(&routes[from_r], from_pos, distances);

            for (to_r, to_route) in routes.iter().enumerate() {
                if to_r == from_r {
                    continue;
                }
                if loads[to_r] + amounts[idx] > capacities[to_r] + 1e-9 {
                    continue;
                }

                for to_pos in 0..=to_route.len() {
                    let delta =
                        removal_delta + insertion_cost(to_route, to_pos, idx, distances);
                    if delta < -1e-10 && best.as_ref().is_none_or(|b| delta < b.delta) {
                        best = Some(RelocateMove {
                            from_route: from_r,
                            from_pos,
                            to_route: to_r,
                            to_pos,
                            delta,
                        });
                    }
                }
            }
        }
    }

    best
}

/// Distance change from removing the stop at `pos` from a route.
fn removal_cost(route: &[usize], pos: usize, distances: &DistanceMatrix) -> f64 {
    let prev = if pos == 0 { 0 } else { node(route[pos - 1]) };
    let next = if pos == route.len() - 1 {
        0
    } else {
        node(route[pos + 1])
    };
    let n = node(route[pos]);

    distances.get(prev, next) - distances.get(prev, n) - distances.get(n, next)
}

/// Distance change from inserting stop `idx` at `pos` in a route.
pub(crate) fn insertion_cost(
    route: &[usize],
    pos: usize,
    idx: usize,
    distances: &DistanceMatrix,
) -> f64 {
    let prev = if pos == 0 { 0 } else { node(route[pos - 1]) };
    let next = if pos == route.len() { 0 } else { node(route[pos]) };
    let n = node(idx);

    distances.get(prev, n) + distances.get(n, next) - distances.get(prev, next)
}
