//! Pen routes over glyph pixels and their cost-driven reordering.
//!
//! A route is an ordered visiting sequence over the foreground pixels
//! of one glyph. Replaying a route costs "pen effort": long jumps need
//! a pen lift, color changes need a state switch, and straight runs of
//! unit steps are cheaper than their naive per-step sum. [`Optimizer`]
//! shuffles a route with the classic 2-opt local search to reduce that
//! total.

/// One visited pixel in a pen route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoutePoint {
    pub x: i32,
    pub y: i32,
    /// Small color tag; for 1bpp glyphs this is effectively binary.
    pub color: u8,
    /// Marks a travel-only point inserted during route construction.
    pub move_only: bool,
}

impl RoutePoint {
    pub fn new(x: i32, y: i32, color: u8) -> Self {
        Self {
            x,
            y,
            color,
            move_only: false,
        }
    }
}

/// Scores a route as total integer "pen effort".
#[derive(Copy, Clone, Debug)]
pub struct CostModel {
    color_threshold: i32,
    pen_lift_cost: i32,
    color_change_cost: i32,
    max_free_line_run: i32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            color_threshold: 0,
            pen_lift_cost: 3,
            color_change_cost: 2,
            max_free_line_run: 4,
        }
    }
}

impl CostModel {
    /// Creates a cost model, clamping nonsense values into range.
    pub fn new(
        color_threshold: i32,
        pen_lift_cost: i32,
        color_change_cost: i32,
        max_free_line_run: i32,
    ) -> Self {
        Self {
            color_threshold: color_threshold.max(0),
            pen_lift_cost: pen_lift_cost.max(0),
            color_change_cost: color_change_cost.max(0),
            max_free_line_run: max_free_line_run.max(1),
        }
    }

    /// Whether two colors count as equal under the model's threshold.
    pub fn same_color(&self, a: &RoutePoint, b: &RoutePoint) -> bool {
        (i32::from(a.color) - i32::from(b.color)).abs() <= self.color_threshold
    }

    /// Cost of moving the pen from `a` to `b`, plus the step vector.
    ///
    /// The base cost is the Chebyshev distance. Steps longer than one
    /// pixel pay the pen lift surcharge; unit steps across a color
    /// boundary pay the color change surcharge.
    pub fn transition_cost(&self, a: &RoutePoint, b: &RoutePoint) -> (i32, i32, i32) {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let mut dist = dx.abs().max(dy.abs());
        if dist > 1 {
            dist += self.pen_lift_cost;
        } else if !self.same_color(a, b) {
            dist += self.color_change_cost;
        }
        (dist, dx, dy)
    }

    /// Total cost of a route. Routes with fewer than two points cost
    /// nothing.
    ///
    /// Up to `max_free_line_run` consecutive unit steps along the same
    /// direction vector are folded to zero cost; after that the run
    /// resets and steps resume costing normally. This rewards long
    /// straight strokes.
    pub fn total_cost(&self, route: &[RoutePoint]) -> i32 {
        if route.len() < 2 {
            return 0;
        }
        let mut sum = 0;
        let mut prev_dx = 0;
        let mut prev_dy = 0;
        let mut line_len = 0;
        for pair in route.windows(2) {
            let (mut step_cost, dx, dy) = self.transition_cost(&pair[0], &pair[1]);
            if step_cost == 1 && dx == prev_dx && dy == prev_dy && line_len < self.max_free_line_run
            {
                line_len += 1;
                step_cost = 0;
            } else {
                line_len = 0;
            }
            sum += step_cost;
            prev_dx = dx;
            prev_dy = dy;
        }
        sum
    }
}

/// 2-opt local search over open pen routes.
///
/// Each full sweep evaluates O(n²) candidate segment reversals and each
/// candidate is recosted from scratch in O(n), so a pass is O(n³). That
/// is fine for glyph-sized routes (tens to low hundreds of points) and
/// hopeless for anything larger; callers decide whether a route is
/// worth optimizing at all.
#[derive(Clone, Debug, Default)]
pub struct Optimizer {
    cost_model: CostModel,
}

impl Optimizer {
    pub fn new(cost_model: CostModel) -> Self {
        Self { cost_model }
    }

    /// Reorders `route` to reduce its total cost. The result is a
    /// permutation of the input; the cost never increases.
    ///
    /// The route is treated as an open path, not a closed tour. The
    /// search adopts the first improving reversal it finds and restarts
    /// the sweep from the top, repeating until a full sweep finds no
    /// improvement. Routes shorter than three points are returned
    /// unchanged.
    pub fn two_opt(&self, route: &[RoutePoint]) -> Vec<RoutePoint> {
        if route.len() < 3 {
            return route.to_vec();
        }

        let mut best = route.to_vec();
        let mut best_cost = self.cost_model.total_cost(&best);
        let swappable = best.len() - 1;

        let mut improved = true;
        'restart: while improved {
            improved = false;
            for i in 0..swappable - 1 {
                for k in i + 1..swappable {
                    let candidate = two_opt_swap(&best, i, k);
                    let candidate_cost = self.cost_model.total_cost(&candidate);
                    if candidate_cost < best_cost {
                        log::trace!(
                            "2-opt: reverse [{i}..={k}], cost {best_cost} -> {candidate_cost}"
                        );
                        best = candidate;
                        best_cost = candidate_cost;
                        improved = true;
                        // First improvement wins; rescan from the top.
                        continue 'restart;
                    }
                }
            }
        }
        best
    }
}

/// Produces the 2-opt neighbor of `route`: prefix before `i`, the
/// segment `[i..=k]` reversed, then the unchanged suffix.
fn two_opt_swap(route: &[RoutePoint], i: usize, k: usize) -> Vec<RoutePoint> {
    let mut result = Vec::with_capacity(route.len());
    result.extend_from_slice(&route[..i]);
    result.extend(route[i..=k].iter().rev());
    result.extend_from_slice(&route[k + 1..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pt(x: i32, y: i32) -> RoutePoint {
        RoutePoint::new(x, y, 1)
    }

    #[test]
    fn short_routes_cost_nothing() {
        let model = CostModel::default();
        assert_eq!(model.total_cost(&[]), 0);
        assert_eq!(model.total_cost(&[pt(3, 3)]), 0);
    }

    #[test]
    fn unit_step_costs_one_and_jump_pays_pen_lift() {
        let model = CostModel::default();
        assert_eq!(model.total_cost(&[pt(0, 0), pt(1, 1)]), 1);
        // Chebyshev distance 5 plus the default pen lift of 3.
        assert_eq!(model.total_cost(&[pt(0, 0), pt(5, 0)]), 8);
    }

    #[test]
    fn color_change_on_unit_step_pays_surcharge() {
        let model = CostModel::default();
        let route = [RoutePoint::new(0, 0, 1), RoutePoint::new(1, 0, 2)];
        assert_eq!(model.total_cost(&route), 3);

        // A tolerant threshold treats the colors as equal.
        let tolerant = CostModel::new(1, 3, 2, 4);
        assert_eq!(tolerant.total_cost(&route), 1);
    }

    #[test]
    fn straight_runs_are_folded_up_to_the_limit() {
        let model = CostModel::default();
        // Seven collinear unit steps: the first costs 1, the next four
        // are free, the sixth pays again and starts a fresh run.
        let route: Vec<RoutePoint> = (0..8).map(|x| pt(x, 0)).collect();
        assert_eq!(model.total_cost(&route), 2);

        // A direction change resets the run.
        let bent = [pt(0, 0), pt(1, 0), pt(1, 1), pt(1, 2)];
        assert_eq!(model.total_cost(&bent), 2);
    }

    #[test]
    fn two_opt_returns_tiny_routes_unchanged() {
        let optimizer = Optimizer::default();
        let route = vec![pt(0, 0), pt(9, 9)];
        assert_eq!(optimizer.two_opt(&route), route);
    }

    #[test]
    fn two_opt_never_worsens_a_route() {
        let model = CostModel::default();
        let optimizer = Optimizer::default();
        let route: Vec<RoutePoint> = [(0, 0), (3, 1), (1, 1), (4, 0), (2, 2), (0, 2)]
            .iter()
            .map(|&(x, y)| pt(x, y))
            .collect();
        let optimized = optimizer.two_opt(&route);
        assert!(model.total_cost(&optimized) <= model.total_cost(&route));
        assert_eq!(optimized.len(), route.len());
    }

    #[test]
    fn two_opt_untangles_the_zigzag_route() {
        // Regression: two distant column pairs visited in zigzag order
        // must strictly improve once the columns are grouped.
        let route = vec![pt(0, 0), pt(5, 0), pt(0, 1), pt(5, 1)];
        let model = CostModel::default();
        let optimizer = Optimizer::default();

        let before = model.total_cost(&route);
        let optimized = optimizer.two_opt(&route);
        let after = model.total_cost(&optimized);

        assert!(after <= before);
        assert!(after < before);
    }

    #[test]
    fn two_opt_result_is_a_permutation() {
        let optimizer = Optimizer::default();
        let route: Vec<RoutePoint> = [(0, 0), (5, 0), (0, 1), (5, 1), (2, 3)]
            .iter()
            .map(|&(x, y)| pt(x, y))
            .collect();
        let mut optimized = optimizer.two_opt(&route);
        let mut expected = route.clone();
        let key = |p: &RoutePoint| (p.x, p.y);
        optimized.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(optimized, expected);
    }
}
