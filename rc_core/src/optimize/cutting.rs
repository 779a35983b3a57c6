//! # Cutting Stock
//!
//! Allocates the cut lengths of one bar mark to supplier stock bars so the
//! offcut waste is as small as practical.
//!
//! ## Strategies
//!
//! | Strategy | Method | Work bound |
//! |----------|--------|------------|
//! | Greedy | Best-fit decreasing, then shrink each bar to the shortest stock that holds it | O(pieces × open bars) |
//! | Exact | Branch-and-bound over cutting patterns, seeded with the greedy plan | pattern limit, then node limit |
//!
//! `Auto` runs the exact search only when the instance is small (few
//! distinct lengths, few pieces); otherwise greedy. If pattern enumeration
//! hits its limit the greedy plan is returned; if the branch-and-bound hits
//! its node limit the best plan found so far is returned. Either way the
//! plan is marked [`PlanStrategy::ExactCapped`].
//!
//! ## Kerf
//!
//! Each separation between adjacent pieces on a bar consumes the kerf, so
//! a bar holding pieces `l1..ln` needs `Σli + kerf·(n − 1) ≤ stock`. Waste
//! is everything that is not a delivered piece:
//! `waste = stock − Σli` (kerf loss included).

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::errors::{require_positive, CalcError, CalcResult};
use crate::settings::CuttingSettings;

/// Slack for floating-point length comparisons (mm)
const LENGTH_EPSILON_MM: f64 = 1e-9;

/// Most pieces one request may ask for
pub const MAX_PIECES_PER_REQUEST: usize = 100_000;

/// Pieces of one length required for a bar mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRequirement {
    pub length_mm: f64,
    pub quantity: u32,
}

/// How the plan should be searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CuttingStrategy {
    /// Exact when the instance is small enough, otherwise greedy
    #[default]
    Auto,
    Greedy,
    /// Exact search regardless of size, still bounded by the pattern and node limits
    Exact,
}

/// Inputs for one bar mark.
///
/// ## JSON Example
///
/// ```json
/// {
///   "bar_mark": "B1-T1",
///   "cuts": [
///     { "length_mm": 4200.0, "quantity": 6 },
///     { "length_mm": 2900.0, "quantity": 4 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingRequest {
    pub bar_mark: String,
    pub cuts: Vec<CutRequirement>,
    #[serde(default)]
    pub strategy: CuttingStrategy,
}

impl CuttingRequest {
    pub fn new(bar_mark: impl Into<String>, cuts: Vec<CutRequirement>) -> Self {
        CuttingRequest { bar_mark: bar_mark.into(), cuts, strategy: CuttingStrategy::Auto }
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.cuts.is_empty() {
            return Err(CalcError::missing_field("cuts"));
        }
        for cut in &self.cuts {
            require_positive("cuts.length_mm", cut.length_mm)?;
            if cut.quantity == 0 {
                return Err(CalcError::invalid_input("cuts.quantity", "0", "Quantity must be at least 1"));
            }
        }
        let pieces = self.piece_count();
        if pieces > MAX_PIECES_PER_REQUEST {
            return Err(CalcError::invalid_input(
                "cuts.quantity",
                pieces.to_string(),
                format!("At most {} pieces per bar mark", MAX_PIECES_PER_REQUEST),
            ));
        }
        Ok(())
    }

    /// Total number of pieces
    pub fn piece_count(&self) -> usize {
        self.cuts.iter().map(|c| c.quantity as usize).sum()
    }
}

/// One stock bar and the pieces cut from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBar {
    pub stock_length_mm: f64,
    /// Piece lengths, longest first
    pub cuts_mm: Vec<f64>,
    /// Lost to kerf between pieces (mm)
    pub kerf_loss_mm: f64,
    /// Stock length not delivered as pieces (mm), kerf loss included
    pub waste_mm: f64,
}

impl StockBar {
    pub fn cut_total_mm(&self) -> f64 {
        self.cuts_mm.iter().sum()
    }
}

/// All bars cut from one stock length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockUsage {
    pub stock_length_mm: f64,
    pub count: usize,
    pub bars: Vec<StockBar>,
    pub waste_mm: f64,
    /// Cumulative waste through this stock length, shortest stock first
    pub running_waste_mm: f64,
}

/// Which search produced the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStrategy {
    Greedy,
    /// Exact search completed; the plan is optimal
    Exact,
    /// Exact search stopped at the pattern or node limit; best plan found so far
    ExactCapped,
}

/// Cutting plan for one bar mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingPlan {
    pub bar_mark: String,
    pub strategy: PlanStrategy,
    /// Grouped by stock length, shortest first
    pub stock: Vec<StockUsage>,
    pub total_stock_length_mm: f64,
    pub total_cut_length_mm: f64,
    pub total_kerf_mm: f64,
    pub total_waste_mm: f64,
    /// Pieces longer than every stock length; never dropped silently
    pub unplaced_cuts_mm: Vec<f64>,
    /// Branch-and-bound nodes visited (0 for greedy)
    pub nodes_explored: u64,
    /// Partial patterns visited while enumerating (0 for greedy)
    pub patterns_visited: u64,
}

impl CuttingPlan {
    pub fn bar_count(&self) -> usize {
        self.stock.iter().map(|s| s.count).sum()
    }

    /// Waste as a fraction of stock consumed
    pub fn waste_ratio(&self) -> f64 {
        if self.total_stock_length_mm > 0.0 {
            self.total_waste_mm / self.total_stock_length_mm
        } else {
            0.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unplaced_cuts_mm.is_empty()
    }

    /// Iterate over every stock bar in the plan
    pub fn bars(&self) -> impl Iterator<Item = &StockBar> {
        self.stock.iter().flat_map(|s| s.bars.iter())
    }
}

/// Length a set of pieces occupies on one bar
fn occupied(cut_total: f64, pieces: usize, kerf: f64) -> f64 {
    if pieces == 0 {
        0.0
    } else {
        cut_total + kerf * (pieces - 1) as f64
    }
}

fn fits(cut_total: f64, pieces: usize, kerf: f64, stock: f64) -> bool {
    occupied(cut_total, pieces, kerf) <= stock + LENGTH_EPSILON_MM
}

/// Working bar during a search: (stock length, pieces)
type OpenBar = (f64, Vec<f64>);

/// Shortest stock that can hold the pieces
fn shortest_stock_for(pieces: &[f64], kerf: f64, stocks_ascending: &[f64]) -> Option<f64> {
    let total: f64 = pieces.iter().sum();
    stocks_ascending.iter().copied().find(|&s| fits(total, pieces.len(), kerf, s))
}

// ============================================================================
// Greedy
// ============================================================================

fn greedy(pieces: &[f64], kerf: f64, stocks_ascending: &[f64]) -> Vec<OpenBar> {
    let Some(&longest) = stocks_ascending.last() else {
        return Vec::new();
    };
    let mut bars: Vec<OpenBar> = Vec::new();
    for &piece in pieces {
        // Best fit: least room left after placing; earliest bar on ties
        let mut best: Option<(usize, f64)> = None;
        for (i, (stock, cuts)) in bars.iter().enumerate() {
            let total: f64 = cuts.iter().sum::<f64>() + piece;
            if fits(total, cuts.len() + 1, kerf, *stock) {
                let left = stock - occupied(total, cuts.len() + 1, kerf);
                if best.map_or(true, |(_, b)| left < b - LENGTH_EPSILON_MM) {
                    best = Some((i, left));
                }
            }
        }
        match best {
            Some((i, _)) => bars[i].1.push(piece),
            None => bars.push((longest, vec![piece])),
        }
    }

    // Downsize each bar to the shortest stock that still holds it
    for (stock, cuts) in bars.iter_mut() {
        if let Some(shorter) = shortest_stock_for(cuts, kerf, stocks_ascending) {
            *stock = shorter;
        }
    }
    bars
}

// ============================================================================
// Exact
// ============================================================================

/// A way of cutting one stock bar: how many of each distinct length
#[derive(Debug, Clone)]
struct Pattern {
    stock: f64,
    counts: Vec<u32>,
}

/// Depth-first pattern enumeration with a visit budget.
struct Enumeration<'a> {
    lengths: &'a [f64],
    demand: &'a [u32],
    kerf: f64,
    visit_limit: u64,
    visits: u64,
    patterns: Vec<Pattern>,
}

impl Enumeration<'_> {
    /// Returns false once the visit budget is spent.
    fn extend(&mut self, idx: usize, stock: f64, counts: &mut Vec<u32>, total: f64, pieces: usize) -> bool {
        if self.visits >= self.visit_limit {
            return false;
        }
        self.visits += 1;

        if idx == self.lengths.len() {
            if pieces > 0 {
                self.patterns.push(Pattern { stock, counts: counts.clone() });
            }
            return true;
        }
        for n in 0..=self.demand[idx] {
            let t = total + n as f64 * self.lengths[idx];
            let p = pieces + n as usize;
            if !fits(t, p, self.kerf, stock) {
                break;
            }
            counts.push(n);
            let within_budget = self.extend(idx + 1, stock, counts, t, p);
            counts.pop();
            if !within_budget {
                return false;
            }
        }
        true
    }
}

/// Every non-empty pattern per stock length whose counts do not exceed
/// demand, or `None` when the enumeration needs more than `visit_limit`
/// visits. The second value is the number of visits made.
fn enumerate_patterns(
    lengths: &[f64],
    demand: &[u32],
    kerf: f64,
    stocks: &[f64],
    visit_limit: u64,
) -> (Option<Vec<Pattern>>, u64) {
    let mut enumeration =
        Enumeration { lengths, demand, kerf, visit_limit, visits: 0, patterns: Vec::new() };
    for &stock in stocks {
        let mut counts = Vec::with_capacity(lengths.len());
        if !enumeration.extend(0, stock, &mut counts, 0.0, 0) {
            return (None, enumeration.visits);
        }
    }
    (Some(enumeration.patterns), enumeration.visits)
}

struct Search<'a> {
    lengths: &'a [f64],
    patterns: &'a [Pattern],
    node_limit: u64,
    nodes: u64,
    capped: bool,
    best_stock: f64,
    best: Option<Vec<usize>>,
}

impl Search<'_> {
    fn run(&mut self, demand: &mut [u32], used_stock: f64, chosen: &mut Vec<usize>) {
        if self.nodes >= self.node_limit {
            self.capped = true;
            return;
        }
        self.nodes += 1;

        // Every remaining millimetre of cut needs at least that much stock
        let remaining: f64 = demand.iter().zip(self.lengths).map(|(&n, &l)| n as f64 * l).sum();
        if used_stock + remaining >= self.best_stock - LENGTH_EPSILON_MM {
            return;
        }
        // Branch on patterns that serve the longest unmet length
        let Some(first) = demand.iter().position(|&n| n > 0) else {
            self.best_stock = used_stock;
            self.best = Some(chosen.clone());
            return;
        };
        for (pi, pattern) in self.patterns.iter().enumerate() {
            if pattern.counts[first] == 0 || pattern.counts.iter().zip(demand.iter()).any(|(&c, &d)| c > d) {
                continue;
            }
            for (d, &c) in demand.iter_mut().zip(&pattern.counts) {
                *d -= c;
            }
            chosen.push(pi);
            self.run(demand, used_stock + pattern.stock, chosen);
            chosen.pop();
            for (d, &c) in demand.iter_mut().zip(&pattern.counts) {
                *d += c;
            }
            if self.capped {
                return;
            }
        }
    }
}

/// Distinct lengths, longest first, with their quantities
fn distinct_lengths(pieces: &[f64]) -> (Vec<f64>, Vec<u32>) {
    let mut lengths: Vec<f64> = Vec::new();
    let mut demand: Vec<u32> = Vec::new();
    for &p in pieces {
        match lengths.iter().position(|&l| (l - p).abs() <= LENGTH_EPSILON_MM) {
            Some(i) => demand[i] += 1,
            None => {
                lengths.push(p);
                demand.push(1);
            }
        }
    }
    (lengths, demand)
}

/// What the exact search produced
struct ExactOutcome {
    /// Improvement over the incumbent, if one was found
    bars: Option<Vec<OpenBar>>,
    nodes: u64,
    patterns_visited: u64,
    capped: bool,
}

fn exact(
    pieces: &[f64],
    kerf: f64,
    stocks_ascending: &[f64],
    settings: &CuttingSettings,
    incumbent: &[OpenBar],
) -> ExactOutcome {
    let (lengths, mut demand) = distinct_lengths(pieces);
    let (patterns, patterns_visited) =
        enumerate_patterns(&lengths, &demand, kerf, stocks_ascending, settings.exact_pattern_limit);
    let Some(patterns) = patterns else {
        warn!(distinct = lengths.len(), patterns_visited, "cutting pattern enumeration hit its limit");
        return ExactOutcome { bars: None, nodes: 0, patterns_visited, capped: true };
    };
    debug!(distinct = lengths.len(), patterns = patterns.len(), patterns_visited, "exact search");

    let mut search = Search {
        lengths: &lengths,
        patterns: &patterns,
        node_limit: settings.exact_node_limit,
        nodes: 0,
        capped: false,
        best_stock: incumbent.iter().map(|(s, _)| s).sum(),
        best: None,
    };
    search.run(&mut demand, 0.0, &mut Vec::new());

    let bars = search.best.map(|chosen| {
        chosen
            .into_iter()
            .map(|pi| {
                let p = &patterns[pi];
                let cuts = p
                    .counts
                    .iter()
                    .zip(&lengths)
                    .flat_map(|(&c, &l)| std::iter::repeat(l).take(c as usize))
                    .collect();
                (p.stock, cuts)
            })
            .collect()
    });
    if search.capped {
        warn!(nodes = search.nodes, "exact cutting search hit the node limit");
    }
    ExactOutcome { bars, nodes: search.nodes, patterns_visited, capped: search.capped }
}

// ============================================================================
// Plan assembly
// ============================================================================

fn assemble(
    bar_mark: &str,
    strategy: PlanStrategy,
    mut bars: Vec<OpenBar>,
    kerf: f64,
    unplaced: Vec<f64>,
    nodes: u64,
    patterns_visited: u64,
) -> CuttingPlan {
    // Stable: bars of one stock length keep their search order
    bars.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut stock: Vec<StockUsage> = Vec::new();
    let mut running = 0.0;
    for (length, mut cuts) in bars {
        cuts.sort_by(|a, b| b.total_cmp(a));
        let cut_total: f64 = cuts.iter().sum();
        let bar = StockBar {
            stock_length_mm: length,
            kerf_loss_mm: occupied(cut_total, cuts.len(), kerf) - cut_total,
            waste_mm: length - cut_total,
            cuts_mm: cuts,
        };
        running += bar.waste_mm;
        match stock.last_mut() {
            Some(group) if group.stock_length_mm == length => {
                group.count += 1;
                group.waste_mm += bar.waste_mm;
                group.running_waste_mm = running;
                group.bars.push(bar);
            }
            _ => stock.push(StockUsage {
                stock_length_mm: length,
                count: 1,
                waste_mm: bar.waste_mm,
                running_waste_mm: running,
                bars: vec![bar],
            }),
        }
    }

    let total_stock: f64 = stock.iter().map(|s| s.stock_length_mm * s.count as f64).sum();
    let total_cut: f64 = stock.iter().flat_map(|s| &s.bars).map(StockBar::cut_total_mm).sum();
    let total_kerf: f64 = stock.iter().flat_map(|s| &s.bars).map(|b| b.kerf_loss_mm).sum();

    CuttingPlan {
        bar_mark: bar_mark.to_string(),
        strategy,
        stock,
        total_stock_length_mm: total_stock,
        total_cut_length_mm: total_cut,
        total_kerf_mm: total_kerf,
        total_waste_mm: total_stock - total_cut,
        unplaced_cuts_mm: unplaced,
        nodes_explored: nodes,
        patterns_visited,
    }
}

/// Plan the cutting of one bar mark.
#[instrument(skip_all, fields(bar_mark = %request.bar_mark, pieces = request.piece_count()))]
pub fn plan_cutting(request: &CuttingRequest, settings: &CuttingSettings) -> CalcResult<CuttingPlan> {
    request.validate()?;
    settings.validate()?;
    let kerf = settings.kerf_mm;

    let mut stocks: Vec<f64> = settings.stock_lengths_mm.clone();
    stocks.sort_by(|a, b| a.total_cmp(b));
    stocks.dedup();
    let longest = stocks.last().copied().unwrap_or(0.0);

    let mut pieces: Vec<f64> = Vec::with_capacity(request.piece_count());
    let mut unplaced = Vec::new();
    for cut in &request.cuts {
        for _ in 0..cut.quantity {
            if cut.length_mm > longest + LENGTH_EPSILON_MM {
                unplaced.push(cut.length_mm);
            } else {
                pieces.push(cut.length_mm);
            }
        }
    }
    if !unplaced.is_empty() {
        warn!(count = unplaced.len(), longest, "cuts longer than every stock length left unplaced");
    }
    // Largest first; stable so equal lengths keep request order
    pieces.sort_by(|a, b| b.total_cmp(a));

    let greedy_bars = greedy(&pieces, kerf, &stocks);
    let (distinct, _) = distinct_lengths(&pieces);
    let small = distinct.len() <= settings.exact_max_distinct_lengths && pieces.len() <= settings.exact_max_pieces;
    let run_exact = !pieces.is_empty()
        && match request.strategy {
            CuttingStrategy::Greedy => false,
            CuttingStrategy::Exact => true,
            CuttingStrategy::Auto => small,
        };

    let plan = if run_exact {
        let outcome = exact(&pieces, kerf, &stocks, settings, &greedy_bars);
        let strategy = if outcome.capped { PlanStrategy::ExactCapped } else { PlanStrategy::Exact };
        assemble(
            &request.bar_mark,
            strategy,
            outcome.bars.unwrap_or(greedy_bars),
            kerf,
            unplaced,
            outcome.nodes,
            outcome.patterns_visited,
        )
    } else {
        assemble(&request.bar_mark, PlanStrategy::Greedy, greedy_bars, kerf, unplaced, 0, 0)
    };

    info!(
        strategy = ?plan.strategy,
        bars = plan.bar_count(),
        waste_mm = plan.total_waste_mm,
        "cutting plan"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(stocks: &[f64]) -> CuttingSettings {
        CuttingSettings { stock_lengths_mm: stocks.to_vec(), ..CuttingSettings::default() }
    }

    fn request(cuts: &[(f64, u32)], strategy: CuttingStrategy) -> CuttingRequest {
        CuttingRequest {
            bar_mark: "B1".to_string(),
            cuts: cuts.iter().map(|&(length_mm, quantity)| CutRequirement { length_mm, quantity }).collect(),
            strategy,
        }
    }

    fn assert_capacity(plan: &CuttingPlan, kerf: f64) {
        for bar in plan.bars() {
            let used = bar.cut_total_mm() + kerf * (bar.cuts_mm.len() - 1) as f64;
            assert!(used <= bar.stock_length_mm + 1e-6);
        }
    }

    #[test]
    fn test_greedy_pairs_complementary_cuts() {
        let plan = plan_cutting(
            &request(&[(7000.0, 2), (5000.0, 2)], CuttingStrategy::Greedy),
            &settings(&[12000.0]),
        )
        .unwrap();
        assert_eq!(plan.strategy, PlanStrategy::Greedy);
        assert_eq!(plan.bar_count(), 2);
        assert!(plan.total_waste_mm.abs() < 1e-9);
        assert_eq!(plan.bars().next().unwrap().cuts_mm, vec![7000.0, 5000.0]);
    }

    #[test]
    fn test_downsizing_uses_shorter_stock() {
        let plan = plan_cutting(&request(&[(5500.0, 1)], CuttingStrategy::Greedy), &settings(&[6000.0, 12000.0])).unwrap();
        assert_eq!(plan.stock.len(), 1);
        assert_eq!(plan.stock[0].stock_length_mm, 6000.0);
        assert!((plan.total_waste_mm - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_beats_greedy() {
        // 24 m of cuts: greedy strands the short pieces, exact packs three bars full
        let cuts = [(4500.0, 1), (3500.0, 3), (1500.0, 2), (3000.0, 2)];
        let greedy_plan = plan_cutting(&request(&cuts, CuttingStrategy::Greedy), &settings(&[8000.0])).unwrap();
        let exact_plan = plan_cutting(&request(&cuts, CuttingStrategy::Exact), &settings(&[8000.0])).unwrap();
        assert_eq!(greedy_plan.bar_count(), 4);
        assert_eq!(exact_plan.strategy, PlanStrategy::Exact);
        assert_eq!(exact_plan.bar_count(), 3);
        assert!(exact_plan.total_waste_mm.abs() < 1e-9);
        assert_capacity(&exact_plan, 0.0);
    }

    #[test]
    fn test_kerf_limits_capacity() {
        let mut s = settings(&[6000.0]);
        s.kerf_mm = 5.0;
        // 3000 + 5 + 3000 > 6000
        let plan = plan_cutting(&request(&[(3000.0, 2)], CuttingStrategy::Greedy), &s).unwrap();
        assert_eq!(plan.bar_count(), 2);
        assert_capacity(&plan, 5.0);
        // 2995 + 5 + 2995 = 5995
        let plan = plan_cutting(&request(&[(2995.0, 2)], CuttingStrategy::Greedy), &s).unwrap();
        assert_eq!(plan.bar_count(), 1);
        assert!((plan.total_kerf_mm - 5.0).abs() < 1e-9);
        assert!((plan.total_waste_mm - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_oversize_cuts_reported() {
        let plan = plan_cutting(&request(&[(13000.0, 1), (4000.0, 1)], CuttingStrategy::Auto), &settings(&[12000.0])).unwrap();
        assert_eq!(plan.unplaced_cuts_mm, vec![13000.0]);
        assert!(!plan.is_complete());
        assert_eq!(plan.bar_count(), 1);
    }

    #[test]
    fn test_waste_totals_consistent() {
        let plan = plan_cutting(
            &request(&[(3100.0, 5), (2300.0, 7), (1250.0, 3)], CuttingStrategy::Auto),
            &settings(&[6000.0, 12000.0]),
        )
        .unwrap();
        let stock: f64 = plan.bars().map(|b| b.stock_length_mm).sum();
        let cut: f64 = plan.bars().map(StockBar::cut_total_mm).sum();
        assert!((plan.total_stock_length_mm - stock).abs() < 1e-6);
        assert!((plan.total_waste_mm - (stock - cut)).abs() < 1e-6);
        assert!((cut - (5.0 * 3100.0 + 7.0 * 2300.0 + 3.0 * 1250.0)).abs() < 1e-6);
        let last = plan.stock.last().unwrap();
        assert!((last.running_waste_mm - plan.total_waste_mm).abs() < 1e-6);
        assert_capacity(&plan, 0.0);
    }

    #[test]
    fn test_node_limit_caps_search() {
        let mut s = settings(&[6000.0, 7500.0, 9000.0, 12000.0]);
        s.exact_node_limit = 10;
        let plan = plan_cutting(
            &request(&[(1700.0, 9), (1300.0, 8), (900.0, 7), (2600.0, 5)], CuttingStrategy::Exact),
            &s,
        )
        .unwrap();
        assert_eq!(plan.strategy, PlanStrategy::ExactCapped);
        assert!(plan.nodes_explored <= 10);
        assert_capacity(&plan, 0.0);
        assert!(plan.is_complete());
    }

    #[test]
    fn test_many_distinct_lengths_stop_at_pattern_limit() {
        // 20 lengths of two pieces each: billions of patterns per stock length
        let cuts: Vec<(f64, u32)> = (0..20).map(|i| (300.0 + 7.0 * i as f64, 2)).collect();
        let s = CuttingSettings::default();
        let started = std::time::Instant::now();
        let plan = plan_cutting(&request(&cuts, CuttingStrategy::Exact), &s).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        assert_eq!(plan.strategy, PlanStrategy::ExactCapped);
        assert_eq!(plan.patterns_visited, s.exact_pattern_limit);
        assert_eq!(plan.nodes_explored, 0);
        assert!(plan.is_complete());
        assert_capacity(&plan, 0.0);

        // Falls back to the greedy plan
        let greedy_plan = plan_cutting(&request(&cuts, CuttingStrategy::Greedy), &s).unwrap();
        assert_eq!(plan.bar_count(), greedy_plan.bar_count());
        assert!((plan.total_waste_mm - greedy_plan.total_waste_mm).abs() < 1e-6);
    }

    #[test]
    fn test_excessive_quantity_rejected() {
        let err = plan_cutting(&request(&[(1000.0, 4_000_000_000)], CuttingStrategy::Greedy), &settings(&[6000.0]))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let cuts = [(1000.0, 60_000), (2000.0, 50_000)];
        let err = request(&cuts, CuttingStrategy::Greedy).validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_empty_cuts_rejected() {
        let err = plan_cutting(&request(&[], CuttingStrategy::Auto), &settings(&[6000.0])).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }
}
