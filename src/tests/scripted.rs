//! A floating-point solver stub that replays a fixed sequence of solve outcomes. Used to steer
//! the refinement driver into paths that a well-behaved solver rarely takes.
use std::time::Instant;

use crate::algorithm::simplex::{
    Algorithm, FloatResult, FloatSimplex, Pricer, RatioTester, Scaler, Simplifier, SingularBasis,
};
use crate::data::linear_program::elements::BasisStatus;
use crate::data::linear_program::general_form::RealLp;

/// One scripted outcome: the result and the vectors the driver may ask for afterwards.
pub struct ScriptedSolve {
    pub result: FloatResult,
    pub primal: Vec<f64>,
    pub dual: Vec<f64>,
    pub farkas: Vec<f64>,
    pub rows: Vec<BasisStatus>,
    pub columns: Vec<BasisStatus>,
    pub iterations: u64,
}

/// Replays its script one `solve` call at a time; any call beyond the script fails the solve.
pub struct ScriptedSimplex {
    script: Vec<ScriptedSolve>,
    calls: usize,

    primal: Vec<f64>,
    dual: Vec<f64>,
    farkas: Vec<f64>,
    rows: Vec<BasisStatus>,
    columns: Vec<BasisStatus>,
    iterations: u64,

    feastol: f64,
    opttol: f64,
    algorithm: Algorithm,
    pricer: Pricer,
    ratio_tester: RatioTester,
    scaler: Scaler,
    simplifier: Simplifier,
}

impl ScriptedSimplex {
    pub fn new(script: Vec<ScriptedSolve>) -> Self {
        Self {
            script,
            calls: 0,

            primal: Vec::new(),
            dual: Vec::new(),
            farkas: Vec::new(),
            rows: Vec::new(),
            columns: Vec::new(),
            iterations: 0,

            feastol: 1e-9,
            opttol: 1e-9,
            algorithm: Algorithm::Enter,
            pricer: Pricer::Devex,
            ratio_tester: RatioTester::Textbook,
            scaler: Scaler::Off,
            simplifier: Simplifier::Off,
        }
    }

    /// Number of `solve` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl std::fmt::Debug for ScriptedSimplex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSimplex")
            .field("calls", &self.calls)
            .field("script_len", &self.script.len())
            .finish()
    }
}

impl FloatSimplex for ScriptedSimplex {
    fn load(&mut self, _lp: &RealLp) {}

    fn reload(&mut self) {}

    fn set_basis(&mut self, _rows: &[BasisStatus], _columns: &[BasisStatus]) {}

    fn basis(&self) -> (Vec<BasisStatus>, Vec<BasisStatus>) {
        (self.rows.clone(), self.columns.clone())
    }

    fn has_basis(&self) -> bool {
        !self.rows.is_empty()
    }

    fn change_bounds(&mut self, _lower: &[f64], _upper: &[f64]) {}

    fn change_range(&mut self, _lhs: &[f64], _rhs: &[f64]) {}

    fn change_cost(&mut self, _cost: &[f64]) {}

    fn feasibility_tolerance(&self) -> f64 {
        self.feastol
    }

    fn set_feasibility_tolerance(&mut self, tolerance: f64) {
        self.feastol = tolerance;
    }

    fn optimality_tolerance(&self) -> f64 {
        self.opttol
    }

    fn set_optimality_tolerance(&mut self, tolerance: f64) {
        self.opttol = tolerance;
    }

    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
    }

    fn pricer(&self) -> Pricer {
        self.pricer
    }

    fn set_pricer(&mut self, pricer: Pricer) {
        self.pricer = pricer;
    }

    fn ratio_tester(&self) -> RatioTester {
        self.ratio_tester
    }

    fn set_ratio_tester(&mut self, ratio_tester: RatioTester) {
        self.ratio_tester = ratio_tester;
    }

    fn scaler(&self) -> Scaler {
        self.scaler
    }

    fn set_scaler(&mut self, scaler: Scaler) {
        self.scaler = scaler;
    }

    fn simplifier(&self) -> Simplifier {
        self.simplifier
    }

    fn set_simplifier(&mut self, simplifier: Simplifier) {
        self.simplifier = simplifier;
    }

    fn set_markowitz(&mut self, _threshold: f64) {}

    fn set_iteration_limit(&mut self, _limit: Option<u64>) {}

    fn set_deadline(&mut self, _deadline: Option<Instant>) {}

    fn solve(&mut self) -> FloatResult {
        let Some(step) = self.script.get(self.calls) else {
            return FloatResult::Error;
        };
        self.calls += 1;

        self.primal = step.primal.clone();
        self.dual = step.dual.clone();
        self.farkas = step.farkas.clone();
        self.rows = step.rows.clone();
        self.columns = step.columns.clone();
        self.iterations = step.iterations;

        step.result
    }

    fn factorize(&mut self) -> Result<(), SingularBasis> {
        Ok(())
    }

    fn primal(&self) -> &[f64] {
        &self.primal
    }

    fn dual(&self) -> &[f64] {
        &self.dual
    }

    fn dual_farkas(&self) -> &[f64] {
        &self.farkas
    }

    fn iterations(&self) -> u64 {
        self.iterations
    }
}
