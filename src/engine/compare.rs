//! Side-by-side evaluation of one input under different assumptions.

use serde::{Deserialize, Serialize};

use super::margin::compute;
use super::status::classify_result;
use crate::domain::{MarginInput, MarginResult, Platform, Status};
use crate::error::AppError;

/// Most scenarios kept side by side.
pub const MAX_SCENARIOS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub result: MarginResult,
    pub status: Status,
}

impl PlatformOutcome {
    /// Evaluate `input` with `platform`'s preset rates.
    pub fn evaluate(input: &MarginInput, platform: Platform) -> Self {
        let result = compute(&platform.preset().apply(input));
        Self {
            platform,
            result,
            status: classify_result(&result),
        }
    }
}

/// Two platforms compared on the same input. Differences are first minus second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformComparison {
    pub first: PlatformOutcome,
    pub second: PlatformOutcome,
    pub payout_diff: f64,
    pub margin_diff: f64,
}

pub fn compare_platforms(input: &MarginInput, first: Platform, second: Platform) -> PlatformComparison {
    let first = PlatformOutcome::evaluate(input, first);
    let second = PlatformOutcome::evaluate(input, second);
    PlatformComparison {
        payout_diff: first.result.net_payout - second.result.net_payout,
        margin_diff: first.result.net_margin_rate - second.result.net_margin_rate,
        first,
        second,
    }
}

/// Every catalogued platform, highest net profit first.
pub fn rank_platforms(input: &MarginInput) -> Vec<PlatformOutcome> {
    let mut outcomes: Vec<PlatformOutcome> = Platform::ALL
        .iter()
        .map(|&p| PlatformOutcome::evaluate(input, p))
        .collect();
    outcomes.sort_by(|a, b| b.result.net_profit.total_cmp(&a.result.net_profit));
    outcomes
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    pub input: MarginInput,
    pub result: MarginResult,
}

impl Scenario {
    pub fn new(name: impl Into<String>, input: MarginInput) -> Self {
        let result = compute(&input);
        Self {
            name: name.into(),
            input,
            result,
        }
    }

    pub fn status(&self) -> Status {
        classify_result(&self.result)
    }
}

/// Between one and [`MAX_SCENARIOS`] named variants of a base input.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    /// Start with a single scenario "A" copied from `base`.
    pub fn new(base: &MarginInput) -> Self {
        Self {
            scenarios: vec![Scenario::new(scenario_name(0), base.clone())],
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Append a copy of `base` under the first unused letter.
    pub fn add(&mut self, base: &MarginInput) -> Result<&Scenario, AppError> {
        if self.scenarios.len() >= MAX_SCENARIOS {
            return Err(AppError::InvalidArgument(format!(
                "at most {} scenarios can be compared",
                MAX_SCENARIOS
            )));
        }
        let name = self.next_free_name();
        self.scenarios.push(Scenario::new(name, base.clone()));
        Ok(&self.scenarios[self.scenarios.len() - 1])
    }

    pub fn remove(&mut self, name: &str) -> Result<Scenario, AppError> {
        let idx = self.position(name)?;
        if self.scenarios.len() <= 1 {
            return Err(AppError::InvalidArgument(
                "at least one scenario must remain".to_string(),
            ));
        }
        Ok(self.scenarios.remove(idx))
    }

    /// Replace a scenario's input and recompute its result.
    pub fn update(&mut self, name: &str, input: MarginInput) -> Result<&Scenario, AppError> {
        let idx = self.position(name)?;
        let scenario = &mut self.scenarios[idx];
        scenario.result = compute(&input);
        scenario.input = input;
        Ok(&self.scenarios[idx])
    }

    /// Scenario with the highest net margin rate.
    pub fn best(&self) -> Option<&Scenario> {
        self.scenarios
            .iter()
            .max_by(|a, b| a.result.net_margin_rate.total_cmp(&b.result.net_margin_rate))
    }

    fn next_free_name(&self) -> String {
        (0..=self.scenarios.len())
            .map(scenario_name)
            .find(|name| self.scenarios.iter().all(|s| &s.name != name))
            .unwrap_or_else(|| scenario_name(self.scenarios.len()))
    }

    fn position(&self, name: &str) -> Result<usize, AppError> {
        self.scenarios
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| AppError::NotFound(format!("scenario {}", name)))
    }
}

fn scenario_name(index: usize) -> String {
    let letter = char::from(b'A' + index as u8);
    format!("Scenario {}", letter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> MarginInput {
        MarginInput {
            sale_price: 20000.0,
            cost: 8000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_compare_smartstore_coupang() {
        let cmp = compare_platforms(&input(), Platform::SmartStore, Platform::Coupang);
        assert_eq!(cmp.first.platform, Platform::SmartStore);
        // smartstore 6.63% vs coupang 11.88% of 20000
        assert!((cmp.payout_diff - 20000.0 * (0.1188 - 0.0663)).abs() < 1e-6);
        assert!(cmp.margin_diff > 0.0);
    }

    #[test]
    fn test_rank_is_sorted() {
        let ranked = rank_platforms(&input());
        assert_eq!(ranked.len(), Platform::ALL.len());
        assert_eq!(ranked[0].platform, Platform::Other);
        for pair in ranked.windows(2) {
            assert!(pair[0].result.net_profit >= pair[1].result.net_profit);
        }
    }

    #[test]
    fn test_scenario_limits() {
        let mut set = ScenarioSet::new(&input());
        assert!(set.remove("Scenario A").is_err());
        set.add(&input()).unwrap();
        let third = set.add(&input()).unwrap();
        assert_eq!(third.name, "Scenario C");
        assert!(matches!(
            set.add(&input()),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(set.remove("Scenario B").is_ok());
        assert_eq!(set.scenarios().len(), 2);
        assert!(matches!(set.remove("Scenario Z"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_recomputes_and_best() {
        let mut set = ScenarioSet::new(&input());
        set.add(&input()).unwrap();
        let updated = set
            .update("Scenario B", input().with_sale_price(30000.0))
            .unwrap();
        assert_eq!(updated.result, compute(&input().with_sale_price(30000.0)));
        assert_eq!(set.best().unwrap().name, "Scenario B");
    }

    #[test]
    fn test_add_after_remove_reuses_free_letter() {
        let mut set = ScenarioSet::new(&input());
        set.add(&input()).unwrap();
        set.add(&input()).unwrap();
        set.remove("Scenario B").unwrap();

        let added = set.add(&input().with_sale_price(25000.0)).unwrap();
        assert_eq!(added.name, "Scenario B");

        let names: Vec<&str> = set.scenarios().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Scenario A", "Scenario C", "Scenario B"]);

        set.update("Scenario C", input().with_sale_price(40000.0))
            .unwrap();
        assert_eq!(set.scenarios()[1].input.sale_price, 40000.0);
        assert_eq!(set.scenarios()[2].input.sale_price, 25000.0);
    }
}
