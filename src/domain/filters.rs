//! Spin Filters
//!
//! Predicates a spin must satisfy. Every supplied predicate is ANDed; an
//! empty set or missing bound means "don't care". Ideas tagged `Any` for
//! setting, time of day or weather fit whatever value is requested.

use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult};
use super::idea::{CostTier, Idea, Setting, TimeOfDay, Weather};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinFilters {
    /// Inclusive lower bound on duration
    pub min_minutes: Option<u32>,
    /// Inclusive upper bound on duration
    pub max_minutes: Option<u32>,
    pub costs: Vec<CostTier>,
    /// Matched case-insensitively
    pub categories: Vec<String>,
    pub times_of_day: Vec<TimeOfDay>,
    pub weather: Vec<Weather>,
    pub setting: Option<Setting>,
    /// Ideas the caller has already seen
    pub exclude_ids: Vec<u32>,
}

impl SpinFilters {
    pub fn validate(&self) -> DomainResult<()> {
        if let (Some(min), Some(max)) = (self.min_minutes, self.max_minutes) {
            if min > max {
                return Err(DomainError::invalid_input(format!(
                    "min_minutes ({}) is greater than max_minutes ({})",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Whether `idea` passes every supplied predicate
    pub fn matches(&self, idea: &Idea) -> bool {
        if self.exclude_ids.contains(&idea.id) {
            return false;
        }

        if self.min_minutes.is_some() || self.max_minutes.is_some() {
            let Some(minutes) = idea.duration_minutes else {
                return false;
            };
            if self.min_minutes.is_some_and(|min| minutes < min) {
                return false;
            }
            if self.max_minutes.is_some_and(|max| minutes > max) {
                return false;
            }
        }

        if !self.costs.is_empty() && !self.costs.contains(&idea.cost) {
            return false;
        }

        if !self.categories.is_empty()
            && !self
                .categories
                .iter()
                .any(|c| c.trim().eq_ignore_ascii_case(idea.category.trim()))
        {
            return false;
        }

        if !self.times_of_day.is_empty()
            && idea.time_of_day != TimeOfDay::Any
            && !self
                .times_of_day
                .iter()
                .any(|t| *t == TimeOfDay::Any || *t == idea.time_of_day)
        {
            return false;
        }

        if !self.weather.is_empty()
            && idea.weather != Weather::Any
            && !self
                .weather
                .iter()
                .any(|w| *w == Weather::Any || *w == idea.weather)
        {
            return false;
        }

        match self.setting {
            None | Some(Setting::Any) => true,
            Some(wanted) => idea.setting == Setting::Any || idea.setting == wanted,
        }
    }
}
