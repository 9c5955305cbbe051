//! Bet creation parameters and their form encoding

use super::error::{ApiError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// Format of plain date fields (deadline, target date)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of the acceptance window end time
pub const ACCEPT_END_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Bet types the engine knows how to create
///
/// All of them are bound to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetType {
    /// Project will stay within budget
    Budget,
    /// Project will be delivered before the deadline
    Deadline,
    /// No open bugs on the given date
    ZeroBugs,
    /// Number of closed tickets reached by the given date
    ClosedTickets,
}

impl BetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::Budget => "budget",
            BetType::Deadline => "deadline",
            BetType::ZeroBugs => "0_bugs",
            BetType::ClosedTickets => "closed_tickets",
        }
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum stake thresholds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinStakes {
    /// One minimum per side
    Sides { min_in: Decimal, min_out: Decimal },
    /// Per side minimum stake, minimum sum and minimum number of stakes,
    /// in the order of [`MinStakes::DETAILED_FIELDS`]
    Detailed([Decimal; 6]),
}

impl MinStakes {
    pub const SIDES_FIELDS: [&'static str; 2] = ["min_in", "min_out"];

    pub const DETAILED_FIELDS: [&'static str; 6] = [
        "min_in",
        "min_out",
        "min_in_sum",
        "min_out_sum",
        "min_in_count",
        "min_out_count",
    ];

    /// Build thresholds from a 2 or 6 element tuple
    ///
    /// Any other length is rejected.
    pub fn from_slice(values: &[Decimal]) -> Result<Self> {
        match values {
            [min_in, min_out] => Ok(MinStakes::Sides {
                min_in: *min_in,
                min_out: *min_out,
            }),
            [a, b, c, d, e, f] => Ok(MinStakes::Detailed([*a, *b, *c, *d, *e, *f])),
            _ => Err(ApiError::Validation(format!(
                "min stakes must have 2 or 6 values, got {}",
                values.len()
            ))),
        }
    }

    /// POST fields for these thresholds, in fixed order
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            MinStakes::Sides { min_in, min_out } => vec![
                (Self::SIDES_FIELDS[0], min_in.to_string()),
                (Self::SIDES_FIELDS[1], min_out.to_string()),
            ],
            MinStakes::Detailed(values) => Self::DETAILED_FIELDS
                .iter()
                .zip(values.iter())
                .map(|(name, value)| (*name, value.to_string()))
                .collect(),
        }
    }
}

/// Parameters of a bet to create
#[derive(Debug, Clone, PartialEq)]
pub struct NewBet {
    bet_type: BetType,
    project: String,
    type_fields: Vec<(&'static str, String)>,
    description: Option<String>,
    accept_end: Option<NaiveDateTime>,
    min_stakes: Option<MinStakes>,
    group: Option<String>,
}

impl NewBet {
    fn new(bet_type: BetType, project: impl Into<String>) -> Self {
        Self {
            bet_type,
            project: project.into(),
            type_fields: Vec::new(),
            description: None,
            accept_end: None,
            min_stakes: None,
            group: None,
        }
    }

    /// Project will be finished within `budget`
    pub fn budget(project: impl Into<String>, budget: Decimal) -> Self {
        let mut bet = Self::new(BetType::Budget, project);
        bet.type_fields.push(("budget", budget.to_string()));
        bet
    }

    /// Project will be finished before `deadline`
    pub fn deadline(project: impl Into<String>, deadline: NaiveDate) -> Self {
        let mut bet = Self::new(BetType::Deadline, project);
        bet.type_fields
            .push(("deadline", deadline.format(DATE_FORMAT).to_string()));
        bet
    }

    /// Project will have no open bugs on `date`
    pub fn zero_bugs(project: impl Into<String>, date: NaiveDate) -> Self {
        let mut bet = Self::new(BetType::ZeroBugs, project);
        bet.type_fields
            .push(("date", date.format(DATE_FORMAT).to_string()));
        bet
    }

    /// Project will have `tickets` closed tickets by `date`
    pub fn closed_tickets(project: impl Into<String>, tickets: u32, date: NaiveDate) -> Self {
        let mut bet = Self::new(BetType::ClosedTickets, project);
        bet.type_fields.push(("tickets", tickets.to_string()));
        bet.type_fields
            .push(("date", date.format(DATE_FORMAT).to_string()));
        bet
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Stop accepting stakes at `accept_end`
    pub fn with_accept_end(mut self, accept_end: NaiveDateTime) -> Self {
        self.accept_end = Some(accept_end);
        self
    }

    /// Minimum stakes as a 2 or 6 element tuple
    pub fn with_min_stakes(mut self, values: &[Decimal]) -> Result<Self> {
        self.min_stakes = Some(MinStakes::from_slice(values)?);
        Ok(self)
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn bet_type(&self) -> BetType {
        self.bet_type
    }

    /// Encode as POST form fields
    pub fn to_form(&self) -> Result<Vec<(String, String)>> {
        if self.project.trim().is_empty() {
            return Err(ApiError::Validation(format!(
                "{} bet requires a project",
                self.bet_type
            )));
        }

        let mut form = vec![
            ("type".to_string(), self.bet_type.as_str().to_string()),
            ("project".to_string(), self.project.clone()),
        ];

        form.extend(
            self.type_fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone())),
        );

        if let Some(description) = &self.description {
            form.push(("description".to_string(), description.clone()));
        }
        if let Some(accept_end) = &self.accept_end {
            form.push((
                "accept_end".to_string(),
                accept_end.format(ACCEPT_END_FORMAT).to_string(),
            ));
        }
        if let Some(min_stakes) = &self.min_stakes {
            form.extend(
                min_stakes
                    .form_fields()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value)),
            );
        }
        if let Some(group) = &self.group {
            form.push(("group".to_string(), group.clone()));
        }

        Ok(form)
    }
}
