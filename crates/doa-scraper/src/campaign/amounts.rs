//! Goal and raised amounts on a campaign page.
//!
//! Amounts are Brazilian-formatted (`R$ 10.000,00`). A labeled pass looks for
//! amounts next to "meta" / "arrecadado"; a fallback pass guesses from every
//! amount on the page.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

const AMOUNT: &str = r"(\d{1,3}(?:\.\d{3})+(?:,\d{1,2})?|\d+(?:,\d{1,2})?)";

static GOAL_LABELED: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(&format!(r"(?i)\bmeta\b.{{0,30}}?R\$\s*{AMOUNT}")).expect("valid regex"),
        Regex::new(&format!(r"(?i)arrecadad[oa]s\s+de\s+R\$\s*{AMOUNT}")).expect("valid regex"),
    ]
});
static RAISED_LABELED: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(&format!(r"(?i)R\$\s*{AMOUNT}\s*arrecadad[oa]s?")).expect("valid regex"),
        Regex::new(&format!(r"(?i)(?:já\s+arrecadou|arrecadad[oa]s?|arrecadou).{{0,30}}?R\$\s*{AMOUNT}"))
            .expect("valid regex"),
    ]
});
static ANY_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"R\$\s*{AMOUNT}")).expect("valid regex"));

/// Where an amount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSource {
    /// Next to an explicit "meta" / "arrecadado" label.
    Labeled,
    /// Guessed from the set of all amounts on the page.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub value: Decimal,
    pub source: AmountSource,
}

impl Amount {
    fn labeled(value: Decimal) -> Self {
        Self {
            value,
            source: AmountSource::Labeled,
        }
    }

    fn fallback(value: Decimal) -> Self {
        Self {
            value,
            source: AmountSource::Fallback,
        }
    }
}

/// Final goal/raised after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub goal: Option<Decimal>,
    pub raised: Option<Decimal>,
    pub swapped: bool,
    pub needs_review: bool,
}

/// Parses `"10.000,00"` / `"500"` into a decimal.
pub(crate) fn parse_brl(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replace('.', "").replace(',', ".");
    Decimal::from_str(&normalized).ok().map(|d| d.normalize())
}

fn first_amount(patterns: &[Regex], text: &str) -> Option<Decimal> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_brl(m.as_str()))
    })
}

/// Runs the labeled pass, then fills whichever side is still unknown from
/// the fallback pass.
pub(crate) fn find_amounts(text: &str) -> (Option<Amount>, Option<Amount>) {
    let mut goal = first_amount(&*GOAL_LABELED, text).map(Amount::labeled);
    let mut raised = first_amount(&*RAISED_LABELED, text).map(Amount::labeled);

    if goal.is_none() || raised.is_none() {
        let (fallback_goal, fallback_raised) = fallback_amounts(text);
        if goal.is_none() {
            goal = fallback_goal
                .filter(|g| raised.is_none_or(|r| r.value != *g))
                .map(Amount::fallback);
        }
        if raised.is_none() {
            raised = fallback_raised
                .filter(|r| goal.is_none_or(|g| g.value != *r))
                .map(Amount::fallback);
        }
    }

    (goal, raised)
}

/// Every distinct amount, largest first. The goal is the largest
/// round-thousand value (else the largest); raised is the next value after it.
pub(crate) fn fallback_amounts(text: &str) -> (Option<Decimal>, Option<Decimal>) {
    let mut values: Vec<Decimal> = ANY_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).and_then(|m| parse_brl(m.as_str())))
        .filter(|v| *v > Decimal::ZERO)
        .collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.dedup();

    let thousand = Decimal::from(1_000);
    let Some(goal_index) = values
        .iter()
        .position(|v| (*v % thousand).is_zero())
        .or_else(|| (!values.is_empty()).then_some(0))
    else {
        return (None, None);
    };

    (
        values.get(goal_index).copied(),
        values.get(goal_index + 1).copied(),
    )
}

/// Decides the final goal and raised amounts.
///
/// A raised amount above the goal is ambiguous: the campaign may have beaten
/// its goal, or the fallback pass may have assigned them the wrong way round.
/// Only a fallback-derived goal is swapped. Either way the result is flagged
/// for manual review.
#[must_use]
pub fn reconcile_goal_and_raised(goal: Option<Amount>, raised: Option<Amount>) -> Reconciled {
    let (Some(goal), Some(raised)) = (goal, raised) else {
        return Reconciled {
            goal: goal.map(|a| a.value),
            raised: raised.map(|a| a.value),
            swapped: false,
            needs_review: false,
        };
    };

    if raised.value <= goal.value {
        return Reconciled {
            goal: Some(goal.value),
            raised: Some(raised.value),
            swapped: false,
            needs_review: false,
        };
    }

    if goal.source == AmountSource::Fallback {
        Reconciled {
            goal: Some(raised.value),
            raised: Some(goal.value),
            swapped: true,
            needs_review: true,
        }
    } else {
        Reconciled {
            goal: Some(goal.value),
            raised: Some(raised.value),
            swapped: false,
            needs_review: true,
        }
    }
}
