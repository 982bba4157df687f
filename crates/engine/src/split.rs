//! Turns one expense amount into a validated split among group members.
//!
//! Two modes are supported:
//!
//! - [`SplitMode::Equal`]: only the set of members is sent; the server
//!   divides the amount evenly.
//! - [`SplitMode::Custom`]: the user types one amount per selected member
//!   and the allocator checks that they add up to the expense total before
//!   anything is submitted.
use std::collections::BTreeMap;

use api_types::MemberId;

use crate::{Money, ValidationError};

/// Maximum difference allowed between the custom amounts and the total.
pub const DEFAULT_TOLERANCE: Money = Money::new(1);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitMode {
    #[default]
    Equal,
    Custom,
}

impl SplitMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::Custom => "Custom",
        }
    }

    /// The other mode.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Equal => Self::Custom,
            Self::Custom => Self::Equal,
        }
    }
}

/// What gets sent to the server once the split is valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPayload {
    pub split_among: Vec<MemberId>,
}

/// In-memory state of the "split among" part of the expense form.
///
/// Invariants kept by every method:
/// - `selected` only holds known members, without duplicates;
/// - `custom_amounts` only holds entries for selected members;
/// - in equal mode `custom_amounts` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAllocator {
    members: Vec<MemberId>,
    selected: Vec<MemberId>,
    mode: SplitMode,
    custom_amounts: BTreeMap<MemberId, Money>,
    tolerance: Money,
}

impl SplitAllocator {
    /// Creates an allocator for the given group members, all of them
    /// selected, in equal mode.
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MemberId>,
    {
        let mut known: Vec<MemberId> = Vec::new();
        for member in members {
            let member = member.into();
            if !known.contains(&member) {
                known.push(member);
            }
        }
        Self {
            selected: known.clone(),
            members: known,
            mode: SplitMode::Equal,
            custom_amounts: BTreeMap::new(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Overrides the accepted gap between custom amounts and the total.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Money) -> Self {
        self.tolerance = tolerance.abs_diff(Money::ZERO);
        self
    }

    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn selected(&self) -> &[MemberId] {
        &self.selected
    }

    pub fn is_selected(&self, member: &str) -> bool {
        self.selected.iter().any(|id| id == member)
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    pub fn tolerance(&self) -> Money {
        self.tolerance
    }

    pub fn custom_amounts(&self) -> &BTreeMap<MemberId, Money> {
        &self.custom_amounts
    }

    pub fn custom_amount(&self, member: &str) -> Option<Money> {
        self.custom_amounts.get(member).copied()
    }

    /// Adds a member to the split. Selecting twice is a no-op, and so is
    /// selecting someone who is not in the group.
    pub fn select(&mut self, member: &str) {
        if self.is_selected(member) {
            return;
        }
        if !self.members.iter().any(|id| id == member) {
            tracing::debug!("ignoring selection of unknown member {member}");
            return;
        }
        self.selected.push(member.to_string());
    }

    /// Removes a member from the split, together with any custom amount.
    pub fn deselect(&mut self, member: &str) {
        self.selected.retain(|id| id != member);
        self.custom_amounts.remove(member);
    }

    /// Flips the selection of `member`, returning whether it is now selected.
    pub fn toggle(&mut self, member: &str) -> bool {
        if self.is_selected(member) {
            self.deselect(member);
            false
        } else {
            self.select(member);
            self.is_selected(member)
        }
    }

    /// Switches mode. Going back to equal forgets every custom amount.
    pub fn set_mode(&mut self, mode: SplitMode) {
        self.mode = mode;
        if mode == SplitMode::Equal {
            self.custom_amounts.clear();
        }
    }

    /// Records what the user typed as `member`'s share.
    ///
    /// Input that does not parse as a finite number removes the entry rather
    /// than zeroing it. Input for unselected members, or while in equal mode,
    /// is ignored. Returns the amount now stored for `member`.
    pub fn set_custom_amount(&mut self, member: &str, raw: &str) -> Option<Money> {
        if self.mode != SplitMode::Custom || !self.is_selected(member) {
            tracing::debug!("ignoring custom amount for {member}");
            return None;
        }
        match Money::parse_input(raw) {
            Some(amount) => {
                self.custom_amounts.insert(member.to_string(), amount);
                Some(amount)
            }
            None => {
                self.custom_amounts.remove(member);
                None
            }
        }
    }

    /// Sum of the custom amounts of the selected members.
    pub fn custom_total(&self) -> Money {
        self.selected
            .iter()
            .filter_map(|id| self.custom_amounts.get(id))
            .sum()
    }

    /// Whether the custom amounts currently add up to `amount`.
    pub fn is_balanced(&self, amount: Money) -> bool {
        self.custom_total().abs_diff(amount) <= self.tolerance
    }

    /// Checks the split against the expense `amount`.
    ///
    /// Runs before any request is made; on success the payload holds the
    /// members to send as `splitAmong`.
    pub fn validate(&self, amount: Money) -> Result<SplitPayload, ValidationError> {
        if self.selected.is_empty() {
            return Err(ValidationError::NoSplitMembers);
        }

        if self.mode == SplitMode::Custom {
            let total = self.custom_total();
            if !total.is_positive() {
                return Err(ValidationError::InvalidCustomAmounts);
            }
            if total.abs_diff(amount) > self.tolerance {
                return Err(ValidationError::CustomSumMismatch { total, amount });
            }
        }

        Ok(SplitPayload {
            split_among: self.selected.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn allocator() -> SplitAllocator {
        SplitAllocator::new(["A", "B", "C"])
    }

    fn selected_set(split: &SplitAllocator) -> BTreeSet<String> {
        split.selected().iter().cloned().collect()
    }

    fn custom(split: &mut SplitAllocator, entries: &[(&str, &str)]) {
        split.set_mode(SplitMode::Custom);
        for (member, raw) in entries {
            split.set_custom_amount(member, raw);
        }
    }

    #[test]
    fn equal_split_among_everyone() {
        let split = allocator();
        let payload = split.validate(Money::new(10_000)).unwrap();
        assert_eq!(payload.split_among, vec!["A", "B", "C"]);
        assert!(split.custom_amounts().is_empty());
    }

    #[test]
    fn toggling_out_and_back_restores_the_set() {
        let mut split = allocator();
        let before = selected_set(&split);

        assert!(!split.toggle("B"));
        assert!(!split.is_selected("B"));
        assert!(split.toggle("B"));

        assert_eq!(selected_set(&split), before);
    }

    #[test]
    fn selecting_twice_is_a_noop() {
        let mut split = allocator();
        split.select("A");
        split.select("A");
        assert_eq!(split.selected().len(), 3);
    }

    #[test]
    fn unknown_members_cannot_be_selected() {
        let mut split = allocator();
        split.select("Z");
        assert!(!split.toggle("Z"));
        assert!(!split.is_selected("Z"));
    }

    #[test]
    fn duplicate_members_are_collapsed() {
        let split = SplitAllocator::new(["A", "A", "B"]);
        assert_eq!(split.members(), ["A", "B"]);
        assert_eq!(split.selected(), ["A", "B"]);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let mut split = allocator();
        for member in ["A", "B", "C"] {
            split.deselect(member);
        }
        assert_eq!(
            split.validate(Money::new(10_000)),
            Err(ValidationError::NoSplitMembers)
        );
    }

    #[test]
    fn custom_sum_mismatch_reports_both_values() {
        let mut split = allocator();
        custom(&mut split, &[("A", "40"), ("B", "40"), ("C", "10")]);

        let err = split.validate(Money::new(10_000)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CustomSumMismatch {
                total: Money::new(9000),
                amount: Money::new(10_000),
            }
        );
        let message = err.to_string();
        assert!(message.contains("90.00"));
        assert!(message.contains("100.00"));
    }

    #[test]
    fn custom_sum_matching_total_is_accepted() {
        let mut split = SplitAllocator::new(["A", "B"]);
        custom(&mut split, &[("A", "60"), ("B", "40")]);

        let payload = split.validate(Money::new(10_000)).unwrap();
        assert_eq!(payload.split_among, vec!["A", "B"]);
    }

    #[test]
    fn tolerance_is_inclusive() {
        let mut split = allocator();
        custom(&mut split, &[("A", "33.33"), ("B", "33.33"), ("C", "33.33")]);
        assert_eq!(split.custom_total(), Money::new(9999));
        assert!(split.validate(Money::new(10_000)).is_ok());

        custom(&mut split, &[("C", "33.32")]);
        assert!(split.validate(Money::new(10_000)).is_err());
        assert!(!split.is_balanced(Money::new(10_000)));
    }

    #[test]
    fn tolerance_is_configurable() {
        let mut split = allocator().with_tolerance(Money::new(100));
        custom(&mut split, &[("A", "50"), ("B", "49.10")]);
        assert!(split.validate(Money::new(10_000)).is_ok());
        assert_eq!(split.tolerance(), Money::new(100));
    }

    #[test]
    fn accepted_iff_within_tolerance() {
        let amount = Money::new(5000);
        for cents in [4990, 4998, 4999, 5000, 5001, 5002, 5010] {
            let mut split = SplitAllocator::new(["A"]);
            split.set_mode(SplitMode::Custom);
            split.set_custom_amount("A", &Money::new(cents).to_string());
            let accepted = split.validate(amount).is_ok();
            assert_eq!(accepted, (cents - 5000i64).abs() <= 1, "cents = {cents}");
        }
    }

    #[test]
    fn non_positive_custom_total_is_rejected() {
        let mut split = allocator();
        split.set_mode(SplitMode::Custom);
        assert_eq!(
            split.validate(Money::new(10_000)),
            Err(ValidationError::InvalidCustomAmounts)
        );

        custom(&mut split, &[("A", "0")]);
        assert_eq!(
            split.validate(Money::new(10_000)),
            Err(ValidationError::InvalidCustomAmounts)
        );
    }

    #[test]
    fn invalid_keystroke_removes_the_entry() {
        let mut split = allocator();
        custom(&mut split, &[("A", "25")]);
        assert_eq!(split.custom_amount("A"), Some(Money::new(2500)));

        assert_eq!(split.set_custom_amount("A", "25x"), None);
        assert_eq!(split.custom_amount("A"), None);
        assert!(!split.custom_amounts().contains_key("A"));
    }

    #[test]
    fn deselecting_drops_the_custom_amount() {
        let mut split = allocator();
        custom(&mut split, &[("A", "50"), ("B", "50")]);
        split.toggle("B");

        for member in split.members() {
            if !split.is_selected(member) {
                assert!(split.custom_amount(member).is_none());
            }
        }
        assert_eq!(split.custom_total(), Money::new(5000));
    }

    #[test]
    fn amounts_for_unselected_members_are_ignored() {
        let mut split = allocator();
        split.set_mode(SplitMode::Custom);
        split.deselect("C");
        assert_eq!(split.set_custom_amount("C", "10"), None);
        assert!(split.custom_amounts().is_empty());
    }

    #[test]
    fn switching_to_equal_clears_custom_amounts() {
        let mut split = allocator();
        custom(&mut split, &[("A", "10"), ("B", "20"), ("C", "30")]);
        assert_eq!(split.custom_amounts().len(), 3);

        split.set_mode(SplitMode::Equal);
        assert!(split.custom_amounts().is_empty());

        split.set_mode(SplitMode::Custom);
        assert!(split.custom_amounts().is_empty());
    }

    #[test]
    fn equal_mode_ignores_custom_input() {
        let mut split = allocator();
        assert_eq!(split.set_custom_amount("A", "10"), None);
        assert!(split.custom_amounts().is_empty());
    }
}
