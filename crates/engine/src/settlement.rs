use api_types::balance::Transaction;

use crate::{ApiError, Resource, SplitApi};

const FETCH_BALANCES_FAILED: &str = "Failed to fetch balances";

/// Which server-computed settlement plan is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettlementMode {
    /// Pairwise balances, one edge per debtor/creditor pair.
    #[default]
    Direct,
    /// Transitive balances with debts chained to reduce the number of edges.
    Simplified,
}

impl SettlementMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Direct => "Regular Balances",
            Self::Simplified => "Simplified Balances",
        }
    }

    /// Value of the `transitive` query parameter for this mode.
    pub fn transitive(self) -> bool {
        matches!(self, Self::Simplified)
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Direct => Self::Simplified,
            Self::Simplified => Self::Direct,
        }
    }
}

/// Both settlement plans of a group plus the toggle between them.
///
/// The two result sets are fetched independently and never merged; the mode
/// only decides which one [`SettlementView::current`] returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementView {
    mode: SettlementMode,
    direct: Resource<Vec<Transaction>>,
    simplified: Resource<Vec<Transaction>>,
}

impl SettlementView {
    pub fn mode(&self) -> SettlementMode {
        self.mode
    }

    /// Flips the presentation mode. Pure view state: nothing is fetched.
    pub fn toggle(&mut self) -> SettlementMode {
        self.mode = self.mode.flipped();
        self.mode
    }

    pub fn current(&self) -> &Resource<Vec<Transaction>> {
        self.result(self.mode)
    }

    pub fn result(&self, mode: SettlementMode) -> &Resource<Vec<Transaction>> {
        match mode {
            SettlementMode::Direct => &self.direct,
            SettlementMode::Simplified => &self.simplified,
        }
    }

    /// `true` once the current plan loaded and has nothing to settle.
    pub fn is_settled(&self) -> bool {
        self.current().ready().is_some_and(Vec::is_empty)
    }

    /// Stores the outcome of one of the two fetches, keeping the server's
    /// order.
    pub fn apply(&mut self, mode: SettlementMode, result: Result<Vec<Transaction>, ApiError>) {
        let resource = Resource::from_list_result(result, FETCH_BALANCES_FAILED);
        match mode {
            SettlementMode::Direct => self.direct = resource,
            SettlementMode::Simplified => self.simplified = resource,
        }
    }

    /// Puts both plans back to loading, keeping the chosen mode.
    pub fn reset(&mut self) {
        self.direct = Resource::Loading;
        self.simplified = Resource::Loading;
    }
}

/// Fetches one settlement plan of a group.
pub async fn fetch_settlement<A: SplitApi>(
    api: &A,
    group_id: &str,
    mode: SettlementMode,
) -> Result<Vec<Transaction>, ApiError> {
    api.get_balances(group_id, mode.transitive()).await
}

/// Fetches both plans concurrently into a fresh view in direct mode.
pub async fn load_settlement<A: SplitApi>(api: &A, group_id: &str) -> SettlementView {
    let (direct, simplified) = tokio::join!(
        fetch_settlement(api, group_id, SettlementMode::Direct),
        fetch_settlement(api, group_id, SettlementMode::Simplified),
    );
    let mut view = SettlementView::default();
    view.apply(SettlementMode::Direct, direct);
    view.apply(SettlementMode::Simplified, simplified);
    view
}
