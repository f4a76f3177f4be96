//! # Return Settlement Service
//!
//! Reacts to a sale return: posts its journal entry and, when the
//! configured policy says so, credits the customer.
//!
//! ## Flow
//! ```text
//! handle(sale_return_id)
//!   │
//!   ▼
//! source.find_with_sale(id) ──None──► Ok(())   (stale event, nothing to do)
//!   │ Some(record)
//!   ▼
//! journal.create_for_sale_return(&record.sale_return, &accounting.map)
//!   │                              (dedupes by sale return id)
//!   ▼
//! plan_settlement(&record, policy) ──None──► Ok(())
//!   │ Some(credit)
//!   ▼
//! balances.credit(&credit)                  (NOT deduped)
//!   │
//!   ▼
//! Ok(())
//! ```
//!
//! Every collaborator error is returned unchanged. There is no retry here;
//! redelivery belongs to whoever publishes the event. Because the credit
//! step is additive, a redelivered event credits the customer again.

use std::sync::Arc;
use tracing::{debug, info};

use harbor_core::settlement::plan_settlement;

use crate::config::AccountingConfig;
use crate::error::BackofficeResult;
use crate::ports::{CustomerBalanceService, JournalService, SaleReturnSource};

pub struct ReturnSettlementService {
    source: Arc<dyn SaleReturnSource>,
    journal: Arc<dyn JournalService>,
    balances: Arc<dyn CustomerBalanceService>,
    accounting: AccountingConfig,
}

impl ReturnSettlementService {
    pub fn new(
        source: Arc<dyn SaleReturnSource>,
        journal: Arc<dyn JournalService>,
        balances: Arc<dyn CustomerBalanceService>,
        accounting: AccountingConfig,
    ) -> Self {
        ReturnSettlementService {
            source,
            journal,
            balances,
            accounting,
        }
    }

    /// Settles one sale return.
    pub async fn handle(&self, sale_return_id: &str) -> BackofficeResult<()> {
        let Some(record) = self.source.find_with_sale(sale_return_id).await? else {
            debug!(sale_return_id = %sale_return_id, "Sale return not found, ignoring event");
            return Ok(());
        };

        self.journal
            .create_for_sale_return(&record.sale_return, &self.accounting.map)
            .await?;

        let policy = self.accounting.settlement_policy();
        match plan_settlement(&record, policy) {
            Some(credit) => {
                self.balances.credit(&credit).await?;
                info!(
                    sale_return_id = %sale_return_id,
                    customer_id = %credit.customer_id,
                    amount = %credit.amount,
                    "Sale return settled as customer credit"
                );
            }
            None => {
                info!(
                    sale_return_id = %sale_return_id,
                    policy = %policy,
                    has_customer = record.customer_id().is_some(),
                    "Sale return posted without customer credit"
                );
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
