//! SQLite implementations of the collaborator ports.

use async_trait::async_trait;
use tracing::debug;

use harbor_core::accounting::AccountMap;
use harbor_core::session::StoreAccess;
use harbor_core::settlement::CustomerCredit;
use harbor_core::{SaleReturn, SaleReturnRecord};
use harbor_db::{CustomerBalanceRepository, JournalRepository, SaleReturnRepository, StoreRepository};

use crate::error::BackofficeResult;
use crate::ports::{CustomerBalanceService, JournalService, SaleReturnSource, StoreDirectory};

#[async_trait]
impl SaleReturnSource for SaleReturnRepository {
    async fn find_with_sale(&self, sale_return_id: &str) -> BackofficeResult<Option<SaleReturnRecord>> {
        Ok(SaleReturnRepository::find_with_sale(self, sale_return_id).await?)
    }
}

#[async_trait]
impl JournalService for JournalRepository {
    async fn create_for_sale_return(
        &self,
        sale_return: &SaleReturn,
        map: &AccountMap,
    ) -> BackofficeResult<()> {
        let outcome = self.post_sale_return(sale_return, map).await?;
        if !outcome.was_created() {
            debug!(
                sale_return_id = %sale_return.id,
                entry_id = %outcome.entry().id,
                "Sale return already posted, skipping"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl CustomerBalanceService for CustomerBalanceRepository {
    async fn credit(&self, credit: &CustomerCredit) -> BackofficeResult<()> {
        CustomerBalanceRepository::credit(self, credit).await?;
        Ok(())
    }
}

#[async_trait]
impl StoreDirectory for StoreRepository {
    async fn store_access(&self, user_id: &str) -> BackofficeResult<StoreAccess> {
        Ok(StoreRepository::store_access(self, user_id).await?)
    }
}
