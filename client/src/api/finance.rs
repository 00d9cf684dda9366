use chrono::NaiveDate;
use staymate_types::{
    AdminFinancialSummary, Earning, EarningsQuery, EarningsSummary, Page, PageRequest, Payment,
    PayoutMethod, PayoutMethodId, PayoutMethodRequest, PayoutRequest, PayoutRequestId,
    PayoutStatus, SpendingSummary,
};

use crate::{ApiClient, ApiRequest, ClientError};

/// Optional inclusive date bounds for the admin reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    fn to_query(self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(start) = self.start {
            out.push(("startDate", start.to_string()));
        }
        if let Some(end) = self.end {
            out.push(("endDate", end.to_string()));
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FinanceApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FinanceApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn earnings_summary(&self) -> Result<EarningsSummary, ClientError> {
        self.client.send_json(ApiRequest::get("/api/finance/earnings")).await
    }

    pub async fn earnings_history(
        &self,
        filter: &EarningsQuery,
        page: PageRequest,
    ) -> Result<Page<Earning>, ClientError> {
        let req = ApiRequest::get("/api/finance/history")
            .query_pairs(filter.to_query())
            .query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    pub async fn my_payments(&self, page: PageRequest) -> Result<Page<Payment>, ClientError> {
        let req = ApiRequest::get("/api/finance/my-payments").query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    pub async fn spending_summary(&self) -> Result<SpendingSummary, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/finance/my-spending-summary"))
            .await
    }

    pub async fn payout_methods(&self) -> Result<Vec<PayoutMethod>, ClientError> {
        self.client
            .send_json(ApiRequest::get("/api/finance/payout-methods"))
            .await
    }

    pub async fn add_payout_method(
        &self,
        request: &PayoutMethodRequest,
    ) -> Result<PayoutMethod, ClientError> {
        let req = ApiRequest::post("/api/finance/payout-methods").json(request)?;
        self.client.send_json(req).await
    }

    pub async fn delete_payout_method(&self, id: PayoutMethodId) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::delete(format!("/api/finance/payout-methods/{id}")))
            .await
    }

    /// Request payout of the whole available balance.
    pub async fn request_payout(&self) -> Result<(), ClientError> {
        self.client
            .send_empty(ApiRequest::post("/api/finance/payout-requests"))
            .await
    }

    pub async fn all_payments(&self, page: PageRequest) -> Result<Page<Payment>, ClientError> {
        let req = ApiRequest::get("/api/finance/admin/payments").query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    pub async fn all_earnings(&self, page: PageRequest) -> Result<Page<Earning>, ClientError> {
        let req = ApiRequest::get("/api/finance/admin/earnings").query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    pub async fn payout_requests(
        &self,
        status: Option<PayoutStatus>,
        page: PageRequest,
    ) -> Result<Page<PayoutRequest>, ClientError> {
        let req = ApiRequest::get("/api/finance/admin/payout-requests")
            .query_opt("status", status.map(PayoutStatus::as_str))
            .query_pairs(page.to_query());
        self.client.send_json(req).await
    }

    pub async fn process_payout_request(
        &self,
        id: PayoutRequestId,
        status: PayoutStatus,
        notes: Option<&str>,
    ) -> Result<(), ClientError> {
        if status == PayoutStatus::Unknown {
            return Err(ClientError::InvalidRequest("unknown payout status".into()));
        }
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        let req = ApiRequest::post(format!("/api/finance/admin/payout-requests/{id}/process"))
            .query("status", status.as_str())
            .query_opt("notes", notes);
        self.client.send_empty(req).await
    }

    pub async fn admin_summary(&self, range: DateRange) -> Result<AdminFinancialSummary, ClientError> {
        let req = ApiRequest::get("/api/finance/admin/summary").query_pairs(range.to_query());
        self.client.send_json(req).await
    }

    /// Chart data for the admin analytics view, passed through untyped.
    pub async fn analytics(&self, range: DateRange) -> Result<serde_json::Value, ClientError> {
        let req = ApiRequest::get("/api/finance/admin/analytics").query_pairs(range.to_query());
        self.client.send_json(req).await
    }

    /// Earnings report as CSV bytes.
    pub async fn export_csv(&self) -> Result<Vec<u8>, ClientError> {
        self.client
            .send_bytes(ApiRequest::get("/api/finance/export"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_only_sends_set_bounds() {
        let range = DateRange {
            start: None,
            end: NaiveDate::from_ymd_opt(2026, 6, 30),
        };
        assert_eq!(range.to_query(), vec![("endDate", "2026-06-30".to_string())]);
        assert!(DateRange::default().to_query().is_empty());
    }
}
