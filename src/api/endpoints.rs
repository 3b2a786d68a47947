//! Builds the URLs of the EzPay service from the one configured base URL.

use crate::model::date::format_date;
use crate::model::{CompositeFilter, DateRange, TransactionId, TransactionStatus, TransactionType};
use crate::Result;
use anyhow::{bail, Context};
use url::Url;

const TRANSACTIONS: &str = "transactions";
const SCHEDULED_PAYMENTS: [&str; 2] = ["api", "scheduled-payments"];

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Validates `base_url`. Any path it carries is kept as a prefix, query and fragment are dropped.
    pub(crate) fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url.trim())
            .with_context(|| format!("The base URL '{base_url}' is not a valid URL"))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!(
                "The base URL '{base_url}' must use http or https, not '{}'",
                base.scheme()
            );
        }
        if base.cannot_be_a_base() {
            bail!("The base URL '{base_url}' cannot have paths appended to it");
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was ruled out in new, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn transactions<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        self.url(std::iter::once(TRANSACTIONS).chain(segments))
    }

    fn scheduled<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        self.url(SCHEDULED_PAYMENTS.into_iter().chain(segments))
    }

    pub(crate) fn history(&self) -> Url {
        self.transactions(["history"])
    }

    pub(crate) fn by_id(&self, id: &TransactionId) -> Url {
        self.transactions([id.as_str()])
    }

    pub(crate) fn filter_by_type(&self, transaction_type: TransactionType) -> Url {
        let mut url = self.transactions(["filterByType"]);
        url.query_pairs_mut()
            .append_pair("type", &transaction_type.to_string());
        url
    }

    pub(crate) fn filter_by_status(&self, status: TransactionStatus) -> Url {
        let mut url = self.transactions(["filterByStatus"]);
        url.query_pairs_mut()
            .append_pair("status", &status.to_string());
        url
    }

    pub(crate) fn filter_by_date_range(&self, range: &DateRange) -> Url {
        let mut url = self.transactions(["filterByDateRange"]);
        url.query_pairs_mut()
            .append_pair("startDate", &format_date(&range.start()))
            .append_pair("endDate", &format_date(&range.end()));
        url
    }

    pub(crate) fn filter_by_multiple(&self, filter: &CompositeFilter) -> Url {
        let mut url = self.transactions(["filterByMultipleFilters"]);
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        url
    }

    pub(crate) fn scheduled_payments(&self) -> Url {
        self.scheduled(["ScheduledPaymentsHistory"])
    }

    pub(crate) fn scheduled_payment(&self, id: &TransactionId) -> Url {
        self.scheduled([id.as_str()])
    }

    pub(crate) fn modify_scheduled_payment(&self, id: &TransactionId) -> Url {
        self.scheduled(["modify", id.as_str()])
    }

    pub(crate) fn cancel_scheduled_payment(&self, id: &TransactionId) -> Url {
        self.scheduled(["cancel", id.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn endpoints() -> Endpoints {
        Endpoints::new("http://localhost:8090").unwrap()
    }

    #[test]
    fn test_rejects_bad_base() {
        assert!(Endpoints::new("not a url").is_err());
        assert!(Endpoints::new("ftp://localhost").is_err());
        assert!(Endpoints::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_history_and_by_id() {
        let e = endpoints();
        assert_eq!(e.history().as_str(), "http://localhost:8090/transactions/history");
        assert_eq!(
            e.by_id(&TransactionId::new("42")).as_str(),
            "http://localhost:8090/transactions/42"
        );
    }

    #[test]
    fn test_id_is_a_single_segment() {
        let url = endpoints().by_id(&TransactionId::new("../history"));
        assert_eq!(url.path(), "/transactions/..%2Fhistory");
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let e = Endpoints::new("https://pay.example.com/ezpay/?debug=1").unwrap();
        assert_eq!(
            e.history().as_str(),
            "https://pay.example.com/ezpay/transactions/history"
        );
    }

    #[test]
    fn test_filter_by_type() {
        let e = endpoints();
        assert_eq!(e.filter_by_type(TransactionType::Upi).query(), Some("type=UPI"));
        assert_eq!(
            e.filter_by_type(TransactionType::BankTransfer).query(),
            Some("type=Bank+Transfer")
        );
    }

    #[test]
    fn test_filter_by_status() {
        let url = endpoints().filter_by_status(TransactionStatus::Processing);
        assert_eq!(url.path(), "/transactions/filterByStatus");
        assert_eq!(url.query(), Some("status=Processing"));
    }

    #[test]
    fn test_filter_by_date_range() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
            today,
        )
        .unwrap();
        let url = endpoints().filter_by_date_range(&range);
        assert_eq!(url.query(), Some("startDate=2024-09-01&endDate=2024-09-30"));
    }

    #[test]
    fn test_filter_by_multiple() {
        let filter = CompositeFilter {
            transaction_type: Some(TransactionType::Upi),
            end_date: NaiveDate::from_ymd_opt(2024, 9, 30),
            ..Default::default()
        };
        let url = endpoints().filter_by_multiple(&filter);
        assert_eq!(url.path(), "/transactions/filterByMultipleFilters");
        assert_eq!(url.query(), Some("type=UPI&endDate=2024-09-30"));

        let url = endpoints().filter_by_multiple(&CompositeFilter::default());
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_scheduled_payment_urls() {
        let e = endpoints();
        let id = TransactionId::new("7");
        assert_eq!(
            e.scheduled_payments().path(),
            "/api/scheduled-payments/ScheduledPaymentsHistory"
        );
        assert_eq!(e.scheduled_payment(&id).path(), "/api/scheduled-payments/7");
        assert_eq!(
            e.modify_scheduled_payment(&id).path(),
            "/api/scheduled-payments/modify/7"
        );
        assert_eq!(
            e.cancel_scheduled_payment(&id).path(),
            "/api/scheduled-payments/cancel/7"
        );
    }
}
