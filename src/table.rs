//! A simple text table for terminal output.

use crate::model::{ScheduledPayment, Transaction};
use crate::paginate::Paginator;
use chrono::NaiveDateTime;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Table {
            col_widths: headers.iter().map(|h| h.chars().count()).collect(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Adds a row. Cells beyond the number of headers are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        for (width, cell) in self.col_widths.iter_mut().zip(&row) {
            *width = (*width).max(cell.chars().count());
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut output = self.render_row(&self.headers);
        output.push('\n');
        output.push_str(&self.render_separator());
        output.push('\n');
        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }
        output
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = self
            .col_widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{cell:<width$}")
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

/// Renders the current page of transactions with a `Page k/n (N transactions)` footer, followed by
/// the `--page` values that reach the neighbouring pages.
pub fn transaction_page(paginator: &Paginator<Transaction>) -> String {
    let mut table = Table::new(&["ID", "Date", "Type", "Amount", "Receiver", "Status"]);
    for tx in paginator.current_items() {
        table.add_row(vec![
            tx.id().to_string(),
            tx.date().to_string(),
            tx.transaction_type().to_string(),
            tx.amount().to_string(),
            tx.receiver().to_string(),
            tx.status().to_string(),
        ]);
    }
    format!("{}{}", table.render(), footer(paginator))
}

fn footer<T>(paginator: &Paginator<T>) -> String {
    let noun = if paginator.len() == 1 {
        "transaction"
    } else {
        "transactions"
    };
    let mut footer = format!(
        "Page {}/{} ({} {noun})",
        paginator.current_page(),
        paginator.total_pages(),
        paginator.len()
    );
    if let Some(page) = paginator.previous_page() {
        footer.push_str(&format!(" | previous: --page {page}"));
    }
    if let Some(page) = paginator.next_page() {
        footer.push_str(&format!(" | next: --page {page}"));
    }
    footer
}

pub fn scheduled_payments(payments: &[ScheduledPayment], now: NaiveDateTime) -> String {
    let mut table = Table::new(&[
        "ID",
        "Amount",
        "Frequency",
        "Next Payment",
        "End Date",
        "To",
        "Status",
    ]);
    for p in payments {
        table.add_row(vec![
            p.id().to_string(),
            p.amount().to_string(),
            p.frequency().to_string(),
            p.next_payment_date().date().to_string(),
            p.end_date().date().to_string(),
            p.destination_account().to_string(),
            p.status(now).to_string(),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Backend, TestBackend};

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(&["Name", "Age"]);
        table.add_row(vec!["Alice".to_string(), "30".to_string()]);
        table.add_row(vec!["Bob".to_string()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Name  | Age");
        assert_eq!(lines[1], "------+----");
        assert_eq!(lines[2], "Alice | 30");
        assert_eq!(lines[3], "Bob   |");
    }

    #[tokio::test]
    async fn test_transaction_page_footer() {
        let backend = TestBackend::seeded().unwrap();
        let mut paginator = Paginator::default();
        paginator.set_items(backend.history().await.unwrap());
        paginator.select(3).unwrap();
        let rendered = transaction_page(&paginator);
        assert!(rendered.contains("1011"));
        assert!(rendered.contains("Rs. 120,000.00"));
        assert!(!rendered.contains("1001 "));
        assert!(rendered.ends_with("Page 3/3 (12 transactions) | previous: --page 2"));

        paginator.select(2).unwrap();
        assert!(transaction_page(&paginator)
            .ends_with("Page 2/3 (12 transactions) | previous: --page 1 | next: --page 3"));

        let first = paginator.current_items()[..1].to_vec();
        paginator.set_items(first);
        assert!(transaction_page(&paginator).ends_with("Page 1/1 (1 transaction)"));
    }
}
