//! Spreadsheet analytics: clean and enrich the sales sheet, summarise revenue,
//! chart it and export the results

use std::path::PathBuf;

use colored::*;

use crate::chart::{self, ChartSpec};
use crate::config::AnalyzeConfig;
use crate::error::{EtlError, EtlResult};
use crate::extract::read_sheets;
use crate::load::WorkbookWriter;
use crate::table::{Dataset, PivotTable, Summary, Value};
use crate::transform::{
    add_month_column, drop_duplicates, expected_join_rows, fill_missing, left_join, monthly_sum, multiply_columns,
    parse_datetimes, pivot_sum, sum_by,
};

/// Everything the transform step produces
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Cleaned sales rows joined with customers and prices, with revenue
    pub processed: Dataset,
    /// Revenue per region (rows) and product (columns)
    pub pivot: PivotTable,
    pub revenue_by_product: Summary,
    pub monthly_revenue: Summary,
    pub duplicates_removed: usize,
    pub quantities_filled: usize,
}

/// Outcome of a full run, for the caller to print
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub sales_rows: usize,
    pub customer_rows: usize,
    pub product_rows: usize,
    pub duplicates_removed: usize,
    pub quantities_filled: usize,
    pub processed_rows: usize,
    pub total_revenue: f64,
    pub output: PathBuf,
    pub charts_shown: bool,
}

/// Read the input workbook, transform, chart and export
pub fn run(config: &AnalyzeConfig) -> EtlResult<AnalysisReport> {
    let sheets = &config.sheets;
    let [sales, customers, products]: [Dataset; 3] = read_sheets(
        &config.workbook,
        &[&sheets.sales, &sheets.customers, &sheets.products].map(String::as_str),
    )?
    .try_into()
    .map_err(|_| EtlError::malformed(config.workbook.display().to_string(), "expected three sheets"))?;

    log::info!(
        "Read {} sales, {} customer and {} product rows from {}",
        sales.len(),
        customers.len(),
        products.len(),
        config.workbook.display()
    );

    print_preview("Sales Data", &sales, config.preview_rows);
    print_preview("Customers Data", &customers, config.preview_rows);
    print_preview("Products Data", &products, config.preview_rows);

    let (sales_rows, customer_rows, product_rows) = (sales.len(), customers.len(), products.len());
    let analysis = transform(sales, &customers, &products, config)?;

    let pivot = &analysis.pivot;
    print_preview(
        &format!(
            "Pivot Table ({} by {} and {})",
            pivot.measure, pivot.row_dimension, pivot.column_dimension
        ),
        &pivot.to_dataset(),
        usize::MAX,
    );
    print_preview(
        "Revenue by Product",
        &analysis.revenue_by_product.to_dataset(),
        usize::MAX,
    );

    let charts_shown = if config.show_charts {
        let charts = [
            ChartSpec::bar("Total Revenue by Product", &analysis.revenue_by_product),
            ChartSpec::line("Monthly Sales Trend", &analysis.monthly_revenue),
        ];
        match chart::show_charts(&charts) {
            Ok(shown) => shown,
            Err(e) => {
                log::warn!("Could not display charts: {}", e);
                false
            }
        }
    } else {
        log::debug!("Charts disabled");
        false
    };

    let mut writer = WorkbookWriter::new();
    writer.add_dataset(&sheets.processed, &analysis.processed)?;
    writer.add_dataset(&sheets.pivot, &analysis.pivot.to_dataset())?;
    writer.save(&config.output)?;

    Ok(AnalysisReport {
        sales_rows,
        customer_rows,
        product_rows,
        duplicates_removed: analysis.duplicates_removed,
        quantities_filled: analysis.quantities_filled,
        processed_rows: analysis.processed.len(),
        total_revenue: analysis.revenue_by_product.total(),
        output: config.output.clone(),
        charts_shown,
    })
}

/// Clean, join, derive and aggregate. No I/O.
pub fn transform(
    mut sales: Dataset,
    customers: &Dataset,
    products: &Dataset,
    config: &AnalyzeConfig,
) -> EtlResult<Analysis> {
    let cols = &config.columns;

    let duplicates_removed = drop_duplicates(&mut sales);
    let quantities_filled = fill_missing(
        &mut sales,
        &cols.quantity,
        Value::Float(config.quantity_default),
    )?;
    parse_datetimes(&mut sales, &cols.order_date)?;
    log::info!(
        "Cleaned sales: {} duplicates removed, {} missing quantities filled",
        duplicates_removed,
        quantities_filled
    );

    let with_customers = left_join(&sales, customers, &cols.customer_id)?;
    let prices = products.select(&[cols.product.as_str(), cols.price.as_str()])?;
    let expected = expected_join_rows(&with_customers, &prices, &cols.product)?;
    if expected > with_customers.len() {
        log::warn!(
            "Price lookup will turn {} sales rows into {}; revenue totals include the repeats",
            with_customers.len(),
            expected
        );
    }
    let mut processed = left_join(&with_customers, &prices, &cols.product)?;
    log::info!("Joined sales with customers and products: {} rows", processed.len());

    multiply_columns(&mut processed, &cols.quantity, &cols.price, &cols.revenue)?;

    let pivot = pivot_sum(&processed, &cols.revenue, &cols.region, &cols.product)?;
    let revenue_by_product = sum_by(&processed, &cols.revenue, &cols.product)?;
    let monthly_revenue = monthly_sum(&processed, &cols.revenue, &cols.order_date)?;

    add_month_column(&mut processed, &cols.order_date, &cols.month)?;

    Ok(Analysis {
        processed,
        pivot,
        revenue_by_product,
        monthly_revenue,
        duplicates_removed,
        quantities_filled,
    })
}

fn print_preview(title: &str, dataset: &Dataset, rows: usize) {
    println!("{}", format!("{}:", title).bold().cyan());
    println!("{}", dataset.preview(rows));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> Value {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().into()
    }

    fn sales() -> Dataset {
        Dataset::from_rows(
            ["CustomerID", "Product", "Quantity", "OrderDate"],
            vec![
                vec![Value::Float(1.0), "A".into(), Value::Float(2.0), day(2024, 1, 15)],
                vec![Value::Float(2.0), "B".into(), Value::Null, "2024-02-03".into()],
            ],
        )
    }

    fn customers() -> Dataset {
        Dataset::from_rows(
            ["CustomerID", "Name", "Region"],
            vec![
                vec![Value::Float(1.0), "X".into(), "East".into()],
                vec![Value::Float(2.0), "Y".into(), "West".into()],
            ],
        )
    }

    fn products() -> Dataset {
        Dataset::from_rows(
            ["Product", "Category", "Price"],
            vec![
                vec!["A".into(), "Tools".into(), Value::Float(10.0)],
                vec!["B".into(), "Toys".into(), Value::Float(5.0)],
            ],
        )
    }

    #[test]
    fn test_worked_example() {
        let analysis =
            transform(sales(), &customers(), &products(), &AnalyzeConfig::default()).unwrap();
        let processed = &analysis.processed;

        assert_eq!(analysis.quantities_filled, 1);
        assert_eq!(processed.len(), 2);
        assert_eq!(
            processed.columns(),
            &[
                "CustomerID",
                "Product",
                "Quantity",
                "OrderDate",
                "Name",
                "Region",
                "Price",
                "TotalRevenue",
                "Month"
            ]
        );
        assert_eq!(processed.get(0, "Name"), Some(&Value::Text("X".into())));
        assert_eq!(processed.get(0, "Price"), Some(&Value::Float(10.0)));
        assert_eq!(processed.get(0, "TotalRevenue"), Some(&Value::Float(20.0)));
        assert_eq!(processed.get(1, "Name"), Some(&Value::Text("Y".into())));
        assert_eq!(processed.get(1, "Price"), Some(&Value::Float(5.0)));
        assert_eq!(processed.get(1, "TotalRevenue"), Some(&Value::Float(0.0)));
        assert_eq!(processed.get(1, "Month"), Some(&Value::Text("February".into())));

        assert_eq!(analysis.revenue_by_product.get("A"), Some(20.0));
        assert_eq!(analysis.revenue_by_product.get("B"), Some(0.0));
        assert_eq!(
            analysis.pivot.column_totals(),
            vec![("A".to_string(), 20.0), ("B".to_string(), 0.0)]
        );
        assert_eq!(
            analysis.monthly_revenue.groups,
            vec![("January".to_string(), 20.0), ("February".to_string(), 0.0)]
        );
    }

    #[test]
    fn test_pivot_total_matches_revenue_total() {
        let mut sales = sales();
        sales.push_row(vec![Value::Float(1.0), "B".into(), Value::Float(3.0), day(2024, 3, 1)]);
        // exact duplicate, dropped before joining
        sales.push_row(vec![Value::Float(1.0), "B".into(), Value::Float(3.0), day(2024, 3, 1)]);

        let analysis =
            transform(sales, &customers(), &products(), &AnalyzeConfig::default()).unwrap();

        let revenue_total: f64 = analysis
            .processed
            .column_values("TotalRevenue")
            .unwrap()
            .filter_map(Value::as_float)
            .sum();

        assert_eq!(analysis.duplicates_removed, 1);
        assert_eq!(revenue_total, 35.0);
        assert_eq!(analysis.pivot.grand_total(), revenue_total);
        assert_eq!(analysis.revenue_by_product.total(), revenue_total);
        assert_eq!(analysis.pivot.get("East", "B"), Some(15.0));
    }

    #[test]
    fn test_duplicate_product_rows_inflate_revenue() {
        let mut products = products();
        products.push_row(vec!["A".into(), "Tools".into(), Value::Float(10.0)]);

        let analysis =
            transform(sales(), &customers(), &products, &AnalyzeConfig::default()).unwrap();

        assert_eq!(analysis.processed.len(), 3);
        assert_eq!(analysis.revenue_by_product.get("A"), Some(40.0));
    }

    #[test]
    fn test_unparseable_order_date() {
        let mut sales = sales();
        sales.push_row(vec![Value::Float(1.0), "A".into(), Value::Float(1.0), "soon".into()]);

        let err = transform(sales, &customers(), &products(), &AnalyzeConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), "MalformedInput");
    }

    #[test]
    fn test_run_exports_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sales_data.xlsx");
        let output = dir.path().join("analysis_results.xlsx");

        let mut writer = WorkbookWriter::new();
        writer.add_dataset("Sales", &sales()).unwrap();
        writer.add_dataset("Customers", &customers()).unwrap();
        writer.add_dataset("Products", &products()).unwrap();
        writer.save(&input).unwrap();

        let config = AnalyzeConfig {
            workbook: input,
            output: output.clone(),
            show_charts: false,
            ..AnalyzeConfig::default()
        };
        let report = run(&config).unwrap();

        assert_eq!(report.sales_rows, 2);
        assert_eq!(report.processed_rows, 2);
        assert_eq!(report.total_revenue, 20.0);
        assert!(!report.charts_shown);

        let sheets = read_sheets(&output, &["Processed Sales", "PivotTable"]).unwrap();
        assert_eq!(sheets[0].len(), 2);
        assert_eq!(sheets[1].columns(), &["Region", "A", "B"]);
        assert_eq!(sheets[1].get(0, "A"), Some(&Value::Float(20.0)));
    }

    #[test]
    fn test_missing_input_workbook() {
        let config = AnalyzeConfig {
            workbook: PathBuf::from("/nonexistent/sales_data.xlsx"),
            show_charts: false,
            ..AnalyzeConfig::default()
        };
        assert_eq!(run(&config).unwrap_err().kind(), "SourceUnavailable");
    }
}
