//! Options for the spreadsheet analytics pipeline

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeConfig {
    /// Workbook holding the sales, customers and products sheets
    pub workbook: PathBuf,
    /// Workbook written with the processed rows and the pivot
    pub output: PathBuf,
    pub sheets: SheetNames,
    pub columns: ColumnNames,
    /// Replacement for missing quantities
    pub quantity_default: f64,
    /// Rows shown in each console preview
    pub preview_rows: usize,
    /// Open the interactive chart view (terminal only)
    pub show_charts: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("sales_data.xlsx"),
            output: PathBuf::from("analysis_results.xlsx"),
            sheets: SheetNames::default(),
            columns: ColumnNames::default(),
            quantity_default: 0.0,
            preview_rows: 5,
            show_charts: true,
        }
    }
}

/// Input sheet names and output sheet names
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetNames {
    pub sales: String,
    pub customers: String,
    pub products: String,
    pub processed: String,
    pub pivot: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            sales: "Sales".to_string(),
            customers: "Customers".to_string(),
            products: "Products".to_string(),
            processed: "Processed Sales".to_string(),
            pivot: "PivotTable".to_string(),
        }
    }
}

/// Column names the pipeline reads and derives
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    pub customer_id: String,
    pub product: String,
    pub quantity: String,
    pub price: String,
    pub order_date: String,
    pub region: String,
    pub revenue: String,
    pub month: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            customer_id: "CustomerID".to_string(),
            product: "Product".to_string(),
            quantity: "Quantity".to_string(),
            price: "Price".to_string(),
            order_date: "OrderDate".to_string(),
            region: "Region".to_string(),
            revenue: "TotalRevenue".to_string(),
            month: "Month".to_string(),
        }
    }
}
