//! SQL builder with parameterized query construction.
//!
//! Every caller-supplied value goes through `?` placeholders, never through
//! string interpolation. Dates are validated by [`crate::dates`] before they
//! get here. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use chain_dashboard::SqlBuilder;
//! use chain_dashboard::dates::DateRange;
//!
//! let range = DateRange::parse("2024-05-01", "2024-05-31").unwrap();
//! let (sql, params) = SqlBuilder::new("sales")
//!     .select(&["department AS key", "SUM(total_excl_vat) AS value"])
//!     .where_date_between("sale_date", &range)
//!     .where_eq("sales_type", "PosSale")
//!     .group_by(&["department"])
//!     .build();
//! assert_eq!(params, vec!["2024-05-01", "2024-05-31", "PosSale"]);
//! ```

use crate::dates::DateRange;

/// Builds parameterized SQL queries.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    is_distinct: bool,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table or view (with optional alias).
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            is_distinct: false,
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add DISTINCT to the SELECT clause.
    pub fn distinct(&mut self) -> &mut Self {
        self.is_distinct = true;
        self
    }

    /// Add a JOIN clause, e.g. `"LEFT JOIN restaurants r ON b.restaurant_id = r.id"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add a NULL-tolerant negative LIKE: `({column} IS NULL OR {column} NOT LIKE ?)`.
    pub fn where_not_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.where_clauses
            .push(format!("({0} IS NULL OR {0} NOT LIKE ?)", column));
        self.params.push(pattern.to_string());
        self
    }

    /// Restrict a date or timestamp expression to an inclusive date range.
    ///
    /// The expression goes through `TRY_CAST(... AS TIMESTAMP)` first, so
    /// text columns holding ISO dates or timestamps work as well as native
    /// DATE/TIMESTAMP columns. Unparseable values never match.
    pub fn where_date_between(&mut self, expr: &str, range: &DateRange) -> &mut Self {
        let (start, end) = range.params();
        self.where_clauses.push(format!(
            "CAST(TRY_CAST({0} AS TIMESTAMP) AS DATE) BETWEEN CAST(? AS DATE) AND CAST(? AS DATE)",
            expr
        ));
        self.params.push(start);
        self.params.push(end);
        self
    }

    /// Add GROUP BY columns.
    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols
            .extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let distinct = if self.is_distinct { "DISTINCT " } else { "" };
        let cols = self.select_cols.join(", ");
        let mut parts = vec![
            format!("SELECT {}{}", distinct, cols),
            format!("FROM {}", self.from_table),
        ];

        for j in &self.joins {
            parts.push(j.clone());
        }

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        (parts.join("\n"), self.params.clone())
    }
}
