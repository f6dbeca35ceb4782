use std::collections::BTreeSet;

use crate::coerce;
use crate::connection::ConnectionProvider;
use crate::departments::DepartmentDirectory;
use crate::error::Result;
use crate::sql_builder::SqlBuilder;

pub struct DepartmentQuery<'a> {
    warehouse: &'a dyn ConnectionProvider,
    directory: &'a DepartmentDirectory,
}

impl<'a> DepartmentQuery<'a> {
    pub fn new(warehouse: &'a dyn ConnectionProvider, directory: &'a DepartmentDirectory) -> Self {
        Self {
            warehouse,
            directory,
        }
    }

    /// Distinct canonical restaurant names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let (sql, params) = SqlBuilder::new("restaurants")
            .distinct()
            .select(&["name"])
            .where_clause("name IS NOT NULL", &[])
            .build();
        let rows = self.warehouse.query(&sql, &params)?;
        let names: BTreeSet<String> = rows
            .iter()
            .filter_map(|row| coerce::to_key(row.get("name")))
            .map(|name| self.directory.canonical_name(&name))
            .collect();
        Ok(names.into_iter().collect())
    }
}
