use serde::{Deserialize, Serialize};

/// The family of database a statement is bound for.
///
/// Drivers disagree on how some values are represented, these differences
/// are keyed by the dialect rather than the raw product name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Oracle,
    MySql,
    PostgreSql,
    MsSql,
    Other,
}

impl Dialect {
    /// Resolves the dialect from the product name reported by the driver
    pub fn from_product_name(name: &str) -> Self {
        let name = name.to_lowercase();

        if name.contains("oracle") {
            Self::Oracle
        } else if name.contains("mysql") || name.contains("mariadb") {
            Self::MySql
        } else if name.contains("postgres") {
            Self::PostgreSql
        } else if name.contains("microsoft sql server") || name.contains("sql server") {
            Self::MsSql
        } else {
            Self::Other
        }
    }

    /// Whether dates are bound as their textual representation
    pub fn binds_date_as_string(&self) -> bool {
        matches!(self, Dialect::Oracle | Dialect::MySql)
    }

    /// Whether times are bound as their textual representation,
    /// oracle only accepts these when binding batched statements
    pub fn binds_time_as_string(&self, batched: bool) -> bool {
        match self {
            Dialect::MySql => true,
            Dialect::Oracle => batched,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_product_name() {
        assert_eq!(Dialect::from_product_name("Oracle"), Dialect::Oracle);
        assert_eq!(Dialect::from_product_name("MySQL"), Dialect::MySql);
        assert_eq!(Dialect::from_product_name("MariaDB"), Dialect::MySql);
        assert_eq!(Dialect::from_product_name("PostgreSQL"), Dialect::PostgreSql);
        assert_eq!(
            Dialect::from_product_name("Microsoft SQL Server"),
            Dialect::MsSql
        );
        assert_eq!(Dialect::from_product_name("SQLite"), Dialect::Other);
    }

    #[test]
    fn test_dialect_temporal_rules() {
        assert!(Dialect::Oracle.binds_date_as_string());
        assert!(Dialect::MySql.binds_date_as_string());
        assert!(!Dialect::PostgreSql.binds_date_as_string());

        assert!(Dialect::MySql.binds_time_as_string(false));
        assert!(!Dialect::Oracle.binds_time_as_string(false));
        assert!(Dialect::Oracle.binds_time_as_string(true));
        assert!(!Dialect::MsSql.binds_time_as_string(true));
    }
}
