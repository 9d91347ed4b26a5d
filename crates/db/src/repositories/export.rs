//! Project export query: one row per project with a twelve-month spread.

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, QueryResult, Statement};

use salesdesk_core::export::{ExportFilter, ExportRow};
use salesdesk_core::project::PostPoStatus;

use crate::filter::export_conditions;

/// Builds the export query; `$1` is the first day of the export year.
fn export_sql(where_clause: &str) -> String {
    let monthly: String = (1..=12)
        .map(|month| {
            format!(
                ",\n        COALESCE(SUM(target_revenue) FILTER (WHERE EXTRACT(MONTH FROM month) = {month}), 0) AS t{month}\
                 ,\n        COALESCE(SUM(target_realization) FILTER (WHERE EXTRACT(MONTH FROM month) = {month}), 0) AS r{month}"
            )
        })
        .collect();

    format!(
        "WITH rp_rng AS (
            SELECT project_id, MIN(month) AS min_month, MAX(month) AS max_month
            FROM project_revenue_plan
            GROUP BY project_id
        ),
        rp_year AS (
            SELECT project_id,
                COALESCE(SUM(target_revenue), 0) AS total_revenue,
                COALESCE(SUM(target_realization), 0) AS total_realization{monthly}
            FROM project_revenue_plan
            WHERE month >= $1::date AND month < ($1::date + INTERVAL '1 year')
            GROUP BY project_id
        )
        SELECT
            p.project_code, p.description, p.division,
            COALESCE(cu.name, '') AS customer,
            p.project_type, p.status, p.sales_stage,
            m.stage1_status, m.stage2_status, m.stage3_status,
            m.stage4_status, m.stage5_status,
            COALESCE(p.sph_release_status, 'No') AS sph_release_status,
            COALESCE(p.sph_status, '') AS sph_status,
            COALESCE(p.sph_status_reason_category, '') AS reason_category,
            COALESCE(p.sph_status_reason_note, '') AS reason_note,
            COALESCE(rp_year.total_revenue, 0) AS total_revenue,
            COALESCE(rp_year.total_realization, 0) AS total_realization{spread}
        FROM projects p
        LEFT JOIN customers cu ON cu.id = p.customer_id
        LEFT JOIN project_postpo_monitoring m ON m.project_id = p.id
        LEFT JOIN rp_rng ON rp_rng.project_id = p.id
        LEFT JOIN rp_year ON rp_year.project_id = p.id
        WHERE {where_clause}
        ORDER BY p.project_code",
        spread = (1..=12)
            .map(|m| {
                format!(
                    ", COALESCE(rp_year.t{m}, 0) AS t{m}, COALESCE(rp_year.r{m}, 0) AS r{m}"
                )
            })
            .collect::<String>(),
    )
}

fn post_po_status(row: &QueryResult, stage: usize) -> Result<PostPoStatus, DbErr> {
    let raw: Option<String> = row.try_get("", &format!("stage{stage}_status"))?;
    Ok(raw
        .as_deref()
        .and_then(PostPoStatus::parse)
        .unwrap_or_default())
}

fn monthly(row: &QueryResult, prefix: char) -> Result<[Decimal; 12], DbErr> {
    let mut values = [Decimal::ZERO; 12];
    for (idx, value) in values.iter_mut().enumerate() {
        *value = row.try_get("", &format!("{prefix}{}", idx + 1))?;
    }
    Ok(values)
}

fn export_row(row: &QueryResult) -> Result<ExportRow, DbErr> {
    let sales_stage: i16 = row.try_get("", "sales_stage")?;
    Ok(ExportRow {
        project_code: row.try_get("", "project_code")?,
        description: row.try_get("", "description")?,
        division: row.try_get("", "division")?,
        customer: row.try_get("", "customer")?,
        project_type: row.try_get("", "project_type")?,
        status: row.try_get("", "status")?,
        sales_stage: i32::from(sales_stage),
        post_po: [
            post_po_status(row, 1)?,
            post_po_status(row, 2)?,
            post_po_status(row, 3)?,
            post_po_status(row, 4)?,
            post_po_status(row, 5)?,
        ],
        sph_release_status: row.try_get("", "sph_release_status")?,
        sph_status: row.try_get("", "sph_status")?,
        reason_category: row.try_get("", "reason_category")?,
        reason_note: row.try_get("", "reason_note")?,
        total_revenue: row.try_get("", "total_revenue")?,
        total_realization: row.try_get("", "total_realization")?,
        targets: monthly(row, 't')?,
        realizations: monthly(row, 'r')?,
    })
}

/// Export repository.
#[derive(Debug, Clone)]
pub struct ExportRepository {
    db: DatabaseConnection,
}

impl ExportRepository {
    /// Creates a new export repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads export rows ordered by project code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a column cannot be decoded.
    pub async fn rows(&self, filter: &ExportFilter) -> Result<Vec<ExportRow>, DbErr> {
        let conds = export_conditions(filter);
        let sql = export_sql(&conds.clause());
        let results = self
            .db
            .query_all(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                conds.values(),
            ))
            .await?;

        tracing::debug!(year = filter.year, rows = results.len(), "Export rows loaded");
        results.iter().map(export_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_sql_spreads_twelve_months() {
        let sql = export_sql("1=1");
        for month in 1..=12 {
            assert!(sql.contains(&format!(" AS t{month}")));
            assert!(sql.contains(&format!(" AS r{month}")));
        }
        assert!(!sql.contains(" AS t13"));
    }

    #[test]
    fn test_export_sql_bounds_year_by_first_placeholder() {
        let sql = export_sql("p.division = $2");
        assert!(sql.contains("month >= $1::date AND month < ($1::date + INTERVAL '1 year')"));
        assert!(sql.contains("WHERE p.division = $2"));
        assert!(sql.trim_end().ends_with("ORDER BY p.project_code"));
    }
}
