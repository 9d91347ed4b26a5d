//! Dashboard aggregation queries.
//!
//! Every project query shares the same `WHERE` built from a
//! [`ProjectFilter`] over `projects p`, `customers c` and
//! `project_revenue_plan r`.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement};

use salesdesk_core::dashboard::{
    BreakdownItem, BudgetFilter, BudgetTotals, CustomerRow, DashboardKpis, DashboardResponse,
    DashboardTotals, ForecastPoint, KpiSums, Pipeline, ProjectFilter, StageRow, TopProject,
};

use crate::filter::{SqlConditions, budget_conditions, project_conditions};

const PROJECT_JOINS: &str = r"
FROM projects p
LEFT JOIN customers c ON c.id = p.customer_id
LEFT JOIN project_revenue_plan r ON r.project_id = p.id
";

const ACTIVE: &str = "p.status IN ('Prospect', 'Carry Over')";

#[derive(Debug, FromQueryResult)]
struct KpiRow {
    total_sales_real: Decimal,
    baseline_target: Decimal,
    carry_real: Decimal,
    carry_target: Decimal,
    pb_real: Decimal,
    pb_target: Decimal,
    rec_real: Decimal,
    rec_target: Decimal,
    newrec_real: Decimal,
    newrec_target: Decimal,
    opp_target: Decimal,
}

impl From<KpiRow> for KpiSums {
    fn from(row: KpiRow) -> Self {
        Self {
            total_sales_real: row.total_sales_real,
            baseline_target: row.baseline_target,
            carry_real: row.carry_real,
            carry_target: row.carry_target,
            project_based_real: row.pb_real,
            project_based_target: row.pb_target,
            recurring_real: row.rec_real,
            recurring_target: row.rec_target,
            new_recurring_real: row.newrec_real,
            new_recurring_target: row.newrec_target,
            opportunity_target: row.opp_target,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total_target_revenue: Decimal,
    total_realization: Decimal,
    total_projects: i64,
}

#[derive(Debug, FromQueryResult)]
struct StageQueryRow {
    stage: i16,
    count: i64,
    target_revenue: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct LabelValueRow {
    label: String,
    value: Decimal,
}

impl From<LabelValueRow> for BreakdownItem {
    fn from(row: LabelValueRow) -> Self {
        Self {
            label: row.label,
            value: row.value,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct ForecastRow {
    month: String,
    target: Decimal,
    realization: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct TopProjectRow {
    id: i64,
    name: String,
    target_revenue: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct BudgetTotalsRow {
    total_budget: Decimal,
    total_realization: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct CustomerQueryRow {
    customer: String,
    total_target: Decimal,
    total_real: Decimal,
}

fn kpi_sql(where_clause: &str) -> String {
    let sum_if = |cond: &str, col: &str| {
        format!("COALESCE(SUM(CASE WHEN {cond} THEN COALESCE(r.{col}, 0) ELSE 0 END), 0)")
    };
    let pb = format!("{ACTIVE} AND p.project_type = 'Project Based'");
    let rec = format!("{ACTIVE} AND p.project_type = 'Recurring'");
    let newrec = "p.status = 'New Prospect' AND p.project_type = 'New Recurring'";
    let carry = "p.status = 'Carry Over'";

    format!(
        "SELECT
            COALESCE(SUM(COALESCE(r.target_realization, 0)), 0) AS total_sales_real,
            {baseline} AS baseline_target,
            {carry_real} AS carry_real,
            {carry_target} AS carry_target,
            {pb_real} AS pb_real,
            {pb_target} AS pb_target,
            {rec_real} AS rec_real,
            {rec_target} AS rec_target,
            {newrec_real} AS newrec_real,
            {newrec_target} AS newrec_target,
            COALESCE(SUM(COALESCE(r.target_revenue, 0)), 0) AS opp_target
         {PROJECT_JOINS}
         WHERE {where_clause}",
        baseline = sum_if(ACTIVE, "target_revenue"),
        carry_real = sum_if(carry, "target_realization"),
        carry_target = sum_if(carry, "target_revenue"),
        pb_real = sum_if(&pb, "target_realization"),
        pb_target = sum_if(&pb, "target_revenue"),
        rec_real = sum_if(&rec, "target_realization"),
        rec_target = sum_if(&rec, "target_revenue"),
        newrec_real = sum_if(newrec, "target_realization"),
        newrec_target = sum_if(newrec, "target_revenue"),
    )
}

fn breakdown_sql(group_expr: &str, value_col: &str, where_clause: &str) -> String {
    format!(
        "SELECT {group_expr} AS label,
                COALESCE(SUM(COALESCE(r.{value_col}, 0)), 0) AS value
         {PROJECT_JOINS}
         WHERE {where_clause}
         GROUP BY {group_expr}
         ORDER BY {group_expr}"
    )
}

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the full dashboard for a resolved filter.
    ///
    /// # Errors
    ///
    /// Returns an error if any aggregation query fails.
    pub async fn load(
        &self,
        projects: &ProjectFilter,
        budgets: &BudgetFilter,
    ) -> Result<DashboardResponse, DbErr> {
        let conds = project_conditions(projects);
        let where_clause = conds.clause();

        let kpis = self.kpis(&conds, &where_clause).await?;
        let totals = self.totals(&conds, &where_clause).await?;
        let pipeline = self.pipeline(&conds, &where_clause).await?;

        let division_breakdown = self
            .breakdown(&conds, &breakdown_sql("p.division", "target_revenue", &where_clause))
            .await?;
        let status_breakdown = self
            .breakdown(&conds, &breakdown_sql("p.status", "target_revenue", &where_clause))
            .await?;
        let type_breakdown = self
            .breakdown(&conds, &breakdown_sql("p.project_type", "target_revenue", &where_clause))
            .await?;
        let customer_contribution = self
            .breakdown(
                &conds,
                &format!(
                    "SELECT COALESCE(c.name, 'Unknown') AS label,
                            COALESCE(SUM(COALESCE(r.target_realization, 0)), 0) AS value
                     {PROJECT_JOINS}
                     WHERE {where_clause}
                     GROUP BY c.name
                     ORDER BY value DESC, label
                     LIMIT 6"
                ),
            )
            .await?;

        let forecast = self.forecast(&conds, &where_clause).await?;
        let top_projects = self.top_projects(&conds, &where_clause).await?;
        let budget = self.budget_totals(budgets).await?;
        let customer_table = self.customer_table(&conds, &where_clause).await?;

        tracing::debug!(
            projects = totals.total_projects,
            forecast_months = forecast.len(),
            "Dashboard loaded"
        );

        Ok(DashboardResponse {
            kpis,
            totals,
            pipeline,
            division_breakdown,
            type_breakdown,
            customer_contribution,
            status_breakdown,
            budget,
            forecast,
            top_projects,
            customer_table,
        })
    }

    async fn kpis(&self, conds: &SqlConditions, where_clause: &str) -> Result<DashboardKpis, DbErr> {
        let sums = KpiRow::find_by_statement(statement(&kpi_sql(where_clause), conds))
            .one(&self.db)
            .await?
            .map(KpiSums::from)
            .unwrap_or_default();
        Ok(DashboardKpis::from_sums(sums))
    }

    async fn totals(
        &self,
        conds: &SqlConditions,
        where_clause: &str,
    ) -> Result<DashboardTotals, DbErr> {
        let sql = format!(
            "SELECT COALESCE(SUM(r.target_revenue), 0) AS total_target_revenue,
                    COALESCE(SUM(r.target_realization), 0) AS total_realization,
                    COUNT(DISTINCT p.id) AS total_projects
             {PROJECT_JOINS}
             WHERE {where_clause} AND {ACTIVE}"
        );
        Ok(TotalsRow::find_by_statement(statement(&sql, conds))
            .one(&self.db)
            .await?
            .map(|row| DashboardTotals {
                total_target_revenue: row.total_target_revenue,
                total_realization: row.total_realization,
                total_projects: row.total_projects,
            })
            .unwrap_or_default())
    }

    async fn pipeline(&self, conds: &SqlConditions, where_clause: &str) -> Result<Pipeline, DbErr> {
        let sql = format!(
            "SELECT p.sales_stage AS stage,
                    COUNT(DISTINCT p.id) AS count,
                    COALESCE(SUM(COALESCE(r.target_revenue, 0)), 0) AS target_revenue
             {PROJECT_JOINS}
             WHERE {where_clause}
             GROUP BY p.sales_stage
             ORDER BY p.sales_stage"
        );
        let rows: Vec<StageRow> = StageQueryRow::find_by_statement(statement(&sql, conds))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| StageRow {
                stage: i32::from(row.stage),
                count: row.count,
                target_revenue: row.target_revenue,
            })
            .collect();
        Ok(Pipeline::from_stage_rows(&rows))
    }

    async fn breakdown(
        &self,
        conds: &SqlConditions,
        sql: &str,
    ) -> Result<Vec<BreakdownItem>, DbErr> {
        Ok(LabelValueRow::find_by_statement(statement(sql, conds))
            .all(&self.db)
            .await?
            .into_iter()
            .map(BreakdownItem::from)
            .collect())
    }

    async fn forecast(
        &self,
        conds: &SqlConditions,
        where_clause: &str,
    ) -> Result<Vec<ForecastPoint>, DbErr> {
        let sql = format!(
            "SELECT to_char(r.month, 'YYYY-MM') AS month,
                    COALESCE(SUM(CASE WHEN {ACTIVE} THEN COALESCE(r.target_revenue, 0) ELSE 0 END), 0)
                        AS target,
                    COALESCE(SUM(COALESCE(r.target_realization, 0)), 0) AS realization
             FROM project_revenue_plan r
             JOIN projects p ON p.id = r.project_id
             LEFT JOIN customers c ON c.id = p.customer_id
             WHERE {where_clause}
             GROUP BY 1
             ORDER BY 1"
        );
        Ok(ForecastRow::find_by_statement(statement(&sql, conds))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| ForecastPoint {
                month: row.month,
                target: row.target,
                realization: row.realization,
            })
            .collect())
    }

    async fn top_projects(
        &self,
        conds: &SqlConditions,
        where_clause: &str,
    ) -> Result<Vec<TopProject>, DbErr> {
        let sql = format!(
            "SELECT p.id, p.description AS name,
                    COALESCE(SUM(COALESCE(r.target_revenue, 0)), 0) AS target_revenue
             {PROJECT_JOINS}
             WHERE {where_clause}
             GROUP BY p.id, p.description
             ORDER BY target_revenue DESC, p.id
             LIMIT 5"
        );
        Ok(TopProjectRow::find_by_statement(statement(&sql, conds))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| TopProject {
                id: row.id,
                name: row.name,
                target_revenue: row.target_revenue,
            })
            .collect())
    }

    async fn budget_totals(&self, filter: &BudgetFilter) -> Result<BudgetTotals, DbErr> {
        let conds = budget_conditions(filter);
        let sql = format!(
            "SELECT COALESCE(SUM(b.budget_amount), 0) AS total_budget,
                    COALESCE(SUM(br.total_realization), 0) AS total_realization
             FROM budgets b
             LEFT JOIN (
                 SELECT budget_id, SUM(amount) AS total_realization
                 FROM budget_realization
                 GROUP BY budget_id
             ) br ON br.budget_id = b.id
             WHERE {}",
            conds.clause()
        );
        Ok(BudgetTotalsRow::find_by_statement(statement(&sql, &conds))
            .one(&self.db)
            .await?
            .map(|row| BudgetTotals {
                total_budget: row.total_budget,
                total_realization: row.total_realization,
            })
            .unwrap_or_default())
    }

    async fn customer_table(
        &self,
        conds: &SqlConditions,
        where_clause: &str,
    ) -> Result<Vec<CustomerRow>, DbErr> {
        let sql = format!(
            "SELECT COALESCE(c.name, 'Unknown') AS customer,
                    COALESCE(SUM(COALESCE(r.target_revenue, 0)), 0) AS total_target,
                    COALESCE(SUM(COALESCE(r.target_realization, 0)), 0) AS total_real
             {PROJECT_JOINS}
             WHERE {where_clause}
             GROUP BY c.name
             ORDER BY total_real DESC, customer"
        );
        Ok(CustomerQueryRow::find_by_statement(statement(&sql, conds))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| CustomerRow {
                customer: row.customer,
                total_target: row.total_target,
                total_real: row.total_real,
            })
            .collect())
    }
}

fn statement(sql: &str, conds: &SqlConditions) -> Statement {
    Statement::from_sql_and_values(DbBackend::Postgres, sql, conds.values())
}
