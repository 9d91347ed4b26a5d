//! Initial database migration.
//!
//! Creates users, customers, projects with their revenue plans and post-PO
//! monitoring, division budgets with realization, and the project code
//! sequence table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ACCOUNTS & CUSTOMERS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;

        // ============================================================
        // PART 2: PROJECTS
        // ============================================================
        db.execute_unprepared(PROJECTS_SQL).await?;
        db.execute_unprepared(PROJECT_REVENUE_PLAN_SQL).await?;
        db.execute_unprepared(PROJECT_POSTPO_MONITORING_SQL).await?;
        db.execute_unprepared(PROJECT_CODE_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 3: BUDGETS
        // ============================================================
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(BUDGET_REALIZATION_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    username VARCHAR(100) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role VARCHAR(20) NOT NULL CHECK (role IN ('admin', 'user')),
    division VARCHAR(100) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    industry VARCHAR(255),
    region VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_name ON customers(name);
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id BIGSERIAL PRIMARY KEY,
    project_code VARCHAR(50) NOT NULL UNIQUE,
    description TEXT NOT NULL,
    customer_id BIGINT REFERENCES customers(id) ON DELETE SET NULL,
    division VARCHAR(100) NOT NULL,
    status VARCHAR(20) NOT NULL
        CHECK (status IN ('Carry Over', 'Prospect', 'New Prospect')),
    project_type VARCHAR(20) NOT NULL
        CHECK (project_type IN ('Project Based', 'Recurring', 'New Recurring')),
    sales_stage SMALLINT NOT NULL DEFAULT 1 CHECK (sales_stage BETWEEN 1 AND 6),
    sph_status VARCHAR(10) CHECK (sph_status IN ('Open', 'Hold', 'Drop', 'Win', 'Loss')),
    sph_release_date DATE,
    sph_release_status VARCHAR(3) NOT NULL DEFAULT 'No'
        CHECK (sph_release_status IN ('Yes', 'No')),
    sph_number VARCHAR(100),
    sph_status_reason_category VARCHAR(20)
        CHECK (sph_status_reason_category IN ('Administrasi', 'Teknis', 'Other')),
    sph_status_reason_note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_new_recurring_status
        CHECK (project_type <> 'New Recurring' OR status = 'New Prospect')
);

CREATE INDEX idx_projects_division ON projects(division);
CREATE INDEX idx_projects_customer ON projects(customer_id);
CREATE INDEX idx_projects_stage ON projects(sales_stage);
";

const PROJECT_REVENUE_PLAN_SQL: &str = r"
CREATE TABLE project_revenue_plan (
    id BIGSERIAL PRIMARY KEY,
    project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    month DATE NOT NULL CHECK (EXTRACT(DAY FROM month) = 1),
    target_revenue NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (target_revenue >= 0),
    target_realization NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (target_realization >= 0),

    CONSTRAINT uq_revenue_plan_month UNIQUE (project_id, month)
);

CREATE INDEX idx_revenue_plan_month ON project_revenue_plan(month);
";

const PROJECT_POSTPO_MONITORING_SQL: &str = r"
CREATE TABLE project_postpo_monitoring (
    project_id BIGINT PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
    stage1_status VARCHAR(20) NOT NULL DEFAULT 'Not Started',
    stage1_date DATE,
    stage1_note TEXT,
    stage2_status VARCHAR(20) NOT NULL DEFAULT 'Not Started',
    stage2_date DATE,
    stage2_note TEXT,
    stage3_status VARCHAR(20) NOT NULL DEFAULT 'Not Started',
    stage3_date DATE,
    stage3_note TEXT,
    stage4_status VARCHAR(20) NOT NULL DEFAULT 'Not Started',
    stage4_date DATE,
    stage4_note TEXT,
    stage5_status VARCHAR(20) NOT NULL DEFAULT 'Not Started',
    stage5_date DATE,
    stage5_note TEXT,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PROJECT_CODE_SEQUENCES_SQL: &str = r"
CREATE TABLE project_code_sequences (
    year INT NOT NULL,
    division_code VARCHAR(10) NOT NULL,
    last_seq INT NOT NULL,
    PRIMARY KEY (year, division_code)
);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id BIGSERIAL PRIMARY KEY,
    division VARCHAR(100) NOT NULL,
    month DATE NOT NULL CHECK (EXTRACT(DAY FROM month) = 1),
    budget_amount NUMERIC(18, 2) NOT NULL CHECK (budget_amount >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_budgets_division_month UNIQUE (division, month)
);
";

const BUDGET_REALIZATION_SQL: &str = r"
CREATE TABLE budget_realization (
    id BIGSERIAL PRIMARY KEY,
    budget_id BIGINT NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
    category VARCHAR(100) NOT NULL,
    amount NUMERIC(18, 2) NOT NULL CHECK (amount > 0),
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_budget_realization_budget ON budget_realization(budget_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS budget_realization CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS project_code_sequences CASCADE;
DROP TABLE IF EXISTS project_postpo_monitoring CASCADE;
DROP TABLE IF EXISTS project_revenue_plan CASCADE;
DROP TABLE IF EXISTS projects CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS users CASCADE;
";
